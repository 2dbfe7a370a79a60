// src/extractors/orchestrator.rs
use scraper::Html;
use crate::extractors::locator::locate;
use crate::extractors::rows::extract_rows;
use crate::market::models::AuctionRecord;
use crate::utils::error::ExtractError;

/// Runs locate → classify → extract over a whole page.
///
/// Stateless; an empty result is reported as [`ExtractError::NoDataFound`], never as success.
pub struct AuctionExtractor;

impl AuctionExtractor {
    pub fn new() -> Self { Self {} }

    pub fn run_extraction(&self, html_content: &str) -> Result<Vec<AuctionRecord>, ExtractError> {
        let document = Html::parse_document(html_content);

        let candidates = locate(&document);
        tracing::info!("Located {} candidate result tables", candidates.len());

        let mut records = Vec::new();
        for candidate in &candidates {
            let rows = extract_rows(candidate.element, candidate.record_type);
            tracing::debug!(
                "Table ({}, {}) produced {} records",
                candidate.record_type, candidate.tier, rows.len()
            );
            records.extend(rows);
        }

        if records.is_empty() {
            tracing::error!("No auction records extracted from {} candidate tables", candidates.len());
            return Err(ExtractError::NoDataFound);
        }

        tracing::info!("Extracted {} auction records", records.len());
        Ok(records)
    }
}

impl Default for AuctionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::models::RecordType;

    #[test]
    fn test_results_heading_with_region_and_technology_tables() {
        let html = r#"<!DOCTYPE html><html><body>
            <h1>French Auctions Power</h1>
            <h2>Results</h2>
            <table>
              <tr><th>Region</th><th>Volume Offered</th><th>Volume Allocated</th><th>Weighted Avg Price</th></tr>
              <tr><td>Île-de-France</td><td>1000</td><td>950</td><td>42.5</td></tr>
            </table>
            <table>
              <tr><th>Technology</th><th>Volume Offered</th><th>Volume Allocated</th><th>Weighted Avg Price</th></tr>
              <tr><td>Wind</td><td>2000</td><td>1980</td><td>40.1</td></tr>
            </table>
            </body></html>"#;

        let records = AuctionExtractor::new().run_extraction(html).unwrap();

        assert_eq!(records, vec![
            AuctionRecord {
                name: "Île-de-France".to_string(),
                record_type: RecordType::Region,
                volume_offered: Some(1000.0),
                volume_allocated: 950.0,
                weighted_avg_price: 42.5,
            },
            AuctionRecord {
                name: "Wind".to_string(),
                record_type: RecordType::Technology,
                volume_offered: Some(2000.0),
                volume_allocated: 1980.0,
                weighted_avg_price: 40.1,
            },
        ]);
    }

    #[test]
    fn test_signature_fallback_without_results_heading() {
        let html = r#"<html><body>
            <h2>Latest auction</h2>
            <div class="table-wrapper"><table>
              <thead><tr><th>Region</th><th>Volume Offered</th><th>Volume Allocated</th><th>Price</th></tr></thead>
              <tbody><tr><td>Grand Est</td><td>500</td><td>480</td><td>39.9</td></tr></tbody>
            </table></div>
            </body></html>"#;

        let records = AuctionExtractor::new().run_extraction(html).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Grand Est");
        assert_eq!(records[0].record_type, RecordType::Region);
    }

    #[test]
    fn test_only_header_or_short_rows_is_no_data() {
        let html = r#"<html><body><h2>Results</h2>
            <table><tr><td>Region</td><td>Volume Offered</td><td>Volume Allocated</td><td>Price</td></tr>
                   <tr><td>Bretagne</td><td>10</td></tr></table>
            <table><tr><td>Technology</td><td>Volume Offered</td><td>Volume Allocated</td><td>Price</td></tr></table>
            </body></html>"#;

        let result = AuctionExtractor::new().run_extraction(html);
        assert!(matches!(result, Err(ExtractError::NoDataFound)), "Expected NoDataFound, got {:?}", result);
    }

    #[test]
    fn test_page_without_qualifying_tables_is_no_data() {
        let html = r#"<html><body><table><tr><td>Opening</td><td>9:00</td><td>x</td><td>y</td></tr></table></body></html>"#;
        let result = AuctionExtractor::new().run_extraction(html);
        assert!(matches!(result, Err(ExtractError::NoDataFound)));
    }

    #[test]
    fn test_layout_table_around_results_yields_each_row_once() {
        let html = r#"<html><body>
            <h2>Latest auction</h2>
            <table class="layout"><tr>
              <td><table>
                <tr><th>Region</th><th>Volume Offered</th><th>Volume Allocated</th><th>Price</th></tr>
                <tr><td>Bretagne</td><td>300</td><td>290</td><td>41.0</td></tr>
              </table></td>
              <td><table>
                <tr><th>Technology</th><th>Volume Offered</th><th>Volume Allocated</th><th>Price</th></tr>
                <tr><td>Wind</td><td>2000</td><td>1980</td><td>40.1</td></tr>
              </table></td>
            </tr></table>
            </body></html>"#;

        let records = AuctionExtractor::new().run_extraction(html).unwrap();

        let summary: Vec<(&str, RecordType)> = records.iter().map(|r| (r.name.as_str(), r.record_type)).collect();
        assert_eq!(summary, vec![("Bretagne", RecordType::Region), ("Wind", RecordType::Technology)]);
    }
}
