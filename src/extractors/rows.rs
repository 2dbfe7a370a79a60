// src/extractors/rows.rs
use scraper::ElementRef;
use crate::extractors::classifier::element_text;
use crate::extractors::numeric::normalize_number;
use crate::market::models::{AuctionRecord, RecordType};

const MIN_CELLS: usize = 4;
// Header rows repeat a column name in their first cell.
const HEADER_MARKERS: [&str; 3] = ["region", "technology", "volume"];

/// Walks the rows of a classified table and emits one record per data row.
///
/// Column order is fixed: name, volume offered, volume allocated, weighted average price.
/// Short rows, header-like rows and rows without a name are skipped; rows whose allocated
/// volume or price do not parse are dropped. An unparseable offered volume is kept as `None`.
pub fn extract_rows(table: ElementRef, record_type: RecordType) -> Vec<AuctionRecord> {
    let mut records = Vec::new();

    for row in own_rows(table) {
        let cells: Vec<String> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|cell| matches!(cell.value().name(), "td" | "th"))
            .map(element_text)
            .collect();

        if cells.len() < MIN_CELLS {
            continue;
        }

        let name = cells[0].trim();
        if name.is_empty() || is_header_like(name) {
            tracing::trace!("Skipping header/empty row: '{}'", name);
            continue;
        }

        let (Some(volume_allocated), Some(weighted_avg_price)) =
            (normalize_number(&cells[2]), normalize_number(&cells[3]))
        else {
            tracing::debug!(
                "Dropping row '{}': unparseable allocated volume '{}' or price '{}'",
                name, cells[2], cells[3]
            );
            continue;
        };

        records.push(AuctionRecord {
            name: name.to_string(),
            record_type,
            volume_offered: normalize_number(&cells[1]),
            volume_allocated,
            weighted_avg_price,
        });
    }

    records
}

/// Rows belonging to `table` itself (direct or via `thead`/`tbody`/`tfoot`), not to nested tables.
fn own_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|row| row.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

fn is_header_like(first_cell: &str) -> bool {
    let lowered = first_cell.to_lowercase();
    HEADER_MARKERS.iter().any(|marker| lowered.contains(marker))
}
