// src/extractors/classifier.rs
use scraper::ElementRef;
use crate::market::models::RecordType;

/// Decides the semantic type of a table from its full text. First match wins,
/// case-sensitive: `Region`, then `Technology`, then `Calendar` / `Auctioning month`.
pub fn classify(table_text: &str) -> RecordType {
    if table_text.contains("Region") {
        RecordType::Region
    } else if table_text.contains("Technology") {
        RecordType::Technology
    } else if table_text.contains("Calendar") || table_text.contains("Auctioning month") {
        RecordType::Calendar
    } else {
        RecordType::Unknown
    }
}

/// Concatenated text of an element with non-breaking spaces folded and whitespace runs collapsed.
pub fn element_text(element: ElementRef) -> String {
    let raw = element.text().collect::<String>();
    collapse_whitespace(&raw.replace('\u{a0}', " "))
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_first_match_wins() {
        assert_eq!(classify("Region Technology Volume Offered"), RecordType::Region);
        assert_eq!(classify("Technology Volume Offered"), RecordType::Technology);
        assert_eq!(classify("Calendar 2026"), RecordType::Calendar);
        assert_eq!(classify("Auctioning month Volume"), RecordType::Calendar);
        assert_eq!(classify("Opening hours"), RecordType::Unknown);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        assert_eq!(classify("region technology"), RecordType::Unknown);
    }

    #[test]
    fn test_element_text_folds_nbsp_and_newlines() {
        let doc = Html::parse_fragment("<table><tr><th>Volume&nbsp;\n   Offered</th></tr></table>");
        let table = doc.select(&Selector::parse("table").unwrap()).next().unwrap();
        assert_eq!(element_text(table), "Volume Offered");
    }
}
