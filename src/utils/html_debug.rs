// src/utils/html_debug.rs
use std::fs;
use std::path::Path;
use regex::Regex;
use crate::utils::error::AppError;

/// Patterns the table locator relies on, paired with the highlight kind used in the dump.
pub const LOCATOR_ANCHOR_PATTERNS: &[(&str, &str)] = &[
    (r"(?i)<h[1-6][^>]*>\s*Results\s*</h[1-6]>", "heading"),
    (r"Volume\s+Offered", "signature"),
    (r"\bRegion\b", "region"),
    (r"\bTechnology\b", "technology"),
    (r"(?i)<table\b", "table"),
];

fn css_class(kind: &str) -> &'static str {
    match kind {
        "heading" => "highlight-heading",
        "signature" => "highlight-signature",
        "region" => "highlight-region",
        "technology" => "highlight-technology",
        "table" => "highlight-table",
        _ => "highlight-custom",
    }
}

/// Writes `html` to `path` wrapped in a page that highlights the given byte ranges.
/// Ranges overlapping an earlier highlight are skipped.
pub fn save_debug_html(html: &str, path: &Path, highlights: &[(usize, usize, &str)]) -> Result<(), AppError> {
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    debug_html.push_str(".highlight-heading { background-color: #FFFF00; }\n");
    debug_html.push_str(".highlight-signature { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-region { background-color: #ADD8E6; }\n");
    debug_html.push_str(".highlight-technology { background-color: #FFA500; }\n");
    debug_html.push_str(".highlight-table { outline: 2px solid #FF0000; }\n");
    debug_html.push_str(".highlight-custom { background-color: #FFC0CB; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut sorted = highlights.to_vec();
    sorted.sort_by_key(|h| (h.0, h.1));

    let mut last_pos = 0;
    for (start, end, kind) in sorted {
        if start < last_pos || end > html.len() || start >= end {
            continue;
        }
        debug_html.push_str(&html[last_pos..start]);
        debug_html.push_str(&format!(
            "<span class=\"{}\" title=\"Position: {}-{}, Kind: {}\">",
            css_class(kind), start, end, kind
        ));
        debug_html.push_str(&html[start..end]);
        debug_html.push_str("</span>");
        last_pos = end;
    }
    debug_html.push_str(&html[last_pos..]);
    debug_html.push_str("\n</body>\n</html>");

    fs::write(path, debug_html)?;
    tracing::info!("Saved debug HTML to {}", path.display());
    Ok(())
}

/// Creates a debug copy of a page with every match of the given regex patterns highlighted.
pub fn create_debug_html(html: &str, path: &Path, patterns: &[(&str, &str)]) -> Result<(), AppError> {
    let mut highlights = Vec::new();

    for (pattern, kind) in patterns {
        let re = Regex::new(pattern)
            .map_err(|e| AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e)))?;
        for mat in re.find_iter(html) {
            highlights.push((mat.start(), mat.end(), *kind));
        }
    }

    tracing::debug!("Annotating {} locator anchors in debug dump", highlights.len());
    save_debug_html(html, path, &highlights)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("auction_scraper_debug_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_annotates_locator_anchors() {
        let html = "<h2>Results</h2><table><tr><th>Region</th><th>Volume Offered</th></tr></table>";
        let path = temp_path("annotated.html");

        create_debug_html(html, &path, LOCATOR_ANCHOR_PATTERNS).unwrap();
        let written = fs::read_to_string(&path).unwrap();

        assert!(written.contains("class=\"highlight-heading\""), "Heading not highlighted");
        assert!(written.contains("class=\"highlight-signature\""), "Signature not highlighted");
        assert!(written.contains("class=\"highlight-region\""), "Region not highlighted");
        assert!(written.contains("</table>"), "Trailing markup lost");
    }

    #[test]
    fn test_overlapping_highlights_are_skipped() {
        let html = "abcdef";
        let path = temp_path("overlap.html");

        save_debug_html(html, &path, &[(0, 4, "custom"), (2, 5, "custom")]).unwrap();
        let written = fs::read_to_string(&path).unwrap();

        assert_eq!(written.matches("<span").count(), 1);
        assert!(written.contains(">abcd</span>ef"), "Unexpected body: {}", written);
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let path = temp_path("invalid.html");
        let result = create_debug_html("x", &path, &[("(", "custom")]);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
