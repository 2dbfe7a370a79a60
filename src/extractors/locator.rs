// src/extractors/locator.rs

// --- Imports ---
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use crate::extractors::classifier::{classify, element_text};
use crate::market::models::RecordType;

// --- Constants ---
const RESULTS_HEADING_TEXT: &str = "results";
const TABLES_UNDER_RESULTS: usize = 2;
const COLUMN_SIGNATURE: &str = "Volume Offered";
const TYPE_SIGNATURES: [&str; 2] = ["Region", "Technology"];
const SECTION_BOUNDARIES: [&str; 5] = ["section", "article", "main", "body", "html"];

// --- CSS Selectors (Lazy Static) ---
static HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6").expect("Failed to compile HEADING_SELECTOR")
});

static TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("table").expect("Failed to compile TABLE_SELECTOR")
});

// --- Data Structures ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorTier {
    /// Tables following a heading that reads "Results".
    HeadingAnchored,
    /// Any table carrying both the column signature and a type header.
    ContentSignature,
}

impl fmt::Display for LocatorTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorTier::HeadingAnchored => f.write_str("heading-anchored"),
            LocatorTier::ContentSignature => f.write_str("content-signature"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CandidateTable<'a> {
    pub element: ElementRef<'a>,
    pub record_type: RecordType,
    pub tier: LocatorTier,
}

/// Finds the result tables of a document, in document order, without duplicates.
///
/// The heading-anchored tier is accepted only when it yields two tables; otherwise the
/// content-signature tier decides, whatever it finds.
pub fn locate(document: &Html) -> Vec<CandidateTable<'_>> {
    let anchored = heading_anchored_tables(document);
    if anchored.len() >= TABLES_UNDER_RESULTS {
        tracing::debug!("Heading-anchored tier found {} tables", anchored.len());
        return into_candidates(anchored, LocatorTier::HeadingAnchored);
    }

    tracing::debug!(
        "Heading-anchored tier found {} tables, falling back to content signature",
        anchored.len()
    );
    let signed = signature_tables(document);
    tracing::debug!("Content-signature tier found {} tables", signed.len());
    into_candidates(signed, LocatorTier::ContentSignature)
}

fn into_candidates(tables: Vec<ElementRef<'_>>, tier: LocatorTier) -> Vec<CandidateTable<'_>> {
    let mut candidates: Vec<CandidateTable> = Vec::with_capacity(tables.len());
    for element in tables {
        if candidates.iter().any(|c| c.element.id() == element.id()) {
            continue;
        }
        let record_type = classify(&element_text(element));
        tracing::trace!("Candidate <table> classified as {} ({})", record_type, tier);
        candidates.push(CandidateTable { element, record_type, tier });
    }
    candidates
}

/// Tier 1: tries every "Results" heading in order; the first one followed by two tables wins.
/// Returns the best partial result when none does.
fn heading_anchored_tables(document: &Html) -> Vec<ElementRef<'_>> {
    let mut best: Vec<ElementRef> = Vec::new();

    for heading in document.select(&HEADING_SELECTOR) {
        if element_text(heading).to_lowercase() != RESULTS_HEADING_TEXT {
            continue;
        }
        tracing::debug!("Found results heading <{}>", heading.value().name());

        let tables = tables_after(heading, TABLES_UNDER_RESULTS);
        if tables.len() >= TABLES_UNDER_RESULTS {
            return tables;
        }
        if tables.len() > best.len() {
            best = tables;
        }
    }

    best
}

/// Collects up to `limit` tables under `anchor` or after it within its section: the anchor's
/// descendants, then the subtrees of the following siblings of its section scope.
/// Layout tables (tables holding other tables) are looked through, not collected.
fn tables_after<'a>(anchor: ElementRef<'a>, limit: usize) -> Vec<ElementRef<'a>> {
    let scope = section_scope(anchor);
    let following = anchor
        .descendants()
        .chain(scope.next_siblings().flat_map(|sibling| sibling.descendants()));

    let mut tables: Vec<ElementRef> = Vec::new();
    for node in following {
        let Some(element) = ElementRef::wrap(node) else { continue };
        if !is_table(element) || contains_table(element) {
            continue;
        }
        let nested = element
            .ancestors()
            .any(|ancestor| tables.iter().any(|t| t.id() == ancestor.id()));
        if nested {
            continue;
        }

        tables.push(element);
        if tables.len() == limit {
            break;
        }
    }

    tables
}

/// The element whose following siblings belong to the anchor's section. A heading that is the
/// last element of a wrapper climbs to the wrapper, but never past a sectioning element.
fn section_scope(anchor: ElementRef<'_>) -> ElementRef<'_> {
    let mut scope = anchor;
    loop {
        if scope.next_siblings().any(|sibling| sibling.value().is_element()) {
            return scope;
        }
        let Some(parent) = scope.parent().and_then(ElementRef::wrap) else { return scope };
        if SECTION_BOUNDARIES.contains(&parent.value().name()) {
            return scope;
        }
        scope = parent;
    }
}

fn is_table(element: ElementRef) -> bool {
    element.value().name() == "table"
}

fn contains_table(element: ElementRef) -> bool {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(is_table)
}

/// Tier 2: every table whose text carries the column signature and a type header.
/// A qualifying table that wraps another qualifying table is dropped in favour of the inner one.
fn signature_tables(document: &Html) -> Vec<ElementRef<'_>> {
    let qualifying: Vec<ElementRef> = document
        .select(&TABLE_SELECTOR)
        .filter(|table| {
            let text = element_text(*table);
            text.contains(COLUMN_SIGNATURE) && TYPE_SIGNATURES.iter().any(|sig| text.contains(sig))
        })
        .collect();

    qualifying
        .iter()
        .filter(|outer| {
            !qualifying.iter().any(|inner| {
                inner.id() != outer.id() && inner.ancestors().any(|a| a.id() == outer.id())
            })
        })
        .copied()
        .collect()
}
