//! Umbrella crate for the reqmatch catalog matching engine.
//!
//! This crate stitches the text layer, the catalog index, and the matching
//! cascade together so callers can go from a catalog dump plus a batch of
//! extracted request lines to per-line verdicts with a single entry point.
//!
//! The engine is a pure function of (index, query, config): it fetches
//! nothing, persists nothing, and never mutates the snapshot after
//! construction. Catalog refreshes are handled by building a new matcher
//! and swapping the handle; in-flight matches keep the old snapshot.
//!
//! ```
//! use reqmatch::{match_lines, LineSource, MatchConfig, MatchStatus, QueryLine};
//! use reqmatch::{ProductFlatCodes, ProductRecord};
//!
//! let products = vec![ProductRecord {
//!     id: 1,
//!     sync_uid: Some("sync-1".into()),
//!     header: "Кабель ВВГнг 3x2.5".into(),
//!     articul: Some("ELC0100203802".into()),
//!     unit_header: Some("м".into()),
//!     manufacturer_header: None,
//!     multiplicity_order: None,
//!     analog_codes: vec![],
//!     flat_codes: ProductFlatCodes::default(),
//!     updated_at: None,
//!     raw: serde_json::Value::Null,
//! }];
//!
//! let lines = vec![QueryLine::parse(1, LineSource::EmailText, "ELC0100203802 2 шт")];
//! let matched = match_lines(products, lines, MatchConfig::default()).expect("valid catalog");
//! assert_eq!(matched[0].result.status, MatchStatus::Ok);
//! ```

pub use reqmatch_catalog::{
    CatalogError, NormalizedHeader, ProductFlatCodes, ProductIndex, ProductRecord,
};
pub use reqmatch_engine::{
    set_match_metrics, CatalogMatcher, LineItem, LineSource, MatchCandidate, MatchConfig,
    MatchError, MatchMetrics, MatchProduct, MatchReason, MatchResult, MatchStatus, MatchedLine,
    Matcher, QueryLine,
};
pub use reqmatch_text::{
    bigram_similarity, header_score, looks_like_code, normalize_code, normalize_header,
    normalize_unit, parse_qty, tokenize, ParsedQty,
};

use tracing::debug;

/// Derive query forms for a batch of extracted lines.
pub fn normalize_lines(items: Vec<LineItem>) -> Vec<QueryLine> {
    items.into_iter().map(QueryLine::from_item).collect()
}

/// Build one index snapshot from the catalog and match a batch of lines
/// against it.
///
/// Every line is matched independently; order is preserved so the output
/// rows line up with the extraction output.
pub fn match_lines(
    products: Vec<ProductRecord>,
    lines: Vec<QueryLine>,
    config: MatchConfig,
) -> Result<Vec<MatchedLine>, MatchError> {
    let matcher = CatalogMatcher::new(products, config)?;
    debug!(lines = lines.len(), catalog = matcher.index().len(), "matching extracted lines");
    Ok(lines
        .into_iter()
        .map(|line| {
            let result = matcher.match_line(&line);
            MatchedLine { line, result }
        })
        .collect())
}
