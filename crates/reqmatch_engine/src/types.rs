//! Query and verdict types plus the cascade configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use reqmatch_catalog::{CatalogError, ProductFlatCodes, ProductRecord};
use reqmatch_text::{collapse_whitespace, normalize_header, parse_qty, strip_qty};

/// Where an extracted line came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LineSource {
    EmailText,
    EmailHtmlTable,
    Xlsx,
    Pdf,
}

/// One request line as delivered by the extraction pipeline, before the
/// query form is derived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub line_no: usize,
    pub source: LineSource,
    pub raw_line: String,
    /// Candidate item description or code, when the extractor isolated one.
    pub name_or_code: Option<String>,
    pub qty: Option<f64>,
    pub unit: Option<String>,
}

/// A request line ready for matching, with its pre-normalized query form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryLine {
    pub line_no: usize,
    pub source: LineSource,
    pub raw_line: String,
    pub name_or_code: Option<String>,
    pub qty: Option<f64>,
    pub unit: Option<String>,
    /// Normalized header form of `name_or_code`, falling back to `raw_line`
    /// when `name_or_code` is absent or normalizes to nothing.
    pub normalized: String,
}

impl QueryLine {
    /// Derive the query form from an extracted line.
    pub fn from_item(item: LineItem) -> Self {
        let mut normalized = item
            .name_or_code
            .as_deref()
            .map(normalize_header)
            .unwrap_or_default();
        if normalized.is_empty() {
            normalized = normalize_header(&item.raw_line);
        }
        QueryLine {
            line_no: item.line_no,
            source: item.source,
            raw_line: item.raw_line,
            name_or_code: item.name_or_code,
            qty: item.qty,
            unit: item.unit,
            normalized,
        }
    }

    /// Build a query line from raw text alone: collapse whitespace, derive
    /// quantity and unit with the quantity parser, and strip the quantity
    /// span to isolate the item name or code.
    pub fn parse(line_no: usize, source: LineSource, raw_line: impl Into<String>) -> Self {
        let compact = collapse_whitespace(&raw_line.into());
        let parsed = parse_qty(&compact);
        let name_or_code = strip_qty(&compact, &parsed);
        Self::from_item(LineItem {
            line_no,
            source,
            raw_line: compact,
            name_or_code: Some(name_or_code),
            qty: parsed.qty,
            unit: parsed.unit,
        })
    }
}

/// Disposition of one matched line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// Confident enough to auto-accept.
    Ok,
    /// Needs a human decision: ambiguous, weakly scored, or missing a
    /// usable quantity.
    Review,
    NotFound,
}

/// Which cascade stage produced the verdict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchReason {
    Code,
    Header,
    Fuzzy,
    None,
}

/// One ranked alternative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchCandidate {
    pub id: i64,
    pub sync_uid: Option<String>,
    pub header: String,
    pub score: f64,
}

/// Projection of the resolved product for the export boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchProduct {
    pub id: i64,
    pub sync_uid: Option<String>,
    pub header: String,
    pub articul: Option<String>,
    pub unit_header: Option<String>,
    pub flat_codes: ProductFlatCodes,
}

impl From<&ProductRecord> for MatchProduct {
    fn from(product: &ProductRecord) -> Self {
        MatchProduct {
            id: product.id,
            sync_uid: product.sync_uid.clone(),
            header: product.header.clone(),
            articul: product.articul.clone(),
            unit_header: product.unit_header.clone(),
            flat_codes: product.flat_codes.clone(),
        }
    }
}

/// Verdict for one query line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    pub status: MatchStatus,
    pub confidence: f64,
    pub reason: MatchReason,
    /// Best guess, absent for unresolved or ambiguous-exact verdicts.
    pub product: Option<MatchProduct>,
    /// Ordered best-first, at most five entries.
    pub candidates: Vec<MatchCandidate>,
}

impl MatchResult {
    /// The second-best candidate, reported downstream for audit.
    pub fn runner_up(&self) -> Option<&MatchCandidate> {
        self.candidates.get(1)
    }
}

/// A matched line as handed to the exporter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchedLine {
    pub line: QueryLine,
    pub result: MatchResult,
}

/// Cascade thresholds.
///
/// Cheap to clone and serde-friendly, so it can be embedded in higher-level
/// configuration. Thresholds are explicit constructor inputs — never
/// process-global state — so behavior stays reproducible in tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchConfig {
    /// Minimum top score for a fuzzy auto-accept.
    #[serde(default = "MatchConfig::default_ok_threshold")]
    pub ok_threshold: f64,
    /// Minimum top score to surface a fuzzy best guess for review.
    #[serde(default = "MatchConfig::default_review_threshold")]
    pub review_threshold: f64,
    /// Minimum lead of the top candidate over the runner-up for a fuzzy
    /// auto-accept; with a single candidate the lead is the score itself.
    #[serde(default = "MatchConfig::default_gap_threshold")]
    pub gap_threshold: f64,
}

impl MatchConfig {
    pub(crate) fn default_ok_threshold() -> f64 {
        0.90
    }

    pub(crate) fn default_review_threshold() -> f64 {
        0.72
    }

    pub(crate) fn default_gap_threshold() -> f64 {
        0.08
    }

    /// Validate threshold relationships before any matching happens.
    pub fn validate(&self) -> Result<(), MatchError> {
        let in_unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(MatchError::InvalidConfig(format!(
                    "{name} must be within [0.0, 1.0], got {value}"
                )))
            }
        };
        in_unit("ok_threshold", self.ok_threshold)?;
        in_unit("review_threshold", self.review_threshold)?;
        in_unit("gap_threshold", self.gap_threshold)?;
        if self.review_threshold > self.ok_threshold {
            return Err(MatchError::InvalidConfig(
                "review_threshold must not exceed ok_threshold".into(),
            ));
        }
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            ok_threshold: Self::default_ok_threshold(),
            review_threshold: Self::default_review_threshold(),
            gap_threshold: Self::default_gap_threshold(),
        }
    }
}

/// Errors produced while setting up a matcher.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Invalid threshold configuration.
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    /// The catalog snapshot could not be indexed.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}
