//! # reqmatch engine
//!
//! ## Purpose
//!
//! `reqmatch_engine` sits on top of the text layer (`reqmatch_text`) and the
//! catalog index (`reqmatch_catalog`). Given one extracted request line it
//! runs the matching cascade — exact code lookup, exact header lookup, fuzzy
//! ranking — and produces a verdict with ordered candidates and a
//! confidence-based disposition.
//!
//! ## Core Types
//!
//! - [`QueryLine`]: one extracted line with its pre-normalized query form.
//! - [`MatchConfig`]: the three cascade thresholds, serde-friendly with
//!   per-field defaults.
//! - [`MatchResult`]: status (`Ok`/`Review`/`NotFound`), confidence, reason
//!   (`Code`/`Header`/`Fuzzy`/`None`), resolved product projection, and up
//!   to five ranked candidates.
//! - [`CatalogMatcher`]: implementation of the [`Matcher`] trait over an
//!   `Arc<ProductIndex>` snapshot.
//!
//! ## Example Usage
//!
//! ```
//! use reqmatch_catalog::{ProductFlatCodes, ProductRecord};
//! use reqmatch_engine::{CatalogMatcher, LineSource, MatchConfig, Matcher, QueryLine};
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
//! let matcher = CatalogMatcher::new(products, MatchConfig::default()).expect("valid catalog");
//! let line = QueryLine::parse(1, LineSource::EmailText, "ELC0100203802 2 шт");
//! let result = matcher.match_line(&line);
//! assert_eq!(result.product.map(|p| p.id), Some(1));
//! ```
//!
//! ## Observability
//!
//! Install a [`MatchMetrics`] implementation via [`set_match_metrics`] to
//! record per-line latency, disposition, and candidate counts. This is
//! typically done once during service startup.

pub mod engine;
pub mod metrics;
pub mod types;

pub use crate::engine::{CatalogMatcher, Matcher};
pub use crate::metrics::{set_match_metrics, MatchMetrics};
pub use crate::types::{
    LineItem, LineSource, MatchCandidate, MatchConfig, MatchError, MatchProduct, MatchReason,
    MatchResult, MatchStatus, MatchedLine, QueryLine,
};
