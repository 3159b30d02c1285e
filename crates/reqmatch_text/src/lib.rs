//! Text layer for the catalog matching engine.
//!
//! Everything in this crate is a pure function: no I/O, no clock calls, no
//! locale dependence. The same normalization runs at index build time and at
//! query time, because the normalized forms are the join keys for the exact
//! lookup maps — any asymmetry between the two sides silently breaks exact
//! matches.
//!
//! ## What lives here
//!
//! - [`normalize_header`] / [`normalize_code`] — canonical forms for product
//!   names and vendor codes. Both are idempotent.
//! - [`tokenize`] — word-like units (≥ 2 chars) for coarse candidate retrieval.
//! - [`looks_like_code`] — heuristic gate deciding whether a query line is
//!   worth a code lookup before a header lookup.
//! - [`bigram_similarity`] / [`header_score`] — character-bigram Dice
//!   coefficient and the blended header score used by fuzzy ranking.
//! - [`parse_qty`] — quantity/unit extraction from raw request lines.

mod normalize;
mod qty;
mod similarity;

pub use crate::normalize::{
    collapse_whitespace, looks_like_code, normalize_code, normalize_header, tokenize,
};
pub use crate::qty::{normalize_unit, parse_qty, strip_qty, ParsedQty};
pub use crate::similarity::{bigram_similarity, header_score};
