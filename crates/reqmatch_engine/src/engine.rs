//! The matching cascade.
//!
//! One pass, short-circuiting at the first resolving stage: exact code
//! lookup, exact header lookup, fuzzy ranking over token-retrieved
//! candidates. The cascade never fails for a well-formed line — "no match"
//! is a value, not an error — so [`Matcher::match_line`] returns the verdict
//! directly; fallible work (config validation, index construction) happens
//! at setup time.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use reqmatch_catalog::{ProductIndex, ProductRecord};
use reqmatch_text::{header_score, looks_like_code, normalize_code, tokenize};

use crate::metrics::metrics_recorder;
use crate::types::{
    MatchCandidate, MatchConfig, MatchError, MatchProduct, MatchReason, MatchResult, MatchStatus,
    QueryLine,
};

/// Ranked alternatives reported per line, best first.
const MAX_CANDIDATES: usize = 5;

/// Bounded scan when no query token hits the catalog at all. Keeps the
/// unranked fallback from walking very large catalogs end to end, at the
/// cost of completeness on this path only.
const FALLBACK_SCAN_LIMIT: usize = 1500;

/// Trait for a matching engine.
pub trait Matcher: Send + Sync {
    /// Match a single query line and return the verdict.
    fn match_line(&self, line: &QueryLine) -> MatchResult;
}

/// Cascade matcher over an immutable catalog snapshot.
///
/// The snapshot is shared behind an `Arc`, so any number of threads can
/// match in parallel; a catalog refresh means building a new index and a
/// new matcher, never mutating this one.
#[derive(Debug)]
pub struct CatalogMatcher {
    index: Arc<ProductIndex>,
    config: MatchConfig,
}

impl CatalogMatcher {
    /// Index the catalog and construct a matcher in one step.
    pub fn new(products: Vec<ProductRecord>, config: MatchConfig) -> Result<Self, MatchError> {
        let index = ProductIndex::build(products)?;
        Self::with_index(Arc::new(index), config)
    }

    /// Construct a matcher over an existing snapshot handle.
    pub fn with_index(index: Arc<ProductIndex>, config: MatchConfig) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(CatalogMatcher { index, config })
    }

    /// The underlying snapshot, shareable with other matchers.
    pub fn index(&self) -> &Arc<ProductIndex> {
        &self.index
    }

    fn run_cascade(&self, line: &QueryLine) -> MatchResult {
        let probe = line.name_or_code.as_deref().unwrap_or(&line.raw_line);

        if looks_like_code(probe) {
            if let Some(result) = self.code_stage(line, probe) {
                return result;
            }
        }

        if let Some(result) = self.header_stage(line) {
            return result;
        }

        self.fuzzy_stage(line)
    }

    /// Exact lookup over every code family. Zero hits fall through rather
    /// than resolving, so a code-looking free-text line still gets a chance
    /// at header and fuzzy matching.
    fn code_stage(&self, line: &QueryLine, probe: &str) -> Option<MatchResult> {
        let code = normalize_code(probe);
        if code.is_empty() {
            return None;
        }

        let hits = self.index.code_matches(&code);
        match hits.len() {
            0 => None,
            1 => {
                debug!(line_no = line.line_no, code = %code, id = hits[0].id, "resolved by code");
                let result = MatchResult {
                    status: MatchStatus::Ok,
                    confidence: 0.99,
                    reason: MatchReason::Code,
                    product: Some(MatchProduct::from(hits[0])),
                    candidates: vec![candidate_at(hits[0], 0.99)],
                };
                Some(apply_qty_override(line, result))
            }
            n => {
                debug!(line_no = line.line_no, code = %code, hits = n, "ambiguous code");
                Some(MatchResult {
                    status: MatchStatus::Review,
                    confidence: 0.8,
                    reason: MatchReason::Code,
                    product: None,
                    candidates: hits
                        .iter()
                        .take(MAX_CANDIDATES)
                        .map(|p| candidate_at(p, 0.8))
                        .collect(),
                })
            }
        }
    }

    fn header_stage(&self, line: &QueryLine) -> Option<MatchResult> {
        let hits = self.index.header_matches(&line.normalized);
        match hits.len() {
            0 => None,
            1 => {
                debug!(line_no = line.line_no, id = hits[0].id, "resolved by header");
                let result = MatchResult {
                    status: MatchStatus::Ok,
                    confidence: 0.95,
                    reason: MatchReason::Header,
                    product: Some(MatchProduct::from(hits[0])),
                    candidates: vec![candidate_at(hits[0], 0.95)],
                };
                Some(apply_qty_override(line, result))
            }
            n => {
                debug!(line_no = line.line_no, hits = n, "ambiguous header");
                Some(MatchResult {
                    status: MatchStatus::Review,
                    confidence: 0.78,
                    reason: MatchReason::Header,
                    product: None,
                    candidates: hits
                        .iter()
                        .take(MAX_CANDIDATES)
                        .map(|p| candidate_at(p, 0.78))
                        .collect(),
                })
            }
        }
    }

    fn fuzzy_stage(&self, line: &QueryLine) -> MatchResult {
        let candidates = self.rank_candidates(&line.normalized);
        let Some(top1) = candidates.first() else {
            return MatchResult {
                status: MatchStatus::NotFound,
                confidence: 0.0,
                reason: MatchReason::None,
                product: None,
                candidates: Vec::new(),
            };
        };
        let top_score = top1.score;
        // With a single candidate the gap is the score itself.
        let gap = top_score - candidates.get(1).map_or(0.0, |c| c.score);
        let best = self.index.get(top1.id).map(MatchProduct::from);
        debug!(
            line_no = line.line_no,
            top_score,
            gap,
            candidates = candidates.len(),
            "fuzzy ranking"
        );

        let result = if top_score >= self.config.ok_threshold && gap >= self.config.gap_threshold {
            MatchResult {
                status: MatchStatus::Ok,
                confidence: top_score,
                reason: MatchReason::Fuzzy,
                product: best,
                candidates,
            }
        } else if top_score >= self.config.review_threshold {
            // Unlike the exact-stage ambiguity verdicts, a weak fuzzy match
            // keeps its best guess attached for the reviewer.
            MatchResult {
                status: MatchStatus::Review,
                confidence: top_score,
                reason: MatchReason::Fuzzy,
                product: best,
                candidates,
            }
        } else {
            MatchResult {
                status: MatchStatus::NotFound,
                confidence: top_score,
                reason: MatchReason::None,
                product: None,
                candidates,
            }
        };
        apply_qty_override(line, result)
    }

    fn rank_candidates(&self, query: &str) -> Vec<MatchCandidate> {
        let query_tokens = tokenize(query);

        let mut candidate_ids: BTreeSet<i64> = BTreeSet::new();
        for token in &query_tokens {
            if let Some(ids) = self.index.ids_for_token(token) {
                candidate_ids.extend(ids.iter().copied());
            }
        }
        if candidate_ids.is_empty() {
            // Best-effort bounded scan in snapshot insertion order; past the
            // cap the true best match may be missed.
            for id in self.index.iter_ids() {
                candidate_ids.insert(id);
                if candidate_ids.len() >= FALLBACK_SCAN_LIMIT {
                    break;
                }
            }
        }

        let mut ranked: Vec<MatchCandidate> = Vec::with_capacity(candidate_ids.len());
        for id in candidate_ids {
            let (Some(product), Some(header)) =
                (self.index.get(id), self.index.normalized_header(id))
            else {
                continue;
            };
            let score = header_score(query, &header.text, &query_tokens, &header.tokens);
            ranked.push(MatchCandidate {
                id,
                sync_uid: product.sync_uid.clone(),
                header: product.header.clone(),
                score,
            });
        }

        // Stable sort over ids already in ascending order: ties resolve by
        // ascending id, so results are reproducible across rebuilds.
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(MAX_CANDIDATES);
        ranked
    }
}

impl Matcher for CatalogMatcher {
    fn match_line(&self, line: &QueryLine) -> MatchResult {
        let start = Instant::now();
        let result = self.run_cascade(line);
        if let Some(recorder) = metrics_recorder() {
            recorder.record_match(
                result.status,
                result.reason,
                start.elapsed(),
                result.candidates.len(),
            );
        }
        result
    }
}

fn candidate_at(product: &ProductRecord, score: f64) -> MatchCandidate {
    MatchCandidate {
        id: product.id,
        sync_uid: product.sync_uid.clone(),
        header: product.header.clone(),
        score,
    }
}

/// A confident item match is not actionable without a usable quantity, so an
/// `Ok` verdict on a line with no positive quantity is demoted to review.
/// Review and not-found verdicts pass through unchanged.
fn apply_qty_override(line: &QueryLine, result: MatchResult) -> MatchResult {
    let qty_usable = line.qty.map_or(false, |q| q > 0.0);
    if qty_usable || result.status != MatchStatus::Ok {
        return result;
    }
    debug!(line_no = line.line_no, "confident match without usable quantity, demoting to review");
    MatchResult {
        status: MatchStatus::Review,
        confidence: result.confidence.min(0.7),
        ..result
    }
}
