//! Immutable lookup index over a catalog snapshot.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use reqmatch_text::{normalize_code, normalize_header, tokenize};

use crate::error::CatalogError;
use crate::record::ProductRecord;

/// Cached normalized header of an indexed product.
///
/// Computed once at build time so the fuzzy stage never re-normalizes
/// catalog headers at query time. `tokens` is the full token sequence of the
/// header, duplicates included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedHeader {
    pub text: String,
    pub tokens: Vec<String>,
}

/// Read-only snapshot built once per matching session.
///
/// Records live in an arena in input order; the lookup maps reference arena
/// slots. Rebuilding is the only way to reflect catalog changes — share the
/// index behind an `Arc` and swap the handle wholesale, so concurrent
/// readers never observe a partially updated structure.
#[derive(Debug, Default)]
pub struct ProductIndex {
    products: Vec<ProductRecord>,
    by_id: HashMap<i64, usize>,
    by_code: HashMap<String, Vec<usize>>,
    by_header: HashMap<String, Vec<usize>>,
    token_to_ids: HashMap<String, BTreeSet<i64>>,
    headers_by_id: HashMap<i64, NormalizedHeader>,
}

impl ProductIndex {
    /// Build the snapshot from a flat record list.
    ///
    /// Records are processed in input order; a repeated id overwrites the
    /// `by_id` entry (last seen wins) while the displaced record keeps its
    /// code and header postings, exactly as a mutable-map build would leave
    /// them. A record with a blank header fails the build.
    pub fn build(products: Vec<ProductRecord>) -> Result<Self, CatalogError> {
        let mut index = ProductIndex {
            products: Vec::with_capacity(products.len()),
            ..ProductIndex::default()
        };

        for product in products {
            if product.header.trim().is_empty() {
                return Err(CatalogError::EmptyHeader { id: product.id });
            }

            let slot = index.products.len();
            let id = product.id;
            let text = normalize_header(&product.header);
            let tokens = tokenize(&product.header);

            index.by_id.insert(id, slot);
            index.by_header.entry(text.clone()).or_default().push(slot);

            for code in product.code_values() {
                let normalized = normalize_code(code);
                if !normalized.is_empty() {
                    index.by_code.entry(normalized).or_default().push(slot);
                }
            }

            // The set collapses repeats within one header; repeats across
            // records accumulate ids.
            for token in &tokens {
                index.token_to_ids.entry(token.clone()).or_default().insert(id);
            }

            index.headers_by_id.insert(id, NormalizedHeader { text, tokens });
            index.products.push(product);
        }

        debug!(
            products = index.products.len(),
            code_keys = index.by_code.len(),
            header_keys = index.by_header.len(),
            tokens = index.token_to_ids.len(),
            "catalog index built"
        );
        Ok(index)
    }

    /// Number of records in the snapshot (duplicated ids count once each
    /// occurrence — this is the arena length, not the id count).
    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// The record currently owning this id (last seen on duplicate ids).
    pub fn get(&self, id: i64) -> Option<&ProductRecord> {
        self.by_id.get(&id).map(|slot| &self.products[*slot])
    }

    /// Records posted under this normalized code key, in insertion order.
    pub fn code_matches(&self, normalized_code: &str) -> Vec<&ProductRecord> {
        self.slots_to_records(self.by_code.get(normalized_code))
    }

    /// Records posted under this normalized header key, in insertion order.
    pub fn header_matches(&self, normalized_header: &str) -> Vec<&ProductRecord> {
        self.slots_to_records(self.by_header.get(normalized_header))
    }

    /// Ids of products whose header contains this token.
    pub fn ids_for_token(&self, token: &str) -> Option<&BTreeSet<i64>> {
        self.token_to_ids.get(token)
    }

    /// Cached normalized header of the record owning this id.
    pub fn normalized_header(&self, id: i64) -> Option<&NormalizedHeader> {
        self.headers_by_id.get(&id)
    }

    /// Ids in arena insertion order, duplicates included. Callers sampling a
    /// bounded prefix must not assume any ranking.
    pub fn iter_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.products.iter().map(|p| p.id)
    }

    fn slots_to_records(&self, slots: Option<&Vec<usize>>) -> Vec<&ProductRecord> {
        slots
            .map(|slots| slots.iter().map(|slot| &self.products[*slot]).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ProductFlatCodes;
    use serde_json::Value as JsonValue;

    fn record(id: i64, header: &str, articul: Option<&str>) -> ProductRecord {
        ProductRecord {
            id,
            sync_uid: Some(format!("sync-{id}")),
            header: header.to_owned(),
            articul: articul.map(str::to_owned),
            unit_header: None,
            manufacturer_header: None,
            multiplicity_order: None,
            analog_codes: Vec::new(),
            flat_codes: ProductFlatCodes::default(),
            updated_at: None,
            raw: JsonValue::Null,
        }
    }

    #[test]
    fn rejects_blank_headers() {
        let err = ProductIndex::build(vec![record(3, "   ", None)]).unwrap_err();
        assert_eq!(err, CatalogError::EmptyHeader { id: 3 });
    }

    #[test]
    fn codes_from_every_field_share_one_map() {
        let mut a = record(1, "Кабель ВВГнг 3x2.5", Some("ELC0100203802"));
        a.analog_codes = vec!["alt 01".into()];
        a.flat_codes.etm = Some("ETM-9".into());
        let b = record(2, "Кабель ВВГнг 3x4", Some("elc 010 0203 802"));

        let index = ProductIndex::build(vec![a, b]).expect("index builds");

        // Both articuls normalize to the same key and collect both records.
        let hits = index.code_matches("ELC0100203802");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, 1);
        assert_eq!(hits[1].id, 2);

        assert_eq!(index.code_matches("ALT01").len(), 1);
        assert_eq!(index.code_matches("ETM-9").len(), 1);
        assert_eq!(index.code_matches("SYNC-1").len(), 1);
        assert!(index.code_matches("MISSING").is_empty());
    }

    #[test]
    fn duplicate_ids_keep_last_record_but_both_postings() {
        let first = record(5, "Розетка настенная", Some("OLD-5"));
        let second = record(5, "Розетка встраиваемая", Some("NEW-5"));

        let index = ProductIndex::build(vec![first, second]).expect("index builds");

        assert_eq!(index.len(), 2);
        assert_eq!(index.get(5).map(|p| p.header.as_str()), Some("Розетка встраиваемая"));
        // The displaced record still answers code and header lookups.
        assert_eq!(index.code_matches("OLD-5").len(), 1);
        assert_eq!(index.header_matches("РОЗЕТКА НАСТЕННАЯ").len(), 1);
    }

    #[test]
    fn header_tokens_feed_candidate_retrieval() {
        let index = ProductIndex::build(vec![
            record(1, "Кабель ВВГнг 3x2.5", None),
            record(2, "Кабель КГ 3x4", None),
        ])
        .expect("index builds");

        let ids = index.ids_for_token("КАБЕЛЬ").expect("token present");
        assert_eq!(ids.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        let ids = index.ids_for_token("ВВГНГ").expect("token present");
        assert_eq!(ids.iter().copied().collect::<Vec<_>>(), vec![1]);

        let cached = index.normalized_header(1).expect("header cached");
        assert_eq!(cached.text, "КАБЕЛЬ ВВГНГ 3X2.5");
        assert_eq!(cached.tokens, vec!["КАБЕЛЬ", "ВВГНГ", "3X2.5"]);
    }
}
