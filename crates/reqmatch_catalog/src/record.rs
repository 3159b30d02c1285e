//! Catalog entity types.
//!
//! These mirror the camelCase payload shape of the upstream catalog feed, so
//! records deserialize straight from the store. The feed tolerates arbitrary
//! extra fields per product; everything the matcher does not recognize stays
//! in the opaque `raw` blob, which is retained for export and debugging only
//! and never inspected by matching logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// The named alternate-code families a product may carry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductFlatCodes {
    pub elcom: Option<String>,
    pub manufacturer: Option<String>,
    pub raec: Option<String>,
    pub pc: Option<String>,
    pub etm: Option<String>,
}

/// One product from the catalog store.
///
/// `id` is the identity; every other field may repeat across records. The
/// only structural invariant is a non-blank `header`, enforced at index
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: i64,
    #[serde(default)]
    pub sync_uid: Option<String>,
    /// Display name; the source of header keys and retrieval tokens.
    pub header: String,
    /// Primary vendor code.
    #[serde(default)]
    pub articul: Option<String>,
    #[serde(default)]
    pub unit_header: Option<String>,
    #[serde(default)]
    pub manufacturer_header: Option<String>,
    #[serde(default)]
    pub multiplicity_order: Option<f64>,
    /// Alternate codes the same product is known by, in feed order.
    #[serde(default)]
    pub analog_codes: Vec<String>,
    #[serde(default)]
    pub flat_codes: ProductFlatCodes,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Original payload, kept verbatim for export/debug.
    #[serde(default)]
    pub raw: JsonValue,
}

impl ProductRecord {
    /// Every identifier this record can be looked up by, in posting order:
    /// articul, sync uid, the five flat-code families, then analog codes.
    pub fn code_values(&self) -> impl Iterator<Item = &str> {
        [
            self.articul.as_deref(),
            self.sync_uid.as_deref(),
            self.flat_codes.elcom.as_deref(),
            self.flat_codes.manufacturer.as_deref(),
            self.flat_codes.raec.as_deref(),
            self.flat_codes.pc.as_deref(),
            self.flat_codes.etm.as_deref(),
        ]
        .into_iter()
        .flatten()
        .chain(self.analog_codes.iter().map(String::as_str))
    }
}
