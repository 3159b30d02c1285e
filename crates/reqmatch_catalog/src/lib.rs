//! Catalog layer: the product data model and the read-only lookup index.
//!
//! A catalog store hands this crate a flat list of [`ProductRecord`] values;
//! [`ProductIndex::build`] turns them into an immutable snapshot with four
//! lookup structures (by id, by normalized code, by normalized header, and
//! token → candidate ids). The snapshot never mutates after construction —
//! catalog changes are reflected by building a fresh index and swapping the
//! handle, so in-flight matches keep a consistent view without locks.

mod error;
mod index;
mod record;

pub use crate::error::CatalogError;
pub use crate::index::{NormalizedHeader, ProductIndex};
pub use crate::record::{ProductFlatCodes, ProductRecord};
