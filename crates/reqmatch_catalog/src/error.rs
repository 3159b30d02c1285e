use thiserror::Error;

/// Errors raised while building a catalog snapshot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A record arrived with a blank display header. Such records cannot be
    /// keyed and are rejected before they reach any lookup structure.
    #[error("product {id} has an empty header")]
    EmptyHeader { id: i64 },
}
