//! Canonical podcast records and the mapping from provider items.

pub mod mapping;
mod types;

pub use mapping::{derive_collection_id, ItemShape, MappingError};
pub use types::*;
