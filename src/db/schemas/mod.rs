//! Collection layout for the staging export
//!
//! Upstream collections are owned by the main application and only read here.
//! Documents stay as raw `bson::Document` so unknown fields survive a copy.

mod catalog;
mod ids;

pub use catalog::{
    StagingCollections, HEAD_MNEMONIC, ORGANIZATION_COLLECTION, SOURCE_COLLECTION,
    SOURCE_VERSION_COLLECTION,
};
pub use ids::{id_key, IdSet};
