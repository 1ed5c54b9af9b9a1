//! Flat UAV / armament catalog stored in SQLite.

mod import;
mod rows;
pub mod schema;
mod store;

pub use import::CatalogImportSummary;
pub use store::Catalog;

/// Sample catalog shipped with the repository.
pub const SAMPLE_CATALOG: &str = include_str!("../../../data/uav_catalog.json");
