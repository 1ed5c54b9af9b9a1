//! Platform graph for collaborative combat aircraft and their supply chain.

pub mod import;
pub mod models;
pub mod query;
pub mod schema;
pub mod store;
pub mod views;

pub use import::{CollectionStats, ImportService, ImportStats, RelationshipStats, CCA_SEED};
pub use query::{QueryService, MAX_NEIGHBORHOOD_DEPTH};
pub use schema::init_schema;
pub use store::{EdgeRecord, GraphStore};
pub use views::*;
