//! Vertex and edge collections of the platform graph.

use crate::store::GraphStore;
use serde_json::{Map, Value as JsonValue};
use tracing::info;
use xuav_core::{Result, XuavError};

pub const FAMILIES: &str = "platform_families";
pub const VARIANTS: &str = "platform_variants";
pub const CONFIGURATIONS: &str = "mission_configurations";
pub const PLATFORMS: &str = "platforms";
pub const COUNTRIES: &str = "countries";
pub const MANUFACTURERS: &str = "manufacturers";
pub const MISSIONS: &str = "missions";
pub const SENSORS: &str = "sensors";
pub const WEAPONS: &str = "weapons";
pub const MILITARY_UNITS: &str = "military_units";
pub const PROGRAMS: &str = "programs";
pub const TECHNOLOGIES: &str = "technologies";
pub const SPECIFICATIONS: &str = "specifications";

pub const BELONGS_TO_FAMILY: &str = "belongs_to_family";
pub const HAS_VARIANT: &str = "has_variant";
pub const HAS_CONFIGURATION: &str = "has_configuration";
pub const CONFIGURED_FROM: &str = "configured_from";
pub const CONFIGURED_FOR: &str = "configured_for";
pub const MANUFACTURED_BY: &str = "manufactured_by";
pub const MANUFACTURED_IN: &str = "manufactured_in";
pub const OPERATED_BY: &str = "operated_by";
pub const PROCURED_BY: &str = "procured_by";
pub const PERFORMS_MISSION: &str = "performs_mission";
pub const EQUIPPED_WITH: &str = "equipped_with";
pub const CARRIES_WEAPON: &str = "carries_weapon";
pub const DEVELOPED_UNDER: &str = "developed_under";
pub const IMPLEMENTS_TECH: &str = "implements_tech";
pub const HAS_SPECIFICATION: &str = "has_specification";
pub const COMPETES_WITH: &str = "competes_with";
pub const COMPETES_WITH_CONFIG: &str = "competes_with_config";
pub const DERIVED_FROM: &str = "derived_from";
pub const REQUIRES: &str = "requires";
pub const EXPORTS_TO: &str = "exports_to";
pub const SUPPLIES: &str = "supplies";
pub const PROVIDES_AUTONOMY: &str = "provides_autonomy";

#[derive(Debug, Clone, Copy)]
pub struct VertexCollection {
    pub name: &'static str,
    pub required: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct EdgeDefinition {
    pub name: &'static str,
    pub from: &'static [&'static str],
    pub to: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct IndexDefinition {
    pub collection: &'static str,
    pub field: &'static str,
    pub unique: bool,
}

pub const VERTEX_COLLECTIONS: &[VertexCollection] = &[
    VertexCollection { name: FAMILIES, required: &["name", "manufacturer"] },
    VertexCollection { name: VARIANTS, required: &["name"] },
    VertexCollection { name: CONFIGURATIONS, required: &["name", "mission_type"] },
    VertexCollection { name: PLATFORMS, required: &[] },
    VertexCollection { name: COUNTRIES, required: &["name", "iso_code"] },
    VertexCollection { name: MANUFACTURERS, required: &[] },
    VertexCollection { name: MISSIONS, required: &[] },
    VertexCollection { name: SENSORS, required: &[] },
    VertexCollection { name: WEAPONS, required: &[] },
    VertexCollection { name: MILITARY_UNITS, required: &[] },
    VertexCollection {
        name: PROGRAMS,
        required: &["name", "country", "budget", "start_date", "status"],
    },
    VertexCollection {
        name: TECHNOLOGIES,
        required: &["name", "type", "maturity_level", "description"],
    },
    VertexCollection { name: SPECIFICATIONS, required: &[] },
];

pub const EDGE_DEFINITIONS: &[EdgeDefinition] = &[
    EdgeDefinition { name: BELONGS_TO_FAMILY, from: &[VARIANTS], to: &[FAMILIES] },
    EdgeDefinition { name: HAS_VARIANT, from: &[FAMILIES], to: &[VARIANTS] },
    EdgeDefinition { name: HAS_CONFIGURATION, from: &[VARIANTS], to: &[CONFIGURATIONS] },
    EdgeDefinition { name: CONFIGURED_FROM, from: &[CONFIGURATIONS], to: &[VARIANTS] },
    EdgeDefinition { name: CONFIGURED_FOR, from: &[CONFIGURATIONS], to: &[MISSIONS] },
    EdgeDefinition { name: MANUFACTURED_BY, from: &[FAMILIES, PLATFORMS], to: &[MANUFACTURERS] },
    EdgeDefinition { name: MANUFACTURED_IN, from: &[FAMILIES, PLATFORMS], to: &[COUNTRIES] },
    EdgeDefinition { name: OPERATED_BY, from: &[VARIANTS, PLATFORMS], to: &[COUNTRIES] },
    EdgeDefinition { name: PROCURED_BY, from: &[VARIANTS, PLATFORMS], to: &[MILITARY_UNITS] },
    EdgeDefinition { name: PERFORMS_MISSION, from: &[CONFIGURATIONS, PLATFORMS], to: &[MISSIONS] },
    EdgeDefinition { name: EQUIPPED_WITH, from: &[CONFIGURATIONS, PLATFORMS], to: &[SENSORS] },
    EdgeDefinition { name: CARRIES_WEAPON, from: &[CONFIGURATIONS, PLATFORMS], to: &[WEAPONS] },
    EdgeDefinition { name: DEVELOPED_UNDER, from: &[FAMILIES], to: &[PROGRAMS] },
    EdgeDefinition { name: IMPLEMENTS_TECH, from: &[VARIANTS, PLATFORMS], to: &[TECHNOLOGIES] },
    EdgeDefinition {
        name: HAS_SPECIFICATION,
        from: &[VARIANTS, CONFIGURATIONS, PLATFORMS],
        to: &[SPECIFICATIONS],
    },
    EdgeDefinition { name: COMPETES_WITH, from: &[FAMILIES], to: &[FAMILIES] },
    EdgeDefinition {
        name: COMPETES_WITH_CONFIG,
        from: &[CONFIGURATIONS],
        to: &[CONFIGURATIONS],
    },
    EdgeDefinition { name: DERIVED_FROM, from: &[VARIANTS], to: &[VARIANTS] },
    EdgeDefinition { name: REQUIRES, from: &[TECHNOLOGIES], to: &[TECHNOLOGIES] },
    EdgeDefinition { name: EXPORTS_TO, from: &[COUNTRIES], to: &[COUNTRIES] },
    EdgeDefinition { name: SUPPLIES, from: &[MANUFACTURERS], to: &[PROGRAMS] },
    EdgeDefinition { name: PROVIDES_AUTONOMY, from: &[MANUFACTURERS], to: &[VARIANTS] },
];

pub const INDEXES: &[IndexDefinition] = &[
    IndexDefinition { collection: FAMILIES, field: "name", unique: true },
    IndexDefinition { collection: FAMILIES, field: "manufacturer", unique: false },
    IndexDefinition { collection: FAMILIES, field: "program", unique: false },
    IndexDefinition { collection: VARIANTS, field: "name", unique: false },
    IndexDefinition { collection: VARIANTS, field: "designation", unique: true },
    IndexDefinition { collection: CONFIGURATIONS, field: "mission_type", unique: false },
    IndexDefinition { collection: COUNTRIES, field: "iso_code", unique: true },
    IndexDefinition { collection: COUNTRIES, field: "name", unique: true },
];

pub fn vertex_collection(name: &str) -> Option<&'static VertexCollection> {
    VERTEX_COLLECTIONS.iter().find(|c| c.name == name)
}

pub fn edge_definition(name: &str) -> Option<&'static EdgeDefinition> {
    EDGE_DEFINITIONS.iter().find(|e| e.name == name)
}

pub(crate) fn require_vertex_collection(name: &str) -> Result<&'static VertexCollection> {
    vertex_collection(name)
        .ok_or_else(|| XuavError::InvalidInput(format!("unknown vertex collection: {}", name)))
}

impl EdgeDefinition {
    /// Reject endpoints outside the edge's declared from/to collections.
    pub fn check(&self, from_collection: &str, to_collection: &str) -> Result<()> {
        if !self.from.contains(&from_collection) || !self.to.contains(&to_collection) {
            return Err(XuavError::InvalidInput(format!(
                "{} cannot link {} -> {}",
                self.name, from_collection, to_collection
            )));
        }
        Ok(())
    }
}

impl VertexCollection {
    /// Names of required fields that are absent or null in `doc`.
    pub fn missing_fields(&self, doc: &Map<String, JsonValue>) -> Vec<&'static str> {
        self.required
            .iter()
            .copied()
            .filter(|f| doc.get(*f).map_or(true, JsonValue::is_null))
            .collect()
    }
}

/// SurrealQL that defines every collection and index. Idempotent.
pub fn schema_statements() -> String {
    let mut sql = String::new();
    for vertex in VERTEX_COLLECTIONS {
        sql.push_str(&format!("DEFINE TABLE IF NOT EXISTS `{}` SCHEMALESS;\n", vertex.name));
        sql.push_str(&format!(
            "DEFINE INDEX IF NOT EXISTS {0}_key ON TABLE `{0}` COLUMNS key UNIQUE;\n",
            vertex.name
        ));
    }
    for edge in EDGE_DEFINITIONS {
        sql.push_str(&format!("DEFINE TABLE IF NOT EXISTS `{}` SCHEMALESS;\n", edge.name));
        sql.push_str(&format!(
            "DEFINE INDEX IF NOT EXISTS {0}_from ON TABLE `{0}` COLUMNS from_collection, from_key;\n",
            edge.name
        ));
        sql.push_str(&format!(
            "DEFINE INDEX IF NOT EXISTS {0}_to ON TABLE `{0}` COLUMNS to_collection, to_key;\n",
            edge.name
        ));
    }
    for index in INDEXES {
        sql.push_str(&format!(
            "DEFINE INDEX IF NOT EXISTS {}_{} ON TABLE `{}` COLUMNS {}{};\n",
            index.collection,
            index.field,
            index.collection,
            index.field,
            if index.unique { " UNIQUE" } else { "" }
        ));
    }
    sql
}

pub async fn init_schema(store: &GraphStore) -> Result<()> {
    info!(
        "Defining graph '{}': {} vertex and {} edge collections",
        store.graph_name(),
        VERTEX_COLLECTIONS.len(),
        EDGE_DEFINITIONS.len()
    );
    store.execute(&schema_statements()).await
}
