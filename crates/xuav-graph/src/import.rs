use crate::schema::*;
use crate::store::GraphStore;
use crate::views::NewVariant;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};
use xuav_core::{Result, XuavError};

/// Bundled CCA platform data set.
pub const CCA_SEED: &str = include_str!("../../../data/cca_platforms.json");

/// One relationship batch: edge collection, endpoint collections and key pairs.
type RelationshipSet = (&'static str, &'static str, &'static str, &'static [(&'static str, &'static str)]);

const CCA_RELATIONSHIPS: &[RelationshipSet] = &[
    (
        MANUFACTURED_BY,
        FAMILIES,
        MANUFACTURERS,
        &[
            ("fury", "anduril"),
            ("gambit", "general-atomics"),
            ("ghost-bat", "boeing"),
            ("x-bat", "shield-ai"),
            ("ca-1-europa", "helsing"),
        ],
    ),
    (
        DEVELOPED_UNDER,
        FAMILIES,
        PROGRAMS,
        &[("fury", "cca-increment-1"), ("gambit", "cca-increment-1")],
    ),
    (
        BELONGS_TO_FAMILY,
        VARIANTS,
        FAMILIES,
        &[
            ("yfq-44a", "fury"),
            ("gambit-1", "gambit"),
            ("gambit-4", "gambit"),
            ("gambit-6", "gambit"),
            ("mq-28a", "ghost-bat"),
            ("x-bat-1", "x-bat"),
            ("ca-1", "ca-1-europa"),
        ],
    ),
    (
        CONFIGURED_FROM,
        CONFIGURATIONS,
        VARIANTS,
        &[
            ("fury-isr", "yfq-44a"),
            ("fury-strike", "yfq-44a"),
            ("fury-ew", "yfq-44a"),
            ("fury-decoy", "yfq-44a"),
            ("gambit-1-aa", "gambit-1"),
            ("gambit-4-isr", "gambit-4"),
            ("gambit-6-strike", "gambit-6"),
            ("gambit-6-ew", "gambit-6"),
            ("ghost-bat-isr", "mq-28a"),
            ("ghost-bat-ew", "mq-28a"),
            ("x-bat-isr", "x-bat-1"),
            ("x-bat-strike", "x-bat-1"),
        ],
    ),
    (
        CONFIGURED_FOR,
        CONFIGURATIONS,
        MISSIONS,
        &[
            ("fury-isr", "isr"),
            ("fury-strike", "strike"),
            ("fury-ew", "electronic-warfare"),
            ("fury-decoy", "decoy"),
            ("gambit-1-aa", "air-to-air"),
            ("gambit-4-isr", "isr"),
            ("gambit-6-strike", "strike"),
            ("gambit-6-ew", "electronic-warfare"),
            ("ghost-bat-isr", "isr"),
            ("ghost-bat-ew", "electronic-warfare"),
            ("x-bat-isr", "isr"),
            ("x-bat-strike", "strike"),
        ],
    ),
    (
        PROVIDES_AUTONOMY,
        MANUFACTURERS,
        VARIANTS,
        &[("shield-ai", "yfq-44a"), ("rtx", "gambit-1")],
    ),
    (
        IMPLEMENTS_TECH,
        VARIANTS,
        TECHNOLOGIES,
        &[
            ("yfq-44a", "lattice-os"),
            ("yfq-44a", "hivemind-ai"),
            ("yfq-44a", "mosa"),
            ("x-bat-1", "hivemind-ai"),
            ("ca-1", "centaur-ai"),
        ],
    ),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub imported: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportStats {
    pub collections: BTreeMap<String, CollectionStats>,
    pub errors: Vec<String>,
}

impl ImportStats {
    pub fn imported(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, |s| s.imported)
    }

    pub fn total_imported(&self) -> usize {
        self.collections.values().map(|s| s.imported).sum()
    }

    pub fn total_errors(&self) -> usize {
        self.collections.values().map(|s| s.errors).sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipStats {
    pub created: BTreeMap<String, usize>,
    pub errors: Vec<String>,
}

impl RelationshipStats {
    pub fn total_created(&self) -> usize {
        self.created.values().sum()
    }
}

/// Loads documents and relationships into the graph.
#[derive(Clone)]
pub struct ImportService {
    store: GraphStore,
}

impl ImportService {
    pub fn new(store: GraphStore) -> Self {
        Self { store }
    }

    pub async fn import_file(&self, path: &Path) -> Result<ImportStats> {
        info!("Importing graph data from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        let document: JsonValue = serde_json::from_str(&raw)?;
        self.import_document(&document).await
    }

    /// Upsert every document of every known vertex collection in `document`.
    ///
    /// A document without a key or missing a required field is counted as an
    /// error for its collection and the rest of the batch continues.
    pub async fn import_document(&self, document: &JsonValue) -> Result<ImportStats> {
        let sections = document.as_object().ok_or_else(|| {
            XuavError::InvalidInput("import document must be a JSON object".to_string())
        })?;

        let mut stats = ImportStats::default();
        for (name, items) in sections {
            let Some(collection) = vertex_collection(name) else {
                warn!("Skipping unknown collection '{}'", name);
                continue;
            };
            let Some(items) = items.as_array() else {
                warn!("Skipping '{}': expected a list of documents", name);
                continue;
            };

            info!("Importing {} documents into {}", items.len(), name);
            let entry = stats.collections.entry(name.clone()).or_default();
            for item in items {
                match self.import_one(collection, item).await {
                    Ok(()) => entry.imported += 1,
                    Err(e) => {
                        warn!("Failed to import into {}: {}", name, e);
                        entry.errors += 1;
                        stats.errors.push(format!("{}: {}", name, e));
                    }
                }
            }
        }
        Ok(stats)
    }

    /// Upsert platform variants only. Accepts either a bare list or an object
    /// holding a `platform_variants` list.
    pub async fn import_variants(&self, document: &JsonValue) -> Result<ImportStats> {
        let variants = match document {
            JsonValue::Array(_) => document.clone(),
            JsonValue::Object(map) => map.get(VARIANTS).cloned().ok_or_else(|| {
                XuavError::InvalidInput(format!("no {} found in document", VARIANTS))
            })?,
            _ => {
                return Err(XuavError::InvalidInput(
                    "expected a list of variants".to_string(),
                ))
            }
        };
        self.import_document(&json!({ VARIANTS: variants })).await
    }

    /// Create the fixed CCA relationship set. Missing endpoints are recorded
    /// as errors; the remaining edges are still created.
    pub async fn create_relationships(&self) -> Result<RelationshipStats> {
        let mut stats = RelationshipStats::default();
        for (edge, from_collection, to_collection, pairs) in CCA_RELATIONSHIPS {
            let created = stats.created.entry(edge.to_string()).or_default();
            for (from_key, to_key) in pairs.iter() {
                match self
                    .store
                    .relate(edge, (*from_collection, *from_key), (*to_collection, *to_key))
                    .await
                {
                    Ok(()) => *created += 1,
                    Err(XuavError::NotFound(missing)) => {
                        warn!("Skipping {} {} -> {}: {} missing", edge, from_key, to_key, missing);
                        stats
                            .errors
                            .push(format!("{} {} -> {}: {} not found", edge, from_key, to_key, missing));
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        info!("Created {} relationships", stats.total_created());
        Ok(stats)
    }

    /// Import the bundled data set and link it.
    pub async fn seed_cca(&self) -> Result<(ImportStats, RelationshipStats)> {
        let document: JsonValue = serde_json::from_str(CCA_SEED)?;
        let vertices = self.import_document(&document).await?;
        let edges = self.create_relationships().await?;
        Ok((vertices, edges))
    }

    /// Insert a new variant and link it to an existing family.
    pub async fn add_variant(&self, variant: &NewVariant) -> Result<()> {
        let key = variant.key.trim();
        if key.is_empty() {
            return Err(XuavError::InvalidInput("variant key must not be empty".to_string()));
        }
        if variant.name.trim().is_empty() {
            return Err(XuavError::InvalidInput("variant name must not be empty".to_string()));
        }
        if !self.store.vertex_exists(FAMILIES, &variant.family_key).await? {
            return Err(XuavError::NotFound(format!(
                "Platform family '{}' not found",
                variant.family_key
            )));
        }
        if self.store.vertex_exists(VARIANTS, key).await? {
            return Err(XuavError::Conflict(format!("Platform variant '{}'", key)));
        }
        let designation = variant.designation.as_deref().map(str::trim);
        if let Some(designation) = designation.filter(|d| !d.is_empty()) {
            if let Some(owner) = self.store.key_where(VARIANTS, "designation", designation).await? {
                return Err(XuavError::Conflict(format!(
                    "Designation '{}' (platform variant '{}')",
                    designation, owner
                )));
            }
        }

        let mut doc = serde_json::to_value(variant)?;
        if let Some(map) = doc.as_object_mut() {
            map.remove("family_key");
            map.retain(|_, v| !v.is_null());
        }
        self.store.upsert_vertex(VARIANTS, key, doc).await?;
        self.store
            .relate(BELONGS_TO_FAMILY, (VARIANTS, key), (FAMILIES, variant.family_key.as_str()))
            .await?;
        info!("Added variant {} to family {}", key, variant.family_key);
        Ok(())
    }

    async fn import_one(&self, collection: &VertexCollection, item: &JsonValue) -> Result<()> {
        let doc: &Map<String, JsonValue> = item
            .as_object()
            .ok_or_else(|| XuavError::InvalidInput("document is not an object".to_string()))?;
        let key = document_key(doc)
            .ok_or_else(|| XuavError::InvalidInput("document has no _key".to_string()))?;

        let missing = collection.missing_fields(doc);
        if !missing.is_empty() {
            return Err(XuavError::InvalidInput(format!(
                "{} is missing required fields: {}",
                key,
                missing.join(", ")
            )));
        }
        self.store.upsert_vertex(collection.name, &key, item.clone()).await
    }
}

fn document_key(doc: &Map<String, JsonValue>) -> Option<String> {
    doc.get("_key")
        .or_else(|| doc.get("key"))
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

/// Example document for hand-authored imports.
pub fn template() -> JsonValue {
    json!({
        FAMILIES: [{
            "_key": "example-family",
            "name": "Example UAV Family",
            "manufacturer": "Example Manufacturer",
            "program": "Example Program",
            "base_technology": "Description of core tech",
            "description": "Description of the platform family",
            "country": "Country"
        }],
        VARIANTS: [{
            "_key": "example-variant",
            "name": "Example UAV Variant Name",
            "designation": "XQ-##",
            "airframe_type": "Fixed-wing / VTOL / Helicopter",
            "development_status": "Development / Flight testing / Operational",
            "first_flight": "2025-01-01 or null",
            "description": "Description of this specific variant"
        }],
        CONFIGURATIONS: [{
            "_key": "example-config",
            "name": "Example Config Name",
            "mission_type": "ISR / Strike / EW / etc",
            "payload_description": "Description of payload and sensors",
            "estimated_cost_per_sortie": 50000
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_prefers_underscore_key() {
        let doc = json!({ "_key": "fury", "key": "other" });
        assert_eq!(document_key(doc.as_object().unwrap()).as_deref(), Some("fury"));

        let doc = json!({ "key": " gambit " });
        assert_eq!(document_key(doc.as_object().unwrap()).as_deref(), Some("gambit"));

        let doc = json!({ "_key": "" });
        assert!(document_key(doc.as_object().unwrap()).is_none());
    }

    #[test]
    fn relationship_sets_respect_edge_definitions() {
        for (edge, from, to, _) in CCA_RELATIONSHIPS {
            let definition = edge_definition(edge).expect("known edge");
            assert!(definition.check(from, to).is_ok(), "{}", edge);
        }
    }

    #[test]
    fn template_sections_are_known_collections() {
        let template = template();
        for name in template.as_object().unwrap().keys() {
            assert!(vertex_collection(name).is_some(), "{}", name);
        }
    }

    #[test]
    fn seed_parses_with_expected_sizes() {
        let seed: JsonValue = serde_json::from_str(CCA_SEED).unwrap();
        let len = |c: &str| seed[c].as_array().map_or(0, Vec::len);
        assert_eq!(len(FAMILIES), 5);
        assert_eq!(len(VARIANTS), 7);
        assert_eq!(len(CONFIGURATIONS), 12);
    }
}
