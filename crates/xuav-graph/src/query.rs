//! Named traversal templates over the platform graph.
//!
//! Each template walks edges hop by hop through [`GraphStore::outbound`] and
//! [`GraphStore::inbound`]. Neighbours come back in key order, so "first"
//! lookups and row order are deterministic. Unknown start keys produce an
//! empty result, never an error.

use crate::models::{Configuration, Family, Manufacturer, Mission, NamedNode, Program, Technology, Variant};
use crate::schema::*;
use crate::store::GraphStore;
use crate::views::*;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::{BTreeSet, HashSet, VecDeque};
use tracing::debug;
use xuav_core::{Result, XuavError};

pub const MAX_NEIGHBORHOOD_DEPTH: usize = 3;

/// Collections searched by [`QueryService::suggest`].
const SUGGEST_COLLECTIONS: &[&str] = &[
    FAMILIES,
    VARIANTS,
    CONFIGURATIONS,
    MANUFACTURERS,
    MISSIONS,
    TECHNOLOGIES,
];

#[derive(Clone)]
pub struct QueryService {
    store: GraphStore,
}

impl QueryService {
    pub fn new(store: GraphStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Every mission configuration built from any variant of a family.
    pub async fn platform_configurations(&self, family_key: &str) -> Result<Vec<FamilyConfiguration>> {
        debug!("platform_configurations({})", family_key);
        let Some(family) = self.store.get::<Family>(FAMILIES, family_key).await? else {
            return Ok(Vec::new());
        };

        let mut rows = Vec::new();
        for variant in self.variants_of(&family.key).await? {
            let configurations: Vec<Configuration> = self
                .neighbours_in(CONFIGURED_FROM, (VARIANTS, variant.key.as_str()), CONFIGURATIONS)
                .await?;
            for configuration in configurations {
                let mission: Option<Mission> = self
                    .first_out(CONFIGURED_FOR, (CONFIGURATIONS, configuration.key.as_str()), MISSIONS)
                    .await?;
                push_distinct(
                    &mut rows,
                    FamilyConfiguration {
                        family: family.name.clone(),
                        variant: variant.name.clone(),
                        designation: variant.designation.clone(),
                        configuration: configuration.name.clone(),
                        mission_type: mission.as_ref().and_then(|m| m.name.clone()),
                        mission_category: mission.as_ref().and_then(|m| m.category.clone()),
                        payload: configuration.payload_description.clone(),
                        cost_per_sortie: configuration.estimated_cost_per_sortie,
                    },
                );
            }
        }
        Ok(rows)
    }

    pub async fn variant_technologies(&self, variant_key: &str) -> Result<Vec<VariantTechnology>> {
        debug!("variant_technologies({})", variant_key);
        let Some(variant) = self.store.get::<Variant>(VARIANTS, variant_key).await? else {
            return Ok(Vec::new());
        };

        let technologies: Vec<Technology> = self
            .neighbours_out(IMPLEMENTS_TECH, (VARIANTS, variant.key.as_str()), TECHNOLOGIES)
            .await?;
        let mut rows = Vec::new();
        for tech in technologies {
            push_distinct(
                &mut rows,
                VariantTechnology {
                    variant: variant.name.clone(),
                    technology: tech.name,
                    kind: tech.kind,
                    maturity: tech.maturity_level,
                    description: tech.description,
                },
            );
        }
        Ok(rows)
    }

    pub async fn supply_chain(&self, variant_key: &str) -> Result<Option<SupplyChain>> {
        debug!("supply_chain({})", variant_key);
        let Some(variant) = self.store.get::<Variant>(VARIANTS, variant_key).await? else {
            return Ok(None);
        };

        let family = self.family_of(&variant.key).await?;
        let manufacturer = match &family {
            Some(f) => self.manufacturer_of(&f.key).await?,
            None => None,
        };
        let providers: Vec<Manufacturer> = self
            .neighbours_in(PROVIDES_AUTONOMY, (VARIANTS, variant.key.as_str()), MANUFACTURERS)
            .await?;

        let mut autonomy_providers = Vec::new();
        for provider in providers {
            push_distinct(
                &mut autonomy_providers,
                AutonomyProvider {
                    name: provider.name,
                    kind: provider.kind,
                    headquarters: provider.headquarters,
                },
            );
        }

        Ok(Some(SupplyChain {
            variant: variant.name,
            designation: variant.designation,
            family: family.and_then(|f| f.name),
            manufacturer: manufacturer.map(|m| ManufacturerSummary {
                name: m.name,
                kind: m.kind,
                headquarters: m.headquarters,
                country: m.country,
            }),
            autonomy_providers,
        }))
    }

    pub async fn mission_capable_platforms(&self, mission_key: &str) -> Result<Vec<MissionPlatform>> {
        debug!("mission_capable_platforms({})", mission_key);
        let configurations: Vec<Configuration> = self
            .neighbours_in(CONFIGURED_FOR, (MISSIONS, mission_key), CONFIGURATIONS)
            .await?;

        let mut rows = Vec::new();
        for configuration in configurations {
            let variants: Vec<Variant> = self
                .neighbours_out(CONFIGURED_FROM, (CONFIGURATIONS, configuration.key.as_str()), VARIANTS)
                .await?;
            for variant in variants {
                let families: Vec<Family> = self
                    .neighbours_out(BELONGS_TO_FAMILY, (VARIANTS, variant.key.as_str()), FAMILIES)
                    .await?;
                for family in families {
                    let manufacturers: Vec<Manufacturer> = self
                        .neighbours_out(MANUFACTURED_BY, (FAMILIES, family.key.as_str()), MANUFACTURERS)
                        .await?;
                    for manufacturer in manufacturers {
                        push_distinct(
                            &mut rows,
                            MissionPlatform {
                                family: family.name.clone(),
                                variant: variant.name.clone(),
                                designation: variant.designation.clone(),
                                configuration: configuration.name.clone(),
                                manufacturer: manufacturer.name,
                                payload: configuration.payload_description.clone(),
                                cost_per_sortie: configuration.estimated_cost_per_sortie,
                                status: variant.development_status.clone(),
                            },
                        );
                    }
                }
            }
        }
        Ok(rows)
    }

    pub async fn program_platforms(&self, program_key: &str) -> Result<Vec<ProgramPlatform>> {
        debug!("program_platforms({})", program_key);
        let Some(program) = self.store.get::<Program>(PROGRAMS, program_key).await? else {
            return Ok(Vec::new());
        };

        let families: Vec<Family> = self
            .neighbours_in(DEVELOPED_UNDER, (PROGRAMS, program.key.as_str()), FAMILIES)
            .await?;
        let mut rows = Vec::new();
        for family in families {
            let manufacturers: Vec<Manufacturer> = self
                .neighbours_out(MANUFACTURED_BY, (FAMILIES, family.key.as_str()), MANUFACTURERS)
                .await?;
            if manufacturers.is_empty() {
                continue;
            }
            let variants: Vec<VariantBrief> = self
                .variants_of(&family.key)
                .await?
                .into_iter()
                .map(|v| VariantBrief {
                    name: v.name,
                    designation: v.designation,
                    status: v.development_status,
                    first_flight: v.first_flight,
                })
                .collect();
            for manufacturer in manufacturers {
                push_distinct(
                    &mut rows,
                    ProgramPlatform {
                        program: program.name.clone(),
                        budget: program.budget,
                        family: family.name.clone(),
                        manufacturer: manufacturer.name,
                        variants: variants.clone(),
                        base_technology: family.base_technology.clone(),
                    },
                );
            }
        }
        Ok(rows)
    }

    pub async fn configuration_provenance(&self, config_key: &str) -> Result<Option<ConfigurationProvenance>> {
        debug!("configuration_provenance({})", config_key);
        let Some(configuration) = self
            .store
            .get::<Configuration>(CONFIGURATIONS, config_key)
            .await?
        else {
            return Ok(None);
        };

        let mission: Option<Mission> = self
            .first_out(CONFIGURED_FOR, (CONFIGURATIONS, configuration.key.as_str()), MISSIONS)
            .await?;
        let variant: Option<Variant> = self
            .first_out(CONFIGURED_FROM, (CONFIGURATIONS, configuration.key.as_str()), VARIANTS)
            .await?;

        let (family, technologies) = match &variant {
            Some(v) => {
                let technologies: Vec<Technology> = self
                    .neighbours_out(IMPLEMENTS_TECH, (VARIANTS, v.key.as_str()), TECHNOLOGIES)
                    .await?;
                (
                    self.family_of(&v.key).await?,
                    technologies.into_iter().filter_map(|t| t.name).collect(),
                )
            }
            None => (None, Vec::new()),
        };
        let (manufacturer, program) = match &family {
            Some(f) => (
                self.manufacturer_of(&f.key).await?,
                self.first_out::<Program>(DEVELOPED_UNDER, (FAMILIES, f.key.as_str()), PROGRAMS)
                    .await?,
            ),
            None => (None, None),
        };

        Ok(Some(ConfigurationProvenance {
            configuration: configuration.name,
            mission: mission.map(|m| ProvenanceMission {
                kind: m.name,
                category: m.category,
                description: m.description,
            }),
            variant: variant.map(|v| ProvenanceVariant {
                name: v.name,
                designation: v.designation,
                airframe_type: v.airframe_type,
                status: v.development_status,
                first_flight: v.first_flight,
            }),
            family: family.map(|f| ProvenanceFamily {
                name: f.name,
                description: f.description,
                base_technology: f.base_technology,
            }),
            manufacturer: manufacturer.map(|m| ProvenanceManufacturer {
                name: m.name,
                headquarters: m.headquarters,
                kind: m.kind,
            }),
            program: program.map(|p| ProvenanceProgram {
                name: p.name,
                budget: p.budget,
                status: p.status,
                start_date: p.start_date,
            }),
            technologies,
            payload: configuration.payload_description,
            cost_per_sortie: configuration.estimated_cost_per_sortie,
        }))
    }

    pub async fn technology_adoption(&self, tech_key: &str) -> Result<Vec<TechnologyAdoption>> {
        debug!("technology_adoption({})", tech_key);
        let Some(tech) = self.store.get::<Technology>(TECHNOLOGIES, tech_key).await? else {
            return Ok(Vec::new());
        };

        let variants: Vec<Variant> = self
            .neighbours_in(IMPLEMENTS_TECH, (TECHNOLOGIES, tech.key.as_str()), VARIANTS)
            .await?;
        let mut rows = Vec::new();
        for variant in variants {
            let families: Vec<Family> = self
                .neighbours_out(BELONGS_TO_FAMILY, (VARIANTS, variant.key.as_str()), FAMILIES)
                .await?;
            for family in families {
                let manufacturers: Vec<Manufacturer> = self
                    .neighbours_out(MANUFACTURED_BY, (FAMILIES, family.key.as_str()), MANUFACTURERS)
                    .await?;
                for manufacturer in manufacturers {
                    push_distinct(
                        &mut rows,
                        TechnologyAdoption {
                            technology: tech.name.clone(),
                            variant: variant.name.clone(),
                            designation: variant.designation.clone(),
                            family: family.name.clone(),
                            manufacturer: manufacturer.name,
                            status: variant.development_status.clone(),
                        },
                    );
                }
            }
        }
        Ok(rows)
    }

    pub async fn manufacturer_portfolio(&self, manufacturer_key: &str) -> Result<Option<ManufacturerPortfolio>> {
        debug!("manufacturer_portfolio({})", manufacturer_key);
        let Some(manufacturer) = self
            .store
            .get::<Manufacturer>(MANUFACTURERS, manufacturer_key)
            .await?
        else {
            return Ok(None);
        };

        let families: Vec<Family> = self
            .neighbours_in(MANUFACTURED_BY, (MANUFACTURERS, manufacturer.key.as_str()), FAMILIES)
            .await?;
        let mut platforms = Vec::with_capacity(families.len());
        for family in families {
            let variants = self
                .variants_of(&family.key)
                .await?
                .into_iter()
                .map(|v| VariantBrief {
                    name: v.name,
                    designation: v.designation,
                    status: v.development_status,
                    first_flight: None,
                })
                .collect();
            platforms.push(PortfolioPlatform {
                family: family.name,
                program: family.program,
                variants,
            });
        }

        let autonomy_variants: Vec<Variant> = self
            .neighbours_out(PROVIDES_AUTONOMY, (MANUFACTURERS, manufacturer.key.as_str()), VARIANTS)
            .await?;
        let mut autonomy_systems = Vec::new();
        for variant in autonomy_variants {
            let family = self.family_of(&variant.key).await?;
            push_distinct(
                &mut autonomy_systems,
                AutonomySystem {
                    variant: variant.name,
                    family: family.and_then(|f| f.name),
                },
            );
        }

        Ok(Some(ManufacturerPortfolio {
            manufacturer: manufacturer.name,
            kind: manufacturer.kind,
            headquarters: manufacturer.headquarters,
            country: manufacturer.country,
            platforms,
            autonomy_systems,
        }))
    }

    /// Variants matching every given filter, sorted by variant name. A variant
    /// is only returned once it joins to both a family and a manufacturer.
    pub async fn search_platforms(&self, filters: &PlatformSearch) -> Result<Vec<PlatformMatch>> {
        debug!("search_platforms({:?})", filters);
        let variants: Vec<Variant> = self.store.all(VARIANTS, "name").await?;

        let mut rows = Vec::new();
        for variant in variants {
            if !matches_filter(&filters.airframe_type, &variant.airframe_type)
                || !matches_filter(&filters.development_status, &variant.development_status)
            {
                continue;
            }

            let mission_matched = match &filters.mission_type {
                None => true,
                Some(mission_type) => {
                    let configurations: Vec<Configuration> = self
                        .neighbours_in(CONFIGURED_FROM, (VARIANTS, variant.key.as_str()), CONFIGURATIONS)
                        .await?;
                    configurations
                        .iter()
                        .any(|c| c.mission_type.as_deref() == Some(mission_type.as_str()))
                }
            };
            if !mission_matched {
                continue;
            }

            let families: Vec<Family> = self
                .neighbours_out(BELONGS_TO_FAMILY, (VARIANTS, variant.key.as_str()), FAMILIES)
                .await?;
            for family in families {
                let manufacturers: Vec<Manufacturer> = self
                    .neighbours_out(MANUFACTURED_BY, (FAMILIES, family.key.as_str()), MANUFACTURERS)
                    .await?;
                for manufacturer in manufacturers {
                    push_distinct(
                        &mut rows,
                        PlatformMatch {
                            variant: variant.name.clone(),
                            designation: variant.designation.clone(),
                            airframe_type: variant.airframe_type.clone(),
                            status: variant.development_status.clone(),
                            family: family.name.clone(),
                            manufacturer: manufacturer.name,
                            mission_type: filters.mission_type.clone(),
                        },
                    );
                }
            }
        }
        Ok(rows)
    }

    /// One page of variants sorted by name, plus the total variant count.
    pub async fn list_platforms(&self, skip: usize, limit: usize) -> Result<PlatformPage> {
        debug!("list_platforms(skip={}, limit={})", skip, limit);
        let variants: Vec<Variant> = self.store.page(VARIANTS, "name", skip, limit).await?;
        let total = self.store.count(VARIANTS).await?;

        let mut platforms = Vec::with_capacity(variants.len());
        for variant in variants {
            platforms.push(self.listing(variant).await?);
        }
        Ok(PlatformPage { platforms, total })
    }

    pub async fn platform_detail(&self, key: &str) -> Result<Option<PlatformListing>> {
        match self.store.get::<Variant>(VARIANTS, key).await? {
            Some(variant) => Ok(Some(self.listing(variant).await?)),
            None => Ok(None),
        }
    }

    /// Vertices (at most `limit`) and the edges between them.
    pub async fn graph_overview(&self, limit: usize) -> Result<GraphView> {
        debug!("graph_overview(limit={})", limit);
        let mut nodes = Vec::new();
        let mut ids = HashSet::new();

        'collections: for collection in VERTEX_COLLECTIONS {
            let named: Vec<NamedNode> = self.store.all(collection.name, "key").await?;
            for node in named {
                if nodes.len() >= limit {
                    break 'collections;
                }
                let id = node_id(collection.name, node.key.as_str());
                ids.insert(id.clone());
                nodes.push(GraphNode {
                    id,
                    collection: collection.name.to_string(),
                    key: node.key,
                    name: node.name,
                });
            }
        }

        let mut edges = Vec::new();
        for definition in EDGE_DEFINITIONS {
            for record in self.store.edges(definition.name).await? {
                let from = node_id(&record.from_collection, &record.from_key);
                let to = node_id(&record.to_collection, &record.to_key);
                if ids.contains(&from) && ids.contains(&to) {
                    edges.push(GraphEdge {
                        edge: definition.name.to_string(),
                        from,
                        to,
                    });
                }
            }
        }
        Ok(GraphView { nodes, edges })
    }

    /// Breadth-first expansion from one vertex across every edge collection,
    /// following edges in both directions.
    pub async fn neighborhood(&self, collection: &str, key: &str, depth: usize) -> Result<Neighborhood> {
        if !(1..=MAX_NEIGHBORHOOD_DEPTH).contains(&depth) {
            return Err(XuavError::InvalidInput(format!(
                "depth must be between 1 and {}",
                MAX_NEIGHBORHOOD_DEPTH
            )));
        }
        require_vertex_collection(collection)?;
        if !self.store.vertex_exists(collection, key).await? {
            return Err(XuavError::NotFound(node_id(collection, key)));
        }
        debug!("neighborhood({}/{}, depth={})", collection, key, depth);

        let start = (collection.to_string(), key.to_string());
        let mut visited: Vec<(String, String)> = vec![start.clone()];
        let mut seen: HashSet<(String, String)> = HashSet::from([start.clone()]);
        let mut edges: BTreeSet<(String, String, String)> = BTreeSet::new();
        let mut frontier: VecDeque<(String, String)> = VecDeque::from([start]);

        for _ in 0..depth {
            let mut next = VecDeque::new();
            while let Some((c, k)) = frontier.pop_front() {
                for (edge, record) in self.store.edges_touching(&c, &k).await? {
                    let from = (record.from_collection, record.from_key);
                    let to = (record.to_collection, record.to_key);
                    edges.insert((edge, node_id(&from.0, &from.1), node_id(&to.0, &to.1)));

                    let other = if from.0 == c && from.1 == k { to } else { from };
                    if seen.insert(other.clone()) {
                        visited.push(other.clone());
                        next.push_back(other);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        let mut nodes = Vec::with_capacity(visited.len());
        for (c, k) in visited {
            let name = self
                .store
                .get::<NamedNode>(&c, &k)
                .await?
                .and_then(|n| n.name);
            nodes.push(GraphNode {
                id: node_id(&c, &k),
                collection: c,
                key: k,
                name,
            });
        }

        Ok(Neighborhood {
            center: node_id(collection, key),
            depth,
            nodes,
            edges: edges
                .into_iter()
                .map(|(edge, from, to)| GraphEdge { edge, from, to })
                .collect(),
        })
    }

    /// Case-insensitive name matches across the main collections, sorted by name.
    pub async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut suggestions = Vec::new();
        for collection in SUGGEST_COLLECTIONS {
            let named: Vec<NamedNode> = self.store.all(collection, "key").await?;
            suggestions.extend(named.into_iter().filter_map(|node| {
                let name = node.name?;
                name.to_lowercase().contains(&needle).then(|| Suggestion {
                    collection: collection.to_string(),
                    key: node.key,
                    name,
                })
            }));
        }
        suggestions.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.key.cmp(&b.key)));
        suggestions.truncate(limit);
        Ok(suggestions)
    }

    async fn listing(&self, variant: Variant) -> Result<PlatformListing> {
        let family = self.family_of(&variant.key).await?;
        let manufacturer = match &family {
            Some(f) => self.manufacturer_of(&f.key).await?,
            None => None,
        };
        let specifications: Vec<JsonValue> = self
            .neighbours_out(HAS_SPECIFICATION, (VARIANTS, variant.key.as_str()), SPECIFICATIONS)
            .await?;

        Ok(PlatformListing {
            manufacturer: manufacturer
                .and_then(|m| m.name)
                .or_else(|| family.as_ref().and_then(|f| f.manufacturer.clone())),
            country: family
                .and_then(|f| f.country)
                .unwrap_or_else(|| "Unknown".to_string()),
            id: variant.key,
            name: variant.name,
            description: variant.description,
            category: variant.airframe_type,
            designation: variant.designation,
            development_status: variant.development_status,
            first_flight: variant.first_flight,
            specifications,
        })
    }

    async fn variants_of(&self, family_key: &str) -> Result<Vec<Variant>> {
        self.neighbours_in(BELONGS_TO_FAMILY, (FAMILIES, family_key), VARIANTS)
            .await
    }

    async fn family_of(&self, variant_key: &str) -> Result<Option<Family>> {
        self.first_out(BELONGS_TO_FAMILY, (VARIANTS, variant_key), FAMILIES)
            .await
    }

    async fn manufacturer_of(&self, family_key: &str) -> Result<Option<Manufacturer>> {
        self.first_out(MANUFACTURED_BY, (FAMILIES, family_key), MANUFACTURERS)
            .await
    }

    async fn neighbours_out<T: DeserializeOwned>(
        &self,
        edge: &str,
        from: (&str, &str),
        to_collection: &str,
    ) -> Result<Vec<T>> {
        let keys = self.store.outbound(edge, from, to_collection).await?;
        self.store.get_many(to_collection, &keys).await
    }

    async fn neighbours_in<T: DeserializeOwned>(
        &self,
        edge: &str,
        to: (&str, &str),
        from_collection: &str,
    ) -> Result<Vec<T>> {
        let keys = self.store.inbound(edge, to, from_collection).await?;
        self.store.get_many(from_collection, &keys).await
    }

    async fn first_out<T: DeserializeOwned>(
        &self,
        edge: &str,
        from: (&str, &str),
        to_collection: &str,
    ) -> Result<Option<T>> {
        let keys = self.store.outbound(edge, from, to_collection).await?;
        match keys.first() {
            Some(key) => self.store.get(to_collection, key).await,
            None => Ok(None),
        }
    }
}

fn matches_filter(filter: &Option<String>, value: &Option<String>) -> bool {
    match filter {
        Some(wanted) => value.as_deref() == Some(wanted.as_str()),
        None => true,
    }
}

fn push_distinct<T: PartialEq>(rows: &mut Vec<T>, row: T) {
    if !rows.contains(&row) {
        rows.push(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_filter_matches_anything() {
        assert!(matches_filter(&None, &None));
        assert!(matches_filter(&None, &Some("Fixed-wing".into())));
        assert!(matches_filter(&Some("Fixed-wing".into()), &Some("Fixed-wing".into())));
        assert!(!matches_filter(&Some("Fixed-wing".into()), &Some("fixed-wing".into())));
        assert!(!matches_filter(&Some("Fixed-wing".into()), &None));
    }

    #[test]
    fn push_distinct_keeps_first_occurrence() {
        let mut rows = vec![1, 2];
        push_distinct(&mut rows, 2);
        push_distinct(&mut rows, 3);
        assert_eq!(rows, vec![1, 2, 3]);
    }
}
