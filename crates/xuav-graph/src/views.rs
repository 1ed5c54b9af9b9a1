//! Rows returned by the traversal templates and graph listings.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FamilyConfiguration {
    pub family: Option<String>,
    pub variant: Option<String>,
    pub designation: Option<String>,
    pub configuration: Option<String>,
    pub mission_type: Option<String>,
    pub mission_category: Option<String>,
    pub payload: Option<String>,
    pub cost_per_sortie: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VariantTechnology {
    pub variant: Option<String>,
    pub technology: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub maturity: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ManufacturerSummary {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub headquarters: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AutonomyProvider {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub headquarters: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SupplyChain {
    pub variant: Option<String>,
    pub designation: Option<String>,
    pub family: Option<String>,
    pub manufacturer: Option<ManufacturerSummary>,
    pub autonomy_providers: Vec<AutonomyProvider>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MissionPlatform {
    pub family: Option<String>,
    pub variant: Option<String>,
    pub designation: Option<String>,
    pub configuration: Option<String>,
    pub manufacturer: Option<String>,
    pub payload: Option<String>,
    pub cost_per_sortie: Option<f64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VariantBrief {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_flight: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProgramPlatform {
    pub program: Option<String>,
    pub budget: Option<f64>,
    pub family: Option<String>,
    pub manufacturer: Option<String>,
    pub variants: Vec<VariantBrief>,
    pub base_technology: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProvenanceMission {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProvenanceVariant {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub airframe_type: Option<String>,
    pub status: Option<String>,
    pub first_flight: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProvenanceFamily {
    pub name: Option<String>,
    pub description: Option<String>,
    pub base_technology: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProvenanceManufacturer {
    pub name: Option<String>,
    pub headquarters: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProvenanceProgram {
    pub name: Option<String>,
    pub budget: Option<f64>,
    pub status: Option<String>,
    pub start_date: Option<String>,
}

/// Where a mission configuration comes from, traced back to its program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConfigurationProvenance {
    pub configuration: Option<String>,
    pub mission: Option<ProvenanceMission>,
    pub variant: Option<ProvenanceVariant>,
    pub family: Option<ProvenanceFamily>,
    pub manufacturer: Option<ProvenanceManufacturer>,
    pub program: Option<ProvenanceProgram>,
    pub technologies: Vec<String>,
    pub payload: Option<String>,
    pub cost_per_sortie: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TechnologyAdoption {
    pub technology: Option<String>,
    pub variant: Option<String>,
    pub designation: Option<String>,
    pub family: Option<String>,
    pub manufacturer: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PortfolioPlatform {
    pub family: Option<String>,
    pub program: Option<String>,
    pub variants: Vec<VariantBrief>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AutonomySystem {
    pub variant: Option<String>,
    pub family: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ManufacturerPortfolio {
    pub manufacturer: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub headquarters: Option<String>,
    pub country: Option<String>,
    pub platforms: Vec<PortfolioPlatform>,
    pub autonomy_systems: Vec<AutonomySystem>,
}

/// Filters for platform search. All are exact matches; absent means any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PlatformSearch {
    pub airframe_type: Option<String>,
    pub development_status: Option<String>,
    pub mission_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlatformMatch {
    pub variant: Option<String>,
    pub designation: Option<String>,
    pub airframe_type: Option<String>,
    pub status: Option<String>,
    pub family: Option<String>,
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_type: Option<String>,
}

/// A platform variant flattened with its family and manufacturer context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlatformListing {
    pub id: String,
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub country: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub designation: Option<String>,
    pub development_status: Option<String>,
    pub first_flight: Option<String>,
    #[schema(value_type = Vec<Object>)]
    pub specifications: Vec<JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlatformPage {
    pub platforms: Vec<PlatformListing>,
    pub total: usize,
}

/// Request body for adding a variant under an existing family.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewVariant {
    pub family_key: String,
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub airframe_type: Option<String>,
    #[serde(default)]
    pub development_status: Option<String>,
    #[serde(default)]
    pub first_flight: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GraphNode {
    /// `collection/key`
    pub id: String,
    pub collection: String,
    pub key: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GraphEdge {
    pub edge: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Neighborhood {
    pub center: String,
    pub depth: usize,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Suggestion {
    pub collection: String,
    pub key: String,
    pub name: String,
}

pub(crate) fn node_id(collection: &str, key: &str) -> String {
    format!("{}/{}", collection, key)
}
