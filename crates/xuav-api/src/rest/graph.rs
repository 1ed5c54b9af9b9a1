//! Versioned endpoints over the platform graph.

use crate::error::store_err;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use xuav_graph::{
    ConfigurationProvenance, FamilyConfiguration, GraphView, ManufacturerPortfolio,
    MissionPlatform, Neighborhood, NewVariant, PlatformListing, PlatformMatch, PlatformSearch,
    ProgramPlatform, Suggestion, SupplyChain, TechnologyAdoption, VariantTechnology,
};

const DEFAULT_PAGE_LIMIT: usize = 100;
const MAX_PAGE_LIMIT: usize = 1000;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Rows to skip
    pub skip: Option<usize>,
    /// Page size, clamped to 1..=1000
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitParams {
    /// Maximum number of nodes, clamped to 1..=1000
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DepthParams {
    /// Hops to expand, 1..=3
    pub depth: Option<usize>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SuggestParams {
    pub query: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlatformList {
    pub platforms: Vec<PlatformListing>,
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResults {
    pub results: Vec<PlatformMatch>,
    pub total: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Suggestions {
    pub suggestions: Vec<Suggestion>,
}

fn clamp_limit(limit: Option<usize>, default: usize) -> usize {
    limit.unwrap_or(default).clamp(1, MAX_PAGE_LIMIT)
}

#[utoipa::path(
    get,
    path = "/api/v1/uavs",
    tag = "graph",
    params(PageParams),
    responses(
        (status = 200, description = "Platform variants sorted by name", body = PlatformList),
        (status = 503, description = "Graph store unreachable", body = crate::ErrorBody)
    )
)]
pub async fn list_platforms(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Json<PlatformList>> {
    let Query(params) = params?;
    let skip = params.skip.unwrap_or(0);
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT);

    let page = state
        .queries()
        .await?
        .list_platforms(skip, limit)
        .await
        .map_err(store_err("Database query failed"))?;
    Ok(Json(PlatformList {
        platforms: page.platforms,
        total: page.total,
        skip,
        limit,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/uavs/{key}",
    tag = "graph",
    params(("key" = String, Path, description = "Variant key")),
    responses(
        (status = 200, description = "Platform detail", body = PlatformListing),
        (status = 404, description = "Unknown variant", body = crate::ErrorBody)
    )
)]
pub async fn get_platform(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<PlatformListing>> {
    state
        .queries()
        .await?
        .platform_detail(&key)
        .await
        .map_err(store_err("Error fetching UAV"))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("UAV not found".to_string()))
}

#[utoipa::path(
    post,
    path = "/api/v1/uavs",
    tag = "graph",
    request_body = NewVariant,
    responses(
        (status = 201, description = "Variant created", body = PlatformListing),
        (status = 404, description = "Unknown family", body = crate::ErrorBody),
        (status = 409, description = "Variant key already exists", body = crate::ErrorBody),
        (status = 422, description = "Invalid body", body = crate::ErrorBody)
    )
)]
pub async fn create_platform(
    State(state): State<AppState>,
    payload: Result<Json<NewVariant>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PlatformListing>)> {
    let Json(variant) = payload?;
    state
        .importer()
        .await?
        .add_variant(&variant)
        .await
        .map_err(store_err("Error creating UAV"))?;

    let created = state
        .queries()
        .await?
        .platform_detail(variant.key.trim())
        .await
        .map_err(store_err("Error fetching UAV"))?
        .ok_or_else(|| ApiError::Internal("created variant could not be read back".to_string()))?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/graph",
    tag = "graph",
    params(LimitParams),
    responses((status = 200, description = "Nodes and edges for visualisation", body = GraphView))
)]
pub async fn graph_overview(
    State(state): State<AppState>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> ApiResult<Json<GraphView>> {
    let Query(params) = params?;
    state
        .queries()
        .await?
        .graph_overview(clamp_limit(params.limit, DEFAULT_PAGE_LIMIT))
        .await
        .map(Json)
        .map_err(store_err("Error fetching graph"))
}

#[utoipa::path(
    get,
    path = "/api/v1/graph/{collection}/{key}/neighborhood",
    tag = "graph",
    params(
        ("collection" = String, Path, description = "Vertex collection"),
        ("key" = String, Path, description = "Vertex key"),
        DepthParams
    ),
    responses(
        (status = 200, description = "Nodes and edges within depth hops", body = Neighborhood),
        (status = 404, description = "Unknown vertex", body = crate::ErrorBody),
        (status = 422, description = "Depth outside 1..=3", body = crate::ErrorBody)
    )
)]
pub async fn neighborhood(
    State(state): State<AppState>,
    Path((collection, key)): Path<(String, String)>,
    params: Result<Query<DepthParams>, QueryRejection>,
) -> ApiResult<Json<Neighborhood>> {
    let Query(params) = params?;
    state
        .queries()
        .await?
        .neighborhood(&collection, &key, params.depth.unwrap_or(1))
        .await
        .map(Json)
        .map_err(store_err("Error fetching neighborhood"))
}

#[utoipa::path(
    post,
    path = "/api/v1/search",
    tag = "graph",
    request_body = PlatformSearch,
    responses((status = 200, description = "Matching platforms", body = SearchResults))
)]
pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<PlatformSearch>, JsonRejection>,
) -> ApiResult<Json<SearchResults>> {
    let Json(filters) = payload?;
    let results = state
        .queries()
        .await?
        .search_platforms(&filters)
        .await
        .map_err(store_err("Error searching UAVs"))?;
    Ok(Json(SearchResults {
        total: results.len(),
        results,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/search/suggestions",
    tag = "graph",
    params(SuggestParams),
    responses((status = 200, description = "Name suggestions", body = Suggestions))
)]
pub async fn suggestions(
    State(state): State<AppState>,
    params: Result<Query<SuggestParams>, QueryRejection>,
) -> ApiResult<Json<Suggestions>> {
    let Query(params) = params?;
    let suggestions = state
        .queries()
        .await?
        .suggest(&params.query, params.limit.unwrap_or(10).min(MAX_PAGE_LIMIT))
        .await
        .map_err(store_err("Error fetching suggestions"))?;
    Ok(Json(Suggestions { suggestions }))
}

#[utoipa::path(
    get,
    path = "/api/v1/families/{key}/configurations",
    tag = "templates",
    params(("key" = String, Path, description = "Platform family key")),
    responses((status = 200, description = "Configurations across the family", body = [FamilyConfiguration]))
)]
pub async fn family_configurations(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<Vec<FamilyConfiguration>>> {
    state
        .queries()
        .await?
        .platform_configurations(&key)
        .await
        .map(Json)
        .map_err(store_err("Error fetching configurations"))
}

#[utoipa::path(
    get,
    path = "/api/v1/variants/{key}/technologies",
    tag = "templates",
    params(("key" = String, Path, description = "Platform variant key")),
    responses((status = 200, description = "Technologies implemented", body = [VariantTechnology]))
)]
pub async fn variant_technologies(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<Vec<VariantTechnology>>> {
    state
        .queries()
        .await?
        .variant_technologies(&key)
        .await
        .map(Json)
        .map_err(store_err("Error fetching technologies"))
}

#[utoipa::path(
    get,
    path = "/api/v1/variants/{key}/supply-chain",
    tag = "templates",
    params(("key" = String, Path, description = "Platform variant key")),
    responses(
        (status = 200, description = "Builder and autonomy providers", body = SupplyChain),
        (status = 404, description = "Unknown variant", body = crate::ErrorBody)
    )
)]
pub async fn supply_chain(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<SupplyChain>> {
    state
        .queries()
        .await?
        .supply_chain(&key)
        .await
        .map_err(store_err("Error fetching supply chain"))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Variant '{}' not found", key)))
}

#[utoipa::path(
    get,
    path = "/api/v1/missions/{key}/platforms",
    tag = "templates",
    params(("key" = String, Path, description = "Mission key")),
    responses((status = 200, description = "Platforms configured for the mission", body = [MissionPlatform]))
)]
pub async fn mission_platforms(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<Vec<MissionPlatform>>> {
    state
        .queries()
        .await?
        .mission_capable_platforms(&key)
        .await
        .map(Json)
        .map_err(store_err("Error fetching mission platforms"))
}

#[utoipa::path(
    get,
    path = "/api/v1/programs/{key}/platforms",
    tag = "templates",
    params(("key" = String, Path, description = "Program key")),
    responses((status = 200, description = "Families developed under the program", body = [ProgramPlatform]))
)]
pub async fn program_platforms(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<Vec<ProgramPlatform>>> {
    state
        .queries()
        .await?
        .program_platforms(&key)
        .await
        .map(Json)
        .map_err(store_err("Error fetching program platforms"))
}

#[utoipa::path(
    get,
    path = "/api/v1/configurations/{key}/provenance",
    tag = "templates",
    params(("key" = String, Path, description = "Mission configuration key")),
    responses(
        (status = 200, description = "Configuration lineage", body = ConfigurationProvenance),
        (status = 404, description = "Unknown configuration", body = crate::ErrorBody)
    )
)]
pub async fn configuration_provenance(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<ConfigurationProvenance>> {
    state
        .queries()
        .await?
        .configuration_provenance(&key)
        .await
        .map_err(store_err("Error fetching provenance"))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Configuration '{}' not found", key)))
}

#[utoipa::path(
    get,
    path = "/api/v1/technologies/{key}/adoption",
    tag = "templates",
    params(("key" = String, Path, description = "Technology key")),
    responses((status = 200, description = "Variants using the technology", body = [TechnologyAdoption]))
)]
pub async fn technology_adoption(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<Vec<TechnologyAdoption>>> {
    state
        .queries()
        .await?
        .technology_adoption(&key)
        .await
        .map(Json)
        .map_err(store_err("Error fetching adoption"))
}

#[utoipa::path(
    get,
    path = "/api/v1/manufacturers/{key}/portfolio",
    tag = "templates",
    params(("key" = String, Path, description = "Manufacturer key")),
    responses(
        (status = 200, description = "Families built and autonomy supplied", body = ManufacturerPortfolio),
        (status = 404, description = "Unknown manufacturer", body = crate::ErrorBody)
    )
)]
pub async fn manufacturer_portfolio(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<ManufacturerPortfolio>> {
    state
        .queries()
        .await?
        .manufacturer_portfolio(&key)
        .await
        .map_err(store_err("Error fetching portfolio"))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Manufacturer '{}' not found", key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_clamped() {
        assert_eq!(clamp_limit(None, DEFAULT_PAGE_LIMIT), 100);
        assert_eq!(clamp_limit(Some(0), DEFAULT_PAGE_LIMIT), 1);
        assert_eq!(clamp_limit(Some(5000), DEFAULT_PAGE_LIMIT), 1000);
        assert_eq!(clamp_limit(Some(25), DEFAULT_PAGE_LIMIT), 25);
    }
}
