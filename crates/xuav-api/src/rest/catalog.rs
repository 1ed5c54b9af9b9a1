//! Flat catalog endpoints backed by the SQLite store.

use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use xuav_core::{
    Armament, ArmamentCarrier, ArmamentIntegration, ArmamentSearch, CatalogStats, Uav, UavSearch,
};

pub const MAX_COMPARE: usize = 10;

#[derive(Debug, Serialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub docs: String,
    pub api: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UavList {
    pub total: usize,
    pub uavs: Vec<Uav>,
}

impl From<Vec<Uav>> for UavList {
    fn from(uavs: Vec<Uav>) -> Self {
        Self {
            total: uavs.len(),
            uavs,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompareRequest {
    /// Between 1 and 10 designations
    pub designations: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArmamentList {
    pub total: usize,
    pub armaments: Vec<Armament>,
}

impl From<Vec<Armament>> for ArmamentList {
    fn from(armaments: Vec<Armament>) -> Self {
        Self {
            total: armaments.len(),
            armaments,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UavArmaments {
    pub uav_designation: String,
    pub total: usize,
    pub armaments: Vec<ArmamentIntegration>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArmamentCarriers {
    pub armament_designation: String,
    pub total: usize,
    pub uavs: Vec<ArmamentCarrier>,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "root",
    responses((status = 200, description = "Service banner", body = RootResponse))
)]
pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("Welcome to {}", state.settings.api.project_name),
        version: state.settings.api.version.clone(),
        docs: "/docs".to_string(),
        api: state.settings.api.prefix.clone(),
    })
}

/// Always 200; a broken catalog is reported in the `database` field.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "catalog",
    responses((status = 200, description = "Service health", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state
        .with_catalog("Health check failed", |c| c.count_uavs())
        .await
    {
        Ok(total) => format!("OK ({} UAVs)", total),
        Err(e) => format!("ERROR: {}", e),
    };
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.settings.api.version.clone(),
        database,
    })
}

#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog statistics", body = CatalogStats),
        (status = 500, description = "Store error", body = crate::ErrorBody)
    )
)]
pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<CatalogStats>> {
    state
        .with_catalog("Error fetching statistics", |c| c.get_stats())
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/uavs",
    tag = "catalog",
    responses((status = 200, description = "Every UAV by designation", body = UavList))
)]
pub async fn list_uavs(State(state): State<AppState>) -> ApiResult<Json<UavList>> {
    let uavs = state
        .with_catalog("Error fetching UAVs", |c| c.get_all_uavs())
        .await?;
    Ok(Json(uavs.into()))
}

#[utoipa::path(
    get,
    path = "/api/uavs/{designation}",
    tag = "catalog",
    params(("designation" = String, Path, description = "Exact, case-sensitive designation")),
    responses(
        (status = 200, description = "UAV record", body = Uav),
        (status = 404, description = "Unknown designation", body = crate::ErrorBody)
    )
)]
pub async fn get_uav(
    State(state): State<AppState>,
    Path(designation): Path<String>,
) -> ApiResult<Json<Uav>> {
    let lookup = designation.clone();
    state
        .with_catalog("Error fetching UAV", move |c| c.get_uav_by_designation(&lookup))
        .await?
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotFound(format!("UAV with designation '{}' not found", designation))
        })
}

#[utoipa::path(
    post,
    path = "/api/uavs/compare",
    tag = "catalog",
    request_body = CompareRequest,
    responses(
        (status = 200, description = "Known UAVs among the requested designations", body = UavList),
        (status = 422, description = "Empty or oversized designation list", body = crate::ErrorBody)
    )
)]
pub async fn compare_uavs(
    State(state): State<AppState>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> ApiResult<Json<UavList>> {
    let Json(request) = payload?;
    if request.designations.is_empty() || request.designations.len() > MAX_COMPARE {
        return Err(ApiError::Validation(format!(
            "designations must contain between 1 and {} entries",
            MAX_COMPARE
        )));
    }
    let uavs = state
        .with_catalog("Error comparing UAVs", move |c| {
            c.compare_uavs(&request.designations)
        })
        .await?;
    Ok(Json(uavs.into()))
}

#[utoipa::path(
    post,
    path = "/api/uavs/search",
    tag = "catalog",
    request_body = UavSearch,
    responses((status = 200, description = "UAVs matching every given filter", body = UavList))
)]
pub async fn search_uavs(
    State(state): State<AppState>,
    payload: Result<Json<UavSearch>, JsonRejection>,
) -> ApiResult<Json<UavList>> {
    let Json(filters) = payload?;
    let uavs = state
        .with_catalog("Error searching UAVs", move |c| c.search_uavs(&filters))
        .await?;
    Ok(Json(uavs.into()))
}

#[utoipa::path(
    get,
    path = "/api/filters/countries",
    tag = "catalog",
    responses((status = 200, description = "Distinct countries of origin", body = [String]))
)]
pub async fn countries(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    state
        .with_catalog("Error fetching countries", |c| c.get_countries())
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/filters/types",
    tag = "catalog",
    responses((status = 200, description = "Distinct UAV types", body = [String]))
)]
pub async fn types(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    state
        .with_catalog("Error fetching types", |c| c.get_types())
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/armaments",
    tag = "catalog",
    responses((status = 200, description = "Every armament", body = ArmamentList))
)]
pub async fn list_armaments(State(state): State<AppState>) -> ApiResult<Json<ArmamentList>> {
    let armaments = state
        .with_catalog("Error fetching armaments", |c| c.get_all_armaments())
        .await?;
    Ok(Json(armaments.into()))
}

#[utoipa::path(
    get,
    path = "/api/armaments/search",
    tag = "catalog",
    params(ArmamentSearch),
    responses((status = 200, description = "Armaments matching every given filter", body = ArmamentList))
)]
pub async fn search_armaments(
    State(state): State<AppState>,
    query: Result<Query<ArmamentSearch>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<Json<ArmamentList>> {
    let Query(filters) = query?;
    let armaments = state
        .with_catalog("Error searching armaments", move |c| {
            c.search_armaments(&filters)
        })
        .await?;
    Ok(Json(armaments.into()))
}

#[utoipa::path(
    get,
    path = "/api/armaments/{designation}",
    tag = "catalog",
    params(("designation" = String, Path, description = "Exact armament designation")),
    responses(
        (status = 200, description = "Armament record", body = Armament),
        (status = 404, description = "Unknown designation", body = crate::ErrorBody)
    )
)]
pub async fn get_armament(
    State(state): State<AppState>,
    Path(designation): Path<String>,
) -> ApiResult<Json<Armament>> {
    let lookup = designation.clone();
    state
        .with_catalog("Error fetching armament", move |c| {
            c.get_armament_by_designation(&lookup)
        })
        .await?
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "Armament with designation '{}' not found",
                designation
            ))
        })
}

#[utoipa::path(
    get,
    path = "/api/uavs/{designation}/armaments",
    tag = "catalog",
    params(("designation" = String, Path, description = "UAV designation")),
    responses((status = 200, description = "Armaments integrated on the UAV", body = UavArmaments))
)]
pub async fn uav_armaments(
    State(state): State<AppState>,
    Path(designation): Path<String>,
) -> ApiResult<Json<UavArmaments>> {
    let lookup = designation.clone();
    let armaments = state
        .with_catalog("Error fetching UAV armaments", move |c| {
            c.get_armaments_for_uav(&lookup)
        })
        .await?;
    Ok(Json(UavArmaments {
        uav_designation: designation,
        total: armaments.len(),
        armaments,
    }))
}

#[utoipa::path(
    get,
    path = "/api/armaments/{designation}/uavs",
    tag = "catalog",
    params(("designation" = String, Path, description = "Armament designation")),
    responses((status = 200, description = "UAVs able to carry the armament", body = ArmamentCarriers))
)]
pub async fn armament_uavs(
    State(state): State<AppState>,
    Path(designation): Path<String>,
) -> ApiResult<Json<ArmamentCarriers>> {
    let lookup = designation.clone();
    let uavs = state
        .with_catalog("Error fetching armament UAVs", move |c| {
            c.get_uavs_for_armament(&lookup)
        })
        .await?;
    Ok(Json(ArmamentCarriers {
        armament_designation: designation,
        total: uavs.len(),
        uavs,
    }))
}

#[utoipa::path(
    get,
    path = "/api/filters/weapon-types",
    tag = "catalog",
    responses((status = 200, description = "Distinct weapon types", body = [String]))
)]
pub async fn weapon_types(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    state
        .with_catalog("Error fetching weapon types", |c| c.get_weapon_types())
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/filters/weapon-classes",
    tag = "catalog",
    responses((status = 200, description = "Distinct weapon classes", body = [String]))
)]
pub async fn weapon_classes(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    state
        .with_catalog("Error fetching weapon classes", |c| c.get_weapon_classes())
        .await
        .map(Json)
}
