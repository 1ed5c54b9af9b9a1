use crate::rest::{catalog, graph};
use crate::{ApiError, AppState};
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

pub fn create_router(state: AppState) -> Router {
    let api = &state.settings.api;
    let cors = cors_layer(&state.settings.security.allowed_origins);

    let router = Router::new()
        .route("/", get(catalog::root))
        .nest(&api.prefix, catalog_routes())
        .nest(&api.v1_prefix, graph_routes());

    with_openapi(router)
        .fallback(not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(catalog::health))
        .route("/stats", get(catalog::stats))
        // UAVs
        .route("/uavs", get(catalog::list_uavs))
        .route("/uavs/compare", post(catalog::compare_uavs))
        .route("/uavs/search", post(catalog::search_uavs))
        .route("/uavs/{designation}", get(catalog::get_uav))
        .route("/uavs/{designation}/armaments", get(catalog::uav_armaments))
        // Armaments; the static search route wins over the designation capture
        .route("/armaments", get(catalog::list_armaments))
        .route("/armaments/search", get(catalog::search_armaments))
        .route("/armaments/{designation}", get(catalog::get_armament))
        .route("/armaments/{designation}/uavs", get(catalog::armament_uavs))
        // Filter lists
        .route("/filters/countries", get(catalog::countries))
        .route("/filters/types", get(catalog::types))
        .route("/filters/weapon-types", get(catalog::weapon_types))
        .route("/filters/weapon-classes", get(catalog::weapon_classes))
}

fn graph_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/uavs",
            get(graph::list_platforms).post(graph::create_platform),
        )
        .route("/uavs/{key}", get(graph::get_platform))
        .route("/graph", get(graph::graph_overview))
        .route(
            "/graph/{collection}/{key}/neighborhood",
            get(graph::neighborhood),
        )
        .route("/search", post(graph::search))
        .route("/search/suggestions", get(graph::suggestions))
        // Traversal templates
        .route(
            "/families/{key}/configurations",
            get(graph::family_configurations),
        )
        .route(
            "/variants/{key}/technologies",
            get(graph::variant_technologies),
        )
        .route("/variants/{key}/supply-chain", get(graph::supply_chain))
        .route("/missions/{key}/platforms", get(graph::mission_platforms))
        .route("/programs/{key}/platforms", get(graph::program_platforms))
        .route(
            "/configurations/{key}/provenance",
            get(graph::configuration_provenance),
        )
        .route(
            "/technologies/{key}/adoption",
            get(graph::technology_adoption),
        )
        .route(
            "/manufacturers/{key}/portfolio",
            get(graph::manufacturer_portfolio),
        )
}

#[cfg(feature = "openapi-ui")]
fn with_openapi(router: Router<AppState>) -> Router<AppState> {
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    router.merge(SwaggerUi::new("/docs").url("/openapi.json", crate::rest::ApiDoc::openapi()))
}

#[cfg(not(feature = "openapi-ui"))]
fn with_openapi(router: Router<AppState>) -> Router<AppState> {
    router.route("/openapi.json", get(openapi_json))
}

#[cfg(not(feature = "openapi-ui"))]
async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;
    axum::Json(crate::rest::ApiDoc::openapi())
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Resource not found".to_string())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}
