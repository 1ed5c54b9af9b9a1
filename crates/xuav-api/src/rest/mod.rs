pub mod catalog;
pub mod graph;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        catalog::root,
        catalog::health,
        catalog::stats,
        catalog::list_uavs,
        catalog::get_uav,
        catalog::compare_uavs,
        catalog::search_uavs,
        catalog::countries,
        catalog::types,
        catalog::list_armaments,
        catalog::search_armaments,
        catalog::get_armament,
        catalog::uav_armaments,
        catalog::armament_uavs,
        catalog::weapon_types,
        catalog::weapon_classes,
        graph::list_platforms,
        graph::get_platform,
        graph::create_platform,
        graph::graph_overview,
        graph::neighborhood,
        graph::search,
        graph::suggestions,
        graph::family_configurations,
        graph::variant_technologies,
        graph::supply_chain,
        graph::mission_platforms,
        graph::program_platforms,
        graph::configuration_provenance,
        graph::technology_adoption,
        graph::manufacturer_portfolio,
    ),
    components(
        schemas(
            crate::ErrorBody,
            catalog::RootResponse,
            catalog::HealthResponse,
            catalog::UavList,
            catalog::CompareRequest,
            catalog::ArmamentList,
            catalog::UavArmaments,
            catalog::ArmamentCarriers,
            graph::PlatformList,
            graph::SearchResults,
            graph::Suggestions,
            xuav_core::Uav,
            xuav_core::Armament,
            xuav_core::ArmamentIntegration,
            xuav_core::ArmamentCarrier,
            xuav_core::CatalogStats,
            xuav_core::UavSearch,
            xuav_graph::PlatformListing,
            xuav_graph::NewVariant,
            xuav_graph::PlatformSearch,
            xuav_graph::GraphView,
            xuav_graph::Neighborhood,
        )
    ),
    tags(
        (name = "root", description = "Service banner"),
        (name = "catalog", description = "Flat UAV and armament catalog"),
        (name = "graph", description = "Platform graph listing, search and exploration"),
        (name = "templates", description = "Named graph traversals")
    )
)]
pub struct ApiDoc;
