use axum_test::TestServer;
use serde_json::{json, Value};
use xuav_api::{create_router, AppState};
use xuav_core::Settings;
use xuav_graph::{GraphStore, ImportService};

async fn seeded_server() -> TestServer {
    let store = GraphStore::in_memory().await.expect("in-memory graph");
    let (_, edges) = ImportService::new(store.clone())
        .seed_cca()
        .await
        .expect("seed");
    assert_eq!(edges.total_created(), 45);

    let state = AppState::with_graph(Settings::default(), store);
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn listing_pages_and_clamps_limit() {
    let server = seeded_server().await;

    let resp = server.get("/api/v1/uavs").add_query_param("limit", 3).await;
    assert_eq!(resp.status_code(), 200);
    let page: Value = resp.json();
    assert_eq!(page["total"], 7);
    assert_eq!(page["skip"], 0);
    assert_eq!(page["limit"], 3);
    assert_eq!(page["platforms"][0]["name"], "CA-1 Europa");
    assert_eq!(page["platforms"][1]["id"], "gambit-1");

    let clamped: Value = server
        .get("/api/v1/uavs")
        .add_query_param("limit", 0)
        .await
        .json();
    assert_eq!(clamped["limit"], 1);
    assert_eq!(clamped["platforms"].as_array().unwrap().len(), 1);

    let bad = server.get("/api/v1/uavs").add_query_param("skip", "many").await;
    assert_eq!(bad.status_code(), 422);
}

#[tokio::test]
async fn platform_detail_by_key() {
    let server = seeded_server().await;

    let fury: Value = server.get("/api/v1/uavs/yfq-44a").await.json();
    assert_eq!(fury["name"], "YFQ-44A Fury");
    assert_eq!(fury["manufacturer"], "Anduril Industries");
    assert_eq!(fury["country"], "United States");

    let missing = server.get("/api/v1/uavs/nope").await;
    assert_eq!(missing.status_code(), 404);
    let body: Value = missing.json();
    assert_eq!(body, json!({ "detail": "UAV not found", "status": 404 }));
}

#[tokio::test]
async fn creating_a_variant() {
    let server = seeded_server().await;
    let body = json!({
        "family_key": "fury",
        "key": "fury-block-2",
        "name": "Fury Block 2",
        "airframe_type": "Fixed-wing"
    });

    let created = server.post("/api/v1/uavs").json(&body).await;
    assert_eq!(created.status_code(), 201);
    let listing: Value = created.json();
    assert_eq!(listing["id"], "fury-block-2");
    assert_eq!(listing["manufacturer"], "Anduril Industries");

    let page: Value = server.get("/api/v1/uavs").await.json();
    assert_eq!(page["total"], 8);

    let duplicate = server.post("/api/v1/uavs").json(&body).await;
    assert_eq!(duplicate.status_code(), 409);

    let reused = server
        .post("/api/v1/uavs")
        .json(&json!({
            "family_key": "fury",
            "key": "fury-copy",
            "name": "Fury Copy",
            "designation": "YFQ-44A"
        }))
        .await;
    assert_eq!(reused.status_code(), 409);
    let detail: Value = reused.json();
    assert_eq!(
        detail["detail"],
        "Already exists: Designation 'YFQ-44A' (platform variant 'yfq-44a')"
    );

    let orphan = server
        .post("/api/v1/uavs")
        .json(&json!({ "family_key": "nope", "key": "orphan", "name": "Orphan" }))
        .await;
    assert_eq!(orphan.status_code(), 404);
    let detail: Value = orphan.json();
    assert_eq!(detail["detail"], "Platform family 'nope' not found");

    let unnamed = server
        .post("/api/v1/uavs")
        .json(&json!({ "family_key": "fury", "key": "x" }))
        .await;
    assert_eq!(unnamed.status_code(), 422);
}

#[tokio::test]
async fn graph_overview_and_neighborhood() {
    let server = seeded_server().await;

    let overview: Value = server
        .get("/api/v1/graph")
        .add_query_param("limit", 10)
        .await
        .json();
    assert_eq!(overview["nodes"].as_array().unwrap().len(), 10);

    let two: Value = server
        .get("/api/v1/graph/platform_families/fury/neighborhood")
        .add_query_param("depth", 2)
        .await
        .json();
    assert_eq!(two["center"], "platform_families/fury");
    assert_eq!(two["nodes"].as_array().unwrap().len(), 13);
    assert_eq!(two["edges"].as_array().unwrap().len(), 12);

    let too_deep = server
        .get("/api/v1/graph/platform_families/fury/neighborhood")
        .add_query_param("depth", 4)
        .await;
    assert_eq!(too_deep.status_code(), 422);

    let unknown = server
        .get("/api/v1/graph/platform_families/nope/neighborhood")
        .await;
    assert_eq!(unknown.status_code(), 404);
}

#[tokio::test]
async fn search_and_suggestions() {
    let server = seeded_server().await;

    let isr: Value = server
        .post("/api/v1/search")
        .json(&json!({ "mission_type": "ISR" }))
        .await
        .json();
    assert_eq!(isr["total"], 4);

    let suggestions: Value = server
        .get("/api/v1/search/suggestions")
        .add_query_param("query", "gambit")
        .add_query_param("limit", 3)
        .await
        .json();
    assert_eq!(suggestions["suggestions"][0]["name"], "Gambit");
    assert_eq!(suggestions["suggestions"].as_array().unwrap().len(), 3);

    let no_query = server.get("/api/v1/search/suggestions").await;
    assert_eq!(no_query.status_code(), 422);
}

#[tokio::test]
async fn traversal_templates() {
    let server = seeded_server().await;

    let configs: Value = server.get("/api/v1/families/fury/configurations").await.json();
    assert_eq!(configs.as_array().unwrap().len(), 4);

    let techs: Value = server.get("/api/v1/variants/yfq-44a/technologies").await.json();
    assert_eq!(techs.as_array().unwrap().len(), 3);

    let chain: Value = server.get("/api/v1/variants/yfq-44a/supply-chain").await.json();
    assert_eq!(chain["family"], "Fury");
    let no_chain = server.get("/api/v1/variants/nope/supply-chain").await;
    assert_eq!(no_chain.status_code(), 404);

    let isr: Value = server.get("/api/v1/missions/isr/platforms").await.json();
    assert_eq!(isr.as_array().unwrap().len(), 4);

    let program: Value = server
        .get("/api/v1/programs/cca-increment-1/platforms")
        .await
        .json();
    assert_eq!(program.as_array().unwrap().len(), 2);

    let provenance: Value = server
        .get("/api/v1/configurations/fury-isr/provenance")
        .await
        .json();
    assert_eq!(provenance["configuration"], "Fury ISR");
    let no_provenance = server.get("/api/v1/configurations/nope/provenance").await;
    assert_eq!(no_provenance.status_code(), 404);

    let adoption: Value = server
        .get("/api/v1/technologies/hivemind-ai/adoption")
        .await
        .json();
    assert_eq!(adoption.as_array().unwrap().len(), 2);

    let portfolio: Value = server
        .get("/api/v1/manufacturers/shield-ai/portfolio")
        .await
        .json();
    assert_eq!(portfolio["manufacturer"], "Shield AI");
    let no_portfolio = server.get("/api/v1/manufacturers/lockheed/portfolio").await;
    assert_eq!(no_portfolio.status_code(), 404);
}

#[tokio::test]
async fn unknown_template_keys_return_empty_lists() {
    let server = seeded_server().await;
    let resp = server.get("/api/v1/missions/nope/platforms").await;
    assert_eq!(resp.status_code(), 200);
    let rows: Value = resp.json();
    assert_eq!(rows, json!([]));
}
