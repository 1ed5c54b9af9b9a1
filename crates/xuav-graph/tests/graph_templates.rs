use serde_json::json;
use std::collections::BTreeSet;
use xuav_core::XuavError;
use xuav_graph::schema::{FAMILIES, VARIANTS};
use xuav_graph::{GraphStore, ImportService, NewVariant, PlatformSearch, QueryService};

async fn seeded() -> (QueryService, ImportService) {
    let store = GraphStore::in_memory().await.expect("in-memory graph");
    let importer = ImportService::new(store.clone());
    let (vertices, edges) = importer.seed_cca().await.expect("seed");

    assert_eq!(vertices.total_errors(), 0, "{:?}", vertices.errors);
    assert_eq!(vertices.imported(FAMILIES), 5);
    assert_eq!(vertices.imported(VARIANTS), 7);
    assert!(edges.errors.is_empty(), "{:?}", edges.errors);
    assert_eq!(edges.total_created(), 45);

    (QueryService::new(store), importer)
}

fn names<T>(rows: &[T], f: impl Fn(&T) -> Option<&String>) -> Vec<String> {
    rows.iter().filter_map(|r| f(r).cloned()).collect()
}

#[tokio::test]
async fn family_configurations_follow_variants() {
    let (queries, _) = seeded().await;

    let fury = queries.platform_configurations("fury").await.unwrap();
    assert_eq!(fury.len(), 4);
    assert!(fury.iter().all(|r| r.variant.as_deref() == Some("YFQ-44A Fury")));
    assert_eq!(
        names(&fury, |r| r.mission_type.as_ref()),
        vec!["Decoy", "Electronic Warfare", "ISR", "Strike"]
    );
    let isr = fury.iter().find(|r| r.mission_type.as_deref() == Some("ISR")).unwrap();
    assert_eq!(
        isr.mission_category.as_deref(),
        Some("Intelligence, Surveillance, Reconnaissance")
    );
    assert_eq!(isr.cost_per_sortie, Some(45000.0));

    let gambit = queries.platform_configurations("gambit").await.unwrap();
    assert_eq!(gambit.len(), 4);
    let variants: BTreeSet<_> = names(&gambit, |r| r.variant.as_ref()).into_iter().collect();
    assert_eq!(variants.len(), 3);
}

#[tokio::test]
async fn variant_technologies_are_listed_in_key_order() {
    let (queries, _) = seeded().await;
    let techs = queries.variant_technologies("yfq-44a").await.unwrap();
    assert_eq!(
        names(&techs, |t| t.technology.as_ref()),
        vec!["Hivemind AI", "Lattice OS", "MOSA"]
    );
    assert_eq!(techs[1].kind.as_deref(), Some("Autonomy software"));
    assert!(queries.variant_technologies("gambit-4").await.unwrap().is_empty());
}

#[tokio::test]
async fn supply_chain_names_builder_and_autonomy_provider() {
    let (queries, _) = seeded().await;

    let fury = queries.supply_chain("yfq-44a").await.unwrap().expect("yfq-44a");
    assert_eq!(fury.family.as_deref(), Some("Fury"));
    let manufacturer = fury.manufacturer.expect("manufacturer");
    assert_eq!(manufacturer.name.as_deref(), Some("Anduril Industries"));
    assert_eq!(manufacturer.headquarters.as_deref(), Some("Costa Mesa, California"));
    assert_eq!(names(&fury.autonomy_providers, |p| p.name.as_ref()), vec!["Shield AI"]);

    let gambit = queries.supply_chain("gambit-1").await.unwrap().unwrap();
    assert_eq!(
        names(&gambit.autonomy_providers, |p| p.name.as_ref()),
        vec!["RTX Corporation"]
    );

    let ca1 = queries.supply_chain("ca-1").await.unwrap().unwrap();
    assert!(ca1.autonomy_providers.is_empty());

    assert!(queries.supply_chain("no-such-variant").await.unwrap().is_none());
}

#[tokio::test]
async fn mission_capable_platforms_join_through_manufacturer() {
    let (queries, _) = seeded().await;
    let isr = queries.mission_capable_platforms("isr").await.unwrap();
    assert_eq!(
        names(&isr, |r| r.configuration.as_ref()),
        vec!["Fury ISR", "Gambit 4 ISR", "Ghost Bat ISR", "X-BAT ISR"]
    );
    assert_eq!(
        names(&isr, |r| r.manufacturer.as_ref()),
        vec![
            "Anduril Industries",
            "General Atomics Aeronautical Systems",
            "Boeing Defence Australia",
            "Shield AI"
        ]
    );
    assert_eq!(isr[2].status.as_deref(), Some("Flight testing"));
    assert_eq!(queries.mission_capable_platforms("air-to-air").await.unwrap().len(), 1);
}

#[tokio::test]
async fn program_platforms_group_variants_per_family() {
    let (queries, _) = seeded().await;
    let rows = queries.program_platforms("cca-increment-1").await.unwrap();
    assert_eq!(names(&rows, |r| r.family.as_ref()), vec!["Fury", "Gambit"]);
    assert!(rows.iter().all(|r| r.budget == Some(6.0e9)));

    let gambit = &rows[1];
    assert_eq!(gambit.manufacturer.as_deref(), Some("General Atomics Aeronautical Systems"));
    assert_eq!(
        names(&gambit.variants, |v| v.designation.as_ref()),
        vec!["YFQ-42A", "Gambit 4", "Gambit 6"]
    );
    assert_eq!(gambit.variants[0].first_flight.as_deref(), Some("2025-08-27"));
}

#[tokio::test]
async fn configuration_provenance_traces_to_program() {
    let (queries, _) = seeded().await;

    let fury = queries
        .configuration_provenance("fury-isr")
        .await
        .unwrap()
        .expect("fury-isr");
    assert_eq!(fury.configuration.as_deref(), Some("Fury ISR"));
    assert_eq!(fury.mission.as_ref().and_then(|m| m.kind.as_deref()), Some("ISR"));
    let variant = fury.variant.as_ref().unwrap();
    assert_eq!(variant.designation.as_deref(), Some("YFQ-44A"));
    assert_eq!(variant.airframe_type.as_deref(), Some("Fixed-wing"));
    assert_eq!(fury.family.as_ref().and_then(|f| f.name.as_deref()), Some("Fury"));
    assert_eq!(
        fury.manufacturer.as_ref().and_then(|m| m.name.as_deref()),
        Some("Anduril Industries")
    );
    let program = fury.program.as_ref().expect("program");
    assert_eq!(program.name.as_deref(), Some("CCA Increment 1"));
    assert_eq!(program.status.as_deref(), Some("Active"));
    assert_eq!(fury.technologies, vec!["Hivemind AI", "Lattice OS", "MOSA"]);
    assert_eq!(fury.cost_per_sortie, Some(45000.0));

    let ghost_bat = queries
        .configuration_provenance("ghost-bat-isr")
        .await
        .unwrap()
        .unwrap();
    assert!(ghost_bat.program.is_none());
    assert!(ghost_bat.technologies.is_empty());

    assert!(queries.configuration_provenance("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn technology_adoption_lists_every_variant() {
    let (queries, _) = seeded().await;
    let rows = queries.technology_adoption("hivemind-ai").await.unwrap();
    assert_eq!(names(&rows, |r| r.designation.as_ref()), vec!["X-BAT", "YFQ-44A"]);
    assert_eq!(
        names(&rows, |r| r.manufacturer.as_ref()),
        vec!["Shield AI", "Anduril Industries"]
    );
    assert!(rows.iter().all(|r| r.technology.as_deref() == Some("Hivemind AI")));
}

#[tokio::test]
async fn manufacturer_portfolio_includes_autonomy_work() {
    let (queries, importer) = seeded().await;

    let shield = queries
        .manufacturer_portfolio("shield-ai")
        .await
        .unwrap()
        .expect("shield-ai");
    assert_eq!(shield.manufacturer.as_deref(), Some("Shield AI"));
    assert_eq!(shield.platforms.len(), 1);
    assert_eq!(shield.platforms[0].family.as_deref(), Some("X-BAT"));
    assert!(shield.platforms[0].program.is_none());
    assert_eq!(shield.autonomy_systems.len(), 1);
    assert_eq!(shield.autonomy_systems[0].variant.as_deref(), Some("YFQ-44A Fury"));
    assert_eq!(shield.autonomy_systems[0].family.as_deref(), Some("Fury"));

    let ga = queries
        .manufacturer_portfolio("general-atomics")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ga.platforms[0].program.as_deref(), Some("CCA Increment 1"));
    assert_eq!(ga.platforms[0].variants.len(), 3);
    assert!(ga.autonomy_systems.is_empty());

    importer
        .import_document(&json!({
            FAMILIES: [{
                "_key": "gambit",
                "name": "Gambit",
                "manufacturer": "General Atomics Aeronautical Systems",
                "program": "Gambit Demonstrator"
            }]
        }))
        .await
        .unwrap();
    let ga = queries
        .manufacturer_portfolio("general-atomics")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ga.platforms[0].program.as_deref(), Some("Gambit Demonstrator"));

    assert!(queries.manufacturer_portfolio("lockheed").await.unwrap().is_none());
}

#[tokio::test]
async fn search_filters_are_exact_and_combinable() {
    let (queries, _) = seeded().await;

    let fixed_wing = queries
        .search_platforms(&PlatformSearch {
            airframe_type: Some("Fixed-wing".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(fixed_wing.len(), 6);
    let mut sorted = names(&fixed_wing, |r| r.variant.as_ref());
    sorted.sort();
    assert_eq!(names(&fixed_wing, |r| r.variant.as_ref()), sorted);
    assert!(fixed_wing.iter().all(|r| r.mission_type.is_none()));

    let flying = queries
        .search_platforms(&PlatformSearch {
            development_status: Some("Flight testing".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(
        names(&flying, |r| r.designation.as_ref()),
        vec!["YFQ-42A", "MQ-28A", "YFQ-44A"]
    );

    let isr = queries
        .search_platforms(&PlatformSearch {
            mission_type: Some("ISR".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(isr.len(), 4);
    assert!(isr.iter().all(|r| r.mission_type.as_deref() == Some("ISR")));

    let combined = queries
        .search_platforms(&PlatformSearch {
            airframe_type: Some("Fixed-wing".into()),
            development_status: Some("Flight testing".into()),
            mission_type: Some("ISR".into()),
        })
        .await
        .unwrap();
    assert_eq!(names(&combined, |r| r.designation.as_ref()), vec!["MQ-28A", "YFQ-44A"]);

    let lowercase = queries
        .search_platforms(&PlatformSearch {
            airframe_type: Some("fixed-wing".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(lowercase.is_empty());
}

#[tokio::test]
async fn listing_pages_by_name_with_context() {
    let (queries, _) = seeded().await;

    let first = queries.list_platforms(0, 3).await.unwrap();
    assert_eq!(first.total, 7);
    assert_eq!(
        names(&first.platforms, |p| p.name.as_ref()),
        vec!["CA-1 Europa", "Gambit 1", "Gambit 4"]
    );
    let gambit = &first.platforms[1];
    assert_eq!(gambit.id, "gambit-1");
    assert_eq!(gambit.manufacturer.as_deref(), Some("General Atomics Aeronautical Systems"));
    assert_eq!(gambit.country, "United States");
    assert_eq!(gambit.category.as_deref(), Some("Fixed-wing"));
    assert!(gambit.specifications.is_empty());

    let tail = queries.list_platforms(5, 10).await.unwrap();
    assert_eq!(names(&tail.platforms, |p| p.name.as_ref()), vec!["X-BAT", "YFQ-44A Fury"]);

    let detail = queries.platform_detail("mq-28a").await.unwrap().expect("mq-28a");
    assert_eq!(detail.country, "Australia");
    assert!(queries.platform_detail("MQ-28A").await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_keys_yield_empty_results() {
    let (queries, _) = seeded().await;
    assert!(queries.platform_configurations("Fury").await.unwrap().is_empty());
    assert!(queries.variant_technologies("nope").await.unwrap().is_empty());
    assert!(queries.mission_capable_platforms("nope").await.unwrap().is_empty());
    assert!(queries.program_platforms("nope").await.unwrap().is_empty());
    assert!(queries.technology_adoption("nope").await.unwrap().is_empty());
}

#[tokio::test]
async fn neighborhood_expands_breadth_first() {
    let (queries, _) = seeded().await;

    let one = queries.neighborhood(FAMILIES, "fury", 1).await.unwrap();
    assert_eq!(one.center, "platform_families/fury");
    assert_eq!(one.nodes[0].id, "platform_families/fury");
    let ids: BTreeSet<_> = one.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(
        ids,
        BTreeSet::from([
            "platform_families/fury",
            "platform_variants/yfq-44a",
            "manufacturers/anduril",
            "programs/cca-increment-1",
        ])
    );
    assert_eq!(one.edges.len(), 3);

    let two = queries.neighborhood(FAMILIES, "fury", 2).await.unwrap();
    assert_eq!(two.nodes.len(), 13);
    assert_eq!(two.edges.len(), 12);
    assert!(two.nodes.iter().any(|n| n.id == "platform_families/gambit"));

    assert!(matches!(
        queries.neighborhood(FAMILIES, "fury", 0).await,
        Err(XuavError::InvalidInput(_))
    ));
    assert!(matches!(
        queries.neighborhood(FAMILIES, "fury", 4).await,
        Err(XuavError::InvalidInput(_))
    ));
    assert!(matches!(
        queries.neighborhood(FAMILIES, "nope", 1).await,
        Err(XuavError::NotFound(_))
    ));
    assert!(matches!(
        queries.neighborhood("hangars", "fury", 1).await,
        Err(XuavError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn overview_respects_node_limit() {
    let (queries, _) = seeded().await;

    let full = queries.graph_overview(1000).await.unwrap();
    assert_eq!(full.nodes.len(), 43);
    assert_eq!(full.edges.len(), 45);

    let small = queries.graph_overview(10).await.unwrap();
    assert_eq!(small.nodes.len(), 10);
    let ids: BTreeSet<_> = small.nodes.iter().map(|n| n.id.clone()).collect();
    assert!(small
        .edges
        .iter()
        .all(|e| ids.contains(&e.from) && ids.contains(&e.to)));
}

#[tokio::test]
async fn suggestions_match_names_case_insensitively() {
    let (queries, _) = seeded().await;

    let ghost = queries.suggest("GHOST", 10).await.unwrap();
    assert_eq!(ghost.len(), 4);

    let gambit = queries.suggest("gambit", 3).await.unwrap();
    assert_eq!(
        gambit.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        vec!["Gambit", "Gambit 1", "Gambit 1 Air-to-Air"]
    );
    assert_eq!(gambit[0].collection, FAMILIES);

    assert!(queries.suggest("   ", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn add_variant_links_family_and_rejects_duplicates() {
    let (queries, importer) = seeded().await;
    let variant = NewVariant {
        family_key: "fury".into(),
        key: "fury-block-2".into(),
        name: "Fury Block 2".into(),
        designation: Some("YFQ-44B".into()),
        airframe_type: Some("Fixed-wing".into()),
        development_status: Some("Development".into()),
        ..Default::default()
    };
    importer.add_variant(&variant).await.unwrap();

    let chain = queries.supply_chain("fury-block-2").await.unwrap().unwrap();
    assert_eq!(chain.family.as_deref(), Some("Fury"));
    assert_eq!(queries.list_platforms(0, 100).await.unwrap().total, 8);

    assert!(matches!(
        importer.add_variant(&variant).await,
        Err(XuavError::Conflict(_))
    ));
    let renamed = NewVariant {
        key: "fury-block-3".into(),
        designation: Some("YFQ-44A".into()),
        ..variant.clone()
    };
    assert!(matches!(
        importer.add_variant(&renamed).await,
        Err(XuavError::Conflict(msg)) if msg.contains("yfq-44a")
    ));
    let orphan = NewVariant {
        family_key: "no-family".into(),
        key: "orphan".into(),
        name: "Orphan".into(),
        ..Default::default()
    };
    assert!(matches!(
        importer.add_variant(&orphan).await,
        Err(XuavError::NotFound(_))
    ));
}

#[tokio::test]
async fn search_requires_family_and_manufacturer() {
    let (queries, importer) = seeded().await;
    importer
        .import_variants(&json!([
            { "_key": "orphan", "name": "Orphan", "airframe_type": "Fixed-wing" }
        ]))
        .await
        .unwrap();
    importer
        .import_document(&json!({
            FAMILIES: [{ "_key": "unbuilt", "name": "Unbuilt", "manufacturer": "Nobody" }]
        }))
        .await
        .unwrap();
    importer
        .add_variant(&NewVariant {
            family_key: "unbuilt".into(),
            key: "unbuilt-1".into(),
            name: "Unbuilt One".into(),
            airframe_type: Some("Fixed-wing".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let everything = queries.search_platforms(&PlatformSearch::default()).await.unwrap();
    assert_eq!(everything.len(), 7);
    assert!(everything.iter().all(|r| r.family.is_some() && r.manufacturer.is_some()));

    let fixed_wing = queries
        .search_platforms(&PlatformSearch {
            airframe_type: Some("Fixed-wing".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let found = names(&fixed_wing, |r| r.variant.as_ref());
    assert_eq!(found.len(), 6);
    assert!(!found.iter().any(|n| n == "Orphan" || n == "Unbuilt One"));

    assert_eq!(queries.list_platforms(0, 100).await.unwrap().total, 9);
}

#[tokio::test]
async fn mistyped_documents_remain_readable() {
    let (queries, importer) = seeded().await;
    let stats = importer
        .import_document(&json!({
            "technologies": [{
                "_key": "lattice-os",
                "name": "Lattice OS",
                "type": "Autonomy software",
                "maturity_level": 6,
                "description": "Autonomy stack"
            }],
            VARIANTS: [{ "_key": "numbered", "name": "Numbered", "designation": 7 }]
        }))
        .await
        .unwrap();
    assert_eq!(stats.total_errors(), 0);

    let techs = queries.variant_technologies("yfq-44a").await.unwrap();
    let lattice = techs
        .iter()
        .find(|t| t.technology.as_deref() == Some("Lattice OS"))
        .expect("lattice");
    assert_eq!(lattice.maturity.as_deref(), Some("6"));

    let page = queries.list_platforms(0, 100).await.unwrap();
    assert_eq!(page.total, 8);
    let numbered = page
        .platforms
        .iter()
        .find(|p| p.id == "numbered")
        .expect("numbered");
    assert_eq!(numbered.designation.as_deref(), Some("7"));
    assert!(queries.platform_detail("numbered").await.unwrap().is_some());
}

#[tokio::test]
async fn reseeding_is_idempotent() {
    let (queries, importer) = seeded().await;
    importer.seed_cca().await.unwrap();

    assert_eq!(queries.list_platforms(0, 100).await.unwrap().total, 7);
    assert_eq!(queries.graph_overview(1000).await.unwrap().edges.len(), 45);
    assert_eq!(queries.platform_configurations("fury").await.unwrap().len(), 4);
}

#[tokio::test]
async fn import_counts_invalid_documents_as_errors() {
    let store = GraphStore::in_memory().await.unwrap();
    let importer = ImportService::new(store);

    let stats = importer
        .import_document(&json!({
            "programs": [
                { "_key": "partial", "name": "Partial", "country": "US" },
                {
                    "_key": "full", "name": "Full", "country": "US",
                    "budget": 10, "start_date": "2024-01-01", "status": "Planned"
                }
            ],
            "hangars": [{ "_key": "h1" }],
            "platform_variants": [{ "name": "no key" }]
        }))
        .await
        .unwrap();
    assert_eq!(stats.imported("programs"), 1);
    assert_eq!(stats.collections["programs"].errors, 1);
    assert_eq!(stats.collections["platform_variants"].errors, 1);
    assert!(!stats.collections.contains_key("hangars"));
    assert_eq!(stats.errors.len(), 2);

    let links = importer.create_relationships().await.unwrap();
    assert_eq!(links.total_created(), 0);
    assert_eq!(links.errors.len(), 45);
}

#[tokio::test]
async fn variants_import_from_file() {
    let store = GraphStore::in_memory().await.unwrap();
    let importer = ImportService::new(store.clone());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("uav_template.json");
    std::fs::write(&path, serde_json::to_string_pretty(&xuav_graph::import::template()).unwrap())
        .unwrap();

    let stats = importer.import_file(&path).await.unwrap();
    assert_eq!(stats.total_imported(), 3);

    let document: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let variants_only = importer.import_variants(&document).await.unwrap();
    assert_eq!(variants_only.total_imported(), 1);
    assert_eq!(variants_only.collections.len(), 1);

    assert!(importer.import_variants(&json!({ "other": [] })).await.is_err());
    assert_eq!(store.count(VARIANTS).await.unwrap(), 1);
}
