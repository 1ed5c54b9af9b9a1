use chrono::NaiveDate;
use tempfile::TempDir;
use xuav_catalog::{Catalog, SAMPLE_CATALOG};
use xuav_core::{ArmamentSearch, UavSearch, XuavError};

fn seeded_catalog() -> (TempDir, Catalog) {
    let dir = tempfile::tempdir().expect("tempdir");
    let catalog = Catalog::new(dir.path().join("db").join("uavs.db"));
    catalog.init_schema().expect("schema");
    let document = serde_json::from_str(SAMPLE_CATALOG).expect("sample json");
    let summary = catalog.import_document(&document).expect("import");
    assert_eq!(summary.uavs, 8);
    assert_eq!(summary.armaments, 5);
    assert_eq!(summary.uav_armaments, 6);
    (dir, catalog)
}

fn designations<T>(rows: &[T], f: impl Fn(&T) -> &str) -> Vec<String> {
    rows.iter().map(|r| f(r).to_string()).collect()
}

#[test]
fn all_uavs_are_ordered_by_designation() {
    let (_dir, catalog) = seeded_catalog();
    let uavs = catalog.get_all_uavs().unwrap();
    assert_eq!(
        designations(&uavs, |u| &u.designation),
        vec!["Heron", "MQ-1C", "MQ-9", "RQ-4", "RQ-7B", "ScanEagle", "TB2", "Wing Loong II"]
    );
}

#[test]
fn uav_lookup_decodes_typed_columns() {
    let (_dir, catalog) = seeded_catalog();
    let reaper = catalog.get_uav_by_designation("MQ-9").unwrap().expect("MQ-9");

    assert_eq!(reaper.name.as_deref(), Some("Reaper"));
    assert_eq!(reaper.country_of_origin.as_deref(), Some("United States"));
    assert_eq!(reaper.uav_type.as_deref(), Some("MALE UCAV"));
    assert_eq!(reaper.endurance_hours, Some(27.0));
    assert_eq!(reaper.hardpoints, Some(7));
    assert_eq!(reaper.internal_weapons_bays, Some(false));
    assert_eq!(
        reaper.initial_operating_capability,
        NaiveDate::from_ymd_opt(2007, 10, 1)
    );
    assert_eq!(
        reaper.mission_types,
        Some(vec!["ISR".to_string(), "Strike".to_string(), "Close Air Support".to_string()])
    );
    assert_eq!(
        reaper.imagery_urls.as_ref().and_then(|m| m.get("side")).map(String::as_str),
        Some("/images/mq-9/side.png")
    );
    assert!(reaper.created_at.is_some());
    assert!(reaper.id > 0);
}

#[test]
fn unknown_designation_is_none() {
    let (_dir, catalog) = seeded_catalog();
    assert!(catalog.get_uav_by_designation("XQ-00").unwrap().is_none());
    assert!(catalog.get_uav_by_designation("mq-9").unwrap().is_none());
}

#[test]
fn compare_returns_known_designations_in_order() {
    let (_dir, catalog) = seeded_catalog();
    let rows = catalog
        .compare_uavs(&["TB2".to_string(), "MQ-9".to_string(), "NOPE".to_string()])
        .unwrap();
    assert_eq!(designations(&rows, |u| &u.designation), vec!["MQ-9", "TB2"]);
    assert!(catalog.compare_uavs(&[]).unwrap().is_empty());
}

#[test]
fn search_combines_filters() {
    let (_dir, catalog) = seeded_catalog();

    let us = catalog
        .search_uavs(&UavSearch {
            country: Some("United States".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(us.len(), 5);

    let male = catalog
        .search_uavs(&UavSearch {
            uav_type: Some("MALE".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(
        designations(&male, |u| &u.designation),
        vec!["Heron", "MQ-1C", "MQ-9", "TB2", "Wing Loong II"]
    );

    let us_male = catalog
        .search_uavs(&UavSearch {
            country: Some("United States".into()),
            uav_type: Some("MALE".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(designations(&us_male, |u| &u.designation), vec!["MQ-1C", "MQ-9"]);

    let retired = catalog
        .search_uavs(&UavSearch {
            status: Some("Retired".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(designations(&retired, |u| &u.designation), vec!["RQ-7B"]);

    let class_one = catalog
        .search_uavs(&UavSearch {
            nato_class: Some("Class I".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(designations(&class_one, |u| &u.designation), vec!["ScanEagle"]);

    let all = catalog.search_uavs(&UavSearch::default()).unwrap();
    assert_eq!(all.len(), 8);
}

#[test]
fn filter_lists_are_distinct_and_sorted() {
    let (_dir, catalog) = seeded_catalog();
    assert_eq!(
        catalog.get_countries().unwrap(),
        vec!["China", "Israel", "Turkey", "United States"]
    );
    let types = catalog.get_types().unwrap();
    assert_eq!(types.first().map(String::as_str), Some("HALE ISR"));
    assert_eq!(types.iter().filter(|t| *t == "MALE UCAV").count(), 1);
}

#[test]
fn stats_group_and_exclude_nulls() {
    let (_dir, catalog) = seeded_catalog();
    let stats = catalog.get_stats().unwrap();

    assert_eq!(stats.total, 8);
    assert_eq!(stats.by_country[0].country.as_deref(), Some("United States"));
    assert_eq!(stats.by_country[0].count, 5);
    assert_eq!(stats.by_type[0].uav_type, "MALE UCAV");
    assert_eq!(stats.by_type[0].count, 4);

    let status_total: i64 = stats.by_status.iter().map(|s| s.count).sum();
    assert_eq!(status_total, 7, "ScanEagle has no status and is excluded");
    assert_eq!(stats.by_status[0].status, "Active");
    assert_eq!(stats.by_status[0].count, 6);
}

#[test]
fn armaments_are_ordered_by_type_then_designation() {
    let (_dir, catalog) = seeded_catalog();
    let armaments = catalog.get_all_armaments().unwrap();
    assert_eq!(
        designations(&armaments, |a| &a.designation),
        vec!["AGM-114", "Blue Arrow 7", "GBU-12", "GBU-38", "MAM-L"]
    );

    let hellfire = catalog.get_armament_by_designation("AGM-114").unwrap().unwrap();
    assert_eq!(hellfire.name.as_deref(), Some("Hellfire"));
    assert_eq!(
        hellfire.launch_platform_types.as_ref().map(Vec::len),
        Some(3)
    );
    assert!(catalog.get_armament_by_designation("AGM-999").unwrap().is_none());
}

#[test]
fn armament_search_uses_exact_and_substring_filters() {
    let (_dir, catalog) = seeded_catalog();

    let guided = catalog
        .search_armaments(&ArmamentSearch {
            weapon_class: Some("guided".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(guided.len(), 4);

    let laser = catalog
        .search_armaments(&ArmamentSearch {
            guidance_type: Some("laser".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(
        designations(&laser, |a| &a.designation),
        vec!["AGM-114", "Blue Arrow 7", "GBU-12", "MAM-L"]
    );

    let bombs_us = catalog
        .search_armaments(&ArmamentSearch {
            weapon_type: Some("Guided bomb".into()),
            country: Some("United States".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(designations(&bombs_us, |a| &a.designation), vec!["GBU-12", "GBU-38"]);

    let partial_type = catalog
        .search_armaments(&ArmamentSearch {
            weapon_type: Some("Guided".into()),
            ..Default::default()
        })
        .unwrap();
    assert!(partial_type.is_empty(), "weapon_type is an exact match");
}

#[test]
fn compatibility_joins_both_directions() {
    let (_dir, catalog) = seeded_catalog();

    let loadout = catalog.get_armaments_for_uav("MQ-9").unwrap();
    assert_eq!(
        designations(&loadout, |a| &a.armament.designation),
        vec!["AGM-114", "GBU-12", "GBU-38"]
    );
    assert_eq!(loadout[0].max_quantity, Some(8));
    assert_eq!(loadout[0].integration_status.as_deref(), Some("Operational"));
    assert_eq!(
        loadout[2].integration_notes.as_deref(),
        Some("Cleared with block 5 aircraft")
    );

    let carriers = catalog.get_uavs_for_armament("AGM-114").unwrap();
    assert_eq!(designations(&carriers, |c| &c.designation), vec!["MQ-1C", "MQ-9"]);
    assert_eq!(carriers[1].name.as_deref(), Some("Reaper"));
    assert_eq!(carriers[1].max_quantity, Some(8));

    assert!(catalog.get_armaments_for_uav("RQ-4").unwrap().is_empty());
    assert!(catalog.get_uavs_for_armament("NOPE").unwrap().is_empty());
}

#[test]
fn weapon_filter_lists() {
    let (_dir, catalog) = seeded_catalog();
    assert_eq!(
        catalog.get_weapon_types().unwrap(),
        vec!["Air-to-surface missile", "Guided bomb"]
    );
    assert_eq!(catalog.get_weapon_classes().unwrap().len(), 4);
}

#[test]
fn reimport_updates_in_place() {
    let (_dir, catalog) = seeded_catalog();
    let update = serde_json::json!({
        "uavs": [{ "designation": "MQ-9", "name": "Reaper (Block 5)" }, { "name": "no key" }]
    });
    let summary = catalog.import_document(&update).unwrap();
    assert_eq!(summary.uavs, 1);
    assert_eq!(summary.skipped, 1);

    assert_eq!(catalog.count_uavs().unwrap(), 8);
    let reaper = catalog.get_uav_by_designation("MQ-9").unwrap().unwrap();
    assert_eq!(reaper.name.as_deref(), Some("Reaper (Block 5)"));
}

#[test]
fn missing_database_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Catalog::new(dir.path().join("absent.db"));
    let err = catalog.get_all_uavs().unwrap_err();
    assert!(matches!(err, XuavError::Database(_)));
}
