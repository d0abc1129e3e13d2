mod common;

use common::*;
use retro_shelf_collections::*;
use tempfile::TempDir;

#[test]
fn update_is_idempotent_and_bundles_custom_collections() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let corpus = corpus();
    let settings = CollectionSettings {
        auto_collections: "favorites,all,2players".into(),
        ..CollectionSettings::default()
    };
    let mut registry = registry(&dir, corpus.clone(), "/roms", settings);
    registry.create_custom_collection("Mine").unwrap();
    registry.set_collection_enabled("Mine", true).unwrap();

    let mut list = physical_system_list(&corpus);
    registry.update_systems_list(&mut list, &mut NullViews);
    let first = list.clone();
    registry.update_systems_list(&mut list, &mut NullViews);

    assert_eq!(list, first);
    assert_eq!(
        list_names(&list),
        vec!["snes", "megadrive", "nes", "2players", "all", "favorites", "collections", "retropie"]
    );
    assert_eq!(registry.bundled_collections(), ["Mine".to_string()]);
    assert_eq!(registry.collection("all").unwrap().system.len(), 5);
    assert_eq!(
        member_names(&registry.collection("2players").unwrap().system),
        vec!["Streets of Rage"]
    );
}

#[test]
fn sequential_population_fills_enabled_collections() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let corpus = corpus();
    let settings = CollectionSettings {
        auto_collections: "all,2players,neverplayed".into(),
        threaded_loading: false,
        ..CollectionSettings::default()
    };
    let mut registry = registry(&dir, corpus.clone(), "/roms", settings);
    let mut list = physical_system_list(&corpus);
    registry.update_systems_list(&mut list, &mut NullViews);

    assert!(registry.auto_collections().filter(|e| e.enabled).all(|e| e.populated));
    assert_eq!(registry.collection("neverplayed").unwrap().system.len(), 5);
}

#[test]
fn disabled_bundling_gives_custom_collections_their_own_slot() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let corpus = corpus();
    let settings = CollectionSettings {
        bundle_custom_collections: false,
        sort_systems: SystemSortMode::Name,
        auto_collections: "all".into(),
        ..CollectionSettings::default()
    };
    let mut registry = registry(&dir, corpus.clone(), "/roms", settings);
    registry.create_custom_collection("Zapped").unwrap();
    registry.set_collection_enabled("Zapped", true).unwrap();

    let mut list = physical_system_list(&corpus);
    registry.update_systems_list(&mut list, &mut NullViews);

    assert_eq!(
        list_names(&list),
        vec!["megadrive", "nes", "snes", "Zapped", "all", "retropie"]
    );
    assert!(registry.bundled_collections().is_empty());
    assert_eq!(registry.system_to_view("Zapped").unwrap().name, "Zapped");
}

#[test]
fn themed_custom_collection_is_not_bundled() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let corpus = corpus();
    let mut registry = registry_with_theme(
        &dir,
        corpus.clone(),
        "/roms",
        CollectionSettings::default(),
        StaticTheme::new(["Mine"]),
    );
    registry.create_custom_collection("Mine").unwrap();
    registry.set_collection_enabled("Mine", true).unwrap();

    let mut list = physical_system_list(&corpus);
    registry.update_systems_list(&mut list, &mut NullViews);

    let names = list_names(&list);
    assert!(names.contains(&"Mine".to_string()));
    assert!(!names.contains(&"collections".to_string()));
}

#[test]
fn manufacturer_ordering_keeps_collections_last() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let corpus = corpus();
    let settings = CollectionSettings {
        auto_collections: "all".into(),
        sort_systems: SystemSortMode::Manufacturer,
        ..CollectionSettings::default()
    };
    let mut registry = registry(&dir, corpus.clone(), "/roms", settings);
    let mut list = physical_system_list(&corpus);
    registry.update_systems_list(&mut list, &mut NullViews);

    assert_eq!(
        list_names(&list),
        vec!["megadrive", "nes", "snes", "all", "retropie"]
    );
}

#[test]
fn last_played_keeps_fifty_newest() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let corpus = played_corpus(60);
    let settings = CollectionSettings {
        auto_collections: "recent".into(),
        ..CollectionSettings::default()
    };
    let mut registry = registry(&dir, corpus.clone(), "/roms", settings);
    let mut list = physical_system_list(&corpus);
    registry.update_systems_list(&mut list, &mut NullViews);

    let recent = &registry.collection("recent").unwrap().system;
    assert_eq!(recent.len(), 50);
    let names = member_names(recent);
    assert_eq!(names.first().unwrap(), "Game 59");
    assert_eq!(names.last().unwrap(), "Game 10");
}
