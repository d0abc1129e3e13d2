use super::*;
use crate::facet::Facet;
use crate::view::{NullViews, StaticTheme};
use retro_shelf_core::GameMetadata;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingViews {
    events: Vec<(ChangeTarget, ChangeKind)>,
    detached: Vec<(String, std::path::PathBuf)>,
    repopulated: Vec<String>,
    removed: Vec<String>,
    messages: Vec<String>,
}

impl CollectionViews for RecordingViews {
    fn on_changed(&mut self, target: ChangeTarget, kind: ChangeKind) {
        self.events.push((target, kind));
    }

    fn detach_entry(&mut self, system: &str, key: &std::path::Path) -> bool {
        self.detached.push((system.to_string(), key.to_path_buf()));
        true
    }

    fn repopulate(&mut self, system: &str) {
        self.repopulated.push(system.to_string());
    }

    fn remove_view(&mut self, system: &str) {
        self.removed.push(system.to_string());
    }

    fn notify(&mut self, message: &str, _duration: Duration) {
        self.messages.push(message.to_string());
    }
}

fn game(system: &str, name: &str, meta: GameMetadata) -> Arc<Game> {
    Arc::new(Game::with_metadata(
        format!("/roms/{system}/{name}.rom"),
        name,
        system,
        meta,
    ))
}

fn platform() -> GameMetadata {
    GameMetadata {
        genre: Some("Platform".into()),
        ..Default::default()
    }
}

fn corpus() -> Arc<GameCorpus> {
    use retro_shelf_core::GameSystem;

    let mut snes = GameSystem::new("snes", "Super Nintendo", "/roms/snes");
    snes.root.push_game(game("snes", "Super Mario World (USA)", platform()));
    snes.root.push_game(game(
        "snes",
        "F-Zero",
        GameMetadata {
            genre: Some("Racing".into()),
            ..Default::default()
        },
    ));
    let mut megadrive = GameSystem::new("megadrive", "Mega Drive", "/roms/megadrive");
    megadrive.root.push_game(game("megadrive", "Sonic", platform()));
    megadrive
        .root
        .push_game(game("megadrive", "Columns", GameMetadata::default()));
    let mut nes = GameSystem::new("nes", "Nintendo", "/roms/nes");
    nes.root.push_game(game("nes", "Mega Man", platform()));
    Arc::new(GameCorpus::new(vec![snes, megadrive, nes]))
}

fn registry_with(dir: &TempDir, settings: CollectionSettings, theme: StaticTheme) -> CollectionRegistry {
    let paths = CollectionPaths::new(dir.path().join("collections"), "/roms").with_home(None);
    let mut registry = CollectionRegistry::new(corpus(), settings, paths, Arc::new(theme));
    registry.load_collection_systems();
    registry
}

fn registry(dir: &TempDir) -> CollectionRegistry {
    registry_with(dir, CollectionSettings::default(), StaticTheme::default())
}

fn find(registry: &CollectionRegistry, name: &str) -> Arc<Game> {
    registry
        .corpus()
        .systems
        .iter()
        .flat_map(|s| s.owned_games())
        .find(|g| g.name() == name)
        .unwrap()
}

fn names(system: &CollectionSystem) -> Vec<String> {
    system.items().iter().map(|i| i.name().to_string()).collect()
}

#[test]
fn strip_parenthesis_drops_tags() {
    assert_eq!(strip_parenthesis("Super Mario World (USA) [!]"), "Super Mario World");
    assert_eq!(strip_parenthesis("Tetris"), "Tetris");
    assert_eq!(strip_parenthesis("Game (Rev 1) Deluxe"), "Game Deluxe");
}

#[test]
fn refresh_entry_follows_wanted_membership() {
    let g = game("snes", "Axelay", GameMetadata::default());
    let mut entry = CollectionEntry::new(
        CollectionDecl::custom("Mine"),
        CollectionKind::StaticCustom,
        SortOrder::default(),
    );
    assert_eq!(refresh_entry(&mut entry, &g, None), Membership::Unchanged);
    assert_eq!(refresh_entry(&mut entry, &g, Some(true)), Membership::Added);
    assert_eq!(refresh_entry(&mut entry, &g, None), Membership::Reindexed);
    assert_eq!(refresh_entry(&mut entry, &g, Some(true)), Membership::Reindexed);
    assert_eq!(refresh_entry(&mut entry, &g, Some(false)), Membership::Removed);
    assert!(entry.system.is_empty());
}

#[test]
fn load_creates_every_auto_collection_unpopulated() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);
    let autos = registry.decls().iter().filter(|d| !d.is_custom).count();
    assert_eq!(registry.auto_collections().count(), autos);
    assert!(registry.auto_collections().all(|e| !e.populated && !e.enabled));
    assert_eq!(registry.custom_collections().count(), 0);
}

#[test]
fn enabled_lists_come_from_settings() {
    let dir = TempDir::new().unwrap();
    let settings = CollectionSettings {
        auto_collections: "favorites,all".into(),
        ..CollectionSettings::default()
    };
    let registry = registry_with(&dir, settings, StaticTheme::default());
    let enabled: Vec<_> = registry
        .auto_collections()
        .filter(|e| e.enabled)
        .map(|e| e.name().to_string())
        .collect();
    assert_eq!(enabled, vec!["all", "favorites"]);
}

#[test]
fn set_collection_enabled_updates_settings() {
    let dir = TempDir::new().unwrap();
    let mut registry = registry(&dir);
    registry.set_collection_enabled("recent", true).unwrap();
    registry.set_collection_enabled("all", true).unwrap();
    assert_eq!(registry.settings().enabled_auto(), vec!["all", "recent"]);

    registry.set_collection_enabled("all", false).unwrap();
    assert_eq!(registry.settings().enabled_auto(), vec!["recent"]);
    assert!(matches!(
        registry.set_collection_enabled("nope", true),
        Err(CollectionError::UnknownCollection(_))
    ));
}

#[test]
fn new_names_are_sanitised_and_deduplicated() {
    let dir = TempDir::new().unwrap();
    let mut registry = registry(&dir);

    assert_eq!(registry.valid_new_collection_name("My Collection!"), "My Collection");
    assert_eq!(registry.create_custom_collection("My Collection!").unwrap(), "My Collection");
    assert_eq!(registry.valid_new_collection_name("My Collection"), "My Collection (1)");
    assert_eq!(registry.create_custom_collection("My Collection").unwrap(), "My Collection (1)");
    assert_eq!(registry.valid_new_collection_name("My Collection"), "My Collection (2)");

    assert_eq!(registry.valid_new_collection_name("???"), DEFAULT_COLLECTION_NAME);
    assert_eq!(registry.valid_new_collection_name("snes"), "snes (1)");
    assert_eq!(registry.valid_new_collection_name("favorites"), "favorites (1)");
    assert_eq!(registry.valid_new_collection_name("Favorites"), "Favorites (1)");
    assert_eq!(registry.valid_new_collection_name("SNES"), "SNES (1)");
    assert_eq!(registry.valid_new_collection_name("mine"), "mine");
    registry.create_custom_collection("Mine").unwrap();
    assert_eq!(registry.valid_new_collection_name("mine"), "mine (1)");
    assert_eq!(registry.valid_new_collection_name_from("Fresh", 3), "Fresh (3)");
}

#[test]
fn toggle_adds_then_removes_from_static_collection() {
    let dir = TempDir::new().unwrap();
    let mut registry = registry(&dir);
    registry.create_custom_collection("Mine").unwrap();
    let mario = find(&registry, "Super Mario World (USA)");
    let mut views = RecordingViews::default();

    assert!(registry.toggle_game_in_collection(&mario, "Mine", &mut views));
    assert!(registry.is_in_custom_collection(&mario, "Mine"));
    assert!(registry.collection("Mine").unwrap().needs_save);
    assert_eq!(
        registry.collection("Mine").unwrap().system.folder.description,
        "This collection contains 1 game, including :\n- Super Mario World (USA)"
    );

    assert!(registry.toggle_game_in_collection(&mario, "Mine", &mut views));
    assert!(!registry.is_in_custom_collection(&mario, "Mine"));
    assert_eq!(
        views.messages,
        vec![
            "Added 'Super Mario World' to 'MINE'",
            "Removed 'Super Mario World' from 'MINE'",
        ]
    );
    assert_eq!(views.detached.len(), 1);
}

#[test]
fn toggle_rejects_unknown_and_dynamic_collections() {
    let dir = TempDir::new().unwrap();
    let mut registry = registry(&dir);
    registry.create_dynamic_collection("Smart", None).unwrap();
    let mario = find(&registry, "Super Mario World (USA)");
    let mut views = RecordingViews::default();

    assert!(!registry.toggle_game_in_collection(&mario, "Nope", &mut views));
    assert!(!registry.toggle_game_in_collection(&mario, "Smart", &mut views));
    assert!(views.messages.is_empty());
}

#[test]
fn toggling_favorite_updates_favorites_collection() {
    let dir = TempDir::new().unwrap();
    let mut registry = registry(&dir);
    registry.populate_collection("favorites").unwrap();
    let sonic = find(&registry, "Sonic");
    let mut views = RecordingViews::default();

    assert!(registry.toggle_game_in_collection(&sonic, "favorites", &mut views));
    assert!(sonic.is_favorite());
    assert_eq!(names(&registry.collection("favorites").unwrap().system), vec!["Sonic"]);
    assert_eq!(views.messages, vec!["Added 'Sonic' to 'FAVORITES'"]);

    assert!(registry.toggle_game_in_collection(&sonic, "favorites", &mut views));
    assert!(!sonic.is_favorite());
    assert!(registry.collection("favorites").unwrap().system.is_empty());
    assert!(views.events.contains(&(
        ChangeTarget::Entry {
            system: "favorites".into(),
            key: sonic.path().to_path_buf(),
        },
        ChangeKind::Removed,
    )));
}

#[test]
fn refresh_adds_played_game_to_last_played() {
    let dir = TempDir::new().unwrap();
    let mut registry = registry(&dir);
    registry.populate_collection("recent").unwrap();
    registry.populate_collection("neverplayed").unwrap();
    assert!(registry.collection("recent").unwrap().system.is_empty());
    assert_eq!(registry.collection("neverplayed").unwrap().system.len(), 5);

    let columns = find(&registry, "Columns");
    columns.mark_played(
        chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
    );
    let mut views = RecordingViews::default();
    registry.refresh_collection_systems(&columns, &mut views);

    assert_eq!(names(&registry.collection("recent").unwrap().system), vec!["Columns"]);
    assert_eq!(registry.collection("neverplayed").unwrap().system.len(), 4);
    assert!(views.events.contains(&(
        ChangeTarget::Root {
            system: "recent".into()
        },
        ChangeKind::MetadataChanged,
    )));
}

#[test]
fn refresh_skips_unpopulated_collections() {
    let dir = TempDir::new().unwrap();
    let mut registry = registry(&dir);
    let sonic = find(&registry, "Sonic");
    sonic.toggle_favorite();
    let mut views = RecordingViews::default();
    registry.refresh_collection_systems(&sonic, &mut views);
    assert!(views.events.is_empty());
    assert!(!registry.collection("favorites").unwrap().populated);
}

#[test]
fn custom_collection_named_like_favorites_keeps_its_own_members() {
    let dir = TempDir::new().unwrap();
    let folder = dir.path().join("collections");
    std::fs::create_dir_all(&folder).unwrap();
    std::fs::write(
        folder.join("custom-favorites.cfg"),
        "./snes/Super Mario World (USA).rom\n",
    )
    .unwrap();
    let mut registry = registry(&dir);
    let sonic = find(&registry, "Sonic");
    let mario = find(&registry, "Super Mario World (USA)");

    assert!(registry.toggle_game_in_collection(&sonic, "favorites", &mut NullViews));
    assert!(registry.is_in_custom_collection(&sonic, "favorites"));
    assert!(registry.is_in_custom_collection(&mario, "favorites"));
    assert!(!sonic.is_favorite());
}

#[test]
fn undecodable_line_does_not_cost_the_other_entries() {
    let dir = TempDir::new().unwrap();
    let folder = dir.path().join("collections");
    std::fs::create_dir_all(&folder).unwrap();
    let list = folder.join("custom-Mine.cfg");
    std::fs::write(
        &list,
        b"./snes/Super Mario World (USA).rom\n./nes/Caf\xE9.rom\n./nes/Mega Man.rom\n",
    )
    .unwrap();
    let mut registry = registry(&dir);
    registry.populate_collection("Mine").unwrap();
    assert_eq!(
        names(&registry.collection("Mine").unwrap().system),
        vec!["Mega Man", "Super Mario World (USA)"]
    );

    let sonic = find(&registry, "Sonic");
    assert!(registry.toggle_game_in_collection(&sonic, "Mine", &mut NullViews));
    registry.save_custom_collection("Mine").unwrap();
    let saved = std::fs::read_to_string(&list).unwrap();
    assert!(saved.contains("./snes/Super Mario World (USA).rom\n"));
    assert!(saved.contains("./nes/Mega Man.rom\n"));
    assert!(saved.contains("./megadrive/Sonic.rom\n"));
}

#[test]
fn unreadable_list_is_never_overwritten() {
    let dir = TempDir::new().unwrap();
    let folder = dir.path().join("collections");
    std::fs::create_dir_all(&folder).unwrap();
    let list = folder.join("custom-Mine.cfg");
    std::fs::write(&list, "./nes/Mega Man.rom\n").unwrap();
    let mut registry = registry(&dir);

    // Replace the list with something that exists but cannot be read.
    std::fs::remove_file(&list).unwrap();
    std::fs::create_dir(&list).unwrap();

    let sonic = find(&registry, "Sonic");
    assert!(registry.toggle_game_in_collection(&sonic, "Mine", &mut NullViews));
    assert!(registry.collection("Mine").unwrap().load_failed);
    assert!(matches!(
        registry.save_custom_collection("Mine"),
        Err(CollectionError::UnreadableList(_))
    ));
    assert!(list.is_dir());
}

#[test]
fn delete_collection_files_removes_game_everywhere() {
    let dir = TempDir::new().unwrap();
    let mut registry = registry(&dir);
    registry.populate_collection("all").unwrap();
    registry.create_custom_collection("Mine").unwrap();
    let mario = find(&registry, "Super Mario World (USA)");
    registry.toggle_game_in_collection(&mario, "Mine", &mut NullViews);
    registry.save_custom_collection("Mine").unwrap();
    assert!(!registry.collection("Mine").unwrap().needs_save);

    let mut views = RecordingViews::default();
    registry.delete_collection_files(&mario, &mut views);

    assert!(!registry.collection("all").unwrap().system.contains(mario.path()));
    assert!(!registry.is_in_custom_collection(&mario, "Mine"));
    assert!(registry.collection("Mine").unwrap().needs_save);
    let mut detached: Vec<_> = views.detached.iter().map(|(s, _)| s.as_str()).collect();
    detached.sort();
    assert_eq!(detached, vec!["Mine", "all"]);
}

#[test]
fn genre_collection_without_theme_support_is_groupable() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);
    let genre = registry
        .auto_collections()
        .find(|e| e.decl.kind.is_genre_or_subsystem())
        .unwrap();
    assert!(registry.is_groupable(genre));
    assert!(!registry.gets_own_slot(genre));

    let themed = registry_with(
        &dir,
        CollectionSettings::default(),
        StaticTheme::new([genre.decl.theme_folder.clone()]),
    );
    let genre = themed.collection(genre.name()).unwrap();
    assert!(!themed.is_groupable(genre));
    assert!(themed.gets_own_slot(genre));

    let favorites = registry.collection("favorites").unwrap();
    assert!(!registry.is_groupable(favorites));
}

#[test]
fn bundled_collection_views_through_bundle() {
    let dir = TempDir::new().unwrap();
    let mut registry = registry(&dir);
    registry.create_custom_collection("Mine").unwrap();
    registry.set_collection_enabled("Mine", true).unwrap();
    let mario = find(&registry, "Super Mario World (USA)");
    registry.toggle_game_in_collection(&mario, "Mine", &mut NullViews);

    let mut list = Vec::new();
    registry.update_systems_list(&mut list, &mut NullViews);

    assert_eq!(registry.bundled_collections(), ["Mine".to_string()]);
    assert_eq!(registry.system_to_view("Mine").unwrap().name, CUSTOM_COLLECTIONS_NAME);
    assert_eq!(registry.bundle().index().count(Facet::Genre, "PLATFORM"), 1);

    let sonic = find(&registry, "Sonic");
    registry.toggle_game_in_collection(&sonic, "Mine", &mut NullViews);
    assert_eq!(registry.bundle().index().count(Facet::Genre, "PLATFORM"), 2);
}

#[test]
fn theme_compatibility_checks() {
    let dir = TempDir::new().unwrap();
    let theme = StaticTheme::new(["snes", "auto-allgames", "extra-folder", "Mine"]);
    let mut registry = registry_with(&dir, CollectionSettings::default(), theme);
    registry.create_custom_collection("Mine").unwrap();

    assert_eq!(registry.unused_theme_folders(), vec!["extra-folder"]);
    assert!(!registry.is_theme_generic_collection_compatible(false));
    assert!(!registry.is_theme_generic_collection_compatible(true));
    assert!(registry.is_theme_custom_collection_compatible(&["Mine"]));
    assert!(!registry.is_theme_custom_collection_compatible(&["Mine", "Other"]));

    let theme = StaticTheme {
        default_theme: true,
        ..StaticTheme::default()
    };
    let registry = registry_with(&dir, CollectionSettings::default(), theme);
    assert!(registry.is_theme_custom_collection_compatible(&["Other"]));
}

#[test]
fn arcade_and_all_games_populate_on_demand() {
    let dir = TempDir::new().unwrap();
    let mut registry = registry(&dir);
    assert_eq!(registry.all_games().unwrap().len(), 5);
    assert!(registry.arcade_collection().unwrap().is_empty());
    assert!(registry.collection("arcade").unwrap().populated);
}

#[test]
fn cancel_only_applies_to_the_batch_in_flight() {
    let dir = TempDir::new().unwrap();
    let settings = CollectionSettings {
        auto_collections: "all,favorites,neverplayed".into(),
        threaded_loading: true,
        ..CollectionSettings::default()
    };
    let mut registry = registry_with(&dir, settings, StaticTheme::default());
    registry.cancel_token().store(true, Ordering::Relaxed);

    let mut list = Vec::new();
    registry.update_systems_list(&mut list, &mut NullViews);

    assert!(!registry.cancel_token().load(Ordering::Relaxed));
    assert!(registry.auto_collections().filter(|e| e.enabled).all(|e| e.populated));
    assert_eq!(registry.collection("neverplayed").unwrap().system.len(), 5);
}
