#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use retro_shelf_collections::*;
use retro_shelf_core::{Game, GameCorpus, GameMetadata, GameSystem, SystemFlags};
use tempfile::TempDir;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Views implementation that records every call.
#[derive(Debug, Default)]
pub struct RecordingViews {
    pub events: Vec<(ChangeTarget, ChangeKind)>,
    pub repopulated: Vec<String>,
    pub removed: Vec<String>,
    pub messages: Vec<String>,
}

impl CollectionViews for RecordingViews {
    fn on_changed(&mut self, target: ChangeTarget, kind: ChangeKind) {
        self.events.push((target, kind));
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

fn genre(name: &str) -> GameMetadata {
    GameMetadata {
        genre: Some(name.to_string()),
        ..Default::default()
    }
}

fn push(system: &mut GameSystem, root: &str, file: &str, name: &str, meta: GameMetadata) {
    let path = Path::new(root).join(&system.name).join(file);
    let game = Game::with_metadata(path, name, system.name.clone(), meta);
    system.root.push_game(Arc::new(game));
}

/// Three consoles and a configuration system, all below `root`.
pub fn corpus_at(root: &str) -> Arc<GameCorpus> {
    let mut snes = GameSystem::new("snes", "Super Nintendo", Path::new(root).join("snes"));
    push(&mut snes, root, "Super Mario World.sfc", "Super Mario World", genre("Platform"));
    push(&mut snes, root, "F-Zero.sfc", "F-Zero", genre("Racing"));

    let mut megadrive = GameSystem::new("megadrive", "Mega Drive", Path::new(root).join("megadrive"));
    push(&mut megadrive, root, "Sonic.md", "Sonic", genre("Platform"));
    push(
        &mut megadrive,
        root,
        "Streets of Rage.md",
        "Streets of Rage",
        GameMetadata {
            players: Some("1-2".into()),
            ..genre("Beat'em Up")
        },
    );

    let mut nes = GameSystem::new("nes", "Nintendo", Path::new(root).join("nes"));
    push(&mut nes, root, "Mega Man.nes", "Mega Man", genre("Platform"));

    let mut retropie = GameSystem::new("retropie", "RetroPie", Path::new(root).join("retropie"))
        .with_flags(SystemFlags {
            game_system: false,
            ..SystemFlags::default()
        });
    push(&mut retropie, root, "Setup.sh", "Setup", GameMetadata::default());

    Arc::new(GameCorpus::new(vec![snes, megadrive, nes, retropie]))
}

pub fn corpus() -> Arc<GameCorpus> {
    corpus_at("/roms")
}

/// One system with `count` games, each played once a minute apart.
pub fn played_corpus(count: i64) -> Arc<GameCorpus> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    let mut nes = GameSystem::new("nes", "Nintendo", "/roms/nes");
    for i in 0..count {
        let name = format!("Game {i:02}");
        push(
            &mut nes,
            "/roms",
            &format!("{name}.nes"),
            &name,
            GameMetadata {
                play_count: 1,
                last_played: Some(base + chrono::Duration::minutes(i)),
                ..Default::default()
            },
        );
    }
    Arc::new(GameCorpus::new(vec![nes]))
}

pub fn collections_dir(dir: &TempDir) -> PathBuf {
    dir.path().join("collections")
}

pub fn paths(dir: &TempDir, root: &str) -> CollectionPaths {
    CollectionPaths::new(collections_dir(dir), root).with_home(None)
}

/// A loaded registry over `corpus` with an empty theme.
pub fn registry(
    dir: &TempDir,
    corpus: Arc<GameCorpus>,
    root: &str,
    settings: CollectionSettings,
) -> CollectionRegistry {
    registry_with_theme(dir, corpus, root, settings, StaticTheme::default())
}

pub fn registry_with_theme(
    dir: &TempDir,
    corpus: Arc<GameCorpus>,
    root: &str,
    settings: CollectionSettings,
    theme: StaticTheme,
) -> CollectionRegistry {
    let mut registry = CollectionRegistry::new(corpus, settings, paths(dir, root), Arc::new(theme));
    registry.load_collection_systems();
    registry
}

pub fn find(corpus: &GameCorpus, name: &str) -> Arc<Game> {
    corpus
        .systems
        .iter()
        .flat_map(|s| s.owned_games())
        .find(|g| g.name() == name)
        .unwrap()
}

pub fn member_names(system: &CollectionSystem) -> Vec<String> {
    system.items().iter().map(|i| i.name().to_string()).collect()
}

pub fn list_names(list: &[SystemListEntry]) -> Vec<String> {
    list.iter().map(|s| s.name.clone()).collect()
}
