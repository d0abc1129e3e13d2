//! Physical systems and their game trees.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::game::Game;

/// A node in a system's game tree.
#[derive(Debug, Clone)]
pub enum GameNode {
    Game(Arc<Game>),
    Folder(GameFolder),
}

/// A folder of games, possibly nested.
#[derive(Debug, Clone, Default)]
pub struct GameFolder {
    pub name: String,
    pub path: PathBuf,
    pub children: Vec<GameNode>,
}

impl GameFolder {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            children: Vec::new(),
        }
    }

    pub fn push_game(&mut self, game: Arc<Game>) {
        self.children.push(GameNode::Game(game));
    }

    pub fn push_folder(&mut self, folder: GameFolder) {
        self.children.push(GameNode::Folder(folder));
    }

    /// Every game below this folder, depth-first, in tree order.
    pub fn games_recursive(&self) -> Vec<Arc<Game>> {
        let mut out = Vec::new();
        self.collect_games(&mut out);
        out
    }

    fn collect_games(&self, out: &mut Vec<Arc<Game>>) {
        for child in &self.children {
            match child {
                GameNode::Game(g) => out.push(Arc::clone(g)),
                GameNode::Folder(f) => f.collect_games(out),
            }
        }
    }
}

/// Descriptive data used when ordering the system list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemMetadata {
    pub manufacturer: String,
    /// "console", "portable", "computer", "arcade", ...
    pub hardware_type: String,
    pub release_year: Option<u16>,
    /// Subgroup used by the "subgroup" system ordering.
    pub group: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemFlags {
    /// A real game system (as opposed to a tool launcher or media browser).
    pub game_system: bool,
    /// A grouping system whose tree also contains games owned by other systems.
    pub group: bool,
    pub arcade: bool,
    /// Platform explicitly excluded from automatic collections.
    pub ignored_platform: bool,
}

impl Default for SystemFlags {
    fn default() -> Self {
        Self {
            game_system: true,
            group: false,
            arcade: false,
            ignored_platform: false,
        }
    }
}

/// One physical system with its loaded game tree.
#[derive(Debug, Clone)]
pub struct GameSystem {
    pub name: String,
    pub full_name: String,
    pub theme_folder: String,
    pub metadata: SystemMetadata,
    pub flags: SystemFlags,
    pub root: GameFolder,
}

impl GameSystem {
    pub fn new(name: impl Into<String>, full_name: impl Into<String>, root_path: impl AsRef<Path>) -> Self {
        let name = name.into();
        Self {
            theme_folder: name.clone(),
            full_name: full_name.into(),
            metadata: SystemMetadata::default(),
            flags: SystemFlags::default(),
            root: GameFolder::new(name.clone(), root_path.as_ref()),
            name,
        }
    }

    pub fn with_metadata(mut self, metadata: SystemMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_flags(mut self, flags: SystemFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_theme_folder(mut self, folder: impl Into<String>) -> Self {
        self.theme_folder = folder.into();
        self
    }

    /// All games this system owns. Group systems skip games that belong to
    /// their member systems.
    pub fn owned_games(&self) -> Vec<Arc<Game>> {
        let games = self.root.games_recursive();
        if !self.flags.group {
            return games;
        }
        games
            .into_iter()
            .filter(|g| g.system_name() == self.name)
            .collect()
    }
}

/// The ordered set of physical systems loaded by the frontend.
#[derive(Debug, Clone, Default)]
pub struct GameCorpus {
    pub systems: Vec<Arc<GameSystem>>,
}

impl GameCorpus {
    pub fn new(systems: Vec<GameSystem>) -> Self {
        Self {
            systems: systems.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn find(&self, name: &str) -> Option<&Arc<GameSystem>> {
        self.systems.iter().find(|s| s.name == name)
    }

    /// The system that owns `game`, if it is part of this corpus.
    pub fn system_of(&self, game: &Game) -> Option<&Arc<GameSystem>> {
        self.find(game.system_name())
    }

    /// Look a game up by its absolute path.
    pub fn find_game(&self, path: &Path) -> Option<Arc<Game>> {
        self.systems
            .iter()
            .flat_map(|s| s.root.games_recursive())
            .find(|g| g.path() == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn games_recursive_walks_nested_folders() {
        let mut root = GameFolder::new("snes", "/roms/snes");
        root.push_game(Arc::new(Game::new("/roms/snes/a.sfc", "A", "snes")));
        let mut sub = GameFolder::new("hacks", "/roms/snes/hacks");
        sub.push_game(Arc::new(Game::new("/roms/snes/hacks/b.sfc", "B", "snes")));
        root.push_folder(sub);
        root.push_game(Arc::new(Game::new("/roms/snes/c.sfc", "C", "snes")));

        let names: Vec<_> = root.games_recursive().iter().map(|g| g.name().to_string()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn group_system_only_owns_its_own_games() {
        let mut system = GameSystem::new("mame", "MAME", "/roms/mame").with_flags(SystemFlags {
            group: true,
            ..SystemFlags::default()
        });
        system
            .root
            .push_game(Arc::new(Game::new("/roms/mame/a.zip", "A", "mame")));
        system
            .root
            .push_game(Arc::new(Game::new("/roms/fbneo/b.zip", "B", "fbneo")));
        let owned = system.owned_games();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].name(), "A");
    }

    #[test]
    fn corpus_finds_games_by_path() {
        let mut system = GameSystem::new("nes", "NES", "/roms/nes");
        system
            .root
            .push_game(Arc::new(Game::new("/roms/nes/Contra.nes", "Contra", "nes")));
        let corpus = GameCorpus::new(vec![system]);
        assert!(corpus.find_game(Path::new("/roms/nes/Contra.nes")).is_some());
        assert!(corpus.find_game(Path::new("/roms/nes/Missing.nes")).is_none());
        assert!(corpus.find("nes").is_some());
    }
}
