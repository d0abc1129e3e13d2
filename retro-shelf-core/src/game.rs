//! Game records as loaded from a system's gamelist.
//!
//! A [`Game`] is shared as `Arc<Game>` between the physical system tree and
//! any collection that references it. The identity fields (path, name,
//! owning system) are immutable; the metadata sits behind a lock so a
//! favorite toggle or a play-count bump can be applied from anywhere that
//! holds a reference.

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDateTime;

/// Editable per-game metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameMetadata {
    pub favorite: bool,
    pub hidden: bool,
    pub kid_game: bool,
    pub play_count: u32,
    pub last_played: Option<NaiveDateTime>,
    /// Player count as written by scrapers: "1", "1-4", "2+".
    pub players: Option<String>,
    /// Free-form genre label, e.g. "Shooter / Vertical".
    pub genre: Option<String>,
    /// Resolved ids from the genre table (see [`crate::genre`]).
    pub genre_ids: Vec<u32>,
    /// Arcade board short name, e.g. "cps2".
    pub arcade_system_name: Option<String>,
    /// Rating from 0.0 to 1.0
    pub rating: Option<f32>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    /// Release date in YYYYMMDD[THHMMSS] format
    pub release_date: Option<String>,
    /// Comma-separated language codes, e.g. "en,fr".
    pub language: Option<String>,
    /// Comma-separated region codes, e.g. "us,eu".
    pub region: Option<String>,
    pub achievements: bool,
    pub vertical: bool,
    pub lightgun: bool,
    pub wheel: bool,
    pub image: Option<PathBuf>,
    pub thumbnail: Option<PathBuf>,
    pub video: Option<PathBuf>,
}

impl GameMetadata {
    pub fn is_played(&self) -> bool {
        self.play_count > 0
    }
}

/// A single game entry owned by one physical system.
#[derive(Debug)]
pub struct Game {
    path: PathBuf,
    name: String,
    system: String,
    metadata: RwLock<GameMetadata>,
}

impl Game {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, system: impl Into<String>) -> Self {
        Self::with_metadata(path, name, system, GameMetadata::default())
    }

    pub fn with_metadata(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        system: impl Into<String>,
        metadata: GameMetadata,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            system: system.into(),
            metadata: RwLock::new(metadata),
        }
    }

    /// Absolute path of the game file. This is the game's identity key.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short name of the system that owns this game.
    pub fn system_name(&self) -> &str {
        &self.system
    }

    /// Lower-cased extension including the leading dot (".zip"), or empty.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default()
    }

    /// Read access to the metadata. A poisoned lock still yields the data.
    pub fn metadata(&self) -> RwLockReadGuard<'_, GameMetadata> {
        self.metadata.read().unwrap_or_else(|e| e.into_inner())
    }

    fn metadata_mut(&self) -> RwLockWriteGuard<'_, GameMetadata> {
        self.metadata.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply an edit to the metadata and return whatever the closure returns.
    pub fn update_metadata<R>(&self, f: impl FnOnce(&mut GameMetadata) -> R) -> R {
        f(&mut self.metadata_mut())
    }

    pub fn is_favorite(&self) -> bool {
        self.metadata().favorite
    }

    /// Flip the favorite flag, returning the new value.
    pub fn toggle_favorite(&self) -> bool {
        self.update_metadata(|m| {
            m.favorite = !m.favorite;
            m.favorite
        })
    }

    /// Record a launch: bump the play count and stamp the time.
    pub fn mark_played(&self, at: NaiveDateTime) {
        self.update_metadata(|m| {
            m.play_count += 1;
            m.last_played = Some(at);
        });
    }
}
