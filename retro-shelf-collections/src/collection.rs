//! Virtual systems that hold collection members.
//!
//! A collection never owns games. Each member is a [`CollectionItem`]
//! holding a `Weak<Game>` back to the record in its physical system, plus
//! the identity fields needed to find, sort and un-index it even after the
//! source has gone away.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use retro_shelf_core::{Game, SystemMetadata};
use serde::{Deserialize, Serialize};

use crate::decl::CollectionDecl;
use crate::dynamic_filter::DynamicFilter;
use crate::facet::{FacetIndex, FacetKeys};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    FilenameAscending,
    FilenameDescending,
    RatingAscending,
    RatingDescending,
    ReleaseDateAscending,
    ReleaseDateDescending,
    LastPlayedAscending,
    LastPlayedDescending,
    PlayCountDescending,
    SystemAscending,
}

impl SortOrder {
    pub fn compare(&self, a: &Game, b: &Game) -> Ordering {
        let by_name = || a.name().to_uppercase().cmp(&b.name().to_uppercase());
        let (ma, mb) = (a.metadata(), b.metadata());
        let primary = match self {
            Self::FilenameAscending => Ordering::Equal,
            Self::FilenameDescending => return by_name().reverse(),
            Self::RatingAscending => cmp_rating(ma.rating, mb.rating),
            Self::RatingDescending => cmp_rating(mb.rating, ma.rating),
            Self::ReleaseDateAscending => ma.release_date.cmp(&mb.release_date),
            Self::ReleaseDateDescending => mb.release_date.cmp(&ma.release_date),
            Self::LastPlayedAscending => ma.last_played.cmp(&mb.last_played),
            Self::LastPlayedDescending => mb.last_played.cmp(&ma.last_played),
            Self::PlayCountDescending => mb.play_count.cmp(&ma.play_count),
            Self::SystemAscending => a.system_name().cmp(b.system_name()),
        };
        primary.then_with(by_name)
    }
}

fn cmp_rating(a: Option<f32>, b: Option<f32>) -> Ordering {
    a.unwrap_or(0.0).total_cmp(&b.unwrap_or(0.0))
}

/// A non-owning proxy for a game inside a collection.
#[derive(Debug, Clone)]
pub struct CollectionItem {
    source: Weak<Game>,
    key: PathBuf,
    name: String,
    system: String,
    facet_keys: FacetKeys,
}

impl CollectionItem {
    pub fn new(game: &Arc<Game>) -> Self {
        Self {
            source: Arc::downgrade(game),
            key: game.path().to_path_buf(),
            name: game.name().to_string(),
            system: game.system_name().to_string(),
            facet_keys: FacetKeys::of(game),
        }
    }

    /// The source game, if it is still loaded.
    pub fn source(&self) -> Option<Arc<Game>> {
        self.source.upgrade()
    }

    pub fn key(&self) -> &Path {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system_name(&self) -> &str {
        &self.system
    }

    /// Keys this item is currently counted under in its collection's index.
    pub fn facet_keys(&self) -> &FacetKeys {
        &self.facet_keys
    }
}

/// Roll-up metadata shown on a collection's root folder.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderMetadata {
    pub description: String,
    pub rating: f32,
    pub players: u32,
    pub release_date: Option<String>,
    pub developer: String,
    pub genre: String,
    pub image: Option<PathBuf>,
    pub thumbnail: Option<PathBuf>,
    pub video: Option<PathBuf>,
}

impl Default for FolderMetadata {
    fn default() -> Self {
        Self {
            description: "This collection is empty.".to_string(),
            rating: 0.0,
            players: 1,
            release_date: None,
            developer: "None".to_string(),
            genre: "None".to_string(),
            image: None,
            thumbnail: None,
            video: None,
        }
    }
}

/// The virtual system a collection is browsed as.
#[derive(Debug, Clone)]
pub struct CollectionSystem {
    pub name: String,
    pub full_name: String,
    pub theme_folder: String,
    pub metadata: SystemMetadata,
    pub folder: FolderMetadata,
    sort_order: SortOrder,
    items: Vec<CollectionItem>,
    members: HashSet<PathBuf>,
    index: FacetIndex,
}

impl CollectionSystem {
    pub fn new(
        name: impl Into<String>,
        full_name: impl Into<String>,
        theme_folder: impl Into<String>,
        sort_order: SortOrder,
    ) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            theme_folder: theme_folder.into(),
            metadata: SystemMetadata {
                manufacturer: "Collections".to_string(),
                hardware_type: "collection".to_string(),
                release_year: None,
                group: None,
            },
            folder: FolderMetadata::default(),
            sort_order,
            items: Vec::new(),
            members: HashSet::new(),
            index: FacetIndex::new(),
        }
    }

    pub fn from_decl(decl: &CollectionDecl, sort_order: SortOrder) -> Self {
        let mut system = Self::new(&decl.name, &decl.long_name, &decl.theme_folder, sort_order);
        system.metadata.hardware_type = if decl.is_custom {
            "custom collection".to_string()
        } else {
            "auto collection".to_string()
        };
        system
    }

    pub fn items(&self) -> &[CollectionItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, key: &Path) -> bool {
        self.members.contains(key)
    }

    pub fn position(&self, key: &Path) -> Option<usize> {
        self.items.iter().position(|i| i.key() == key)
    }

    /// Live source games, in collection order.
    pub fn games(&self) -> Vec<Arc<Game>> {
        self.items.iter().filter_map(CollectionItem::source).collect()
    }

    /// Append a game and index it. Returns `false` if it was already a member.
    pub fn add(&mut self, game: &Arc<Game>) -> bool {
        if !self.members.insert(game.path().to_path_buf()) {
            return false;
        }
        let item = CollectionItem::new(game);
        self.index.add_keys(item.facet_keys());
        self.items.push(item);
        true
    }

    /// Remove a member and un-index it.
    pub fn remove(&mut self, key: &Path) -> Option<CollectionItem> {
        let pos = self.position(key)?;
        let item = self.items.remove(pos);
        self.members.remove(item.key());
        self.index.remove_keys(item.facet_keys());
        Some(item)
    }

    /// Re-index a member whose source metadata changed. Returns `false`
    /// if the game is not a member.
    pub fn reindex(&mut self, game: &Arc<Game>) -> bool {
        let Some(pos) = self.position(game.path()) else {
            return false;
        };
        let fresh = CollectionItem::new(game);
        self.index.remove_keys(self.items[pos].facet_keys());
        self.index.add_keys(fresh.facet_keys());
        self.items[pos] = fresh;
        true
    }

    /// Drop every member past `max`, un-indexing them.
    pub fn truncate(&mut self, max: usize) {
        if self.items.len() <= max {
            return;
        }
        for item in self.items.drain(max..) {
            self.members.remove(item.key());
            self.index.remove_keys(item.facet_keys());
        }
    }

    /// Remove all members and reset the index.
    pub fn clear(&mut self) {
        self.items.clear();
        self.members.clear();
        self.index.reset_index();
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
    }

    /// Sort members by the current order. Members whose source is gone sink to the end.
    pub fn sort(&mut self) {
        let order = self.sort_order;
        self.items.sort_by(|a, b| match (a.source(), b.source()) {
            (Some(x), Some(y)) => order.compare(&x, &y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }

    /// A uniformly random live member.
    pub fn random_game(&self) -> Option<Arc<Game>> {
        if self.items.is_empty() {
            return None;
        }
        self.items[rand::random_range(0..self.items.len())].source()
    }

    pub fn index(&self) -> &FacetIndex {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut FacetIndex {
        &mut self.index
    }
}

/// How a collection's membership is determined.
#[derive(Debug, Clone)]
pub enum CollectionKind {
    /// Computed from a built-in predicate over the corpus.
    Auto,
    /// An explicit, user-edited list persisted as `custom-<name>.cfg`.
    StaticCustom,
    /// Recomputed from a saved filter definition.
    Dynamic(Box<DynamicFilter>),
}

/// Runtime record for one collection.
#[derive(Debug, Clone)]
pub struct CollectionEntry {
    pub system: CollectionSystem,
    pub decl: CollectionDecl,
    pub kind: CollectionKind,
    pub enabled: bool,
    pub populated: bool,
    pub needs_save: bool,
    /// The static list exists but could not be read. Saving is refused so
    /// the file is never replaced by a partial member set.
    pub load_failed: bool,
}

impl CollectionEntry {
    pub fn new(decl: CollectionDecl, kind: CollectionKind, sort_order: SortOrder) -> Self {
        Self {
            system: CollectionSystem::from_decl(&decl, sort_order),
            decl,
            kind,
            enabled: false,
            populated: false,
            needs_save: false,
            load_failed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn is_custom(&self) -> bool {
        !matches!(self.kind, CollectionKind::Auto)
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, CollectionKind::Dynamic(_))
    }

    pub fn filter(&self) -> Option<&DynamicFilter> {
        match &self.kind {
            CollectionKind::Dynamic(filter) => Some(&**filter),
            _ => None,
        }
    }

    pub fn filter_mut(&mut self) -> Option<&mut DynamicFilter> {
        match &mut self.kind {
            CollectionKind::Dynamic(filter) => Some(&mut **filter),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "tests/collection_tests.rs"]
mod tests;
