//! The collection registry.
//!
//! [`CollectionRegistry`] owns every auto and custom collection, the bundle
//! that groups un-themed collections under a single carousel slot, and the
//! settings that say which collections are enabled. It is an ordinary owned
//! value: the frontend constructs one after loading the game corpus and
//! passes it by reference to whatever needs it.
//!
//! Membership is kept current through three entry points:
//! - [`refresh_collection_systems`](CollectionRegistry::refresh_collection_systems)
//!   after a game's metadata changed
//! - [`delete_collection_files`](CollectionRegistry::delete_collection_files)
//!   after a game was removed from disk
//! - [`toggle_game_in_collection`](CollectionRegistry::toggle_game_in_collection)
//!   for explicit user edits

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use retro_shelf_core::{Game, GameCorpus};

use crate::collection::{CollectionEntry, CollectionKind, CollectionSystem, SortOrder};
use crate::decl::{
    ALL_GAMES_NAME, CUSTOM_COLLECTIONS_NAME, CollectionDecl, CollectionType, FAVORITES_NAME,
    system_decls,
};
use crate::display::{
    SystemListEntry, float_legacy_system, sort_by_full_name, sort_system_list,
};
use crate::dynamic_filter::DynamicFilter;
use crate::error::CollectionError;
use crate::facet::FacetIndex;
use crate::metadata::update_collection_folder_metadata;
use crate::persistence::{CollectionPaths, StoredKind, write_static_list};
use crate::populate::{
    PopulateContext, auto_collection_includes, effective_sort_order, include_in_auto_collections,
    populate_auto_collection, populate_entry, sort_last_played,
};
use crate::settings::{CollectionSettings, SystemSortMode};
use crate::view::{ChangeKind, ChangeTarget, CollectionViews, ThemeProvider};
use crate::worker_pool::populate_batch;

/// Name given to a new collection whose requested name sanitises to nothing.
pub const DEFAULT_COLLECTION_NAME: &str = "New Collection";

/// How long add/remove notifications stay on screen.
const NOTIFICATION_DURATION: Duration = Duration::from_millis(4000);

/// Characters allowed in a collection name besides ASCII letters and digits.
const NAME_PUNCTUATION: &str = "-[]() ";

/// Filters to seed a new dynamic collection with.
#[derive(Debug, Clone, Copy)]
pub struct FilterSeed<'a> {
    /// The list the filters come from. Only a plain game system becomes the
    /// new collection's system selection.
    pub system: Option<&'a str>,
    pub index: &'a FacetIndex,
}

/// What a single-game refresh did to one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Membership {
    Added,
    Removed,
    Reindexed,
    Unchanged,
}

pub struct CollectionRegistry {
    corpus: Arc<GameCorpus>,
    settings: CollectionSettings,
    paths: CollectionPaths,
    theme: Arc<dyn ThemeProvider>,
    decls: Vec<CollectionDecl>,
    auto: BTreeMap<String, CollectionEntry>,
    custom: BTreeMap<String, CollectionEntry>,
    bundle: CollectionSystem,
    /// Collections currently shown inside the bundle, in display order.
    bundled: Vec<String>,
    cancel: Arc<AtomicBool>,
}

impl std::fmt::Debug for CollectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionRegistry")
            .field("paths", &self.paths)
            .field("auto", &self.auto.keys().collect::<Vec<_>>())
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .field("bundled", &self.bundled)
            .finish_non_exhaustive()
    }
}

impl CollectionRegistry {
    /// Create an empty registry. Call
    /// [`load_collection_systems`](Self::load_collection_systems) to fill it.
    pub fn new(
        corpus: Arc<GameCorpus>,
        settings: CollectionSettings,
        paths: CollectionPaths,
        theme: Arc<dyn ThemeProvider>,
    ) -> Self {
        let decls = system_decls();
        let bundle = decls
            .iter()
            .find(|d| d.name == CUSTOM_COLLECTIONS_NAME)
            .map(|d| CollectionSystem::from_decl(d, SortOrder::FilenameAscending))
            .unwrap_or_else(|| {
                CollectionSystem::new(
                    CUSTOM_COLLECTIONS_NAME,
                    CUSTOM_COLLECTIONS_NAME,
                    "custom-collections",
                    SortOrder::FilenameAscending,
                )
            });
        Self {
            corpus,
            settings,
            paths,
            theme,
            decls,
            auto: BTreeMap::new(),
            custom: BTreeMap::new(),
            bundle,
            bundled: Vec::new(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    // -- Loading -----------------------------------------------------------

    /// Create every auto collection (unpopulated), discover custom
    /// collections in the collections folder and apply the enabled lists.
    pub fn load_collection_systems(&mut self) {
        self.auto.clear();
        for decl in self.decls.iter().filter(|d| !d.is_custom) {
            let sort = effective_sort_order(decl, &self.settings);
            self.auto.insert(
                decl.name.clone(),
                CollectionEntry::new(decl.clone(), CollectionKind::Auto, sort),
            );
        }

        self.bundle.clear();
        self.bundled.clear();

        self.custom.clear();
        match self.paths.discover() {
            Ok(found) => {
                for (name, stored) in found {
                    self.insert_custom_entry(&name, stored);
                }
            }
            Err(e) => log::warn!(
                "Failed to scan collections folder {}: {}",
                self.paths.folder.display(),
                e
            ),
        }
        log::info!(
            "Loaded {} auto and {} custom collections",
            self.auto.len(),
            self.custom.len()
        );

        self.load_enabled_list_from_settings();
    }

    /// Re-apply the enabled auto and custom lists from settings.
    pub fn load_enabled_list_from_settings(&mut self) {
        let auto: HashSet<String> = self.settings.enabled_auto().into_iter().collect();
        for (name, entry) in &mut self.auto {
            entry.enabled = auto.contains(name);
        }
        let custom: HashSet<String> = self.settings.enabled_custom().into_iter().collect();
        for (name, entry) in &mut self.custom {
            entry.enabled = custom.contains(name);
        }
    }

    fn insert_custom_entry(&mut self, name: &str, stored: StoredKind) -> &mut CollectionEntry {
        let kind = match stored {
            StoredKind::Static => CollectionKind::StaticCustom,
            StoredKind::Dynamic => CollectionKind::Dynamic(Box::new(DynamicFilter::new(
                name,
                self.paths.dynamic_filter_path(name),
            ))),
        };
        let decl = CollectionDecl::custom(name);
        let sort = effective_sort_order(&decl, &self.settings);
        self.custom
            .entry(name.to_string())
            .or_insert_with(|| CollectionEntry::new(decl, kind, sort))
    }

    // -- Population --------------------------------------------------------

    fn ensure_all_games(&mut self) {
        if let Some(all) = self.auto.get_mut(ALL_GAMES_NAME)
            && !all.populated
        {
            let ctx = PopulateContext::new(
                Arc::clone(&self.corpus),
                self.settings.clone(),
                self.paths.clone(),
            );
            populate_auto_collection(all, &ctx);
        }
    }

    /// Inputs for populating any collection, with "all games" populated first.
    fn populate_context(&mut self) -> PopulateContext {
        self.ensure_all_games();
        match self.auto.get(ALL_GAMES_NAME) {
            Some(all) => PopulateContext::with_all_games(
                Arc::clone(&self.corpus),
                self.settings.clone(),
                self.paths.clone(),
                all.system.games(),
            ),
            None => PopulateContext::new(
                Arc::clone(&self.corpus),
                self.settings.clone(),
                self.paths.clone(),
            ),
        }
    }

    /// Populate a collection now, even if it already was.
    pub fn populate_collection(&mut self, name: &str) -> Result<(), CollectionError> {
        if self.entry(name).is_none() {
            return Err(CollectionError::unknown_collection(name));
        }
        let ctx = self.populate_context();
        if let Some(entry) = self.entry_mut(name) {
            populate_entry(entry, &ctx);
        }
        Ok(())
    }

    /// Populate a collection if it has not been yet. Returns `false` for an
    /// unknown name.
    fn ensure_populated(&mut self, name: &str) -> bool {
        let custom = !self.auto.contains_key(name);
        self.ensure_populated_in(custom, name)
    }

    fn ensure_populated_in(&mut self, custom: bool, name: &str) -> bool {
        match self.group(custom).get(name) {
            None => return false,
            Some(entry) if entry.populated => return true,
            Some(_) => {}
        }
        let ctx = self.populate_context();
        if let Some(entry) = self.group_mut(custom).get_mut(name) {
            populate_entry(entry, &ctx);
        }
        true
    }

    /// Populate every enabled, unpopulated collection of one group, on the
    /// worker pool when threaded loading is on and there is more than one.
    fn populate_enabled(&mut self, custom: bool) {
        let ctx = self.populate_context();
        let pending: Vec<String> = self
            .group(custom)
            .iter()
            .filter(|(_, e)| e.enabled && !e.populated)
            .map(|(name, _)| name.clone())
            .collect();
        if pending.is_empty() {
            return;
        }

        if self.settings.threaded_loading && pending.len() > 1 {
            let jobs: Vec<CollectionEntry> = pending
                .iter()
                .filter_map(|name| self.group(custom).get(name).cloned())
                .collect();
            let workers = self.settings.worker_count(jobs.len());
            self.cancel.store(false, Ordering::Relaxed);
            let done = populate_batch(
                jobs,
                Arc::new(ctx),
                workers,
                Arc::clone(&self.cancel),
                |done, total| log::debug!("Populating collections: {}/{}", done, total),
            );
            let group = self.group_mut(custom);
            for entry in done {
                group.insert(entry.name().to_string(), entry);
            }
            return;
        }

        for name in &pending {
            if let Some(entry) = self.group_mut(custom).get_mut(name) {
                populate_entry(entry, &ctx);
            }
        }
    }

    // -- Displayed system list ---------------------------------------------

    /// Rebuild the collection slots of the displayed system list.
    ///
    /// Previously injected collections are removed, then enabled custom
    /// collections, enabled auto collections and the bundle are added and
    /// the global ordering is applied. Calling this twice in a row yields
    /// the same list.
    pub fn update_systems_list(
        &mut self,
        list: &mut Vec<SystemListEntry>,
        views: &mut dyn CollectionViews,
    ) {
        list.retain(|s| !s.is_collection);
        self.bundle.clear();
        self.bundled.clear();

        self.populate_enabled(true);
        self.add_enabled_to_list(true, list);

        let mode = self.settings.sort_systems;
        if mode == SystemSortMode::Name {
            sort_by_full_name(list);
        }

        self.populate_enabled(false);
        self.add_enabled_to_list(false, list);

        if !self.bundled.is_empty() {
            list.push(SystemListEntry::from_collection(&self.bundle));
        }

        if !matches!(mode, SystemSortMode::Default | SystemSortMode::Name) {
            sort_system_list(list, mode);
        }
        float_legacy_system(list);

        views.on_changed(
            ChangeTarget::Root {
                system: self.bundle.name.clone(),
            },
            ChangeKind::MetadataChanged,
        );
    }

    fn add_enabled_to_list(&mut self, custom: bool, list: &mut Vec<SystemListEntry>) {
        let enabled: Vec<String> = self
            .group(custom)
            .iter()
            .filter(|(_, e)| e.enabled)
            .map(|(name, _)| name.clone())
            .collect();

        for name in enabled {
            self.ensure_populated(&name);
            let Some(entry) = self.group(custom).get(&name) else {
                continue;
            };
            if !entry.decl.display_if_empty && entry.system.is_empty() {
                continue;
            }
            if self.gets_own_slot(entry) {
                list.push(SystemListEntry::from_collection(&entry.system));
            } else {
                let index = entry.system.index().clone();
                self.bundle.index_mut().import_index(&index);
                self.bundled.push(name);
            }
        }
    }

    /// A custom collection, or a genre / arcade-subsystem collection the
    /// theme has no folder or logo for.
    fn is_groupable(&self, entry: &CollectionEntry) -> bool {
        entry.is_custom()
            || (entry.decl.kind.is_genre_or_subsystem()
                && !self.theme.has_folder(&entry.decl.theme_folder)
                && !self.theme.has_custom_logo(entry.name()))
    }

    fn gets_own_slot(&self, entry: &CollectionEntry) -> bool {
        !self.is_groupable(entry)
            || self.theme.has_folder(&entry.decl.theme_folder)
            || !self.settings.bundle_custom_collections
    }

    /// The system a collection is browsed through: the bundle if the
    /// collection is grouped under it, otherwise the collection itself.
    pub fn system_to_view(&self, name: &str) -> Option<&CollectionSystem> {
        if self.bundled.iter().any(|n| n == name) {
            return Some(&self.bundle);
        }
        self.entry(name).map(|e| &e.system)
    }

    fn view_name(&self, name: &str) -> String {
        if self.bundled.iter().any(|n| n == name) {
            self.bundle.name.clone()
        } else {
            name.to_string()
        }
    }

    // -- Membership updates ------------------------------------------------

    /// Bring every populated collection up to date with one game's metadata.
    pub fn refresh_collection_systems(&mut self, game: &Arc<Game>, views: &mut dyn CollectionViews) {
        let corpus = Arc::clone(&self.corpus);
        let Some(system) = corpus.system_of(game) else {
            return;
        };
        if !system.flags.game_system {
            return;
        }

        let in_auto = include_in_auto_collections(game, system)
            && !(self.settings.is_system_hidden(&system.name)
                && !self.settings.hidden_systems_show_games);
        let hidden_ext = self
            .settings
            .hidden_extensions_for(&system.name)
            .contains(&game.extension());
        let source_hidden = self.settings.is_system_hidden(game.system_name());

        let names: Vec<(bool, String)> = self
            .auto
            .iter()
            .chain(self.custom.iter())
            .filter(|(_, e)| e.populated)
            .map(|(name, e)| (e.is_custom(), name.clone()))
            .collect();

        let mut bundle_dirty = false;
        for (custom, name) in names {
            let view = self.view_name(&name);
            let bundled = view != name;
            let Some(entry) = self.group_mut(custom).get_mut(&name) else {
                continue;
            };

            let wanted = match &entry.kind {
                CollectionKind::Auto => {
                    let kind = entry.decl.kind;
                    Some(
                        in_auto
                            && (kind == CollectionType::Favorites || !hidden_ext)
                            && auto_collection_includes(kind, game, system),
                    )
                }
                CollectionKind::StaticCustom => None,
                CollectionKind::Dynamic(filter) => Some(filter.show_file(game) && !source_hidden),
            };

            let change = refresh_entry(entry, game, wanted);
            if change == Membership::Unchanged {
                continue;
            }
            bundle_dirty |= bundled;

            let key = game.path().to_path_buf();
            match change {
                Membership::Removed => {
                    views.detach_entry(&view, &key);
                    views.on_changed(
                        ChangeTarget::Entry {
                            system: view.clone(),
                            key,
                        },
                        ChangeKind::Removed,
                    );
                }
                _ => views.on_changed(
                    ChangeTarget::Entry {
                        system: view.clone(),
                        key,
                    },
                    ChangeKind::MetadataChanged,
                ),
            }

            let root = ChangeTarget::Root { system: view };
            if entry.decl.kind == CollectionType::LastPlayed {
                sort_last_played(&mut entry.system);
                update_collection_folder_metadata(&mut entry.system);
                views.on_changed(root, ChangeKind::MetadataChanged);
            } else {
                if !matches!(entry.kind, CollectionKind::StaticCustom) {
                    entry.system.sort();
                }
                if change != Membership::Reindexed {
                    update_collection_folder_metadata(&mut entry.system);
                }
                views.on_changed(root, ChangeKind::Sorted);
            }
        }

        if bundle_dirty {
            self.rebuild_bundle_index();
        }
    }

    /// Remove a game from every populated collection that holds it.
    pub fn delete_collection_files(&mut self, game: &Game, views: &mut dyn CollectionViews) {
        let key = game.path().to_path_buf();
        let names: Vec<(bool, String)> = self
            .auto
            .iter()
            .chain(self.custom.iter())
            .filter(|(_, e)| e.populated && e.system.contains(&key))
            .map(|(name, e)| (e.is_custom(), name.clone()))
            .collect();

        let mut bundle_dirty = false;
        for (custom, name) in names {
            let view = self.view_name(&name);
            let Some(entry) = self.group_mut(custom).get_mut(&name) else {
                continue;
            };
            if entry.system.remove(&key).is_none() {
                continue;
            }
            entry.needs_save = true;
            update_collection_folder_metadata(&mut entry.system);
            bundle_dirty |= view != name;

            views.detach_entry(&view, &key);
            views.on_changed(
                ChangeTarget::Entry {
                    system: view,
                    key: key.clone(),
                },
                ChangeKind::Removed,
            );
        }

        if bundle_dirty {
            self.rebuild_bundle_index();
        }
    }

    /// Add a game to a collection, or remove it if it is already there.
    ///
    /// For "favorites" this flips the game's favorite flag and lets
    /// membership follow. Otherwise `name` must be a static custom
    /// collection; a custom collection always wins over the built-in name.
    /// Returns `false` if nothing was toggled.
    pub fn toggle_game_in_collection(
        &mut self,
        game: &Arc<Game>,
        name: &str,
        views: &mut dyn CollectionViews,
    ) -> bool {
        let adding = if name == FAVORITES_NAME && !self.custom.contains_key(name) {
            let adding = game.toggle_favorite();
            self.refresh_collection_systems(game, views);
            adding
        } else {
            match self.custom.get(name).map(|e| &e.kind) {
                Some(CollectionKind::StaticCustom) => {}
                Some(_) => {
                    log::info!("Can't toggle games in dynamic collection '{}'", name);
                    return false;
                }
                None => return false,
            }
            self.ensure_populated_in(true, name);
            match self.toggle_static_member(game, name, views) {
                Some(adding) => adding,
                None => return false,
            }
        };

        let title = strip_parenthesis(game.name());
        let collection = name.to_uppercase();
        let message = if adding {
            format!("Added '{title}' to '{collection}'")
        } else {
            format!("Removed '{title}' from '{collection}'")
        };
        views.notify(&message, NOTIFICATION_DURATION);
        true
    }

    fn toggle_static_member(
        &mut self,
        game: &Arc<Game>,
        name: &str,
        views: &mut dyn CollectionViews,
    ) -> Option<bool> {
        let view = self.view_name(name);
        let bundled = view != name;
        let entry = self.custom.get_mut(name)?;
        entry.needs_save = true;

        let key = game.path().to_path_buf();
        let adding = match entry.system.remove(&key) {
            Some(_) => {
                views.detach_entry(&view, &key);
                views.on_changed(
                    ChangeTarget::Entry {
                        system: view.clone(),
                        key,
                    },
                    ChangeKind::Removed,
                );
                false
            }
            None => {
                entry.system.add(game);
                views.on_changed(
                    ChangeTarget::Entry {
                        system: view.clone(),
                        key,
                    },
                    ChangeKind::MetadataChanged,
                );
                views.on_changed(ChangeTarget::Root { system: view }, ChangeKind::Sorted);
                true
            }
        };
        update_collection_folder_metadata(&mut entry.system);
        if bundled {
            self.rebuild_bundle_index();
        }
        Some(adding)
    }

    /// Whether `game` is in the named custom collection, populating it first
    /// if needed.
    pub fn is_in_custom_collection(&mut self, game: &Game, name: &str) -> bool {
        if !self.ensure_populated_in(true, name) {
            return false;
        }
        self.custom
            .get(name)
            .is_some_and(|e| e.system.contains(game.path()))
    }

    // -- Custom collection management --------------------------------------

    /// Turn a requested name into one that is valid and unused.
    ///
    /// Characters outside `A-Za-z0-9-[]() ` are stripped; on collision a
    /// ` (n)` suffix is appended with an increasing `n`.
    pub fn valid_new_collection_name(&self, name: &str) -> String {
        self.valid_new_collection_name_from(name, 0)
    }

    /// Like [`valid_new_collection_name`](Self::valid_new_collection_name),
    /// but the first candidate already carries the ` (index)` suffix when
    /// `index` is non-zero.
    pub fn valid_new_collection_name_from(&self, name: &str, index: u32) -> String {
        let base: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || NAME_PUNCTUATION.contains(*c))
            .collect();
        let base = if base.is_empty() {
            DEFAULT_COLLECTION_NAME.to_string()
        } else {
            base
        };

        let used = self.names_in_use();
        let mut n = index;
        let valid = loop {
            let candidate = if n == 0 {
                base.clone()
            } else {
                format!("{base} ({n})")
            };
            if !used.contains(&candidate.to_lowercase()) {
                break candidate;
            }
            n += 1;
        };

        if valid != name {
            log::info!("Had to change collection name from '{}' to '{}'", name, valid);
        }
        valid
    }

    /// System names, theme folders and reserved names a new collection may
    /// not take, lower-cased.
    fn names_in_use(&self) -> HashSet<String> {
        let systems = self
            .corpus
            .systems
            .iter()
            .flat_map(|s| [&s.name, &s.theme_folder]);
        let decls = self.decls.iter().flat_map(|d| [&d.name, &d.theme_folder]);
        let custom = self.custom.values().map(|e| &e.decl.theme_folder);
        systems
            .chain(decls)
            .chain(custom)
            .map(|name| name.to_lowercase())
            .collect()
    }

    /// Create an empty static collection. Returns the name actually used.
    pub fn create_custom_collection(&mut self, name: &str) -> Result<String, CollectionError> {
        let name = self.valid_new_collection_name(name);
        self.paths.ensure_folder()?;

        let entry = self.insert_custom_entry(&name, StoredKind::Static);
        entry.populated = true;
        entry.needs_save = true;
        log::info!("Created custom collection '{}'", name);
        Ok(name)
    }

    /// Create a dynamic collection and write its definition, optionally
    /// seeded from another list's filters. Returns the name actually used.
    pub fn create_dynamic_collection(
        &mut self,
        name: &str,
        seed: Option<FilterSeed<'_>>,
    ) -> Result<String, CollectionError> {
        let name = self.valid_new_collection_name(name);
        self.paths.ensure_folder()?;
        let path = self.paths.dynamic_filter_path(&name);

        let filter = match seed {
            Some(seed) => {
                let source = seed.system.filter(|s| {
                    self.corpus
                        .find(s)
                        .is_some_and(|sys| sys.flags.game_system && !sys.flags.group)
                });
                DynamicFilter::create_from_system(&name, path, source, seed.index)?
            }
            None => DynamicFilter::create(&name, path)?,
        };

        let decl = CollectionDecl::custom(&name);
        let sort = effective_sort_order(&decl, &self.settings);
        self.custom.insert(
            name.clone(),
            CollectionEntry::new(decl, CollectionKind::Dynamic(Box::new(filter)), sort),
        );
        log::info!("Created dynamic collection '{}'", name);
        Ok(name)
    }

    /// Delete a custom collection and its backing file. Returns `false` if
    /// there was neither an entry nor a file.
    pub fn delete_custom_collection(
        &mut self,
        name: &str,
        views: &mut dyn CollectionViews,
    ) -> Result<bool, CollectionError> {
        let dynamic = self.paths.dynamic_filter_path(name);
        let path = if dynamic.exists() {
            dynamic
        } else {
            self.paths.static_list_path(name)
        };

        let had_file = path.exists();
        if had_file {
            fs::remove_file(&path)?;
        }
        let had_entry = self.custom.remove(name).is_some();
        self.bundled.retain(|n| n != name);

        let mut enabled = self.settings.enabled_custom();
        if let Some(pos) = enabled.iter().position(|n| n == name) {
            enabled.remove(pos);
            self.settings.set_enabled_custom(&enabled);
        }

        if had_file || had_entry {
            views.remove_view(name);
            log::info!("Deleted custom collection '{}'", name);
        }
        Ok(had_file || had_entry)
    }

    /// Write a dirty static collection to its list file. Dynamic
    /// collections and clean collections are left alone.
    pub fn save_custom_collection(&mut self, name: &str) -> Result<(), CollectionError> {
        let entry = self
            .custom
            .get(name)
            .ok_or_else(|| CollectionError::unknown_collection(name))?;
        if !matches!(entry.kind, CollectionKind::StaticCustom) || !entry.needs_save {
            return Ok(());
        }
        if entry.load_failed {
            return Err(CollectionError::UnreadableList(
                self.paths.static_list_path(name),
            ));
        }

        let keys: Vec<String> = entry
            .system
            .items()
            .iter()
            .map(|item| self.paths.to_portable(item.key()))
            .collect();
        self.paths.ensure_folder()?;
        let path = self.paths.static_list_path(name);
        write_static_list(&path, &keys)?;
        log::info!("Saved {} games to {}", keys.len(), path.display());

        if let Some(entry) = self.custom.get_mut(name) {
            entry.needs_save = false;
        }
        Ok(())
    }

    /// Save every dirty static collection, logging failures.
    pub fn save_dirty_collections(&mut self) {
        let dirty: Vec<String> = self
            .custom
            .iter()
            .filter(|(_, e)| e.needs_save)
            .map(|(name, _)| name.clone())
            .collect();
        for name in dirty {
            if let Err(e) = self.save_custom_collection(&name) {
                log::error!("Failed to save custom collection '{}': {}", name, e);
            }
        }
    }

    /// Re-read a dynamic collection's definition and repopulate it. Auto
    /// collections only ask their view to refresh.
    pub fn reload_collection(&mut self, name: &str, views: &mut dyn CollectionViews) {
        if self.auto.contains_key(name) {
            views.repopulate(name);
            return;
        }
        if !self.is_dynamic_collection(name) {
            return;
        }

        let ctx = self.populate_context();
        let Some(entry) = self.custom.get_mut(name) else {
            return;
        };
        populate_entry(entry, &ctx);

        let view = self.view_name(name);
        if view != name {
            self.rebuild_bundle_index();
        }
        views.repopulate(&view);
    }

    /// Enable or disable a collection and update the matching settings list.
    pub fn set_collection_enabled(&mut self, name: &str, enabled: bool) -> Result<(), CollectionError> {
        if let Some(entry) = self.auto.get_mut(name) {
            entry.enabled = enabled;
            let names = enabled_names(&self.auto);
            self.settings.set_enabled_auto(&names);
            return Ok(());
        }
        if let Some(entry) = self.custom.get_mut(name) {
            entry.enabled = enabled;
            let names = enabled_names(&self.custom);
            self.settings.set_enabled_custom(&names);
            return Ok(());
        }
        Err(CollectionError::unknown_collection(name))
    }

    /// Ask workers that have not started yet to skip their collection.
    ///
    /// The flag applies to the batch in flight; it is cleared when the next
    /// batch starts.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    // -- Queries -----------------------------------------------------------

    pub fn is_custom_collection(&self, name: &str) -> bool {
        self.custom.get(name).is_some_and(|e| e.decl.is_custom)
    }

    pub fn is_dynamic_collection(&self, name: &str) -> bool {
        self.custom.get(name).is_some_and(CollectionEntry::is_dynamic)
    }

    /// The "all games" collection, populated on first use.
    pub fn all_games(&mut self) -> Option<&CollectionSystem> {
        self.ensure_all_games();
        self.auto.get(ALL_GAMES_NAME).map(|e| &e.system)
    }

    /// The "arcade" collection, populated on first use.
    pub fn arcade_collection(&mut self) -> Option<&CollectionSystem> {
        self.ensure_populated("arcade");
        self.auto.get("arcade").map(|e| &e.system)
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionEntry> {
        self.entry(name)
    }

    pub fn auto_collections(&self) -> impl Iterator<Item = &CollectionEntry> {
        self.auto.values()
    }

    pub fn custom_collections(&self) -> impl Iterator<Item = &CollectionEntry> {
        self.custom.values()
    }

    pub fn bundle(&self) -> &CollectionSystem {
        &self.bundle
    }

    /// Names of the collections grouped under the bundle.
    pub fn bundled_collections(&self) -> &[String] {
        &self.bundled
    }

    pub fn decls(&self) -> &[CollectionDecl] {
        &self.decls
    }

    pub fn settings(&self) -> &CollectionSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut CollectionSettings {
        &mut self.settings
    }

    pub fn paths(&self) -> &CollectionPaths {
        &self.paths
    }

    pub fn corpus(&self) -> &GameCorpus {
        &self.corpus
    }

    // -- Theme -------------------------------------------------------------

    /// Theme folders not claimed by any system or collection.
    pub fn unused_theme_folders(&self) -> Vec<String> {
        let used = self.names_in_use();
        let mut unused: Vec<String> = self
            .theme
            .system_folders()
            .into_iter()
            .filter(|f| !used.contains(f))
            .collect();
        unused.sort();
        unused
    }

    /// Whether the theme has a folder for every auto (`custom == false`) or
    /// generic custom (`custom == true`) declaration.
    pub fn is_theme_generic_collection_compatible(&self, custom: bool) -> bool {
        self.decls
            .iter()
            .filter(|d| d.is_custom == custom)
            .all(|d| self.theme.has_folder(&d.theme_folder))
    }

    /// Whether the theme can show the named custom collections.
    pub fn is_theme_custom_collection_compatible<S: AsRef<str>>(&self, names: &[S]) -> bool {
        self.is_theme_generic_collection_compatible(true)
            || self.theme.has_default_theme()
            || names.iter().all(|n| self.theme.has_folder(n.as_ref()))
    }

    // -- Internals ---------------------------------------------------------

    /// Recompute the bundle's facet counts from its member collections.
    fn rebuild_bundle_index(&mut self) {
        let bundle_index = self.bundle.index_mut();
        bundle_index.reset_index();
        for name in &self.bundled {
            if let Some(entry) = self.custom.get(name).or_else(|| self.auto.get(name)) {
                bundle_index.import_index(entry.system.index());
            }
        }
    }

    fn entry(&self, name: &str) -> Option<&CollectionEntry> {
        self.auto.get(name).or_else(|| self.custom.get(name))
    }

    fn entry_mut(&mut self, name: &str) -> Option<&mut CollectionEntry> {
        match self.auto.get_mut(name) {
            Some(entry) => Some(entry),
            None => self.custom.get_mut(name),
        }
    }

    fn group(&self, custom: bool) -> &BTreeMap<String, CollectionEntry> {
        if custom { &self.custom } else { &self.auto }
    }

    fn group_mut(&mut self, custom: bool) -> &mut BTreeMap<String, CollectionEntry> {
        if custom {
            &mut self.custom
        } else {
            &mut self.auto
        }
    }
}

impl Drop for CollectionRegistry {
    fn drop(&mut self) {
        self.save_dirty_collections();
    }
}

/// Apply one game's current state to one collection.
///
/// `wanted` is the membership the game should have, or `None` to keep
/// membership as is and only re-index.
fn refresh_entry(entry: &mut CollectionEntry, game: &Arc<Game>, wanted: Option<bool>) -> Membership {
    let is_member = entry.system.contains(game.path());
    match (is_member, wanted) {
        (true, Some(false)) => {
            entry.system.remove(game.path());
            Membership::Removed
        }
        (true, _) => {
            entry.system.reindex(game);
            Membership::Reindexed
        }
        (false, Some(true)) => {
            entry.system.add(game);
            Membership::Added
        }
        (false, _) => Membership::Unchanged,
    }
}

fn enabled_names(group: &BTreeMap<String, CollectionEntry>) -> Vec<String> {
    group
        .iter()
        .filter(|(_, e)| e.enabled)
        .map(|(name, _)| name.clone())
        .collect()
}

/// Drop bracketed tags like "(USA)" or "[!]" from a game title.
fn strip_parenthesis(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut depth = 0usize;
    for c in name.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
