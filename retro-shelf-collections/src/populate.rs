//! Computing collection membership from the game corpus.
//!
//! Auto collections are rebuilt from a per-type predicate over every game
//! system. Custom collections come from disk: a static list of game keys, or
//! a dynamic filter definition evaluated against the "all games" set.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use retro_shelf_core::genre::genre_belongs_to;
use retro_shelf_core::util::parse_leading_int;
use retro_shelf_core::{ArcadeSystem, Game, GameCorpus, GameSystem};

use crate::collection::{CollectionEntry, CollectionKind, CollectionSystem, SortOrder};
use crate::decl::{CollectionDecl, CollectionType};
use crate::dynamic_filter::DynamicFilter;
use crate::facet::FacetKeys;
use crate::metadata::update_collection_folder_metadata;
use crate::persistence::{CollectionPaths, read_static_list};
use crate::settings::CollectionSettings;

/// Most entries kept in the "last played" collection.
pub const LAST_PLAYED_MAX: usize = 50;

/// Launcher entry that shows up in game lists but is not a game.
const NON_GAME_ENTRY: &str = "kodi";

/// Read-only inputs shared by every populate call in a batch.
///
/// Holds the "all games" membership and a lazily built path lookup over
/// it, so a batch of static collections resolves keys against one map.
#[derive(Debug)]
pub struct PopulateContext {
    corpus: Arc<GameCorpus>,
    settings: CollectionSettings,
    paths: CollectionPaths,
    all_games: Vec<Arc<Game>>,
    key_map: OnceLock<HashMap<PathBuf, Arc<Game>>>,
}

impl PopulateContext {
    /// Build a context, computing "all games" from the corpus.
    pub fn new(corpus: Arc<GameCorpus>, settings: CollectionSettings, paths: CollectionPaths) -> Self {
        let all_games = matching_games(CollectionType::AllGames, &corpus, &settings);
        Self::with_all_games(corpus, settings, paths, all_games)
    }

    /// Build a context around an already populated "all games" list.
    pub fn with_all_games(
        corpus: Arc<GameCorpus>,
        settings: CollectionSettings,
        paths: CollectionPaths,
        all_games: Vec<Arc<Game>>,
    ) -> Self {
        Self {
            corpus,
            settings,
            paths,
            all_games,
            key_map: OnceLock::new(),
        }
    }

    pub fn corpus(&self) -> &GameCorpus {
        &self.corpus
    }

    pub fn settings(&self) -> &CollectionSettings {
        &self.settings
    }

    pub fn paths(&self) -> &CollectionPaths {
        &self.paths
    }

    pub fn all_games(&self) -> &[Arc<Game>] {
        &self.all_games
    }

    /// Path -> game lookup over "all games", built on first use.
    pub fn key_map(&self) -> &HashMap<PathBuf, Arc<Game>> {
        self.key_map.get_or_init(|| {
            log::debug!("Building key map over {} games", self.all_games.len());
            build_key_map(&self.all_games)
        })
    }
}

pub fn build_key_map(games: &[Arc<Game>]) -> HashMap<PathBuf, Arc<Game>> {
    games
        .iter()
        .map(|g| (g.path().to_path_buf(), Arc::clone(g)))
        .collect()
}

/// Whether a game may appear in any auto collection at all.
pub fn include_in_auto_collections(game: &Game, system: &GameSystem) -> bool {
    game.name() != NON_GAME_ENTRY && system.flags.game_system && !system.flags.ignored_platform
}

/// Test a players string ("2", "1-4", "2+") against a player count.
///
/// A range with no positive lower bound only matches its upper bound
/// exactly, so "4" matches 4 but not 2.
pub fn players_range_contains(players: &str, value: i64) -> bool {
    if players.is_empty() {
        return false;
    }
    let players = players.replace('+', "-999");
    let (min, max) = match players.rfind('-') {
        Some(split) => (
            parse_leading_int(&players[..split]),
            parse_leading_int(&players[split + 1..]),
        ),
        None => (-1, parse_leading_int(&players)),
    };
    if min <= 0 {
        value == max
    } else {
        (min..=max).contains(&value)
    }
}

/// The per-type membership predicate of an auto collection.
pub fn auto_collection_includes(kind: CollectionType, game: &Game, system: &GameSystem) -> bool {
    let meta = game.metadata();
    match kind {
        CollectionType::AllGames => true,
        CollectionType::LastPlayed => meta.is_played(),
        CollectionType::NeverPlayed => !meta.is_played(),
        CollectionType::Favorites => meta.favorite,
        CollectionType::TwoPlayers => meta
            .players
            .as_deref()
            .is_some_and(|p| players_range_contains(p, 2)),
        CollectionType::FourPlayers => meta
            .players
            .as_deref()
            .is_some_and(|p| players_range_contains(p, 4)),
        CollectionType::Achievements => meta.achievements,
        CollectionType::Arcade => system.flags.arcade,
        CollectionType::VerticalArcade => system.flags.arcade && meta.vertical,
        CollectionType::LightGun => meta.lightgun,
        CollectionType::Wheel => meta.wheel,
        CollectionType::Genre(top) => meta.genre_ids.iter().any(|&id| genre_belongs_to(id, top)),
        CollectionType::ArcadeSubsystem(id) => {
            system.flags.arcade
                && ArcadeSystem::by_id(id)
                    .zip(meta.arcade_system_name.as_deref())
                    .is_some_and(|(arcade, board)| arcade.short_name.eq_ignore_ascii_case(board))
        }
        CollectionType::Custom => false,
    }
}

/// Every game in the corpus that belongs in an auto collection of `kind`,
/// in system order.
pub fn matching_games(
    kind: CollectionType,
    corpus: &GameCorpus,
    settings: &CollectionSettings,
) -> Vec<Arc<Game>> {
    let mut out = Vec::new();
    for system in &corpus.systems {
        if !system.flags.game_system {
            continue;
        }
        if settings.is_system_hidden(&system.name) && !settings.hidden_systems_show_games {
            continue;
        }

        // Favorites keep games whose extension is otherwise hidden.
        let hidden_exts = if kind == CollectionType::Favorites {
            Vec::new()
        } else {
            settings.hidden_extensions_for(&system.name)
        };

        for game in system.owned_games() {
            if !include_in_auto_collections(&game, system) {
                continue;
            }
            if !hidden_exts.is_empty() && hidden_exts.contains(&game.extension()) {
                continue;
            }
            if auto_collection_includes(kind, &game, system) {
                out.push(game);
            }
        }
    }
    out
}

/// Sort order for a collection: the per-collection setting, else the
/// declaration default.
pub fn effective_sort_order(decl: &CollectionDecl, settings: &CollectionSettings) -> SortOrder {
    if decl.kind == CollectionType::LastPlayed {
        return SortOrder::LastPlayedDescending;
    }
    settings
        .sort_orders
        .get(&decl.name)
        .copied()
        .unwrap_or(decl.default_sort)
}

/// Order newest-first and drop everything past [`LAST_PLAYED_MAX`].
pub fn sort_last_played(system: &mut CollectionSystem) {
    system.set_sort_order(SortOrder::LastPlayedDescending);
    system.sort();
    system.truncate(LAST_PLAYED_MAX);
}

/// Rebuild an auto collection from the corpus.
pub fn populate_auto_collection(entry: &mut CollectionEntry, ctx: &PopulateContext) {
    let kind = entry.decl.kind;
    let games = if kind == CollectionType::AllGames {
        ctx.all_games().to_vec()
    } else {
        matching_games(kind, ctx.corpus(), ctx.settings())
    };

    let system = &mut entry.system;
    system.clear();
    for game in &games {
        system.add(game);
    }

    if kind == CollectionType::LastPlayed {
        sort_last_played(system);
    } else {
        system.set_sort_order(effective_sort_order(&entry.decl, ctx.settings()));
        system.sort();
    }

    update_collection_folder_metadata(system);
    entry.populated = true;
    log::debug!("Populated auto collection '{}' with {} games", system.name, system.len());
}

/// Rebuild a custom collection from its static list or filter definition.
///
/// Problems with the backing file are logged and leave the collection
/// empty; the entry is marked populated either way. An unreadable static
/// list sets `load_failed`.
pub fn populate_custom_collection(entry: &mut CollectionEntry, ctx: &PopulateContext) {
    let CollectionEntry {
        system,
        kind,
        populated,
        load_failed,
        ..
    } = entry;
    *populated = true;
    *load_failed = false;

    match kind {
        CollectionKind::Dynamic(filter) => populate_dynamic(system, filter, ctx),
        CollectionKind::StaticCustom => *load_failed = !populate_static(system, ctx),
        CollectionKind::Auto => {
            log::warn!("'{}' is not a custom collection", system.name);
            return;
        }
    }

    update_collection_folder_metadata(system);
    log::debug!("Populated custom collection '{}' with {} games", system.name, system.len());
}

/// Populate any collection, dispatching on its kind.
pub fn populate_entry(entry: &mut CollectionEntry, ctx: &PopulateContext) {
    match entry.kind {
        CollectionKind::Auto => populate_auto_collection(entry, ctx),
        CollectionKind::StaticCustom | CollectionKind::Dynamic(_) => {
            populate_custom_collection(entry, ctx)
        }
    }
}

fn populate_dynamic(system: &mut CollectionSystem, filter: &mut DynamicFilter, ctx: &PopulateContext) {
    filter.index_mut().reset_index();
    system.clear();

    match filter.reload() {
        Ok(true) => {}
        Ok(false) => {
            log::info!(
                "Couldn't find filter definition at {}",
                filter.path().display()
            );
            return;
        }
        Err(e) => {
            log::warn!(
                "Failed to load filter definition {}: {}",
                filter.path().display(),
                e
            );
            return;
        }
    }

    for game in ctx.all_games() {
        let source = game.system_name();
        let keys = FacetKeys::of(game);
        if filter.is_system_selected(source) {
            filter.index_mut().add_keys(&keys);
        }
        if filter.matches(source, game.name(), &keys) && !ctx.settings().is_system_hidden(source) {
            system.add(game);
        }
    }
    system.sort();
}

/// Returns `false` if the list exists but could not be read.
fn populate_static(system: &mut CollectionSystem, ctx: &PopulateContext) -> bool {
    system.clear();

    let path = ctx.paths().static_list_path(&system.name);
    if !path.exists() {
        log::info!("Couldn't find custom collection list at {}", path.display());
        return true;
    }
    log::info!("Loading custom collection list at {}", path.display());

    let keys = match read_static_list(&path) {
        Ok(keys) => keys,
        Err(e) => {
            log::warn!("Failed to read {}: {}", path.display(), e);
            return false;
        }
    };

    let map = ctx.key_map();
    for key in keys {
        let resolved = ctx.paths().resolve_portable(&key);
        match map.get(&resolved) {
            Some(game) if ctx.settings().is_system_hidden(game.system_name()) => {}
            Some(game) => {
                system.add(game);
            }
            None => log::info!(
                "Couldn't find game referenced at '{}' for collection list '{}'",
                key,
                path.display()
            ),
        }
    }
    true
}

#[cfg(test)]
#[path = "tests/populate_tests.rs"]
mod tests;
