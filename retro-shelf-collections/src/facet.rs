//! Per-facet counted index with active filter selections.
//!
//! Every collection (and every game list in the frontend) keeps a
//! [`FacetIndex`]: for each [`Facet`] it counts how many games carry each
//! key, and it remembers which keys the user selected as filters. A game
//! is shown when, for every facet with an active selection, at least one
//! of its keys is selected, and the free-text filter (if any) matches its
//! name.

use std::collections::{BTreeMap, BTreeSet};

use retro_shelf_core::{Game, GameMetadata};

/// Key used by facets that force an explicit bucket for missing values.
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

const TRUE_KEY: &str = "TRUE";
const FALSE_KEY: &str = "FALSE";

/// One fixed metadata dimension that games are indexed and filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Facet {
    Favorites,
    Genre,
    Players,
    PubDev,
    Ratings,
    Year,
    Language,
    Region,
    KidGame,
    Hidden,
    Played,
    Achievements,
}

const ALL_FACETS: &[Facet] = &[
    Facet::Favorites,
    Facet::Genre,
    Facet::Players,
    Facet::PubDev,
    Facet::Ratings,
    Facet::Year,
    Facet::Language,
    Facet::Region,
    Facet::KidGame,
    Facet::Hidden,
    Facet::Played,
    Facet::Achievements,
];

impl Facet {
    pub fn all() -> &'static [Facet] {
        ALL_FACETS
    }

    /// Element name used in `.xcc` filter definitions.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::Genre => "genre",
            Self::Players => "players",
            Self::PubDev => "pubDev",
            Self::Ratings => "ratings",
            Self::Year => "year",
            Self::Language => "lang",
            Self::Region => "region",
            Self::KidGame => "kidGame",
            Self::Hidden => "hidden",
            Self::Played => "played",
            Self::Achievements => "cheevos",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Facet> {
        ALL_FACETS.iter().copied().find(|f| f.tag() == tag)
    }

    /// Human-readable facet name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Favorites => "FAVORITES",
            Self::Genre => "GENRE",
            Self::Players => "PLAYERS",
            Self::PubDev => "PUBLISHER / DEVELOPER",
            Self::Ratings => "RATING",
            Self::Year => "YEAR",
            Self::Language => "LANGUAGE",
            Self::Region => "REGION",
            Self::KidGame => "KIDGAME",
            Self::Hidden => "HIDDEN",
            Self::Played => "PLAYED",
            Self::Achievements => "ACHIEVEMENTS",
        }
    }

    /// Facets whose keys are always `TRUE` or `FALSE`.
    pub fn is_boolean(&self) -> bool {
        matches!(
            self,
            Self::Favorites | Self::KidGame | Self::Hidden | Self::Played | Self::Achievements
        )
    }

    /// Facets that count games with no value under [`UNKNOWN_LABEL`].
    pub fn forces_unknown(&self) -> bool {
        matches!(self, Self::Language | Self::Region)
    }

    /// Bring a user- or file-supplied key into the form the index stores.
    pub fn normalize(&self, value: &str) -> String {
        let value = value.trim();
        if value.eq_ignore_ascii_case(UNKNOWN_LABEL) {
            return UNKNOWN_LABEL.to_string();
        }
        match self {
            Self::Language | Self::Region => value.to_lowercase(),
            Self::Players => value.to_string(),
            _ => value.to_uppercase(),
        }
    }

    /// The keys a game with `meta` is indexed under for this facet.
    pub fn keys_for(&self, meta: &GameMetadata) -> Vec<String> {
        match self {
            Self::Favorites => bool_key(meta.favorite),
            Self::KidGame => bool_key(meta.kid_game),
            Self::Hidden => bool_key(meta.hidden),
            Self::Played => bool_key(meta.is_played()),
            Self::Achievements => bool_key(meta.achievements),
            Self::Genre => genre_keys(meta.genre.as_deref()),
            Self::Players => non_empty(meta.players.as_deref())
                .map(|p| vec![p.to_string()])
                .unwrap_or_default(),
            Self::PubDev => {
                let mut keys = Vec::new();
                for value in [meta.publisher.as_deref(), meta.developer.as_deref()] {
                    if let Some(v) = non_empty(value) {
                        let key = v.to_uppercase();
                        if !keys.contains(&key) {
                            keys.push(key);
                        }
                    }
                }
                keys
            }
            Self::Ratings => meta
                .rating
                .and_then(rating_key)
                .map(|k| vec![k])
                .unwrap_or_default(),
            Self::Year => meta
                .release_date
                .as_deref()
                .and_then(year_key)
                .map(|k| vec![k])
                .unwrap_or_default(),
            Self::Language => list_keys(meta.language.as_deref()),
            Self::Region => list_keys(meta.region.as_deref()),
        }
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

fn bool_key(value: bool) -> Vec<String> {
    vec![if value { TRUE_KEY } else { FALSE_KEY }.to_string()]
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn genre_keys(genre: Option<&str>) -> Vec<String> {
    let Some(genre) = non_empty(genre) else {
        return Vec::new();
    };
    let full = genre.to_uppercase();
    if full == "BIOS" {
        return Vec::new();
    }
    let mut keys = vec![full.clone()];
    if let Some((parent, _)) = full.split_once('/') {
        let parent = parent.trim();
        if !parent.is_empty() && parent != full {
            keys.push(parent.to_string());
        }
    }
    keys
}

/// `0.8` becomes `"4 STARS"`. A rating that rounds to zero is treated as unknown.
fn rating_key(rating: f32) -> Option<String> {
    let stars = ((rating * 5.0) + 0.5).floor() as i32;
    (stars > 0).then(|| format!("{stars} STARS"))
}

fn year_key(date: &str) -> Option<String> {
    let date = date.trim();
    let first = date.chars().next()?;
    if date.len() >= 4 && (first == '1' || first == '2') {
        date.get(..4).map(str::to_string)
    } else {
        None
    }
}

fn list_keys(value: Option<&str>) -> Vec<String> {
    let keys: Vec<String> = value
        .unwrap_or_default()
        .split(',')
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect();
    if keys.is_empty() {
        vec![UNKNOWN_LABEL.to_string()]
    } else {
        keys
    }
}

/// The full set of keys one game was indexed under.
///
/// Collection items keep this snapshot so that removing a game from an
/// index decrements exactly what was incremented, even if the game's
/// metadata changed in between.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetKeys(BTreeMap<Facet, Vec<String>>);

impl FacetKeys {
    pub fn of(game: &Game) -> Self {
        Self::from_metadata(&game.metadata())
    }

    pub fn from_metadata(meta: &GameMetadata) -> Self {
        Self(
            ALL_FACETS
                .iter()
                .map(|&f| (f, f.keys_for(meta)))
                .filter(|(_, keys)| !keys.is_empty())
                .collect(),
        )
    }

    pub fn get(&self, facet: Facet) -> &[String] {
        self.0.get(&facet).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Facet, &[String])> {
        self.0.iter().map(|(f, keys)| (*f, keys.as_slice()))
    }
}

/// Filters applied by [`FacetIndex::reset_filters`] for the current UI mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterDefaults {
    /// Kid mode: only show games flagged as kid games.
    pub kid_mode: bool,
    /// Hide games flagged hidden.
    pub hide_hidden: bool,
    /// Skip all defaults.
    pub force_disabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetIndex {
    counts: BTreeMap<Facet, BTreeMap<String, usize>>,
    selected: BTreeMap<Facet, BTreeSet<String>>,
    /// Stored upper-cased.
    text_filter: String,
    use_relevance: bool,
}

impl FacetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a game and return the keys it was indexed under.
    pub fn add_to_index(&mut self, game: &Game) -> FacetKeys {
        let keys = FacetKeys::of(game);
        self.add_keys(&keys);
        keys
    }

    /// Remove a game using its current metadata.
    pub fn remove_from_index(&mut self, game: &Game) {
        self.remove_keys(&FacetKeys::of(game));
    }

    pub fn add_keys(&mut self, keys: &FacetKeys) {
        for (facet, values) in keys.iter() {
            let counts = self.counts.entry(facet).or_default();
            for value in values {
                *counts.entry(value.clone()).or_insert(0) += 1;
            }
        }
    }

    pub fn remove_keys(&mut self, keys: &FacetKeys) {
        for (facet, values) in keys.iter() {
            let Some(counts) = self.counts.get_mut(&facet) else {
                log::debug!("No {} entries in index while removing {:?}", facet, values);
                continue;
            };
            for value in values {
                let remaining = match counts.get_mut(value) {
                    Some(count) => {
                        *count = count.saturating_sub(1);
                        *count
                    }
                    None => {
                        log::debug!("Couldn't find '{}' in {} index", value, facet);
                        continue;
                    }
                };
                if remaining == 0 {
                    counts.remove(value);
                }
            }
            if counts.is_empty() {
                self.counts.remove(&facet);
            }
        }
    }

    /// Key -> number of games, for one facet.
    pub fn counts(&self, facet: Facet) -> Option<&BTreeMap<String, usize>> {
        self.counts.get(&facet)
    }

    pub fn count(&self, facet: Facet, key: &str) -> usize {
        self.counts
            .get(&facet)
            .and_then(|c| c.get(key))
            .copied()
            .unwrap_or(0)
    }

    /// Replace the active selection for a facet. Keys not present in the
    /// index are dropped; boolean facets always accept `TRUE`/`FALSE`.
    /// An empty list clears the facet's selection.
    pub fn set_filter<I, S>(&mut self, facet: Facet, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys = BTreeSet::new();
        for value in values {
            let key = facet.normalize(value.as_ref());
            let known = if facet.is_boolean() {
                key == TRUE_KEY || key == FALSE_KEY
            } else {
                self.count(facet, &key) > 0
            };
            if known {
                keys.insert(key);
            } else {
                log::debug!("Ignoring {} filter '{}': not in index", facet, key);
            }
        }
        if keys.is_empty() {
            self.selected.remove(&facet);
        } else {
            self.selected.insert(facet, keys);
        }
    }

    /// Select a key without checking it against the index. Used when a
    /// saved definition is loaded before any game has been indexed.
    pub(crate) fn select_unchecked(&mut self, facet: Facet, value: &str) {
        self.selected
            .entry(facet)
            .or_default()
            .insert(facet.normalize(value));
    }

    pub fn selected(&self, facet: Facet) -> Option<&BTreeSet<String>> {
        self.selected.get(&facet)
    }

    /// All facets with an active selection.
    pub fn selections(&self) -> impl Iterator<Item = (Facet, &BTreeSet<String>)> {
        self.selected.iter().map(|(f, keys)| (*f, keys))
    }

    pub fn is_key_selected(&self, facet: Facet, key: &str) -> bool {
        self.selected.get(&facet).is_some_and(|s| s.contains(key))
    }

    pub fn clear_all_filters(&mut self) {
        self.selected.clear();
    }

    /// Clear every selection, then apply the defaults for the UI mode.
    pub fn reset_filters(&mut self, defaults: FilterDefaults) {
        self.clear_all_filters();
        if defaults.force_disabled {
            return;
        }
        if defaults.kid_mode {
            self.set_filter(Facet::KidGame, [TRUE_KEY]);
        }
        if defaults.hide_hidden {
            self.set_filter(Facet::Hidden, [FALSE_KEY]);
        }
    }

    pub fn set_text_filter(&mut self, text: &str, use_relevance: bool) {
        self.text_filter = text.trim().to_uppercase();
        self.use_relevance = use_relevance;
    }

    pub fn text_filter(&self) -> &str {
        &self.text_filter
    }

    pub fn uses_relevance(&self) -> bool {
        self.use_relevance
    }

    pub fn is_filtered(&self) -> bool {
        !self.selected.is_empty() || !self.text_filter.is_empty()
    }

    pub fn show_file(&self, game: &Game) -> bool {
        if !self.is_filtered() {
            return true;
        }
        self.matches(game.name(), &FacetKeys::of(game))
    }

    /// Whether a game with `name` indexed under `keys` passes every
    /// active facet selection and the text filter.
    pub fn matches(&self, name: &str, keys: &FacetKeys) -> bool {
        let facets_pass = self.selected.iter().all(|(facet, wanted)| {
            keys.get(*facet).iter().any(|k| wanted.contains(k))
        });
        facets_pass && self.text_score(name).is_some()
    }

    /// Score `name` against the text filter. `None` means no match.
    ///
    /// Strict mode requires the whole filter as a substring. Relevance mode
    /// requires every word of the filter to appear somewhere in the name;
    /// words matching at the start of a name word score higher.
    pub fn text_score(&self, name: &str) -> Option<u32> {
        if self.text_filter.is_empty() {
            return Some(0);
        }
        let upper = name.to_uppercase();
        if !self.use_relevance {
            return upper.contains(&self.text_filter).then_some(1);
        }

        let name_words: Vec<&str> = upper.split_whitespace().collect();
        let mut score = 0;
        for word in self.text_filter.split_whitespace() {
            if !upper.contains(word) {
                return None;
            }
            score += if name_words.iter().any(|w| w.starts_with(word)) {
                2
            } else {
                1
            };
        }
        Some(score)
    }

    /// Merge another index's counts and selections into this one.
    pub fn import_index(&mut self, other: &FacetIndex) {
        for (facet, counts) in &other.counts {
            let mine = self.counts.entry(*facet).or_default();
            for (key, count) in counts {
                *mine.entry(key.clone()).or_insert(0) += count;
            }
        }
        for (facet, keys) in &other.selected {
            self.selected
                .entry(*facet)
                .or_default()
                .extend(keys.iter().cloned());
        }
    }

    /// Replace this index's state entirely with a copy of `other`.
    pub fn copy_from(&mut self, other: &FacetIndex) {
        self.clone_from(other);
    }

    /// Drop all counts, selections and the text filter.
    pub fn reset_index(&mut self) {
        self.counts.clear();
        self.selected.clear();
        self.text_filter.clear();
        self.use_relevance = false;
    }
}

#[cfg(test)]
#[path = "tests/facet_tests.rs"]
mod tests;
