//! Collection settings stored in `~/.config/retro-shelf/collections.toml`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use retro_shelf_core::util::{join_list, split_list};
use serde::{Deserialize, Serialize};

use crate::collection::SortOrder;
use crate::error::CollectionError;
use crate::facet::FilterDefaults;

/// Global ordering applied to the displayed system list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemSortMode {
    /// Keep corpus order.
    #[default]
    Default,
    Name,
    Manufacturer,
    Hardware,
    ReleaseDate,
    Subgroup,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    #[default]
    Full,
    Kiosk,
    Kid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionSettings {
    /// Comma-separated names of enabled auto collections.
    pub auto_collections: String,
    /// Comma-separated names of enabled custom collections.
    pub custom_collections: String,
    /// Group un-themed collections under a single "collections" entry.
    pub bundle_custom_collections: bool,
    pub hidden_systems: Vec<String>,
    /// Keep games of hidden systems in auto collections.
    pub hidden_systems_show_games: bool,
    pub sort_systems: SystemSortMode,
    /// Populate enabled collections on a worker pool at load time.
    pub threaded_loading: bool,
    /// Worker count for threaded loading; `None` uses available parallelism.
    pub worker_threads: Option<usize>,
    /// System name -> extensions (without dot) excluded from auto collections.
    pub hidden_extensions: BTreeMap<String, Vec<String>>,
    /// Collection name -> sort order overriding the declaration default.
    pub sort_orders: BTreeMap<String, SortOrder>,
    pub ui_mode: UiMode,
    pub show_hidden_games: bool,
    pub force_disable_filters: bool,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            auto_collections: String::new(),
            custom_collections: String::new(),
            bundle_custom_collections: true,
            hidden_systems: Vec::new(),
            hidden_systems_show_games: false,
            sort_systems: SystemSortMode::Default,
            threaded_loading: true,
            worker_threads: None,
            hidden_extensions: BTreeMap::new(),
            sort_orders: BTreeMap::new(),
            ui_mode: UiMode::Full,
            show_hidden_games: true,
            force_disable_filters: false,
        }
    }
}

impl CollectionSettings {
    pub fn enabled_auto(&self) -> Vec<String> {
        split_list(&self.auto_collections, ',')
    }

    pub fn enabled_custom(&self) -> Vec<String> {
        split_list(&self.custom_collections, ',')
    }

    pub fn set_enabled_auto<S: AsRef<str>>(&mut self, names: &[S]) {
        self.auto_collections = join_list(names, ',');
    }

    pub fn set_enabled_custom<S: AsRef<str>>(&mut self, names: &[S]) {
        self.custom_collections = join_list(names, ',');
    }

    pub fn is_system_hidden(&self, system: &str) -> bool {
        self.hidden_systems.iter().any(|s| s == system)
    }

    /// Hidden extensions for a system, normalised to `.ext` lowercase.
    pub fn hidden_extensions_for(&self, system: &str) -> Vec<String> {
        self.hidden_extensions
            .get(system)
            .map(|exts| {
                exts.iter()
                    .map(|e| format!(".{}", e.trim_start_matches('.').to_lowercase()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn filter_defaults(&self) -> FilterDefaults {
        FilterDefaults {
            kid_mode: self.ui_mode == UiMode::Kid,
            hide_hidden: !self.show_hidden_games,
            force_disabled: self.force_disable_filters,
        }
    }

    /// Worker count for a batch of `jobs` collections.
    pub fn worker_count(&self, jobs: usize) -> usize {
        let available = self.worker_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        available.clamp(1, jobs.max(1))
    }
}

/// Returns `~/.config/retro-shelf/collections.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("retro-shelf").join("collections.toml")
}

/// Load settings from disk, returning defaults if missing or corrupt.
pub fn load_settings() -> CollectionSettings {
    load_settings_from(&settings_path())
}

pub fn load_settings_from(path: &Path) -> CollectionSettings {
    match try_load_settings_from(path) {
        Ok(settings) => settings,
        Err(CollectionError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            CollectionSettings::default()
        }
        Err(e) => {
            log::warn!("Failed to load settings at {}: {}", path.display(), e);
            CollectionSettings::default()
        }
    }
}

/// Load settings, reporting a missing or corrupt file as an error.
pub fn try_load_settings_from(path: &Path) -> Result<CollectionSettings, CollectionError> {
    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|e| CollectionError::settings(e.to_string()))
}

/// Save settings to disk atomically (write to temp, then rename).
pub fn save_settings(settings: &CollectionSettings) -> Result<(), CollectionError> {
    save_settings_to(settings, &settings_path())
}

pub fn save_settings_to(settings: &CollectionSettings, path: &Path) -> Result<(), CollectionError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents =
        toml::to_string_pretty(settings).map_err(|e| CollectionError::settings(e.to_string()))?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
