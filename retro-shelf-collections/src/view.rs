//! Seams towards the presentation layer and the active theme.
//!
//! The registry never renders anything. It reports membership changes
//! through [`CollectionViews`] and asks a [`ThemeProvider`] which system
//! folders and logos the current theme ships, which drives bundling.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

/// What happened to a collection or one of its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    MetadataChanged,
    Sorted,
    Removed,
}

/// Which node a change applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeTarget {
    /// A collection's root folder.
    Root { system: String },
    /// One entry inside a collection.
    Entry { system: String, key: PathBuf },
}

/// Receiver for collection change events, implemented by the UI.
pub trait CollectionViews {
    fn on_changed(&mut self, target: ChangeTarget, kind: ChangeKind);

    /// Detach a removed entry from any live view. Returns `true` if a view
    /// owned the node.
    fn detach_entry(&mut self, _system: &str, _key: &std::path::Path) -> bool {
        false
    }

    /// A view for `system` should rebuild itself from the registry.
    fn repopulate(&mut self, _system: &str) {}

    /// Drop any instantiated view for `system`.
    fn remove_view(&mut self, _system: &str) {}

    /// Show a short transient message.
    fn notify(&mut self, _message: &str, _duration: Duration) {}
}

/// Views implementation that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullViews;

impl CollectionViews for NullViews {
    fn on_changed(&mut self, _target: ChangeTarget, _kind: ChangeKind) {}
}

/// What the active theme provides.
pub trait ThemeProvider: Send + Sync {
    /// Every system folder the theme ships.
    fn system_folders(&self) -> Vec<String>;

    fn has_folder(&self, folder: &str) -> bool {
        self.system_folders().iter().any(|f| f == folder)
    }

    /// Whether the theme resolves a dedicated (non-default) logo for `system`.
    fn has_custom_logo(&self, system: &str) -> bool;

    /// Whether the theme has a default `theme.xml` that any system can fall back to.
    fn has_default_theme(&self) -> bool {
        false
    }
}

/// In-memory theme description.
#[derive(Debug, Clone, Default)]
pub struct StaticTheme {
    pub folders: BTreeSet<String>,
    pub logos: BTreeSet<String>,
    pub default_theme: bool,
}

impl StaticTheme {
    pub fn new<I, S>(folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            folders: folders.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_logo(mut self, system: impl Into<String>) -> Self {
        self.logos.insert(system.into());
        self
    }
}

impl ThemeProvider for StaticTheme {
    fn system_folders(&self) -> Vec<String> {
        self.folders.iter().cloned().collect()
    }

    fn has_folder(&self, folder: &str) -> bool {
        self.folders.contains(folder)
    }

    fn has_custom_logo(&self, system: &str) -> bool {
        self.logos.contains(system)
    }

    fn has_default_theme(&self) -> bool {
        self.default_theme
    }
}
