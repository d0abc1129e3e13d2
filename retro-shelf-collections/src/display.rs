//! The displayed system list and its global orderings.

use std::cmp::Ordering;

use retro_shelf_core::{GameCorpus, GameSystem, SystemMetadata};

use crate::collection::CollectionSystem;
use crate::settings::SystemSortMode;

/// Names of frontend-configuration systems kept at the end of the list.
const LEGACY_SYSTEMS: [&str; 2] = ["retropie", "retrobat"];

/// One slot in the system carousel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemListEntry {
    pub name: String,
    pub full_name: String,
    pub theme_folder: String,
    pub metadata: SystemMetadata,
    pub is_collection: bool,
}

impl SystemListEntry {
    pub fn from_system(system: &GameSystem) -> Self {
        Self {
            name: system.name.clone(),
            full_name: system.full_name.clone(),
            theme_folder: system.theme_folder.clone(),
            metadata: system.metadata.clone(),
            is_collection: false,
        }
    }

    pub fn from_collection(system: &CollectionSystem) -> Self {
        Self {
            name: system.name.clone(),
            full_name: system.full_name.clone(),
            theme_folder: system.theme_folder.clone(),
            metadata: system.metadata.clone(),
            is_collection: true,
        }
    }
}

/// Every corpus system that has at least one entry, in corpus order.
pub fn physical_system_list(corpus: &GameCorpus) -> Vec<SystemListEntry> {
    corpus
        .systems
        .iter()
        .filter(|s| !s.root.children.is_empty())
        .map(|s| SystemListEntry::from_system(s))
        .collect()
}

/// Sort the list by display name, case-insensitively.
pub fn sort_by_full_name(list: &mut [SystemListEntry]) {
    list.sort_by(by_full_name);
}

/// Apply a global ordering. [`SystemSortMode::Default`] keeps the list as is.
pub fn sort_system_list(list: &mut [SystemListEntry], mode: SystemSortMode) {
    match mode {
        SystemSortMode::Default => {}
        SystemSortMode::Name => list.sort_by(by_full_name),
        SystemSortMode::Manufacturer => list.sort_by(by_manufacturer),
        SystemSortMode::Hardware => list.sort_by(by_hardware),
        SystemSortMode::ReleaseDate => list.sort_by(by_release_date),
        SystemSortMode::Subgroup => list.sort_by(by_subgroup),
    }
}

/// Move the first legacy configuration system to the end of the list.
pub fn float_legacy_system(list: &mut Vec<SystemListEntry>) {
    if let Some(pos) = list
        .iter()
        .position(|s| LEGACY_SYSTEMS.contains(&s.name.as_str()))
    {
        let legacy = list.remove(pos);
        list.push(legacy);
    }
}

fn upper(s: &str) -> String {
    s.to_uppercase()
}

fn by_full_name(a: &SystemListEntry, b: &SystemListEntry) -> Ordering {
    upper(&a.full_name).cmp(&upper(&b.full_name))
}

fn by_name(a: &SystemListEntry, b: &SystemListEntry) -> Ordering {
    upper(&a.name).cmp(&upper(&b.name))
}

/// Physical systems first, then collections.
fn collections_last(a: &SystemListEntry, b: &SystemListEntry) -> Ordering {
    a.is_collection.cmp(&b.is_collection)
}

fn by_manufacturer(a: &SystemListEntry, b: &SystemListEntry) -> Ordering {
    collections_last(a, b)
        .then_with(|| {
            if a.is_collection && b.is_collection {
                // "custom collection" before "auto collection"
                upper(&b.metadata.hardware_type).cmp(&upper(&a.metadata.hardware_type))
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| upper(&a.metadata.manufacturer).cmp(&upper(&b.metadata.manufacturer)))
        .then_with(|| a.metadata.release_year.cmp(&b.metadata.release_year))
        .then_with(|| by_name(a, b))
}

fn by_hardware(a: &SystemListEntry, b: &SystemListEntry) -> Ordering {
    collections_last(a, b)
        .then_with(|| upper(&a.metadata.hardware_type).cmp(&upper(&b.metadata.hardware_type)))
        .then_with(|| by_name(a, b))
}

fn by_release_date(a: &SystemListEntry, b: &SystemListEntry) -> Ordering {
    a.metadata
        .release_year
        .unwrap_or(0)
        .cmp(&b.metadata.release_year.unwrap_or(0))
        .then_with(|| b.is_collection.cmp(&a.is_collection))
        .then_with(|| by_name(a, b))
}

fn by_subgroup(a: &SystemListEntry, b: &SystemListEntry) -> Ordering {
    collections_last(a, b)
        .then_with(|| match (&a.metadata.group, &b.metadata.group) {
            (Some(x), Some(y)) => upper(x).cmp(&upper(y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| by_full_name(a, b))
}
