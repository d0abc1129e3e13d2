//! Built-in collection declarations.

use retro_shelf_core::{ArcadeSystem, Genre};

use crate::collection::SortOrder;

/// Name of the declaration that stands for user collections as a group.
pub const CUSTOM_COLLECTIONS_NAME: &str = "collections";
pub const ALL_GAMES_NAME: &str = "all";
pub const LAST_PLAYED_NAME: &str = "recent";
pub const FAVORITES_NAME: &str = "favorites";

/// What a collection is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionType {
    AllGames,
    LastPlayed,
    Favorites,
    TwoPlayers,
    FourPlayers,
    NeverPlayed,
    Achievements,
    Arcade,
    VerticalArcade,
    LightGun,
    Wheel,
    /// Every game whose genre ids fall under this top-level genre.
    Genre(u32),
    /// Arcade games whose board name matches this arcade system id.
    ArcadeSubsystem(u16),
    Custom,
}

impl CollectionType {
    pub fn is_genre_or_subsystem(&self) -> bool {
        matches!(self, Self::Genre(_) | Self::ArcadeSubsystem(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDecl {
    pub kind: CollectionType,
    pub name: String,
    pub long_name: String,
    pub default_sort: SortOrder,
    pub theme_folder: String,
    pub is_custom: bool,
    pub display_if_empty: bool,
}

impl CollectionDecl {
    fn auto(
        kind: CollectionType,
        name: &str,
        long_name: &str,
        default_sort: SortOrder,
        theme_folder: &str,
    ) -> Self {
        Self {
            kind,
            name: name.to_string(),
            long_name: long_name.to_string(),
            default_sort,
            theme_folder: theme_folder.to_string(),
            is_custom: false,
            display_if_empty: true,
        }
    }

    /// Declaration for a user-created collection.
    pub fn custom(name: &str) -> Self {
        Self {
            kind: CollectionType::Custom,
            name: name.to_string(),
            long_name: name.to_string(),
            default_sort: SortOrder::FilenameAscending,
            theme_folder: name.to_string(),
            is_custom: true,
            display_if_empty: true,
        }
    }
}

/// Every built-in declaration: fixed auto collections, one per top-level
/// genre, one per arcade system, and the custom-collections marker.
pub fn system_decls() -> Vec<CollectionDecl> {
    use CollectionType as T;
    use SortOrder::*;

    let mut decls = vec![
        CollectionDecl::auto(T::AllGames, ALL_GAMES_NAME, "all games", FilenameAscending, "auto-allgames"),
        CollectionDecl::auto(T::LastPlayed, LAST_PLAYED_NAME, "last played", LastPlayedDescending, "auto-lastplayed"),
        CollectionDecl::auto(T::Favorites, FAVORITES_NAME, "favorites", FilenameAscending, "auto-favorites"),
        CollectionDecl::auto(T::TwoPlayers, "2players", "2 players", FilenameAscending, "auto-at2players"),
        CollectionDecl::auto(T::FourPlayers, "4players", "4 players", FilenameAscending, "auto-at4players"),
        CollectionDecl::auto(T::NeverPlayed, "neverplayed", "never played", FilenameAscending, "auto-neverplayed"),
        CollectionDecl::auto(T::Achievements, "retroachievements", "retroachievements", FilenameAscending, "auto-retroachievements"),
        CollectionDecl::auto(T::Arcade, "arcade", "arcade", FilenameAscending, "arcade"),
        CollectionDecl::auto(T::VerticalArcade, "vertical", "vertical arcade", FilenameAscending, "auto-verticalarcade"),
        CollectionDecl::auto(T::LightGun, "lightgun", "light gun games", FilenameAscending, "auto-lightgun"),
        CollectionDecl::auto(T::Wheel, "wheel", "wheel games", FilenameAscending, "auto-wheel"),
    ];

    for genre in Genre::top_level() {
        let name = format!("genre-{}", genre.short_name);
        decls.push(CollectionDecl {
            kind: T::Genre(genre.id),
            long_name: genre.name.to_lowercase(),
            default_sort: FilenameAscending,
            theme_folder: name.clone(),
            name,
            is_custom: false,
            display_if_empty: false,
        });
    }

    for arcade in ArcadeSystem::all() {
        decls.push(CollectionDecl {
            kind: T::ArcadeSubsystem(arcade.id),
            name: format!("z{}", arcade.short_name),
            long_name: arcade.display_name.to_string(),
            default_sort: FilenameAscending,
            theme_folder: arcade.short_name.to_string(),
            is_custom: false,
            display_if_empty: false,
        });
    }

    decls.push(CollectionDecl {
        kind: T::Custom,
        name: CUSTOM_COLLECTIONS_NAME.to_string(),
        long_name: "collections".to_string(),
        default_sort: FilenameAscending,
        theme_folder: "custom-collections".to_string(),
        is_custom: true,
        display_if_empty: true,
    });

    decls
}
