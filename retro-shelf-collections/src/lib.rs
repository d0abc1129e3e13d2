//! Game collections for the retro-shelf frontend.
//!
//! Collections are virtual systems built from the games of the physical
//! systems in a [`GameCorpus`](retro_shelf_core::GameCorpus):
//! - auto collections computed from metadata (favorites, last played,
//!   genres, arcade boards, ...)
//! - static custom collections listing games by portable path
//! - dynamic custom collections defined by a saved filter
//!
//! [`CollectionRegistry`] owns all of them and keeps the displayed system
//! list in sync.

pub mod collection;
pub mod decl;
pub mod display;
pub mod dynamic_filter;
pub mod error;
pub mod facet;
pub mod metadata;
pub mod persistence;
pub mod populate;
pub mod registry;
pub mod settings;
pub mod view;
pub mod worker_pool;

pub use collection::{CollectionEntry, CollectionItem, CollectionKind, CollectionSystem, FolderMetadata, SortOrder};
pub use decl::{CollectionDecl, CollectionType, system_decls};
pub use display::{SystemListEntry, physical_system_list};
pub use dynamic_filter::DynamicFilter;
pub use error::CollectionError;
pub use facet::{Facet, FacetIndex, FacetKeys, FilterDefaults};
pub use persistence::{CollectionPaths, StoredKind};
pub use registry::{CollectionRegistry, FilterSeed};
pub use settings::{CollectionSettings, SystemSortMode, UiMode};
pub use view::{ChangeKind, ChangeTarget, CollectionViews, NullViews, StaticTheme, ThemeProvider};
