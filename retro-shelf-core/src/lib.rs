//! Game corpus model shared by the retro-shelf crates.
//!
//! The frontend loads each physical system's gamelist into a [`GameSystem`]
//! tree; everything else (collections, filters, views) reads from the
//! resulting [`GameCorpus`].

pub mod arcade;
pub mod game;
pub mod genre;
pub mod system;
pub mod util;

pub use arcade::ArcadeSystem;
pub use game::{Game, GameMetadata};
pub use genre::{Genre, UnknownGenre};
pub use system::{GameCorpus, GameFolder, GameNode, GameSystem, SystemFlags, SystemMetadata};
