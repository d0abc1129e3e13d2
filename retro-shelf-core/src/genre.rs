//! Built-in genre table.
//!
//! Scrapers write genres as free text ("Shooter / Vertical", "Platform").
//! The table maps those labels to stable numeric ids so collections can
//! group by genre without string matching. Top-level genres have no parent;
//! sub-genres point at their top-level parent and are written as
//! `"PARENT / CHILD"` when labelled.

/// A single genre entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Genre {
    pub id: u32,
    pub parent: Option<u32>,
    pub name: &'static str,
    /// Short identifier used for collection and theme names (top-level only).
    pub short_name: &'static str,
}

/// Error returned when a label does not match any known genre.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown genre: '{0}'")]
pub struct UnknownGenre(pub String);

const fn top(id: u32, name: &'static str, short_name: &'static str) -> Genre {
    Genre {
        id,
        parent: None,
        name,
        short_name,
    }
}

const fn sub(id: u32, parent: u32, name: &'static str) -> Genre {
    Genre {
        id,
        parent: Some(parent),
        name,
        short_name: "",
    }
}

const GENRES: &[Genre] = &[
    top(256, "Action", "action"),
    sub(257, 256, "Platform"),
    sub(258, 256, "Beat'em Up"),
    sub(259, 256, "Fighting"),
    sub(260, 256, "Run & Gun"),
    top(512, "Shooter", "shooter"),
    sub(513, 512, "Vertical"),
    sub(514, 512, "Horizontal"),
    sub(515, 512, "Lightgun"),
    sub(516, 512, "FPS"),
    top(768, "Adventure", "adventure"),
    sub(769, 768, "Point & Click"),
    sub(770, 768, "Visual Novel"),
    top(1024, "Role Playing", "rpg"),
    sub(1025, 1024, "Action RPG"),
    sub(1026, 1024, "Dungeon Crawler"),
    top(1280, "Sports", "sports"),
    sub(1281, 1280, "Football"),
    sub(1282, 1280, "Golf"),
    top(1536, "Race", "race"),
    sub(1537, 1536, "Driving"),
    top(1792, "Puzzle", "puzzle"),
    top(2048, "Strategy", "strategy"),
    top(2304, "Simulation", "simulation"),
    top(2560, "Music", "music"),
    top(2816, "Casino", "casino"),
    top(3072, "Educational", "educational"),
];

impl Genre {
    pub fn all() -> &'static [Genre] {
        GENRES
    }

    /// Top-level genres in table order.
    pub fn top_level() -> impl Iterator<Item = &'static Genre> {
        GENRES.iter().filter(|g| g.parent.is_none())
    }

    pub fn by_id(id: u32) -> Option<&'static Genre> {
        GENRES.iter().find(|g| g.id == id)
    }

    /// The top-level ancestor of this genre (itself if already top-level).
    pub fn top_level_id(&self) -> u32 {
        self.parent.unwrap_or(self.id)
    }

    /// Upper-cased label: `"ACTION"` or `"ACTION / PLATFORM"`.
    pub fn label(&self) -> String {
        match self.parent.and_then(Genre::by_id) {
            Some(parent) => format!(
                "{} / {}",
                parent.name.to_uppercase(),
                self.name.to_uppercase()
            ),
            None => self.name.to_uppercase(),
        }
    }

    /// Resolve a free-text label. Case-insensitive; spaces around `/` are optional.
    pub fn from_label(label: &str) -> Result<&'static Genre, UnknownGenre> {
        let wanted = normalize_label(label);
        GENRES
            .iter()
            .find(|g| normalize_label(&g.label()) == wanted)
            .ok_or_else(|| UnknownGenre(label.to_string()))
    }
}

/// Whether `genre_id` is `top_id` itself or one of its sub-genres.
pub fn genre_belongs_to(genre_id: u32, top_id: u32) -> bool {
    Genre::by_id(genre_id).is_some_and(|g| g.top_level_id() == top_id)
}

fn normalize_label(label: &str) -> String {
    label
        .split('/')
        .map(|part| part.trim().to_uppercase())
        .collect::<Vec<_>>()
        .join("/")
}
