//! Roll-up metadata for a collection's root folder.

use retro_shelf_core::util::parse_leading_int;

use crate::collection::{CollectionSystem, FolderMetadata};

/// Number of members sampled for the description and rolled-up fields.
const SAMPLE_SIZE: usize = 4;
const VARIOUS: &str = "Various";

/// Recompute the root folder metadata from the collection's members.
///
/// Rating and players take the maximum, release date the earliest, and
/// developer and genre the common value (or "Various") over the first few
/// members. Media comes from one random member.
pub fn update_collection_folder_metadata(system: &mut CollectionSystem) {
    let games = system.games();
    if games.is_empty() {
        system.folder = FolderMetadata::default();
        return;
    }

    let mut folder = FolderMetadata::default();
    let mut developer: Option<String> = None;
    let mut genre: Option<String> = None;
    let mut names = String::new();

    for game in games.iter().take(SAMPLE_SIZE) {
        let meta = game.metadata();
        if let Some(rating) = meta.rating {
            folder.rating = folder.rating.max(rating);
        }
        if let Some(players) = meta.players.as_deref() {
            folder.players = folder.players.max(max_players(players));
        }
        if let Some(date) = meta.release_date.as_deref().filter(|d| !d.is_empty()) {
            match &folder.release_date {
                Some(current) if current.as_str() <= date => {}
                _ => folder.release_date = Some(date.to_string()),
            }
        }
        roll_up(&mut developer, meta.developer.as_deref());
        roll_up(&mut genre, meta.genre.as_deref());

        names.push_str("\n- ");
        names.push_str(game.name());
    }

    let count = games.len();
    let noun = if count == 1 { "game" } else { "games" };
    folder.description = format!("This collection contains {count} {noun}, including :{names}");
    if let Some(developer) = developer {
        folder.developer = developer;
    }
    if let Some(genre) = genre {
        folder.genre = genre;
    }

    if let Some(random) = system.random_game() {
        let meta = random.metadata();
        folder.image = meta.image.clone();
        folder.thumbnail = meta.thumbnail.clone();
        folder.video = meta.video.clone();
    }

    system.folder = folder;
}

/// Upper bound of a players string: "1-4" is 4, "2+" is 2, "3" is 3.
fn max_players(players: &str) -> u32 {
    let upper = players
        .trim_end_matches('+')
        .rsplit('-')
        .next()
        .unwrap_or(players);
    parse_leading_int(upper).clamp(0, u32::MAX as i64) as u32
}

fn roll_up(current: &mut Option<String>, value: Option<&str>) {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return;
    };
    match current {
        None => *current = Some(value.to_string()),
        Some(existing) if existing != value => *existing = VARIOUS.to_string(),
        Some(_) => {}
    }
}

#[cfg(test)]
#[path = "tests/metadata_tests.rs"]
mod tests;
