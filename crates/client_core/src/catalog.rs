//! Turns the raw API collections into indexed storage and appearance links.

use std::collections::HashMap;

use shared::{
    domain::{CharId, CharacterEpisodeLink},
    protocol::{Character, Episode},
};
use tracing::debug;

use crate::sparse::{CharacterIndex, EpisodeIndex};

/// Only episodes of this series are kept.
pub const BREAKING_BAD_SERIES: &str = "Breaking Bad";

#[derive(Debug, Clone, Default)]
pub struct CharacterCatalog {
    pub characters: CharacterIndex,
    pub ids_by_name: HashMap<String, CharId>,
}

#[derive(Debug, Clone, Default)]
pub struct EpisodeCatalog {
    pub episodes: EpisodeIndex,
    pub links: Vec<CharacterEpisodeLink>,
    /// Cast names that matched no known character.
    pub unknown_names: usize,
}

/// Indexes characters by id and builds the name lookup. A later record wins
/// when two share an id or a name.
pub fn index_characters(characters: Vec<Character>) -> CharacterCatalog {
    let mut catalog = CharacterCatalog::default();
    for character in characters {
        catalog
            .ids_by_name
            .insert(character.name.clone(), character.char_id);
        catalog.characters.insert(character.char_id, character);
    }
    catalog
}

/// Keeps Breaking Bad episodes and links each listed cast name to its character.
/// Names missing from `ids_by_name` are skipped.
pub fn associate_episodes(
    episodes: Vec<Episode>,
    ids_by_name: &HashMap<String, CharId>,
) -> EpisodeCatalog {
    let mut catalog = EpisodeCatalog::default();
    for episode in episodes
        .into_iter()
        .filter(|episode| episode.series == BREAKING_BAD_SERIES)
    {
        for name in &episode.characters {
            match ids_by_name.get(name) {
                Some(&char_id) => catalog
                    .links
                    .push(CharacterEpisodeLink::new(char_id, episode.episode_id)),
                None => {
                    debug!(
                        episode_id = episode.episode_id.0,
                        "catalog: no character named {name:?}, skipping"
                    );
                    catalog.unknown_names += 1;
                }
            }
        }
        catalog.episodes.insert(episode.episode_id, episode);
    }
    catalog
}
