//! Read-only projections of [`StoreState`], recomputed on every call.

use std::collections::HashSet;

use serde::Serialize;
use shared::{
    domain::{CharId, CharacterEpisodeLink, EpisodeId},
    protocol::{Character, Episode},
};

use crate::{
    sparse::{CharacterIndex, EpisodeIndex},
    state::StoreState,
};

/// A character paired with whether it appears in the episode being viewed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CharacterAppearance<'a> {
    pub character: &'a Character,
    pub appearance: bool,
}

impl StoreState {
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Characters offered by the character selector. With the filter flag set
    /// only characters with at least one episode link are returned.
    pub fn selectable_characters(&self) -> Vec<&Character> {
        if !self.filter_character {
            return self.characters.values().collect();
        }

        let linked: HashSet<CharId> = self.links.iter().map(|link| link.char_id).collect();
        self.characters
            .values()
            .filter(|character| linked.contains(&character.char_id))
            .collect()
    }

    pub fn all_characters(&self) -> &CharacterIndex {
        &self.characters
    }

    pub fn all_episodes(&self) -> &EpisodeIndex {
        &self.episodes
    }

    pub fn links(&self) -> &[CharacterEpisodeLink] {
        &self.links
    }

    pub fn current_character_id(&self) -> CharId {
        self.current_char_id
    }

    pub fn current_episode_id(&self) -> EpisodeId {
        self.current_episode_id
    }

    /// `None` when nothing is selected or the selected id is a hole.
    pub fn current_character(&self) -> Option<&Character> {
        if self.current_char_id.is_unset() {
            return None;
        }
        self.characters.get(self.current_char_id)
    }

    /// `None` when nothing is selected or the selected id is a hole.
    pub fn current_episode(&self) -> Option<&Episode> {
        if self.current_episode_id.is_unset() {
            return None;
        }
        self.episodes.get(self.current_episode_id)
    }

    /// Episodes of the current character in link order.
    pub fn episodes_for_current_character(&self) -> Vec<&Episode> {
        self.links
            .iter()
            .filter(|link| link.char_id == self.current_char_id)
            .filter_map(|link| self.episodes.get(link.episode_id))
            .collect()
    }

    /// Cast of the current episode, sorted by name.
    pub fn characters_for_current_episode(&self) -> Vec<CharacterAppearance<'_>> {
        let mut cast: Vec<_> = self
            .links
            .iter()
            .filter(|link| link.episode_id == self.current_episode_id)
            .filter_map(|link| self.characters.get(link.char_id))
            .map(|character| CharacterAppearance {
                character,
                appearance: true,
            })
            .collect();
        cast.sort_by(|a, b| a.character.name.cmp(&b.character.name));
        cast
    }

    /// Every character with its appearance in the current episode. Appearing
    /// characters come first, each group sorted by name.
    pub fn editable_characters_for_current_episode(&self) -> Vec<CharacterAppearance<'_>> {
        let appearing: HashSet<CharId> = self
            .links
            .iter()
            .filter(|link| link.episode_id == self.current_episode_id)
            .map(|link| link.char_id)
            .collect();

        let mut roster: Vec<_> = self
            .characters
            .values()
            .map(|character| CharacterAppearance {
                character,
                appearance: appearing.contains(&character.char_id),
            })
            .collect();
        roster.sort_by(|a, b| {
            b.appearance
                .cmp(&a.appearance)
                .then_with(|| a.character.name.cmp(&b.character.name))
        });
        roster
    }

    pub fn filter_character_flag(&self) -> bool {
        self.filter_character
    }

    pub fn edit_character_flag(&self) -> bool {
        self.edit_character
    }
}

#[cfg(test)]
#[path = "tests/views_tests.rs"]
mod tests;
