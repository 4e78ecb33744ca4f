use shared::domain::{CharId, CharacterEpisodeLink, EpisodeId};

use crate::sparse::{CharacterIndex, EpisodeIndex};

/// Initial selection state of a fresh store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub filter_character: bool,
    pub edit_character: bool,
    pub current_char_id: CharId,
    pub current_episode_id: EpisodeId,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            filter_character: true,
            edit_character: false,
            current_char_id: CharId(1),
            current_episode_id: EpisodeId(1),
        }
    }
}

/// Everything the store holds. Changed only through [`Mutation`]s.
#[derive(Debug, Clone)]
pub struct StoreState {
    pub(crate) initialized: bool,
    pub(crate) characters: CharacterIndex,
    pub(crate) episodes: EpisodeIndex,
    pub(crate) links: Vec<CharacterEpisodeLink>,
    pub(crate) current_char_id: CharId,
    pub(crate) current_episode_id: EpisodeId,
    pub(crate) filter_character: bool,
    pub(crate) edit_character: bool,
}

impl StoreState {
    pub fn new(options: StoreOptions) -> Self {
        Self {
            initialized: false,
            characters: CharacterIndex::new(),
            episodes: EpisodeIndex::new(),
            links: Vec::new(),
            current_char_id: options.current_char_id,
            current_episode_id: options.current_episode_id,
            filter_character: options.filter_character,
            edit_character: options.edit_character,
        }
    }

    pub fn apply(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::SetInitialized(value) => self.initialized = value,
            Mutation::SetCharacters(characters) => self.characters = characters,
            Mutation::SetEpisodes(episodes) => self.episodes = episodes,
            Mutation::SetCharacterEpisodeLinks(links) => self.links = links,
            Mutation::SetCurrentCharacterId(id) => self.current_char_id = id,
            Mutation::SetCurrentEpisodeId(id) => self.current_episode_id = id,
            Mutation::SetFilterCharacter(value) => self.filter_character = value,
            Mutation::SetEditCharacter(value) => self.edit_character = value,
            Mutation::RemoveLink(char_id) => {
                self.remove_link(char_id);
            }
            Mutation::AddLink(char_id) => self.add_link(char_id),
        }
    }

    /// Drops the first link between `char_id` and the current episode.
    /// Returns whether a link was removed.
    fn remove_link(&mut self, char_id: CharId) -> bool {
        let episode_id = self.current_episode_id;
        match self
            .links
            .iter()
            .position(|link| link.char_id == char_id && link.episode_id == episode_id)
        {
            Some(index) => {
                self.links.remove(index);
                true
            }
            None => false,
        }
    }

    /// Appends a link to the current episode without checking for an existing one.
    fn add_link(&mut self, char_id: CharId) {
        self.links
            .push(CharacterEpisodeLink::new(char_id, self.current_episode_id));
    }
}

impl Default for StoreState {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

#[derive(Debug, Clone)]
pub enum Mutation {
    SetInitialized(bool),
    SetCharacters(CharacterIndex),
    SetEpisodes(EpisodeIndex),
    SetCharacterEpisodeLinks(Vec<CharacterEpisodeLink>),
    SetCurrentCharacterId(CharId),
    SetCurrentEpisodeId(EpisodeId),
    SetFilterCharacter(bool),
    SetEditCharacter(bool),
    RemoveLink(CharId),
    AddLink(CharId),
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::SetInitialized(_) => MutationKind::SetInitialized,
            Self::SetCharacters(_) => MutationKind::SetCharacters,
            Self::SetEpisodes(_) => MutationKind::SetEpisodes,
            Self::SetCharacterEpisodeLinks(_) => MutationKind::SetCharacterEpisodeLinks,
            Self::SetCurrentCharacterId(_) => MutationKind::SetCurrentCharacterId,
            Self::SetCurrentEpisodeId(_) => MutationKind::SetCurrentEpisodeId,
            Self::SetFilterCharacter(_) => MutationKind::SetFilterCharacter,
            Self::SetEditCharacter(_) => MutationKind::SetEditCharacter,
            Self::RemoveLink(_) => MutationKind::RemoveLink,
            Self::AddLink(_) => MutationKind::AddLink,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    SetInitialized,
    SetCharacters,
    SetEpisodes,
    SetCharacterEpisodeLinks,
    SetCurrentCharacterId,
    SetCurrentEpisodeId,
    SetFilterCharacter,
    SetEditCharacter,
    RemoveLink,
    AddLink,
}

impl MutationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SetInitialized => "set_initialized",
            Self::SetCharacters => "set_characters",
            Self::SetEpisodes => "set_episodes",
            Self::SetCharacterEpisodeLinks => "set_character_episode_links",
            Self::SetCurrentCharacterId => "set_current_character_id",
            Self::SetCurrentEpisodeId => "set_current_episode_id",
            Self::SetFilterCharacter => "set_filter_character",
            Self::SetEditCharacter => "set_edit_character",
            Self::RemoveLink => "remove_link",
            Self::AddLink => "add_link",
        }
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
