use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Zero is the "nothing selected" value.
            pub fn is_unset(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype!(CharId);
id_newtype!(EpisodeId);

/// One character's appearance in one episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterEpisodeLink {
    pub char_id: CharId,
    pub episode_id: EpisodeId,
}

impl CharacterEpisodeLink {
    pub fn new(char_id: CharId, episode_id: EpisodeId) -> Self {
        Self {
            char_id,
            episode_id,
        }
    }
}
