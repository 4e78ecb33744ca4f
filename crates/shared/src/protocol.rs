//! Records as served by the catalog API's `characters` and `episodes` endpoints.
//!
//! Only the fields the store relies on are typed. Everything else is kept as
//! raw JSON in `details`, so a malformed descriptive field never fails the
//! whole collection.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::{CharId, EpisodeId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub char_id: CharId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Birthday, occupation, img, status, nickname, portrayed, ...
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Character {
    /// A record carrying only the fields the store relies on.
    pub fn named(char_id: CharId, name: impl Into<String>) -> Self {
        Self {
            char_id,
            name: name.into(),
            details: Map::new(),
        }
    }

    pub fn nickname(&self) -> Option<String> {
        detail_text(&self.details, "nickname")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub episode_id: EpisodeId,
    /// Empty when the record has none, which keeps it out of every series filter.
    #[serde(default, deserialize_with = "null_as_default")]
    pub series: String,
    /// Names of the characters appearing in the episode, as free text.
    #[serde(default, deserialize_with = "null_as_default")]
    pub characters: Vec<String>,
    /// Title, season, episode number, air date, ...
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Episode {
    pub fn new(
        episode_id: EpisodeId,
        series: impl Into<String>,
        characters: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            episode_id,
            series: series.into(),
            characters: characters.into_iter().map(Into::into).collect(),
            details: Map::new(),
        }
    }

    pub fn title(&self) -> Option<String> {
        detail_text(&self.details, "title")
    }

    pub fn season(&self) -> Option<String> {
        detail_text(&self.details, "season")
    }

    pub fn episode_number(&self) -> Option<String> {
        detail_text(&self.details, "episode")
    }

    pub fn air_date(&self) -> Option<String> {
        detail_text(&self.details, "air_date")
    }
}

/// Strings come back trimmed, numbers as their decimal text; anything else is `None`.
fn detail_text(details: &Map<String, Value>, key: &str) -> Option<String> {
    match details.get(key)? {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
