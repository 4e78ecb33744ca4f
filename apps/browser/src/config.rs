use std::{fs, io, path::Path};

use anyhow::Context;
use client_core::{StoreOptions, DEFAULT_API_BASE_URL};
use serde::Deserialize;
use shared::domain::{CharId, EpisodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub filter_character: bool,
    pub current_char_id: i64,
    pub current_episode_id: i64,
}

impl Default for Settings {
    fn default() -> Self {
        let options = StoreOptions::default();
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            filter_character: options.filter_character,
            current_char_id: options.current_char_id.0,
            current_episode_id: options.current_episode_id.0,
        }
    }
}

impl Settings {
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            filter_character: self.filter_character,
            current_char_id: CharId(self.current_char_id),
            current_episode_id: EpisodeId(self.current_episode_id),
            ..StoreOptions::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_base_url: Option<String>,
    filter_character: Option<bool>,
    current_char_id: Option<i64>,
    current_episode_id: Option<i64>,
}

/// Defaults, then `path` if it exists, then environment variables.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

fn load_settings_with(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file_config(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, lookup)?;
    Ok(settings)
}

fn apply_file_config(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileConfig = toml::from_str(raw)?;
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.filter_character {
        settings.filter_character = v;
    }
    if let Some(v) = file_cfg.current_char_id {
        settings.current_char_id = v;
    }
    if let Some(v) = file_cfg.current_episode_id {
        settings.current_episode_id = v;
    }
    Ok(())
}

fn apply_env(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("CATALOG_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__FILTER_CHARACTER") {
        settings.filter_character = v
            .trim()
            .parse()
            .with_context(|| format!("APP__FILTER_CHARACTER must be true or false, got '{v}'"))?;
    }
    if let Some(v) = lookup("APP__CURRENT_CHAR_ID") {
        settings.current_char_id = v
            .trim()
            .parse()
            .with_context(|| format!("APP__CURRENT_CHAR_ID must be an integer, got '{v}'"))?;
    }
    if let Some(v) = lookup("APP__CURRENT_EPISODE_ID") {
        settings.current_episode_id = v
            .trim()
            .parse()
            .with_context(|| format!("APP__CURRENT_EPISODE_ID must be an integer, got '{v}'"))?;
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
