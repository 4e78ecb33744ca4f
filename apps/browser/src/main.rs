use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{CharacterAppearance, DataStore, HttpCatalogSource, InitOutcome, Mutation};
use serde::Serialize;
use serde_json::json;
use shared::{
    domain::{CharId, EpisodeId},
    protocol::{Character, Episode},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "browser.toml")]
    config: PathBuf,
    /// Base URL of the catalog API.
    #[arg(long)]
    api_url: Option<String>,
    /// List characters without episode appearances too.
    #[arg(long)]
    all: bool,
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Characters,
    Episodes,
    Character {
        char_id: i64,
    },
    Episode {
        episode_id: i64,
    },
    EditEpisode {
        episode_id: i64,
        #[arg(long = "add")]
        add: Vec<i64>,
        #[arg(long = "remove")]
        remove: Vec<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config)?;
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }
    if cli.all {
        settings.filter_character = false;
    }

    let source = HttpCatalogSource::parse(&settings.api_base_url)
        .with_context(|| format!("invalid catalog API url '{}'", settings.api_base_url))?;
    info!(api_url = %source.base_url(), "browser: loading catalog");
    let store = DataStore::with_options(Arc::new(source), settings.store_options());

    if let InitOutcome::Aborted(stage) = store.initialize().await {
        bail!("catalog could not be loaded (stopped at {stage:?})");
    }

    match cli.command {
        Command::Characters => {
            let state = store.read().await;
            let characters = state.selectable_characters();
            emit(cli.json, &characters, || {
                characters.iter().map(|c| character_line(c)).collect()
            })?;
        }
        Command::Episodes => {
            let state = store.read().await;
            let episodes: Vec<&Episode> = state.all_episodes().values().collect();
            emit(cli.json, &episodes, || {
                episodes.iter().map(|e| episode_line(e)).collect()
            })?;
        }
        Command::Character { char_id } => {
            store
                .commit(Mutation::SetCurrentCharacterId(CharId(char_id)))
                .await;
            let state = store.read().await;
            let Some(character) = state.current_character() else {
                bail!("no character with id {char_id}");
            };
            let episodes = state.episodes_for_current_character();
            let detail = json!({ "character": character, "episodes": episodes });
            emit(cli.json, &detail, || {
                std::iter::once(character_line(character))
                    .chain(episodes.iter().map(|e| format!("  {}", episode_line(e))))
                    .collect()
            })?;
        }
        Command::Episode { episode_id } => {
            store
                .commit(Mutation::SetCurrentEpisodeId(EpisodeId(episode_id)))
                .await;
            let state = store.read().await;
            let Some(episode) = state.current_episode() else {
                bail!("no Breaking Bad episode with id {episode_id}");
            };
            let cast = state.characters_for_current_episode();
            let detail = json!({ "episode": episode, "characters": cast });
            emit(cli.json, &detail, || {
                std::iter::once(episode_line(episode))
                    .chain(
                        cast.iter()
                            .map(|entry| format!("  {}", character_line(entry.character))),
                    )
                    .collect()
            })?;
        }
        Command::EditEpisode {
            episode_id,
            add,
            remove,
        } => {
            store.commit(Mutation::SetEditCharacter(true)).await;
            store
                .commit(Mutation::SetCurrentEpisodeId(EpisodeId(episode_id)))
                .await;
            if store.read().await.current_episode().is_none() {
                bail!("no Breaking Bad episode with id {episode_id}");
            }
            for char_id in add {
                store.commit(Mutation::AddLink(CharId(char_id))).await;
            }
            for char_id in remove {
                store.commit(Mutation::RemoveLink(CharId(char_id))).await;
            }

            let state = store.read().await;
            let roster = state.editable_characters_for_current_episode();
            emit(cli.json, &roster, || roster.iter().map(roster_line).collect())?;
        }
    }

    Ok(())
}

fn emit<T: Serialize + ?Sized>(
    as_json: bool,
    value: &T,
    lines: impl FnOnce() -> Vec<String>,
) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        for line in lines() {
            println!("{line}");
        }
    }
    Ok(())
}

fn character_line(character: &Character) -> String {
    match character.nickname() {
        Some(nickname) => format!("{:>4}  {} ({nickname})", character.char_id, character.name),
        None => format!("{:>4}  {}", character.char_id, character.name),
    }
}

fn episode_line(episode: &Episode) -> String {
    let season = episode.season().unwrap_or_else(|| "?".into());
    let number = episode.episode_number().unwrap_or_else(|| "?".into());
    let title = episode.title().unwrap_or_else(|| "(untitled)".into());
    format!("{:>4}  S{season}E{number}  {title}", episode.episode_id)
}

fn roster_line(entry: &CharacterAppearance<'_>) -> String {
    let mark = if entry.appearance { "[x]" } else { "[ ]" };
    format!("{mark} {}", character_line(entry.character))
}
