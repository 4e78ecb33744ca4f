use std::sync::Arc;

use tokio::sync::{broadcast, Mutex, RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

pub mod catalog;
pub mod source;
pub mod sparse;
pub mod state;
pub mod views;

pub use catalog::{associate_episodes, index_characters, BREAKING_BAD_SERIES};
pub use source::{
    CatalogResource, CatalogSource, HttpCatalogSource, SourceError, DEFAULT_API_BASE_URL,
};
pub use sparse::{CharacterIndex, EpisodeIndex, SparseIndex};
pub use state::{Mutation, MutationKind, StoreOptions, StoreState};
pub use views::CharacterAppearance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Committed(MutationKind),
}

/// Which fetch stopped an initialization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Characters,
    Episodes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub characters: usize,
    pub episodes: usize,
    pub links: usize,
    pub unknown_names: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    AlreadyInitialized,
    Loaded(LoadSummary),
    /// A fetch failed. Anything committed before it stays committed and the
    /// store remains uninitialized.
    Aborted(LoadStage),
}

/// Session-wide catalog store.
///
/// State is only changed by committing [`Mutation`]s; every commit is
/// announced on the event channel. Readers take a snapshot guard through
/// [`DataStore::read`] and use the views on [`StoreState`].
pub struct DataStore {
    source: Arc<dyn CatalogSource>,
    state: RwLock<StoreState>,
    init_guard: Mutex<()>,
    events: broadcast::Sender<StoreEvent>,
}

impl DataStore {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self::with_options(source, StoreOptions::default())
    }

    pub fn with_options(source: Arc<dyn CatalogSource>, options: StoreOptions) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            source,
            state: RwLock::new(StoreState::new(options)),
            init_guard: Mutex::new(()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Drop the guard before awaiting [`DataStore::commit`]; holding it across a
    /// commit deadlocks the task.
    pub async fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().await
    }

    pub async fn commit(&self, mutation: Mutation) {
        let kind = mutation.kind();
        self.state.write().await.apply(mutation);
        debug!(mutation = kind.as_str(), "store: committed");
        // No subscribers is fine.
        let _ = self.events.send(StoreEvent::Committed(kind));
    }

    /// Loads characters, then episodes, and links them by cast name.
    ///
    /// Runs at most once successfully per store. Fetch failures abort without
    /// retrying; the outcome reports where it stopped.
    pub async fn initialize(&self) -> InitOutcome {
        let _init = self.init_guard.lock().await;
        if self.state.read().await.is_initialized() {
            return InitOutcome::AlreadyInitialized;
        }

        let characters = match self.source.fetch_characters().await {
            Ok(characters) => characters,
            Err(err) => {
                warn!("store: character load failed, staying uninitialized: {err}");
                return InitOutcome::Aborted(LoadStage::Characters);
            }
        };
        let character_catalog = index_characters(characters);
        let character_count = character_catalog.characters.len();
        self.commit(Mutation::SetCharacters(character_catalog.characters))
            .await;

        let episodes = match self.source.fetch_episodes().await {
            Ok(episodes) => episodes,
            Err(err) => {
                warn!(
                    characters = character_count,
                    "store: episode load failed, staying uninitialized: {err}"
                );
                return InitOutcome::Aborted(LoadStage::Episodes);
            }
        };
        let episode_catalog = associate_episodes(episodes, &character_catalog.ids_by_name);
        let summary = LoadSummary {
            characters: character_count,
            episodes: episode_catalog.episodes.len(),
            links: episode_catalog.links.len(),
            unknown_names: episode_catalog.unknown_names,
        };

        self.commit(Mutation::SetEpisodes(episode_catalog.episodes))
            .await;
        self.commit(Mutation::SetCharacterEpisodeLinks(episode_catalog.links))
            .await;
        self.commit(Mutation::SetInitialized(true)).await;

        info!(
            characters = summary.characters,
            episodes = summary.episodes,
            links = summary.links,
            unknown_names = summary.unknown_names,
            "store: catalog loaded"
        );
        InitOutcome::Loaded(summary)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
