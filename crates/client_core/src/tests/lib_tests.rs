use super::*;
use async_trait::async_trait;
use shared::{
    domain::{CharId, CharacterEpisodeLink, EpisodeId},
    protocol::{Character, Episode},
};
use std::{
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::Duration,
};

struct TestCatalogSource {
    characters: Vec<Character>,
    episodes: Vec<Episode>,
    fail_characters: bool,
    fail_episodes: AtomicBool,
    delay: Option<Duration>,
    character_calls: AtomicUsize,
    episode_calls: AtomicUsize,
}

impl TestCatalogSource {
    fn ok(characters: Vec<Character>, episodes: Vec<Episode>) -> Self {
        Self {
            characters,
            episodes,
            fail_characters: false,
            fail_episodes: AtomicBool::new(false),
            delay: None,
            character_calls: AtomicUsize::new(0),
            episode_calls: AtomicUsize::new(0),
        }
    }

    fn failing_characters() -> Self {
        let mut source = Self::ok(Vec::new(), Vec::new());
        source.fail_characters = true;
        source
    }

    fn failing_episodes(characters: Vec<Character>, episodes: Vec<Episode>) -> Self {
        let source = Self::ok(characters, episodes);
        source.fail_episodes.store(true, Ordering::SeqCst);
        source
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn calls(&self) -> (usize, usize) {
        (
            self.character_calls.load(Ordering::SeqCst),
            self.episode_calls.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl CatalogSource for TestCatalogSource {
    async fn fetch_characters(&self) -> Result<Vec<Character>, SourceError> {
        self.character_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_characters {
            return Err(SourceError::new(
                CatalogResource::Characters,
                "connection refused",
            ));
        }
        Ok(self.characters.clone())
    }

    async fn fetch_episodes(&self) -> Result<Vec<Episode>, SourceError> {
        self.episode_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_episodes.load(Ordering::SeqCst) {
            return Err(SourceError::new(
                CatalogResource::Episodes,
                "expected value at line 1 column 1",
            ));
        }
        Ok(self.episodes.clone())
    }
}

fn walt_and_saul() -> Vec<Character> {
    vec![
        Character::named(CharId(1), "Walt"),
        Character::named(CharId(2), "Saul"),
    ]
}

fn mixed_series_episodes() -> Vec<Episode> {
    vec![
        Episode::new(EpisodeId(1), "Breaking Bad", ["Walt"]),
        Episode::new(EpisodeId(2), "Better Call Saul", ["Saul"]),
    ]
}

fn store_with(source: &Arc<TestCatalogSource>) -> DataStore {
    DataStore::new(source.clone())
}

#[tokio::test]
async fn initialize_keeps_only_breaking_bad_episodes() {
    let source = Arc::new(TestCatalogSource::ok(walt_and_saul(), mixed_series_episodes()));
    let store = store_with(&source);

    let outcome = store.initialize().await;
    assert_eq!(
        outcome,
        InitOutcome::Loaded(LoadSummary {
            characters: 2,
            episodes: 1,
            links: 1,
            unknown_names: 0,
        })
    );

    let state = store.read().await;
    assert!(state.is_initialized());
    assert_eq!(
        state.all_episodes().ids().collect::<Vec<_>>(),
        vec![EpisodeId(1)]
    );
    assert_eq!(
        state.links(),
        &[CharacterEpisodeLink::new(CharId(1), EpisodeId(1))]
    );
    let cast: Vec<_> = state
        .characters_for_current_episode()
        .into_iter()
        .map(|entry| (entry.character.name.as_str(), entry.appearance))
        .collect();
    assert_eq!(cast, vec![("Walt", true)]);
}

#[tokio::test]
async fn second_initialize_is_a_no_op() {
    let source = Arc::new(TestCatalogSource::ok(walt_and_saul(), mixed_series_episodes()));
    let store = store_with(&source);

    assert!(matches!(store.initialize().await, InitOutcome::Loaded(_)));
    assert_eq!(store.initialize().await, InitOutcome::AlreadyInitialized);
    assert_eq!(source.calls(), (1, 1));
}

#[tokio::test]
async fn concurrent_initialize_fetches_once() {
    let source = Arc::new(
        TestCatalogSource::ok(walt_and_saul(), mixed_series_episodes())
            .with_delay(Duration::from_millis(20)),
    );
    let store = store_with(&source);

    let (first, second) = tokio::join!(store.initialize(), store.initialize());
    assert!(matches!(first, InitOutcome::Loaded(_)));
    assert_eq!(second, InitOutcome::AlreadyInitialized);
    assert_eq!(source.calls(), (1, 1));
}

#[tokio::test]
async fn unknown_cast_names_are_skipped() {
    let episodes = vec![Episode::new(
        EpisodeId(1),
        "Breaking Bad",
        ["Walt", "Holly White"],
    )];
    let source = Arc::new(TestCatalogSource::ok(walt_and_saul(), episodes));
    let store = store_with(&source);

    match store.initialize().await {
        InitOutcome::Loaded(summary) => {
            assert_eq!(summary.links, 1);
            assert_eq!(summary.unknown_names, 1);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(store.read().await.links().len(), 1);
}

#[tokio::test]
async fn character_failure_leaves_store_empty() {
    let source = Arc::new(TestCatalogSource::failing_characters());
    let store = store_with(&source);

    assert_eq!(
        store.initialize().await,
        InitOutcome::Aborted(LoadStage::Characters)
    );
    assert_eq!(source.calls(), (1, 0));

    let state = store.read().await;
    assert!(!state.is_initialized());
    assert!(state.all_characters().is_empty());
    assert!(state.all_episodes().is_empty());
}

#[tokio::test]
async fn episode_failure_keeps_committed_characters() {
    let source = Arc::new(TestCatalogSource::failing_episodes(
        walt_and_saul(),
        mixed_series_episodes(),
    ));
    let store = store_with(&source);

    assert_eq!(
        store.initialize().await,
        InitOutcome::Aborted(LoadStage::Episodes)
    );

    let state = store.read().await;
    assert!(!state.is_initialized());
    assert_eq!(state.all_characters().len(), 2);
    assert!(state.all_episodes().is_empty());
    assert!(state.links().is_empty());
}

#[tokio::test]
async fn initialize_can_be_called_again_after_abort() {
    let source = Arc::new(TestCatalogSource::failing_episodes(
        walt_and_saul(),
        mixed_series_episodes(),
    ));
    let store = store_with(&source);

    assert_eq!(
        store.initialize().await,
        InitOutcome::Aborted(LoadStage::Episodes)
    );
    source.fail_episodes.store(false, Ordering::SeqCst);

    assert!(matches!(store.initialize().await, InitOutcome::Loaded(_)));
    assert_eq!(source.calls(), (2, 2));
    assert!(store.read().await.is_initialized());
}

#[tokio::test]
async fn commits_are_announced_in_order() {
    let source = Arc::new(TestCatalogSource::ok(walt_and_saul(), mixed_series_episodes()));
    let store = store_with(&source);
    let mut events = store.subscribe();

    store.initialize().await;
    store.commit(Mutation::AddLink(CharId(2))).await;

    let mut kinds = Vec::new();
    while let Ok(StoreEvent::Committed(kind)) = events.try_recv() {
        kinds.push(kind);
    }
    assert_eq!(
        kinds,
        vec![
            MutationKind::SetCharacters,
            MutationKind::SetEpisodes,
            MutationKind::SetCharacterEpisodeLinks,
            MutationKind::SetInitialized,
            MutationKind::AddLink,
        ]
    );
}

#[tokio::test]
async fn link_edits_flow_through_views() {
    let source = Arc::new(TestCatalogSource::ok(
        vec![
            Character::named(CharId(1), "Walt"),
            Character::named(CharId(3), "Jesse"),
        ],
        vec![Episode::new(EpisodeId(1), "Breaking Bad", ["Walt"])],
    ));
    let store = DataStore::with_options(
        source.clone(),
        StoreOptions {
            current_episode_id: EpisodeId(1),
            ..StoreOptions::default()
        },
    );
    store.initialize().await;

    store.commit(Mutation::AddLink(CharId(3))).await;
    {
        let state = store.read().await;
        let cast: Vec<_> = state
            .characters_for_current_episode()
            .into_iter()
            .map(|entry| entry.character.name.as_str())
            .collect();
        assert_eq!(cast, vec!["Jesse", "Walt"]);
    }

    store.commit(Mutation::RemoveLink(CharId(1))).await;
    store.commit(Mutation::RemoveLink(CharId(1))).await;
    let state = store.read().await;
    let roster: Vec<_> = state
        .editable_characters_for_current_episode()
        .into_iter()
        .map(|entry| (entry.character.name.as_str(), entry.appearance))
        .collect();
    assert_eq!(roster, vec![("Jesse", true), ("Walt", false)]);
    assert_eq!(state.links().len(), 1);
}

#[tokio::test]
async fn commit_proceeds_once_read_guard_is_dropped() {
    let source = Arc::new(TestCatalogSource::ok(walt_and_saul(), mixed_series_episodes()));
    let store = store_with(&source);

    let guard = store.read().await;
    let selected = guard.current_episode_id();
    drop(guard);

    tokio::time::timeout(
        Duration::from_secs(1),
        store.commit(Mutation::SetCurrentEpisodeId(EpisodeId(selected.0 + 1))),
    )
    .await
    .expect("commit must not wait on a released reader");
    assert_eq!(store.read().await.current_episode_id(), EpisodeId(2));
}
