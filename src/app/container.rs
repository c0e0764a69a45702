//! Session container for the movetree application.
//!
//! The container owns the rules engine and the durable store, and keeps a
//! registry of live sessions. Every operation on a session locks that session
//! alone, so at most one move is in flight per session while distinct
//! sessions proceed independently.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use super::config::SessionConfig;
use crate::{
    Result,
    adapters::{InMemoryStore, ShakmatyEngine},
    applier::MoveApplier,
    codec,
    error::Error,
    identifiers::{NodeId, SessionId, StorageRef},
    navigator::{Navigator, Step},
    ports::{CandidateMove, MoveRequest, RulesEngine, TreeStore},
    tree::{IdAllocator, MoveNode, MoveTree},
    validation,
};

/// One live session: its cursor and the policies it was started with.
///
/// `closed` is set under the session lock once the session has been ended or
/// discarded, so a caller that fetched the handle earlier cannot mutate a
/// tree that is no longer live.
#[derive(Debug)]
struct Session {
    navigator: Navigator,
    config: SessionConfig,
    closed: bool,
}

type SessionHandle = Arc<Mutex<Session>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Application with dependency injection.
///
/// Centralizes the wiring of the rules engine and the tree store and hands
/// out sessions over move trees.
///
/// # Examples
///
/// ```
/// use movetree::app::App;
/// use movetree::adapters::InMemoryStore;
///
/// let app = App::builder().with_store(InMemoryStore::new()).build();
/// let session = app.start_session("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")?;
///
/// let e4 = app.play_at_cursor(&session, &"e2e4".parse()?)?;
/// assert_eq!(e4.san.as_deref(), Some("e4"));
///
/// let reference = app.end_session(&session)?;
/// let restored = app.restore_session(&reference)?;
/// assert_eq!(app.snapshot(&restored)?.len(), 2);
/// # Ok::<(), movetree::Error>(())
/// ```
pub struct App {
    store: Arc<dyn TreeStore + Send + Sync>,
    engine: Arc<dyn RulesEngine + Send + Sync>,
    config: SessionConfig,
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
    next_session: AtomicU64,
}

impl App {
    /// Create an app with the shakmaty engine, an in-memory store and
    /// default session policies.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for constructing an app with custom dependencies.
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get the tree store.
    pub fn store(&self) -> Arc<dyn TreeStore + Send + Sync> {
        Arc::clone(&self.store)
    }

    /// Get the rules engine.
    pub fn engine(&self) -> Arc<dyn RulesEngine + Send + Sync> {
        Arc::clone(&self.engine)
    }

    /// Start a session on a fresh tree rooted at `position`.
    ///
    /// # Errors
    ///
    /// Whatever the engine reports for a position it cannot read.
    pub fn start_session(&self, position: &str) -> Result<SessionId> {
        self.engine.legal_moves(position)?;
        let tree =
            MoveTree::with_allocator(position, IdAllocator::new(self.config.id_strategy));
        let session = self.register(Navigator::new(tree)?);
        tracing::info!(%session, "session started");
        Ok(session)
    }

    /// Decode, validate and resume a tree previously saved under `reference`.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown reference, the codec's errors for a damaged
    /// blob, `InvalidTree` listing every violation for a tree that decodes
    /// but breaks an invariant.
    pub fn restore_session(&self, reference: &StorageRef) -> Result<SessionId> {
        let blob = self.store.get(reference)?;
        let tree = codec::decode_with(&blob, &self.config.decode_options())?;
        let session = self
            .open_session(tree)
            .inspect_err(|e| tracing::warn!(%reference, error = %e, "stored tree rejected"))?;
        tracing::info!(%session, %reference, "session restored");
        Ok(session)
    }

    /// Validate `tree` and start a session on it, cursor at the root.
    ///
    /// # Errors
    ///
    /// `InvalidTree` listing every violation.
    pub fn open_session(&self, tree: MoveTree) -> Result<SessionId> {
        validation::validate(&tree).into_result()?;
        let nodes = tree.len();
        let session = self.register(Navigator::new(tree)?);
        tracing::debug!(%session, nodes, "session opened");
        Ok(session)
    }

    /// Encode the session's tree, hand it to the store and close the session.
    ///
    /// The session lock is held from encoding until the session is closed,
    /// so every move that reported success is in the stored blob and every
    /// later move fails with `UnknownSession`. The session stays open if the
    /// store refuses the blob.
    pub fn end_session(&self, session: &SessionId) -> Result<StorageRef> {
        let handle = self.handle(session)?;
        let mut guard = lock(&handle);
        if guard.closed {
            return Err(unknown(session));
        }
        let blob = codec::encode(guard.navigator.tree())?;
        let reference = self.store.put(session, &blob)?;

        guard.closed = true;
        lock(&self.sessions).remove(session);
        drop(guard);
        tracing::info!(%session, %reference, "session ended");
        Ok(reference)
    }

    /// Close a session without persisting it.
    pub fn discard_session(&self, session: &SessionId) -> Result<()> {
        let handle = self.handle(session)?;
        let mut guard = lock(&handle);
        if guard.closed {
            return Err(unknown(session));
        }
        guard.closed = true;
        lock(&self.sessions).remove(session);
        drop(guard);
        tracing::debug!(%session, "session discarded");
        Ok(())
    }

    /// Ids of the open sessions, sorted.
    pub fn active_sessions(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = lock(&self.sessions).keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Play `request` from node `from`, which the caller last saw with
    /// `expected_children` children.
    ///
    /// On success the cursor follows the new node; on failure it is left on
    /// `from`.
    ///
    /// # Errors
    ///
    /// `Conflict` if another move was added under `from` since the caller
    /// looked; `NotFound`, `IllegalMove` as for the applier.
    pub fn play(
        &self,
        session: &SessionId,
        from: &NodeId,
        expected_children: usize,
        request: &MoveRequest,
    ) -> Result<MoveNode> {
        self.with_session(session, |navigator, applier| {
            navigator.goto_node(from)?;
            navigator
                .play_expecting(applier, expected_children, request)
                .cloned()
        })
    }

    /// Play `request` from the session's cursor.
    pub fn play_at_cursor(&self, session: &SessionId, request: &MoveRequest) -> Result<MoveNode> {
        self.with_session(session, |navigator, applier| {
            navigator.play(applier, request).cloned()
        })
    }

    pub fn goto(&self, session: &SessionId, node: &NodeId) -> Result<MoveNode> {
        self.with_session(session, |navigator, _| navigator.goto_node(node).cloned())
    }

    pub fn back(&self, session: &SessionId) -> Result<Step> {
        self.with_session(session, |navigator, _| Ok(navigator.back()))
    }

    pub fn forward(&self, session: &SessionId) -> Result<Step> {
        self.with_session(session, |navigator, _| Ok(navigator.forward()))
    }

    /// The node under the session's cursor.
    pub fn current(&self, session: &SessionId) -> Result<MoveNode> {
        self.with_session(session, |navigator, _| Ok(navigator.current().clone()))
    }

    /// Legal moves from the session's cursor.
    pub fn legal_moves(&self, session: &SessionId) -> Result<Vec<CandidateMove>> {
        self.with_session(session, |navigator, applier| {
            applier.legal_moves(navigator.tree(), navigator.current_id())
        })
    }

    /// A copy of the session's tree.
    pub fn snapshot(&self, session: &SessionId) -> Result<MoveTree> {
        self.with_session(session, |navigator, _| Ok(navigator.tree().clone()))
    }

    /// Supersede the session's tree with a fresh root at `position`.
    pub fn reset(&self, session: &SessionId, position: &str) -> Result<()> {
        self.engine.legal_moves(position)?;
        self.with_session(session, |navigator, _| {
            navigator.reset(position);
            Ok(())
        })
    }

    /// Run `f` against the session while holding its lock.
    pub fn with_session<T>(
        &self,
        session: &SessionId,
        f: impl FnOnce(&mut Navigator, &MoveApplier<'_>) -> Result<T>,
    ) -> Result<T> {
        let handle = self.handle(session)?;
        let mut guard = lock(&handle);
        let Session {
            navigator,
            config,
            closed,
        } = &mut *guard;
        if *closed {
            return Err(unknown(session));
        }
        let applier =
            MoveApplier::new(self.engine.as_ref()).with_policy(config.duplicate_moves);
        f(navigator, &applier)
    }

    fn handle(&self, session: &SessionId) -> Result<SessionHandle> {
        lock(&self.sessions)
            .get(session)
            .cloned()
            .ok_or_else(|| unknown(session))
    }

    fn register(&self, navigator: Navigator) -> SessionId {
        let session = loop {
            let n = self.next_session.fetch_add(1, Ordering::Relaxed);
            let candidate = SessionId::new(format!("s{n}"));
            if !lock(&self.sessions).contains_key(&candidate) {
                break candidate;
            }
        };
        let entry = Session {
            navigator,
            config: self.config,
            closed: false,
        };
        lock(&self.sessions).insert(session.clone(), Arc::new(Mutex::new(entry)));
        session
    }
}

fn unknown(session: &SessionId) -> Error {
    Error::UnknownSession {
        session: session.to_string(),
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing an app with custom dependencies.
///
/// # Examples
///
/// ```
/// use movetree::app::{AppBuilder, SessionConfig};
/// use movetree::adapters::{InMemoryStore, ShakmatyEngine};
/// use movetree::tree::IdStrategy;
///
/// let app = AppBuilder::new()
///     .with_store(InMemoryStore::new())
///     .with_engine(ShakmatyEngine::new())
///     .with_config(SessionConfig::new().with_id_strategy(IdStrategy::Random))
///     .build();
/// ```
pub struct AppBuilder {
    store: Option<Arc<dyn TreeStore + Send + Sync>>,
    engine: Option<Arc<dyn RulesEngine + Send + Sync>>,
    config: SessionConfig,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            engine: None,
            config: SessionConfig::default(),
        }
    }

    /// Set a custom tree store.
    pub fn with_store<S: TreeStore + Send + Sync + 'static>(mut self, store: S) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set a custom rules engine.
    pub fn with_engine<E: RulesEngine + Send + Sync + 'static>(mut self, engine: E) -> Self {
        self.engine = Some(Arc::new(engine));
        self
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the app with the configured dependencies.
    ///
    /// Falls back to `ShakmatyEngine` and `InMemoryStore`.
    pub fn build(self) -> App {
        App {
            store: self
                .store
                .unwrap_or_else(|| Arc::new(InMemoryStore::new())),
            engine: self
                .engine
                .unwrap_or_else(|| Arc::new(ShakmatyEngine::new())),
            config: self.config,
            sessions: Mutex::new(HashMap::new()),
            next_session: AtomicU64::new(1),
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
