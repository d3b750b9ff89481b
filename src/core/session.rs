//! Engine lifecycle management.
//!
//! `SessionManager` owns at most one engine instance and deduplicates
//! initialization across every consumer. The whole read model lives
//! in a `watch` channel, and each transition is a single
//! `send_if_modified` check-and-set:
//!
//! ```text
//! idle ──acquire──> loading(n) ──ok──> ready
//!   ^                   │
//!   │                   └──err──> error
//!   └──────reset────────────────────┘   (reset starts attempt n+1)
//! ```
//!
//! An attempt only commits while the state is still `loading(n)`; a
//! reset in between makes its result stale and it is dropped.

use crate::core::engine::{EngineFactory, GeoEngine};
use crate::core::error::{GeoError, Result};
use crate::core::types::{EngineOptions, EngineStats, SearchMode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Lifecycle status of the shared engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Loading => "loading",
            SessionStatus::Ready => "ready",
            SessionStatus::Error => "error",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the session read model
#[derive(Clone, Default)]
pub struct SessionState {
    pub status: SessionStatus,
    pub engine: Option<Arc<dyn GeoEngine>>,
    /// Always `GeoError::InitializationFailed`
    pub error: Option<Arc<GeoError>>,
    pub stats: Option<EngineStats>,
    pub search_mode: Option<SearchMode>,
    /// Identity of the latest started attempt
    pub attempt: u64,
    pub ready_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn initialized(&self) -> bool {
        self.status == SessionStatus::Ready
    }

    pub fn loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.message())
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("status", &self.status)
            .field("engine", &self.engine.as_ref().map(|_| "<engine>"))
            .field("error", &self.error)
            .field("stats", &self.stats)
            .field("search_mode", &self.search_mode)
            .field("attempt", &self.attempt)
            .field("ready_at", &self.ready_at)
            .finish()
    }
}

struct ReadyEngine {
    engine: Arc<dyn GeoEngine>,
    stats: EngineStats,
    search_mode: SearchMode,
}

struct Inner {
    factory: Arc<dyn EngineFactory>,
    options: EngineOptions,
    state: watch::Sender<SessionState>,
}

/// Shared-engine lifecycle manager
///
/// Cloning is cheap; clones share one state.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    pub fn new(factory: Arc<dyn EngineFactory>, options: EngineOptions) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(Inner {
                factory,
                options,
                state,
            }),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.inner.options
    }

    /// Non-suspending snapshot
    pub fn current_state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// The shared engine, if the session is ready
    pub fn engine(&self) -> Result<Arc<dyn GeoEngine>> {
        let state = self.inner.state.borrow();
        match (&state.status, &state.engine) {
            (SessionStatus::Ready, Some(engine)) => Ok(Arc::clone(engine)),
            _ => Err(GeoError::EngineNotReady(state.status.to_string())),
        }
    }

    /// Wait until the session settles, starting an attempt if idle
    ///
    /// A session in `error` is returned as is; use `retry` to try again.
    pub async fn acquire(&self) -> SessionState {
        let mut rx = self.subscribe();
        loop {
            let snapshot = rx.borrow_and_update().clone();
            match snapshot.status {
                SessionStatus::Ready | SessionStatus::Error => return snapshot,
                SessionStatus::Idle => {
                    // Losing the race to another acquirer is fine: the
                    // next pass sees `loading` and waits on it
                    self.begin_attempt();
                    continue;
                }
                SessionStatus::Loading => {}
            }

            if rx.changed().await.is_err() {
                return self.current_state();
            }
        }
    }

    /// Drop the engine and error, then start a fresh attempt
    ///
    /// Returns the `idle` snapshot. Without a tokio runtime the session
    /// stays idle until the next `acquire`.
    pub fn reset(&self) -> SessionState {
        let mut snapshot = SessionState::default();
        self.inner.state.send_modify(|state| {
            *state = SessionState {
                attempt: state.attempt,
                ..SessionState::default()
            };
            snapshot = state.clone();
        });
        tracing::debug!(attempt = snapshot.attempt, "Session reset");

        if Handle::try_current().is_ok() {
            self.begin_attempt();
        } else {
            tracing::debug!("No runtime; next acquire starts the attempt");
        }
        snapshot
    }

    /// `reset` then `acquire`
    pub async fn retry(&self) -> SessionState {
        self.reset();
        self.acquire().await
    }

    /// Move `idle` to `loading(n+1)` and spawn the attempt
    fn begin_attempt(&self) -> bool {
        let mut attempt = 0;
        let started = self.inner.state.send_if_modified(|state| {
            if state.status != SessionStatus::Idle {
                return false;
            }
            state.attempt += 1;
            state.status = SessionStatus::Loading;
            attempt = state.attempt;
            true
        });

        if started {
            tracing::debug!(attempt, "Starting engine initialization");
            self.spawn_attempt(attempt);
        }
        started
    }

    fn spawn_attempt(&self, attempt: u64) {
        let manager = self.clone();
        tokio::spawn(async move {
            let factory = Arc::clone(&manager.inner.factory);
            let options = manager.inner.options.clone();

            // The inner task turns a panic into a JoinError
            let outcome =
                match tokio::spawn(async move { initialize(factory.as_ref(), &options).await })
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(e) if e.is_panic() => Err(GeoError::InitializationFailed(
                        "engine panicked during initialization".to_string(),
                    )),
                    Err(e) => Err(GeoError::InitializationFailed(e.to_string())),
                };

            if let Some(stale) = manager.commit(attempt, outcome) {
                if let Err(e) = stale.close().await {
                    tracing::debug!(attempt, "Failed to close stale engine: {}", e);
                }
            }
        });
    }

    /// Apply an attempt's outcome; returns a stale engine for disposal
    fn commit(&self, attempt: u64, outcome: Result<ReadyEngine>) -> Option<Arc<dyn GeoEngine>> {
        let mut pending = Some(outcome);
        self.inner.state.send_if_modified(|state| {
            if state.status != SessionStatus::Loading || state.attempt != attempt {
                return false;
            }
            match pending.take() {
                Some(Ok(ready)) => {
                    tracing::info!(
                        attempt,
                        tiles = ready.stats.total_tiles,
                        addresses = ready.stats.total_addresses,
                        search_mode = %ready.search_mode,
                        "Engine ready"
                    );
                    state.status = SessionStatus::Ready;
                    state.engine = Some(ready.engine);
                    state.stats = Some(ready.stats);
                    state.search_mode = Some(ready.search_mode);
                    state.ready_at = Some(Utc::now());
                    true
                }
                Some(Err(e)) => {
                    tracing::warn!(attempt, "Engine initialization failed: {}", e);
                    state.status = SessionStatus::Error;
                    state.error = Some(Arc::new(e));
                    true
                }
                None => false,
            }
        });

        match pending {
            Some(Ok(ready)) => {
                tracing::debug!(attempt, "Discarding stale engine");
                Some(ready.engine)
            }
            Some(Err(e)) => {
                tracing::debug!(attempt, "Discarding stale failure: {}", e);
                None
            }
            None => None,
        }
    }
}

async fn initialize(factory: &dyn EngineFactory, options: &EngineOptions) -> Result<ReadyEngine> {
    let engine = factory.construct(options).await.map_err(as_init_failure)?;

    let prepared = async {
        engine.initialize().await?;
        engine.stats().await
    }
    .await;

    match prepared {
        Ok(stats) => Ok(ReadyEngine {
            search_mode: engine.search_mode(),
            stats,
            engine,
        }),
        Err(e) => {
            let _ = engine.close().await;
            Err(as_init_failure(e))
        }
    }
}

fn as_init_failure(e: GeoError) -> GeoError {
    match e {
        GeoError::InitializationFailed(_) => e,
        other => GeoError::InitializationFailed(other.message()),
    }
}
