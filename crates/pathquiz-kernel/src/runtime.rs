//! Session driver around the pure reducer.
//!
//! The reducer is pure and never reads time or writes anywhere. The
//! [`QuizSession`] stamps time-dependent actions from a [`Clock`], applies
//! them, and hands snapshots to a [`SnapshotStore`] according to a
//! [`SyncPolicy`]. After a snapshot is saved the session feeds the matching
//! `SYNC_ACK` back through the reducer, so the dirty flag is only ever
//! cleared by an acknowledged revision.
//!
//! ## Example
//!
//! ```
//! use pathquiz_kernel::runtime::{InMemorySnapshotStore, ManualClock, QuizSession, SyncPolicy};
//! use pathquiz_types::{QuizConfig, QuizOption, QuizQuestion};
//!
//! let questions = vec![QuizQuestion::new(
//!     "q1",
//!     "Most common site of metastasis?",
//!     vec![QuizOption::new("a", "Liver", true), QuizOption::new("b", "Spleen", false)],
//!     "neoplasia",
//! )];
//!
//! let mut session = QuizSession::new(
//!     ManualClock::new(1_000),
//!     InMemorySnapshotStore::new(),
//!     SyncPolicy::default(),
//! );
//! session.initialize("s1", questions, QuizConfig::default()).unwrap();
//! session.start().unwrap();
//! session.submit_answer("q1", "a", 4_000).unwrap();
//! session.complete().unwrap();
//!
//! assert!(!session.state().has_pending_changes());
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use pathquiz_types::{OptionId, QuestionId, QuizConfig, QuizQuestion, SessionId, Timestamp};
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::kernel::{Transition, apply_action};
use crate::snapshot::SnapshotError;
use crate::state::QuizState;
use crate::traits::{Clock, SnapshotStore, StoreError};

/// When the session pushes snapshots to its store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPolicy {
    /// Sync after this many applied actions. Zero disables counting.
    pub autosync_every: u32,
    /// Sync as soon as the quiz is completed or abandoned.
    pub sync_on_finish: bool,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            autosync_every: 5,
            sync_on_finish: true,
        }
    }
}

impl SyncPolicy {
    /// Never syncs on its own; callers invoke [`QuizSession::sync`].
    pub fn manual() -> Self {
        Self {
            autosync_every: 0,
            sync_on_finish: false,
        }
    }
}

/// Errors surfaced by the session driver.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("no snapshot stored for session {0}")]
    SnapshotNotFound(SessionId),

    #[error("snapshot belongs to session {found}, expected {expected}")]
    SessionMismatch {
        expected: SessionId,
        found: SessionId,
    },
}

/// Drives one quiz-taking session.
///
/// Generic over Clock and SnapshotStore to enable both production use and
/// deterministic tests.
pub struct QuizSession<C, S>
where
    C: Clock,
    S: SnapshotStore,
{
    state: QuizState,
    clock: C,
    store: S,
    policy: SyncPolicy,
    applied_since_sync: u32,
}

impl<C, S> QuizSession<C, S>
where
    C: Clock,
    S: SnapshotStore,
{
    /// Creates a session over an empty quiz state.
    pub fn new(clock: C, store: S, policy: SyncPolicy) -> Self {
        Self::with_state(QuizState::new(), clock, store, policy)
    }

    /// Creates a session over an existing state.
    pub fn with_state(state: QuizState, clock: C, store: S, policy: SyncPolicy) -> Self {
        Self {
            state,
            clock,
            store,
            policy,
            applied_since_sync: 0,
        }
    }

    /// Restores a session from the last snapshot in the store.
    ///
    /// The snapshot is validated before use; a corrupt snapshot is an error,
    /// never a partially restored state.
    pub fn rehydrate(
        clock: C,
        store: S,
        policy: SyncPolicy,
        session_id: &SessionId,
    ) -> Result<Self, SessionError> {
        let json = store
            .load(session_id)?
            .ok_or_else(|| SessionError::SnapshotNotFound(session_id.clone()))?;
        let state = QuizState::from_json(&json)?;

        if state.session_id() != session_id {
            return Err(SessionError::SessionMismatch {
                expected: session_id.clone(),
                found: state.session_id().clone(),
            });
        }

        info!(
            session_id = %session_id,
            revision = state.sync_status().revision,
            status = %state.status(),
            "quiz session rehydrated"
        );

        Ok(Self::with_state(state, clock, store, policy))
    }

    /// Applies an action and syncs if the policy asks for it.
    ///
    /// A store failure is returned after the action has been applied; the
    /// state then keeps `pending_changes` set until a later sync succeeds.
    pub fn dispatch(&mut self, action: Action) -> Result<Transition, SessionError> {
        let name = action.name();
        let is_ack = matches!(action, Action::SyncAck { .. });
        let was_finished = self.state.status().is_terminal();

        let (next, transition) = apply_action(std::mem::take(&mut self.state), action);
        self.state = next;

        match transition {
            Transition::Applied => {
                debug!(
                    session_id = %self.state.session_id(),
                    action = name,
                    revision = self.state.sync_status().revision,
                    "action applied"
                );
            }
            Transition::Ignored(reason) => {
                debug!(
                    session_id = %self.state.session_id(),
                    action = name,
                    %reason,
                    "action ignored"
                );
                return Ok(transition);
            }
        }

        if is_ack {
            self.applied_since_sync = 0;
            return Ok(transition);
        }

        self.applied_since_sync = self.applied_since_sync.saturating_add(1);
        let just_finished = !was_finished && self.state.status().is_terminal();
        let due = self.policy.autosync_every > 0
            && self.applied_since_sync >= self.policy.autosync_every;

        if due || (just_finished && self.policy.sync_on_finish) {
            self.sync()?;
        }

        Ok(transition)
    }

    /// Persists the current snapshot if it has unsynced changes.
    ///
    /// Returns `true` if a snapshot was written.
    pub fn sync(&mut self) -> Result<bool, SessionError> {
        if !self.state.has_pending_changes() {
            return Ok(false);
        }

        let revision = self.state.sync_status().revision;

        // The stored snapshot is the acknowledged state, so a rehydrated
        // session starts clean.
        let (acked, transition) = apply_action(self.state.clone(), Action::sync_ack(revision));
        debug_assert!(transition.is_applied());
        let snapshot = acked.to_json()?;

        if let Err(e) = self.store.save(acked.session_id(), &snapshot) {
            warn!(
                session_id = %self.state.session_id(),
                revision,
                error = %e,
                "snapshot save failed"
            );
            return Err(e.into());
        }

        self.state = acked;
        self.applied_since_sync = 0;

        debug!(
            session_id = %self.state.session_id(),
            revision,
            bytes = snapshot.len(),
            "snapshot synced"
        );
        Ok(true)
    }

    // ========================================================================
    // Convenience wrappers
    // ========================================================================

    pub fn initialize(
        &mut self,
        session_id: impl Into<SessionId>,
        questions: Vec<QuizQuestion>,
        config: QuizConfig,
    ) -> Result<Transition, SessionError> {
        self.dispatch(Action::initialize(session_id, questions, config))
    }

    pub fn start(&mut self) -> Result<Transition, SessionError> {
        let at = self.clock.now();
        self.dispatch(Action::start(at))
    }

    pub fn submit_answer(
        &mut self,
        question_id: impl Into<QuestionId>,
        selected_option_id: impl Into<OptionId>,
        time_spent_ms: u64,
    ) -> Result<Transition, SessionError> {
        self.dispatch(Action::submit_answer(
            question_id,
            selected_option_id,
            time_spent_ms,
        ))
    }

    pub fn navigate_to(&mut self, index: usize) -> Result<Transition, SessionError> {
        self.dispatch(Action::navigate_to(index))
    }

    pub fn next_question(&mut self) -> Result<Transition, SessionError> {
        self.dispatch(Action::NextQuestion)
    }

    pub fn previous_question(&mut self) -> Result<Transition, SessionError> {
        self.dispatch(Action::PreviousQuestion)
    }

    pub fn toggle_flag(
        &mut self,
        question_id: impl Into<QuestionId>,
    ) -> Result<Transition, SessionError> {
        self.dispatch(Action::toggle_flag(question_id))
    }

    pub fn complete(&mut self) -> Result<Transition, SessionError> {
        let at = self.clock.now();
        self.dispatch(Action::complete(at))
    }

    pub fn abandon(&mut self) -> Result<Transition, SessionError> {
        let at = self.clock.now();
        self.dispatch(Action::abandon(at))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn into_state(self) -> QuizState {
        self.state
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }
}

// ============================================================================
// Production Implementations
// ============================================================================

/// Production clock using system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Clock that only moves when told to.
///
/// Uses an atomic so tests can advance it through a shared reference while
/// the session owns it.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    /// Creates a clock reading `start_ms` milliseconds since the epoch.
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(start_ms),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::Relaxed);
    }

    /// Sets the clock to an absolute time.
    pub fn set(&self, at: Timestamp) {
        self.now_ms.store(at.as_millis(), Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.now_ms.load(Ordering::Relaxed))
    }
}

/// In-memory snapshot store for testing and development.
///
/// Not suitable for production - snapshots are lost on restart.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    snapshots: HashMap<SessionId, String>,
    save_count: u64,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> u64 {
        self.save_count
    }

    /// Returns the stored snapshot for a session without going through
    /// [`SnapshotStore::load`].
    pub fn get(&self, session_id: &SessionId) -> Option<&str> {
        self.snapshots.get(session_id).map(String::as_str)
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn save(&mut self, session_id: &SessionId, snapshot: &str) -> Result<(), StoreError> {
        self.snapshots
            .insert(session_id.clone(), snapshot.to_string());
        self.save_count += 1;
        Ok(())
    }

    fn load(&self, session_id: &SessionId) -> Result<Option<String>, StoreError> {
        Ok(self.snapshots.get(session_id).cloned())
    }
}
