//! Seams between the pure reducer and the outside world.
//!
//! The reducer never reads a clock or touches storage. [`Clock`] and
//! [`SnapshotStore`] are the two things the session driver needs from its
//! environment; production and test implementations live in
//! [`crate::runtime`].

use pathquiz_types::{SessionId, Timestamp};

/// Source of wall-clock time.
pub trait Clock {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

/// Durable home for serialized quiz snapshots, keyed by session.
///
/// Implementations store the JSON produced by
/// [`crate::state::QuizState::to_json`] verbatim. Merging with server-side
/// state is not the store's concern.
pub trait SnapshotStore {
    /// Persists the latest snapshot of a session, replacing any earlier one.
    fn save(&mut self, session_id: &SessionId, snapshot: &str) -> Result<(), StoreError>;

    /// Loads the latest snapshot of a session, if one exists.
    fn load(&self, session_id: &SessionId) -> Result<Option<String>, StoreError>;
}

/// Errors reported by a [`SnapshotStore`].
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}
