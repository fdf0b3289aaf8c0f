//! # pathquiz-kernel: Functional core of `pathquiz`
//!
//! The kernel is the deterministic heart of quiz taking. It receives actions
//! and produces the next quiz state.
//!
//! ## Key Principles
//!
//! - **No IO**: The reducer never touches disk, network, or any external resource
//! - **No clocks**: Timestamps arrive inside actions, stamped by the caller
//! - **No randomness**: Same input always produces same output
//! - **Total**: Invalid references are ignored, never panics or errors
//! - **Pure functions**: `apply_action(state, action) -> (state, transition)`
//!
//! ## Architecture
//!
//! - [`action`]: Actions that can be applied (`Initialize`, `SubmitAnswer`, ...)
//! - [`state`]: The quiz state aggregate and its derived values
//! - [`kernel`]: The `apply_action` reducer that ties it all together
//! - [`queries`]: Read-only projections for navigation and UI enablement
//! - [`snapshot`]: Validated JSON persistence format
//! - [`runtime`]: Session driver with pluggable clock and snapshot store
//!
//! ## Example
//!
//! ```
//! use pathquiz_kernel::{Action, create_initial_quiz_state, quiz_state_reducer, queries};
//! use pathquiz_types::{QuizConfig, QuizOption, QuizQuestion, Timestamp};
//!
//! let questions = vec![QuizQuestion::new(
//!     "q1",
//!     "Which stain highlights amyloid?",
//!     vec![
//!         QuizOption::new("a", "Congo red", true),
//!         QuizOption::new("b", "Gram stain", false),
//!     ],
//!     "staining",
//! )];
//!
//! let state = create_initial_quiz_state();
//! let state = quiz_state_reducer(state, Action::initialize("s1", questions, QuizConfig::default()));
//! let state = quiz_state_reducer(state, Action::start(Timestamp::from_millis(0)));
//! let state = quiz_state_reducer(state, Action::submit_answer("q1", "a", 5_000));
//!
//! assert_eq!(state.progress().correct, 1);
//! assert_eq!(state.progress().percentage, 100);
//! assert!(!queries::can_navigate_next(&state));
//! ```

pub mod action;
pub mod kernel;
pub mod queries;
pub mod runtime;
pub mod snapshot;
pub mod state;
pub mod state_hash;
pub mod traits;


// Kani verification harnesses for bounded model checking
#[cfg(kani)]
mod kani_proofs;

// Re-export commonly used items
pub use action::Action;
pub use kernel::{IgnoreReason, Transition, apply_action, apply_actions, quiz_state_reducer};
pub use queries::{
    can_navigate_next, can_navigate_previous, get_current_question, is_question_answered,
};
pub use runtime::{
    InMemorySnapshotStore, ManualClock, QuizSession, SessionError, SyncPolicy, SystemClock,
};
pub use snapshot::{SnapshotError, SnapshotViolation};
pub use state::{Answer, Progress, QuizState, QuizStatus, SyncStatus, create_initial_quiz_state};
pub use traits::{Clock, SnapshotStore, StoreError};
