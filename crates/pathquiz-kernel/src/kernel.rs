//! The reducer - pure functional core of `pathquiz`.
//!
//! The reducer applies one [`Action`] to a [`QuizState`] and returns the next
//! state. It is completely pure: no IO, no clocks, no randomness. Invalid
//! references (unknown question or option, out-of-range index) are not
//! errors; they return the input state untouched together with
//! [`Transition::Ignored`], so the reducer is safe to call optimistically
//! from UI handlers and to replay against stale snapshots.
//!
//! # Example
//!
//! ```
//! use pathquiz_kernel::{Action, apply_action, create_initial_quiz_state};
//! use pathquiz_types::QuizConfig;
//!
//! let state = create_initial_quiz_state();
//! let (state, transition) =
//!     apply_action(state, Action::initialize("s1", Vec::new(), QuizConfig::default()));
//! assert!(transition.is_applied());
//! assert_eq!(state.total_questions(), 0);
//! ```

use std::collections::BTreeSet;

use serde::Serialize;

use crate::action::Action;
use crate::queries::{can_navigate_next, can_navigate_previous};
use crate::state::{Answer, QuizState, QuizStatus};

/// Outcome of applying an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "reason")]
pub enum Transition {
    /// The action changed the state.
    Applied,
    /// The action was rejected; the state is unchanged.
    Ignored(IgnoreReason),
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }

    /// Returns the rejection reason, if the action was ignored.
    pub fn ignored_reason(&self) -> Option<IgnoreReason> {
        match self {
            Transition::Applied => None,
            Transition::Ignored(reason) => Some(*reason),
        }
    }
}

/// Why an action left the state unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// INITIALIZE with a question set that repeats an id.
    DuplicateQuestionIds,
    /// START_QUIZ before a non-empty question set was loaded.
    NoQuestions,
    /// The quiz is completed or abandoned.
    QuizFinished,
    /// COMPLETE/ABANDON on a quiz that is not in progress.
    NotInProgress,
    UnknownQuestion,
    /// The option does not belong to the question.
    UnknownOption,
    IndexOutOfBounds,
    /// The action would not change anything.
    Unchanged,
    /// Flagging requires `allow_review`.
    ReviewDisabled,
    /// SYNC_ACK for a revision other than the current one.
    StaleSyncAck,
    /// SYNC_ACK with no pending changes.
    NothingToSync,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::DuplicateQuestionIds => "question set repeats an id",
            IgnoreReason::NoQuestions => "no questions loaded",
            IgnoreReason::QuizFinished => "quiz already finished",
            IgnoreReason::NotInProgress => "quiz not in progress",
            IgnoreReason::UnknownQuestion => "unknown question",
            IgnoreReason::UnknownOption => "option does not belong to question",
            IgnoreReason::IndexOutOfBounds => "question index out of bounds",
            IgnoreReason::Unchanged => "no change",
            IgnoreReason::ReviewDisabled => "review disabled by config",
            IgnoreReason::StaleSyncAck => "acknowledged revision is not current",
            IgnoreReason::NothingToSync => "no pending changes",
        }
    }
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Applies an action to the state, producing the next state and the outcome.
///
/// Takes ownership of the state and returns it, so callers that need the
/// prior value must clone it first. The input is never observed mutated.
pub fn apply_action(state: QuizState, action: Action) -> (QuizState, Transition) {
    let ignored = |state: QuizState, reason: IgnoreReason| (state, Transition::Ignored(reason));

    match action {
        Action::Initialize {
            session_id,
            questions,
            config,
        } => {
            // Precondition: question ids are unique, answers are keyed by them
            let unique = {
                let mut seen = BTreeSet::new();
                questions.iter().all(|q| seen.insert(&q.id))
            };
            if !unique {
                return ignored(state, IgnoreReason::DuplicateQuestionIds);
            }

            let prior_revision = state.sync_status.revision;
            let new_state = state
                .reinitialized(session_id, questions, config)
                .mark_changed();

            // Postcondition: derived count matches the question set
            debug_assert_eq!(new_state.total_questions, new_state.questions.len());
            // Postcondition: revision keeps counting across attempts
            debug_assert!(new_state.sync_status.revision > prior_revision);

            (new_state, Transition::Applied)
        }

        Action::StartQuiz { at } => {
            // Precondition: a question set has been loaded
            if state.total_questions == 0 {
                return ignored(state, IgnoreReason::NoQuestions);
            }
            if state.status.is_terminal() {
                return ignored(state, IgnoreReason::QuizFinished);
            }

            let new_state = state
                .with_status(QuizStatus::InProgress)
                .with_start_time_once(at)
                .mark_changed();

            debug_assert!(new_state.start_time.is_some());

            (new_state, Transition::Applied)
        }

        Action::SubmitAnswer {
            question_id,
            selected_option_id,
            time_spent_ms,
        } => {
            if state.status.is_terminal() {
                return ignored(state, IgnoreReason::QuizFinished);
            }

            // Correctness comes from the question's own option flags.
            let lookup = state
                .question(&question_id)
                .map(|q| q.option(&selected_option_id).map(|o| o.is_correct));
            let is_correct = match lookup {
                None => return ignored(state, IgnoreReason::UnknownQuestion),
                Some(None) => return ignored(state, IgnoreReason::UnknownOption),
                Some(Some(is_correct)) => is_correct,
            };

            let attempts = state
                .answers
                .get(&question_id)
                .map_or(1, |prior| prior.attempts.saturating_add(1));
            let prior_time = state.total_time_spent_ms;

            let answer = Answer {
                selected_option_id,
                is_correct,
                time_spent_ms,
                attempts,
            };
            let new_state = state.with_answer(question_id, answer).mark_changed();

            // Invariant: progress mirrors the answer map
            debug_assert_eq!(new_state.progress.answered, new_state.answers.len());
            debug_assert_eq!(
                new_state.progress.correct + new_state.progress.incorrect,
                new_state.progress.answered
            );
            // Invariant: time only accumulates
            debug_assert!(new_state.total_time_spent_ms >= prior_time);

            (new_state, Transition::Applied)
        }

        Action::NavigateToQuestion { index } => navigate(state, index),

        Action::NextQuestion => {
            if !can_navigate_next(&state) {
                return ignored(state, IgnoreReason::IndexOutOfBounds);
            }
            let index = state.current_question_index + 1;
            navigate(state, index)
        }

        Action::PreviousQuestion => {
            if !can_navigate_previous(&state) {
                return ignored(state, IgnoreReason::IndexOutOfBounds);
            }
            let index = state.current_question_index - 1;
            navigate(state, index)
        }

        Action::ToggleFlag { question_id } => {
            if state.status.is_terminal() {
                return ignored(state, IgnoreReason::QuizFinished);
            }
            if !state.config.allow_review {
                return ignored(state, IgnoreReason::ReviewDisabled);
            }
            if state.question(&question_id).is_none() {
                return ignored(state, IgnoreReason::UnknownQuestion);
            }

            (
                state.with_flag_toggled(question_id).mark_changed(),
                Transition::Applied,
            )
        }

        Action::CompleteQuiz { at } => {
            if state.status != QuizStatus::InProgress {
                return ignored(state, IgnoreReason::NotInProgress);
            }

            let new_state = state
                .with_status(QuizStatus::Completed)
                .with_completed_at(at)
                .mark_changed();

            (new_state, Transition::Applied)
        }

        Action::AbandonQuiz { at } => {
            if state.status != QuizStatus::InProgress {
                return ignored(state, IgnoreReason::NotInProgress);
            }

            let new_state = state
                .with_status(QuizStatus::Abandoned)
                .with_abandoned_at(at)
                .mark_changed();

            (new_state, Transition::Applied)
        }

        Action::SyncAck { revision } => {
            if !state.sync_status.pending_changes {
                return ignored(state, IgnoreReason::NothingToSync);
            }
            // An ack for an older snapshot must not hide newer changes.
            if revision != state.sync_status.revision {
                return ignored(state, IgnoreReason::StaleSyncAck);
            }

            let new_state = state.with_synced(revision);

            // Postcondition: acknowledgement does not advance the revision
            debug_assert_eq!(new_state.sync_status.revision, revision);

            (new_state, Transition::Applied)
        }
    }
}

fn navigate(state: QuizState, index: usize) -> (QuizState, Transition) {
    // Precondition: 0 <= index < total_questions
    if index >= state.total_questions {
        return (state, Transition::Ignored(IgnoreReason::IndexOutOfBounds));
    }
    if index == state.current_question_index {
        return (state, Transition::Ignored(IgnoreReason::Unchanged));
    }

    let new_state = state.with_cursor(index).mark_changed();

    // Postcondition: cursor stays within the question set
    debug_assert!(new_state.current_question_index < new_state.total_questions);

    (new_state, Transition::Applied)
}

/// Reduces `(state, action)` to the next state.
///
/// Same as [`apply_action`] without the outcome.
pub fn quiz_state_reducer(state: QuizState, action: Action) -> QuizState {
    apply_action(state, action).0
}

/// Applies a sequence of actions in order, returning the final state and the
/// outcome of each action.
pub fn apply_actions(
    state: QuizState,
    actions: impl IntoIterator<Item = Action>,
) -> (QuizState, Vec<Transition>) {
    let mut transitions = Vec::new();
    let state = actions.into_iter().fold(state, |state, action| {
        let (next, transition) = apply_action(state, action);
        transitions.push(transition);
        next
    });
    (state, transitions)
}
