//! Snapshot codec for persisting and rehydrating [`QuizState`].
//!
//! The JSON shape is a durable contract with the persistence layer:
//!
//! - field names are camelCase
//! - `answers` is an array of `{ "questionId": .., "answer": { .. } }`
//!   entries rather than a JSON object, so the keyed map never depends on
//!   object-key ordering or escaping rules
//! - `flagged` is an array of question ids
//!
//! Deserialization always validates. A snapshot read from corrupt or stale
//! storage is rejected with a [`SnapshotViolation`] instead of producing a
//! half-valid state the reducer would then build on.

use std::collections::{BTreeMap, BTreeSet};

use pathquiz_types::{OptionId, QuestionId, QuizConfig, QuizQuestion, SessionId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::state::{Answer, Progress, QuizState, QuizStatus, SyncStatus};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

// ============================================================================
// Wire representation
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotView<'a> {
    version: u32,
    session_id: &'a SessionId,
    status: QuizStatus,
    questions: &'a [QuizQuestion],
    total_questions: usize,
    current_question_index: usize,
    answers: Vec<AnswerEntryRef<'a>>,
    flagged: &'a BTreeSet<QuestionId>,
    progress: Progress,
    start_time: Option<Timestamp>,
    completed_at: Option<Timestamp>,
    abandoned_at: Option<Timestamp>,
    total_time_spent_ms: u64,
    config: &'a QuizConfig,
    sync_status: SyncStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnswerEntryRef<'a> {
    question_id: &'a QuestionId,
    answer: &'a Answer,
}

/// Owned form of a snapshot, as read from storage before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStateSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    pub session_id: SessionId,
    pub status: QuizStatus,
    pub questions: Vec<QuizQuestion>,
    pub total_questions: usize,
    pub current_question_index: usize,
    pub answers: Vec<AnswerEntry>,
    #[serde(default)]
    pub flagged: Vec<QuestionId>,
    pub progress: Progress,
    pub start_time: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub abandoned_at: Option<Timestamp>,
    pub total_time_spent_ms: u64,
    #[serde(default)]
    pub config: QuizConfig,
    #[serde(default)]
    pub sync_status: SyncStatus,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// One `{ questionId, answer }` pair of the persisted answer list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEntry {
    pub question_id: QuestionId,
    pub answer: Answer,
}

impl<'a> From<&'a QuizState> for SnapshotView<'a> {
    fn from(state: &'a QuizState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            session_id: &state.session_id,
            status: state.status,
            questions: &state.questions,
            total_questions: state.total_questions,
            current_question_index: state.current_question_index,
            answers: state
                .answers
                .iter()
                .map(|(question_id, answer)| AnswerEntryRef {
                    question_id,
                    answer,
                })
                .collect(),
            flagged: &state.flagged,
            progress: state.progress,
            start_time: state.start_time,
            completed_at: state.completed_at,
            abandoned_at: state.abandoned_at,
            total_time_spent_ms: state.total_time_spent_ms,
            config: &state.config,
            sync_status: state.sync_status,
        }
    }
}

impl TryFrom<QuizStateSnapshot> for QuizState {
    type Error = SnapshotViolation;

    fn try_from(snapshot: QuizStateSnapshot) -> Result<Self, Self::Error> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotViolation::UnsupportedVersion(snapshot.version));
        }

        let mut answers = BTreeMap::new();
        for entry in snapshot.answers {
            if answers.contains_key(&entry.question_id) {
                return Err(SnapshotViolation::DuplicateAnswer(entry.question_id));
            }
            answers.insert(entry.question_id, entry.answer);
        }

        let state = QuizState {
            session_id: snapshot.session_id,
            status: snapshot.status,
            questions: snapshot.questions,
            total_questions: snapshot.total_questions,
            current_question_index: snapshot.current_question_index,
            answers,
            flagged: snapshot.flagged.into_iter().collect(),
            progress: snapshot.progress,
            start_time: snapshot.start_time,
            completed_at: snapshot.completed_at,
            abandoned_at: snapshot.abandoned_at,
            total_time_spent_ms: snapshot.total_time_spent_ms,
            config: snapshot.config,
            sync_status: snapshot.sync_status,
        };

        state.validate()?;
        Ok(state)
    }
}

impl Serialize for QuizState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SnapshotView::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for QuizState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snapshot = QuizStateSnapshot::deserialize(deserializer)?;
        QuizState::try_from(snapshot).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// JSON entry points
// ============================================================================

impl QuizState {
    /// Serializes the state to its compact JSON snapshot.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes the state to indented JSON, for files meant to be read.
    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses and validates a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: QuizStateSnapshot = serde_json::from_str(json)?;
        Ok(QuizState::try_from(snapshot)?)
    }

    /// Checks every structural invariant the reducer maintains.
    ///
    /// Every state reachable through the reducer passes. Use this on any
    /// state that did not come from the reducer.
    pub fn validate(&self) -> Result<(), SnapshotViolation> {
        let mut seen = BTreeSet::new();
        for question in &self.questions {
            if !seen.insert(&question.id) {
                return Err(SnapshotViolation::DuplicateQuestion(question.id.clone()));
            }
        }

        if self.total_questions != self.questions.len() {
            return Err(SnapshotViolation::TotalQuestionsMismatch {
                recorded: self.total_questions,
                actual: self.questions.len(),
            });
        }

        if self.current_question_index >= self.total_questions.max(1) {
            return Err(SnapshotViolation::CursorOutOfBounds {
                index: self.current_question_index,
                total: self.total_questions,
            });
        }

        let mut answered_time: u64 = 0;
        for (question_id, answer) in &self.answers {
            let question = self
                .question(question_id)
                .ok_or_else(|| SnapshotViolation::UnknownAnsweredQuestion(question_id.clone()))?;
            let option = question.option(&answer.selected_option_id).ok_or_else(|| {
                SnapshotViolation::UnknownSelectedOption {
                    question_id: question_id.clone(),
                    option_id: answer.selected_option_id.clone(),
                }
            })?;
            if option.is_correct != answer.is_correct {
                return Err(SnapshotViolation::CorrectnessMismatch(question_id.clone()));
            }
            if answer.attempts == 0 {
                return Err(SnapshotViolation::ZeroAttempts(question_id.clone()));
            }
            answered_time = answered_time.saturating_add(answer.time_spent_ms);
        }

        let computed = Progress::compute(&self.answers, self.total_questions);
        if computed != self.progress {
            return Err(SnapshotViolation::ProgressMismatch {
                recorded: self.progress,
                computed,
            });
        }

        if self.total_time_spent_ms < answered_time {
            return Err(SnapshotViolation::TimeAccountingMismatch {
                total: self.total_time_spent_ms,
                answered: answered_time,
            });
        }

        if let Some(unknown) = self.flagged.iter().find(|id| self.question(id).is_none()) {
            return Err(SnapshotViolation::UnknownFlaggedQuestion(unknown.clone()));
        }

        self.validate_lifecycle()?;
        self.validate_sync_status()
    }

    fn validate_lifecycle(&self) -> Result<(), SnapshotViolation> {
        let inconsistent = |detail: &'static str| SnapshotViolation::InconsistentLifecycle {
            status: self.status,
            detail,
        };

        if self.status != QuizStatus::NotStarted && self.total_questions == 0 {
            return Err(inconsistent("started without questions"));
        }

        match self.status {
            QuizStatus::NotStarted if self.start_time.is_some() => {
                return Err(inconsistent("start time recorded before start"));
            }
            QuizStatus::InProgress | QuizStatus::Completed | QuizStatus::Abandoned
                if self.start_time.is_none() =>
            {
                return Err(inconsistent("missing start time"));
            }
            _ => {}
        }

        if (self.status == QuizStatus::Completed) != self.completed_at.is_some() {
            return Err(inconsistent("completion time does not match status"));
        }
        if (self.status == QuizStatus::Abandoned) != self.abandoned_at.is_some() {
            return Err(inconsistent("abandon time does not match status"));
        }

        Ok(())
    }

    fn validate_sync_status(&self) -> Result<(), SnapshotViolation> {
        let sync = self.sync_status;
        let synced = sync.last_synced_revision;

        if synced.is_some_and(|s| s > sync.revision) {
            return Err(SnapshotViolation::SyncRevisionMismatch {
                revision: sync.revision,
                last_synced: synced,
                pending: sync.pending_changes,
            });
        }

        let consistent = if sync.pending_changes {
            sync.revision > 0 && synced.is_none_or(|s| s < sync.revision)
        } else {
            synced.unwrap_or(0) == sync.revision
        };
        if !consistent {
            return Err(SnapshotViolation::SyncRevisionMismatch {
                revision: sync.revision,
                last_synced: synced,
                pending: sync.pending_changes,
            });
        }

        Ok(())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors reading or writing a snapshot.
#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    #[error("malformed snapshot json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid snapshot: {0}")]
    Invalid(#[from] SnapshotViolation),
}

/// A structural invariant a snapshot failed to satisfy.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotViolation {
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error("question {0} appears more than once")]
    DuplicateQuestion(QuestionId),

    #[error("question {0} has more than one answer entry")]
    DuplicateAnswer(QuestionId),

    #[error("totalQuestions is {recorded} but {actual} questions are present")]
    TotalQuestionsMismatch { recorded: usize, actual: usize },

    #[error("question index {index} out of bounds for {total} questions")]
    CursorOutOfBounds { index: usize, total: usize },

    #[error("answer recorded for unknown question {0}")]
    UnknownAnsweredQuestion(QuestionId),

    #[error("answer to question {question_id} selects unknown option {option_id}")]
    UnknownSelectedOption {
        question_id: QuestionId,
        option_id: OptionId,
    },

    #[error("stored correctness of question {0} disagrees with its options")]
    CorrectnessMismatch(QuestionId),

    #[error("answer to question {0} records zero attempts")]
    ZeroAttempts(QuestionId),

    #[error("stored progress {recorded:?} differs from computed {computed:?}")]
    ProgressMismatch {
        recorded: Progress,
        computed: Progress,
    },

    #[error("total time {total}ms is less than answered time {answered}ms")]
    TimeAccountingMismatch { total: u64, answered: u64 },

    #[error("flag set on unknown question {0}")]
    UnknownFlaggedQuestion(QuestionId),

    #[error("status {status}: {detail}")]
    InconsistentLifecycle {
        status: QuizStatus,
        detail: &'static str,
    },

    #[error(
        "sync status inconsistent: revision {revision}, last synced {last_synced:?}, pending {pending}"
    )]
    SyncRevisionMismatch {
        revision: u64,
        last_synced: Option<u64>,
        pending: bool,
    },
}
