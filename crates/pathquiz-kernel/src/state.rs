//! Quiz state.
//!
//! [`QuizState`] is the single aggregate the reducer owns. Its fields are
//! private: derived values (`total_questions`, `progress`) and the dirty flag
//! can only change through [`crate::kernel::apply_action`]. State transitions
//! take ownership of `self` and return the updated value (builder pattern),
//! so the reducer never clones the answer map.

use std::collections::{BTreeMap, BTreeSet};

use pathquiz_types::{OptionId, QuestionId, QuizConfig, QuizQuestion, SessionId, Timestamp};
use serde::{Deserialize, Serialize};

// ============================================================================
// Status
// ============================================================================

/// Lifecycle of a quiz attempt.
///
/// `not_started -> in_progress -> completed | abandoned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Abandoned,
}

impl QuizStatus {
    /// Returns true for states no further answering can happen in.
    pub fn is_terminal(&self) -> bool {
        matches!(self, QuizStatus::Completed | QuizStatus::Abandoned)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuizStatus::NotStarted => "not_started",
            QuizStatus::InProgress => "in_progress",
            QuizStatus::Completed => "completed",
            QuizStatus::Abandoned => "abandoned",
        }
    }
}

impl std::fmt::Display for QuizStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Answer & Progress
// ============================================================================

/// The recorded answer for one question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub selected_option_id: OptionId,
    /// Derived by the reducer from the question's option flags.
    pub is_correct: bool,
    /// Time reported for the most recent submission.
    pub time_spent_ms: u64,
    /// Number of submissions recorded for this question.
    pub attempts: u32,
}

/// Progress counters derived from the answer map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub answered: usize,
    pub correct: usize,
    pub incorrect: usize,
    /// `answered / total * 100`, rounded half up. Zero for an empty quiz.
    pub percentage: u8,
}

impl Progress {
    /// Recomputes progress over the full answer map.
    pub fn compute(answers: &BTreeMap<QuestionId, Answer>, total_questions: usize) -> Self {
        let answered = answers.len();
        let correct = answers.values().filter(|a| a.is_correct).count();

        Self {
            answered,
            correct,
            incorrect: answered - correct,
            percentage: percentage(answered, total_questions),
        }
    }
}

/// Integer round-half-up of `part / total * 100`, clamped to `0..=100`.
///
/// Only a fully answered quiz reports 100; anything short of that is capped
/// at 99.
pub(crate) fn percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let part = part.min(total) as u128;
    let total = total as u128;
    let mut pct = (part * 200 + total) / (total * 2);
    if part < total {
        pct = pct.min(99);
    }

    // Postcondition: percentage is bounded
    debug_assert!(pct <= 100);
    pct as u8
}

// ============================================================================
// Sync bookkeeping
// ============================================================================

/// Bookkeeping shared with the persistence layer.
///
/// The reducer sets `pending_changes` and bumps `revision` on every applied
/// change. Only a matching `SYNC_ACK` clears the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub pending_changes: bool,
    pub revision: u64,
    pub last_synced_revision: Option<u64>,
}

// ============================================================================
// Quiz State
// ============================================================================

/// In-memory state of one quiz-taking session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuizState {
    pub(crate) session_id: SessionId,
    pub(crate) status: QuizStatus,
    pub(crate) questions: Vec<QuizQuestion>,
    pub(crate) total_questions: usize,
    pub(crate) current_question_index: usize,
    pub(crate) answers: BTreeMap<QuestionId, Answer>,
    pub(crate) flagged: BTreeSet<QuestionId>,
    pub(crate) progress: Progress,
    pub(crate) start_time: Option<Timestamp>,
    pub(crate) completed_at: Option<Timestamp>,
    pub(crate) abandoned_at: Option<Timestamp>,
    pub(crate) total_time_spent_ms: u64,
    pub(crate) config: QuizConfig,
    pub(crate) sync_status: SyncStatus,
}

/// Creates the empty shell a quiz starts from, before `INITIALIZE`.
pub fn create_initial_quiz_state() -> QuizState {
    QuizState::new()
}

impl QuizState {
    /// Creates a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn status(&self) -> QuizStatus {
        self.status
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn answers(&self) -> &BTreeMap<QuestionId, Answer> {
        &self.answers
    }

    pub fn flagged(&self) -> &BTreeSet<QuestionId> {
        &self.flagged
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn start_time(&self) -> Option<Timestamp> {
        self.start_time
    }

    pub fn completed_at(&self) -> Option<Timestamp> {
        self.completed_at
    }

    pub fn abandoned_at(&self) -> Option<Timestamp> {
        self.abandoned_at
    }

    pub fn total_time_spent_ms(&self) -> u64 {
        self.total_time_spent_ms
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync_status
    }

    /// Returns true if the state has changes the persistence layer has not
    /// acknowledged yet.
    pub fn has_pending_changes(&self) -> bool {
        self.sync_status.pending_changes
    }

    /// Looks up a question by id.
    pub fn question(&self, id: &QuestionId) -> Option<&QuizQuestion> {
        self.questions.iter().find(|q| &q.id == id)
    }

    // ========================================================================
    // Transitions (internal to the kernel)
    // ========================================================================

    /// Replaces the quiz content, keeping only the sync revision counters.
    pub(crate) fn reinitialized(
        self,
        session_id: SessionId,
        questions: Vec<QuizQuestion>,
        config: QuizConfig,
    ) -> Self {
        Self {
            session_id,
            status: QuizStatus::NotStarted,
            total_questions: questions.len(),
            questions,
            current_question_index: 0,
            answers: BTreeMap::new(),
            flagged: BTreeSet::new(),
            progress: Progress::default(),
            start_time: None,
            completed_at: None,
            abandoned_at: None,
            total_time_spent_ms: 0,
            config,
            sync_status: self.sync_status,
        }
    }

    pub(crate) fn with_status(mut self, status: QuizStatus) -> Self {
        self.status = status;
        self
    }

    /// Records the start time unless one is already set.
    pub(crate) fn with_start_time_once(mut self, at: Timestamp) -> Self {
        self.start_time.get_or_insert(at);
        self
    }

    pub(crate) fn with_completed_at(mut self, at: Timestamp) -> Self {
        self.completed_at = Some(at);
        self
    }

    pub(crate) fn with_abandoned_at(mut self, at: Timestamp) -> Self {
        self.abandoned_at = Some(at);
        self
    }

    /// Inserts or overwrites an answer, recomputes progress and accumulates
    /// the reported time.
    pub(crate) fn with_answer(mut self, question_id: QuestionId, answer: Answer) -> Self {
        self.total_time_spent_ms = self
            .total_time_spent_ms
            .saturating_add(answer.time_spent_ms);
        self.answers.insert(question_id, answer);
        self.progress = Progress::compute(&self.answers, self.total_questions);
        self
    }

    pub(crate) fn with_cursor(mut self, index: usize) -> Self {
        self.current_question_index = index;
        self
    }

    pub(crate) fn with_flag_toggled(mut self, question_id: QuestionId) -> Self {
        if !self.flagged.remove(&question_id) {
            self.flagged.insert(question_id);
        }
        self
    }

    /// Marks the state dirty and advances the revision.
    ///
    /// The revision saturates at `u64::MAX`. Past that point a change made
    /// after an acknowledgement cannot be told apart from the acknowledged
    /// revision and the state no longer validates.
    pub(crate) fn mark_changed(mut self) -> Self {
        self.sync_status.pending_changes = true;
        self.sync_status.revision = self.sync_status.revision.saturating_add(1);
        self
    }

    /// Clears the dirty flag for an acknowledged revision.
    pub(crate) fn with_synced(mut self, revision: u64) -> Self {
        self.sync_status.pending_changes = false;
        self.sync_status.last_synced_revision = Some(revision);
        self
    }
}
