//! Read-only projections over [`QuizState`].
//!
//! These keep navigation and UI-enablement rules in one place, out of both
//! the reducer and the UI. None of them mutate or allocate more than the
//! returned value.

use pathquiz_types::{QuestionId, QuizMode, QuizQuestion, Timestamp};

use crate::state::{Answer, QuizState};

/// Returns the question under the cursor, or `None` for an empty quiz.
pub fn get_current_question(state: &QuizState) -> Option<&QuizQuestion> {
    state.questions.get(state.current_question_index)
}

/// True iff the cursor is not on the last question.
pub fn can_navigate_next(state: &QuizState) -> bool {
    state.current_question_index + 1 < state.total_questions
}

/// True iff the cursor is not on the first question.
pub fn can_navigate_previous(state: &QuizState) -> bool {
    state.current_question_index > 0
}

/// True iff an answer has been recorded for the question.
pub fn is_question_answered(state: &QuizState, question_id: &QuestionId) -> bool {
    state.answers.contains_key(question_id)
}

/// True iff the question is marked for review.
pub fn is_question_flagged(state: &QuizState, question_id: &QuestionId) -> bool {
    state.flagged.contains(question_id)
}

pub fn get_answer<'a>(state: &'a QuizState, question_id: &QuestionId) -> Option<&'a Answer> {
    state.answers.get(question_id)
}

/// Questions without a recorded answer, in quiz order.
pub fn unanswered_questions(state: &QuizState) -> impl Iterator<Item = &QuizQuestion> + '_ {
    state
        .questions
        .iter()
        .filter(|q| !state.answers.contains_key(&q.id))
}

/// True iff the explanation for the question should be revealed now.
///
/// Tutor mode reveals explanations as soon as a question is answered;
/// every mode reveals them once the quiz is finished.
pub fn should_show_explanation(state: &QuizState, question_id: &QuestionId) -> bool {
    if !state.config.show_explanations || !is_question_answered(state, question_id) {
        return false;
    }
    state.config.mode == QuizMode::Tutor || state.status.is_terminal()
}

/// True iff the quiz is completed or abandoned.
pub fn is_finished(state: &QuizState) -> bool {
    state.status.is_terminal()
}

/// Seconds left on a timed quiz at `now`, or `None` for untimed quizzes.
///
/// A quiz that has not started reports its full limit; a finished quiz
/// reports the time that was left when it finished.
pub fn remaining_time_secs(state: &QuizState, now: Timestamp) -> Option<u64> {
    let limit = state.config.effective_time_limit_secs()?;
    let Some(start) = state.start_time else {
        return Some(limit);
    };

    let end = state.completed_at.or(state.abandoned_at).unwrap_or(now);
    let elapsed_secs = end.millis_since(start) / 1_000;
    Some(limit.saturating_sub(elapsed_secs))
}

/// True iff a started, timed quiz has run out of time at `now`.
pub fn is_time_expired(state: &QuizState, now: Timestamp) -> bool {
    state.start_time.is_some() && remaining_time_secs(state, now) == Some(0)
}
