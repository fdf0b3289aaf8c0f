//! Rendering of quiz state for terminal and JSON output.

use pathquiz_kernel::queries::{get_current_question, remaining_time_secs};
use pathquiz_kernel::QuizState;
use pathquiz_types::Timestamp;

use crate::style::colors::SemanticStyle;

/// Key-value summary of a quiz state.
pub fn state_entries(state: &QuizState) -> Vec<(&'static str, String)> {
    let progress = state.progress();
    let sync = state.sync_status();
    let config = state.config();

    let mut entries = vec![
        ("Session", state.session_id().to_string()),
        ("Status", state.status().to_string()),
        ("Mode", format!("{} / {}", config.mode, config.timing)),
        (
            "Question",
            match get_current_question(state) {
                Some(q) => format!(
                    "{} of {} ({})",
                    state.current_question_index() + 1,
                    state.total_questions(),
                    q.id
                ),
                None => "none".to_string(),
            },
        ),
        (
            "Answered",
            format!(
                "{}/{} ({}%)",
                progress.answered,
                state.total_questions(),
                progress.percentage
            ),
        ),
        (
            "Score",
            format!("{} correct, {} incorrect", progress.correct, progress.incorrect),
        ),
        ("Flagged", state.flagged().len().to_string()),
        (
            "Time spent",
            format!("{:.1}s", state.total_time_spent_ms() as f64 / 1000.0),
        ),
    ];

    if let Some(remaining) = remaining_time_secs(state, Timestamp::now()) {
        entries.push(("Time remaining", format!("{remaining}s")));
    }

    entries.push((
        "Revision",
        format!(
            "{} ({})",
            sync.revision,
            if sync.pending_changes {
                "pending"
            } else {
                "synced"
            }
        ),
    ));
    entries.push(("State hash", state.state_hash_hex()));
    entries
}

/// One row per question: position, id, category, chosen option, result, flag.
pub fn question_rows(state: &QuizState) -> Vec<Vec<String>> {
    state
        .questions()
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let cursor = if index == state.current_question_index() {
                "›"
            } else {
                " "
            };
            let (answer, result) = match state.answers().get(&question.id) {
                Some(answer) if answer.is_correct => {
                    (answer.selected_option_id.to_string(), "correct".success())
                }
                Some(answer) => (answer.selected_option_id.to_string(), "incorrect".error()),
                None => ("-".to_string(), "unanswered".muted()),
            };
            let flagged = if state.flagged().contains(&question.id) {
                "⚑".warning()
            } else {
                String::new()
            };

            vec![
                format!("{cursor}{}", index + 1),
                question.id.to_string(),
                question.category.clone(),
                answer,
                result,
                flagged,
            ]
        })
        .collect()
}

pub const QUESTION_COLUMNS: [&str; 6] = ["#", "Question", "Category", "Answer", "Result", "Flag"];

/// Compact machine-readable summary.
pub fn state_json(state: &QuizState) -> serde_json::Value {
    serde_json::json!({
        "sessionId": state.session_id(),
        "status": state.status(),
        "currentQuestionIndex": state.current_question_index(),
        "totalQuestions": state.total_questions(),
        "progress": state.progress(),
        "flagged": state.flagged(),
        "totalTimeSpentMs": state.total_time_spent_ms(),
        "syncStatus": state.sync_status(),
        "stateHash": state.state_hash_hex(),
    })
}
