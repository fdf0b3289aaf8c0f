//! Actions that drive the quiz state machine.
//!
//! Actions are the only way to change a [`crate::state::QuizState`]. The set
//! is closed, so the reducer's dispatch is exhaustive and a malformed action
//! cannot be constructed.
//!
//! The JSON form uses a `type` tag with upper snake-case names and camelCase
//! payload fields, matching the action logs written by the web client:
//!
//! ```json
//! { "type": "SUBMIT_ANSWER", "questionId": "q1", "selectedOptionId": "a", "timeSpentMs": 5000 }
//! ```

use pathquiz_types::{OptionId, QuestionId, QuizConfig, QuizQuestion, SessionId, Timestamp};
use serde::{Deserialize, Serialize};

/// A request for one discrete state transition.
///
/// Time-dependent actions carry their timestamp. The kernel never reads a
/// clock; the caller (usually [`crate::runtime::QuizSession`]) stamps them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Loads a question set and configuration, replacing any prior quiz.
    #[serde(rename_all = "camelCase")]
    Initialize {
        session_id: SessionId,
        questions: Vec<QuizQuestion>,
        #[serde(default)]
        config: QuizConfig,
    },

    /// Moves the quiz to `in_progress`, recording the first start time.
    #[serde(rename_all = "camelCase")]
    StartQuiz { at: Timestamp },

    /// Records (or overwrites) the answer to one question.
    #[serde(rename_all = "camelCase")]
    SubmitAnswer {
        question_id: QuestionId,
        selected_option_id: OptionId,
        time_spent_ms: u64,
    },

    /// Moves the cursor to an absolute question index.
    #[serde(rename_all = "camelCase")]
    NavigateToQuestion { index: usize },

    /// Moves the cursor forward by one question.
    NextQuestion,

    /// Moves the cursor back by one question.
    PreviousQuestion,

    /// Marks or unmarks a question for review.
    #[serde(rename_all = "camelCase")]
    ToggleFlag { question_id: QuestionId },

    /// Finishes an in-progress quiz.
    #[serde(rename_all = "camelCase")]
    CompleteQuiz { at: Timestamp },

    /// Abandons an in-progress quiz (timeout or explicit cancel).
    #[serde(rename_all = "camelCase")]
    AbandonQuiz { at: Timestamp },

    /// Acknowledges that the snapshot at `revision` has been persisted.
    #[serde(rename_all = "camelCase")]
    SyncAck { revision: u64 },
}

impl Action {
    pub fn initialize(
        session_id: impl Into<SessionId>,
        questions: Vec<QuizQuestion>,
        config: QuizConfig,
    ) -> Self {
        Action::Initialize {
            session_id: session_id.into(),
            questions,
            config,
        }
    }

    pub fn start(at: Timestamp) -> Self {
        Action::StartQuiz { at }
    }

    pub fn submit_answer(
        question_id: impl Into<QuestionId>,
        selected_option_id: impl Into<OptionId>,
        time_spent_ms: u64,
    ) -> Self {
        Action::SubmitAnswer {
            question_id: question_id.into(),
            selected_option_id: selected_option_id.into(),
            time_spent_ms,
        }
    }

    pub fn navigate_to(index: usize) -> Self {
        Action::NavigateToQuestion { index }
    }

    pub fn toggle_flag(question_id: impl Into<QuestionId>) -> Self {
        Action::ToggleFlag {
            question_id: question_id.into(),
        }
    }

    pub fn complete(at: Timestamp) -> Self {
        Action::CompleteQuiz { at }
    }

    pub fn abandon(at: Timestamp) -> Self {
        Action::AbandonQuiz { at }
    }

    pub fn sync_ack(revision: u64) -> Self {
        Action::SyncAck { revision }
    }

    /// Returns the wire name of the action, as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Initialize { .. } => "INITIALIZE",
            Action::StartQuiz { .. } => "START_QUIZ",
            Action::SubmitAnswer { .. } => "SUBMIT_ANSWER",
            Action::NavigateToQuestion { .. } => "NAVIGATE_TO_QUESTION",
            Action::NextQuestion => "NEXT_QUESTION",
            Action::PreviousQuestion => "PREVIOUS_QUESTION",
            Action::ToggleFlag { .. } => "TOGGLE_FLAG",
            Action::CompleteQuiz { .. } => "COMPLETE_QUIZ",
            Action::AbandonQuiz { .. } => "ABANDON_QUIZ",
            Action::SyncAck { .. } => "SYNC_ACK",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_answer_json_shape() {
        let action = Action::submit_answer("q1", "a", 5_000);
        let json = serde_json::to_value(&action).unwrap();

        assert_eq!(json["type"], "SUBMIT_ANSWER");
        assert_eq!(json["questionId"], "q1");
        assert_eq!(json["selectedOptionId"], "a");
        assert_eq!(json["timeSpentMs"], 5_000);
    }

    #[test]
    fn unit_variants_parse_from_tag_only() {
        let action: Action = serde_json::from_str(r#"{"type":"NEXT_QUESTION"}"#).unwrap();
        assert_eq!(action, Action::NextQuestion);
    }

    #[test]
    fn initialize_config_is_optional() {
        let action: Action = serde_json::from_str(
            r#"{"type":"INITIALIZE","sessionId":"s1","questions":[]}"#,
        )
        .unwrap();

        assert_eq!(
            action,
            Action::initialize("s1", Vec::new(), QuizConfig::default())
        );
    }

    #[test]
    fn unknown_action_type_is_rejected() {
        let result: Result<Action, _> = serde_json::from_str(r#"{"type":"RESET_EVERYTHING"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn missing_payload_field_is_rejected() {
        let result: Result<Action, _> =
            serde_json::from_str(r#"{"type":"SUBMIT_ANSWER","questionId":"q1"}"#);
        assert!(result.is_err());
    }
}
