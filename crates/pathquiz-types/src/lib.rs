//! # pathquiz-types: Core types for `pathquiz`
//!
//! This crate contains the value types shared by the quiz kernel, the
//! configuration layer and the CLI:
//! - Identifiers ([`SessionId`], [`QuestionId`], [`OptionId`])
//! - Temporal types ([`Timestamp`])
//! - Question-bank values ([`QuizQuestion`], [`QuizOption`])
//! - Quiz-taking configuration ([`QuizConfig`], [`QuizMode`], [`Timing`])
//!
//! Everything here is a plain value: no IO, no interior mutability. The
//! question bank and configuration are supplied by collaborators and are
//! treated as immutable once handed to the kernel.

use std::{
    borrow::Borrow,
    fmt::Display,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

// ============================================================================
// Identifiers - opaque strings assigned by the content/session subsystems
// ============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the identifier is the empty string.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier correlating a quiz state with a persisted quiz session.
    SessionId
);

string_id!(
    /// Identifier of a question in the question bank.
    QuestionId
);

string_id!(
    /// Identifier of an answer option, unique within its question.
    OptionId
);

// ============================================================================
// Timestamp - Copy (8-byte value)
// ============================================================================

/// Wall-clock timestamp in milliseconds since the Unix epoch.
///
/// Milliseconds match the resolution the web client reports, so snapshots
/// written by either side compare without conversion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The Unix epoch (1970-01-01 00:00:00 UTC).
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Creates a timestamp from milliseconds since the Unix epoch.
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as milliseconds since the Unix epoch.
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, or zero if `earlier` is later.
    pub fn millis_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Creates a timestamp for the current time.
    ///
    /// A system clock set before the epoch reads as [`Timestamp::EPOCH`].
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self(duration.as_millis() as u64)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secs = self.0 / 1_000;
        let millis = self.0 % 1_000;
        write!(f, "{secs}.{millis:03}")
    }
}

impl From<u64> for Timestamp {
    fn from(millis: u64) -> Self {
        Self(millis)
    }
}

impl From<Timestamp> for u64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

// ============================================================================
// Question bank
// ============================================================================

/// One selectable option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOption {
    pub id: OptionId,
    pub text: String,
    pub is_correct: bool,
}

impl QuizOption {
    pub fn new(id: impl Into<OptionId>, text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_correct,
        }
    }
}

/// A question as delivered by the question bank.
///
/// Exactly one option is expected to be flagged correct. That is a
/// precondition of question-set construction and is not re-checked here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<QuizOption>,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl QuizQuestion {
    pub fn new(
        id: impl Into<QuestionId>,
        text: impl Into<String>,
        options: Vec<QuizOption>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            options,
            category: category.into(),
            explanation: None,
        }
    }

    /// Attaches an explanation shown after answering in tutor mode.
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Looks up an option by id.
    pub fn option(&self, id: &OptionId) -> Option<&QuizOption> {
        self.options.iter().find(|o| &o.id == id)
    }

    /// Returns the first option flagged correct.
    pub fn correct_option(&self) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.is_correct)
    }
}

// ============================================================================
// Quiz-taking configuration
// ============================================================================

/// How feedback is delivered while the quiz is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    /// Immediate feedback and explanations after each answer.
    #[default]
    Tutor,
    /// No feedback until the quiz is completed.
    Practice,
}

impl QuizMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizMode::Tutor => "tutor",
            QuizMode::Practice => "practice",
        }
    }
}

impl Display for QuizMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the quiz runs against a time limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timing {
    Timed,
    #[default]
    Untimed,
}

impl Timing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timing::Timed => "timed",
            Timing::Untimed => "untimed",
        }
    }
}

impl Display for Timing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable quiz-taking configuration, fixed when the quiz is initialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizConfig {
    pub mode: QuizMode,
    pub timing: Timing,
    /// Time limit for timed quizzes. Ignored when untimed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<u64>,
    pub show_explanations: bool,
    pub allow_review: bool,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            mode: QuizMode::Tutor,
            timing: Timing::Untimed,
            time_limit_secs: None,
            show_explanations: true,
            allow_review: true,
        }
    }
}

impl QuizConfig {
    /// Tutor-mode, untimed configuration with explanations and review.
    pub fn tutor() -> Self {
        Self::default()
    }

    /// Timed practice configuration: no explanations during the attempt.
    pub fn timed_practice(time_limit_secs: u64) -> Self {
        Self {
            mode: QuizMode::Practice,
            timing: Timing::Timed,
            time_limit_secs: Some(time_limit_secs),
            show_explanations: false,
            allow_review: true,
        }
    }

    /// Returns the effective time limit, present only for timed quizzes.
    pub fn effective_time_limit_secs(&self) -> Option<u64> {
        match self.timing {
            Timing::Timed => self.time_limit_secs,
            Timing::Untimed => None,
        }
    }
}
