//! Configuration management for pathquiz
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence)
//! 2. Environment variables (PATHQUIZ_* prefix, `__` between sections)
//! 3. pathquiz.local.toml (gitignored, local overrides)
//! 4. pathquiz.toml (git-tracked, project config)
//! 5. ~/.config/pathquiz/config.toml (user defaults)
//! 6. Built-in defaults (lowest precedence)

use anyhow::Result;
use pathquiz_kernel::SyncPolicy;
use pathquiz_types::{QuizConfig, QuizMode, Timing};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main pathquiz configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathquizConfig {
    pub project: ProjectConfig,
    pub quiz: QuizDefaults,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "pathquiz".to_string(),
        }
    }
}

/// Quiz settings applied when an action log or session does not carry its
/// own configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizDefaults {
    pub mode: QuizMode,
    pub timing: Timing,
    pub time_limit_secs: Option<u64>,
    pub show_explanations: bool,
    pub allow_review: bool,
}

impl Default for QuizDefaults {
    fn default() -> Self {
        Self::from(&QuizConfig::default())
    }
}

impl From<&QuizConfig> for QuizDefaults {
    fn from(config: &QuizConfig) -> Self {
        Self {
            mode: config.mode,
            timing: config.timing,
            time_limit_secs: config.time_limit_secs,
            show_explanations: config.show_explanations,
            allow_review: config.allow_review,
        }
    }
}

impl QuizDefaults {
    pub fn to_quiz_config(&self) -> QuizConfig {
        QuizConfig {
            mode: self.mode,
            timing: self.timing,
            time_limit_secs: self.time_limit_secs,
            show_explanations: self.show_explanations,
            allow_review: self.allow_review,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Save a snapshot after this many applied actions (0 = never count).
    pub autosync_every: u32,
    pub sync_on_finish: bool,
    pub snapshot_dir: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let policy = SyncPolicy::default();
        Self {
            autosync_every: policy.autosync_every,
            sync_on_finish: policy.sync_on_finish,
            snapshot_dir: PathBuf::from(".pathquiz/snapshots"),
        }
    }
}

impl SyncConfig {
    pub fn policy(&self) -> SyncPolicy {
        SyncPolicy {
            autosync_every: self.autosync_every,
            sync_on_finish: self.sync_on_finish,
        }
    }
}

impl PathquizConfig {
    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Configuration for exam-style practice: timed, no explanations until
    /// the end, no flagging.
    pub fn exam(time_limit_secs: u64) -> Self {
        Self {
            quiz: QuizDefaults {
                mode: QuizMode::Practice,
                timing: Timing::Timed,
                time_limit_secs: Some(time_limit_secs),
                show_explanations: true,
                allow_review: false,
            },
            ..Default::default()
        }
    }

    /// Reject combinations the kernel would silently treat as untimed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quiz.timing == Timing::Timed {
            match self.quiz.time_limit_secs {
                None => {
                    return Err(ConfigError::ValidationError(
                        "quiz.timing is \"timed\" but quiz.time_limit_secs is not set".to_string(),
                    ));
                }
                Some(0) => {
                    return Err(ConfigError::ValidationError(
                        "quiz.time_limit_secs must be greater than zero".to_string(),
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Resolve relative paths to absolute
    pub fn resolve_paths(&mut self, base_dir: impl AsRef<Path>) {
        let base = base_dir.as_ref();

        if self.sync.snapshot_dir.is_relative() {
            self.sync.snapshot_dir = base.join(&self.sync.snapshot_dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PathquizConfig::default();
        assert_eq!(config.quiz.mode, QuizMode::Tutor);
        assert_eq!(config.quiz.timing, Timing::Untimed);
        assert!(config.quiz.allow_review);
        assert_eq!(config.sync.policy(), SyncPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_quiz_defaults_roundtrip_to_kernel_config() {
        let quiz = QuizConfig::timed_practice(600);
        assert_eq!(QuizDefaults::from(&quiz).to_quiz_config(), quiz);
    }

    #[test]
    fn test_exam_config() {
        let config = PathquizConfig::exam(3600);
        assert_eq!(config.quiz.mode, QuizMode::Practice);
        assert_eq!(config.quiz.to_quiz_config().effective_time_limit_secs(), Some(3600));
        assert!(!config.quiz.allow_review);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timed_without_limit_is_invalid() {
        let mut config = PathquizConfig::default();
        config.quiz.timing = Timing::Timed;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        config.quiz.time_limit_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_path_resolution() {
        let mut config = PathquizConfig::default();
        config.resolve_paths("/home/user/project");

        assert_eq!(
            config.sync.snapshot_dir,
            PathBuf::from("/home/user/project/.pathquiz/snapshots")
        );
    }
}
