//! Configuration management commands.

use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;
use pathquiz_config::{Paths, PathquizConfig};

use super::load_config;
use crate::style::{print_error, print_header, print_labeled, print_spacer, print_success};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    #[default]
    Text,
    Toml,
    Json,
}

/// Show the merged configuration.
pub fn show(project: &Path, format: ConfigFormat) -> Result<()> {
    let config = load_config(project)?;

    match format {
        ConfigFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        ConfigFormat::Toml => println!("{}", toml::to_string_pretty(&config)?),
        ConfigFormat::Text => print_text(project, &config),
    }

    Ok(())
}

/// Validate the configuration files of a project.
pub fn validate(project: &Path) -> Result<()> {
    match load_config(project) {
        Ok(_) => {
            print_success("Configuration is valid");
            Ok(())
        }
        Err(e) => {
            print_error("Configuration validation failed");
            Err(e)
        }
    }
}

fn print_text(project: &Path, config: &PathquizConfig) {
    print_header("pathquiz configuration");
    print_spacer();

    print_header("Project:");
    print_labeled("Name", &config.project.name);
    let project_file = Paths::project_config_file(project);
    print_labeled(
        "Config file",
        &if project_file.exists() {
            project_file.display().to_string()
        } else {
            "none".to_string()
        },
    );
    print_spacer();

    print_header("Quiz:");
    print_labeled("Mode", config.quiz.mode.as_str());
    print_labeled("Timing", config.quiz.timing.as_str());
    print_labeled(
        "Time limit",
        &config
            .quiz
            .time_limit_secs
            .map_or("none".to_string(), |s| format!("{s}s")),
    );
    print_labeled("Show explanations", &config.quiz.show_explanations.to_string());
    print_labeled("Allow review", &config.quiz.allow_review.to_string());
    print_spacer();

    print_header("Sync:");
    print_labeled("Autosync every", &config.sync.autosync_every.to_string());
    print_labeled("Sync on finish", &config.sync.sync_on_finish.to_string());
    print_labeled("Snapshot dir", &config.sync.snapshot_dir.display().to_string());
}
