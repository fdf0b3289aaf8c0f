//! CLI command implementations.

pub mod config;
pub mod inspect;
pub mod replay;
pub mod version;

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use pathquiz_config::PathquizConfig;

/// Output format shared by the reporting commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub(crate) fn load_config(project: &Path) -> Result<PathquizConfig> {
    PathquizConfig::load_from_dir(project)
        .with_context(|| format!("Failed to load configuration for {}", project.display()))
}
