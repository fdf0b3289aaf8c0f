//! Validates a snapshot file and shows what it contains.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pathquiz_kernel::QuizState;
use pathquiz_kernel::queries::unanswered_questions;

use super::OutputFormat;
use crate::report;
use crate::style::{
    print_header, print_hint, print_info_table, print_list_table, print_spacer, print_success,
};

pub fn run(snapshot: &Path, format: OutputFormat) -> Result<()> {
    let json = fs::read_to_string(snapshot)
        .with_context(|| format!("Failed to read snapshot {}", snapshot.display()))?;
    let state = QuizState::from_json(&json)
        .with_context(|| format!("Snapshot {} is invalid", snapshot.display()))?;

    match format {
        OutputFormat::Json => {
            let mut summary = report::state_json(&state);
            summary["valid"] = true.into();
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            print_success(&format!("{} is a valid snapshot", snapshot.display()));
            print_spacer();
            print_info_table(&report::state_entries(&state));

            if state.total_questions() > 0 {
                print_spacer();
                print_header("Questions");
                print_list_table(&report::QUESTION_COLUMNS, &report::question_rows(&state));
            }

            let unanswered = unanswered_questions(&state).count();
            if unanswered > 0 && !state.status().is_terminal() {
                print_hint(&format!("{unanswered} question(s) still unanswered"));
            }
        }
    }

    Ok(())
}
