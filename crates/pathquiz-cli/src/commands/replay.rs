//! Replays an action log through the reducer.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use pathquiz_kernel::{
    Action, IgnoreReason, InMemorySnapshotStore, QuizSession, QuizState, SnapshotStore,
    SyncPolicy, SystemClock, Transition,
};
use pathquiz_types::{QuizConfig, SessionId};
use serde_json::Value;
use tracing::info;

use super::{OutputFormat, load_config};
use crate::report;
use crate::store::FileSnapshotStore;
use crate::style::{print_hint, print_info_table, print_spacer, print_success, print_warn};

/// Where the replay starts from.
pub enum Origin<'a> {
    Empty,
    Snapshot(&'a Path),
    Resume(&'a str),
}

pub struct ReplayArgs<'a> {
    pub actions: &'a Path,
    pub origin: Origin<'a>,
    pub out: Option<&'a Path>,
    pub persist: bool,
    pub strict: bool,
    pub project: &'a Path,
    pub format: OutputFormat,
}

struct Ignored {
    index: usize,
    action: &'static str,
    reason: IgnoreReason,
}

pub fn run(args: &ReplayArgs<'_>) -> Result<()> {
    let config = load_config(args.project)?;
    let actions = read_actions(args.actions, &config.quiz.to_quiz_config())?;
    let total = actions.len();

    let snapshot_dir = &config.sync.snapshot_dir;
    let durable = args.persist || matches!(args.origin, Origin::Resume(_));

    let (state, ignored) = if durable {
        let store = FileSnapshotStore::new(snapshot_dir);
        let session = match args.origin {
            Origin::Resume(id) => QuizSession::rehydrate(
                SystemClock::new(),
                store,
                config.sync.policy(),
                &SessionId::new(id),
            )
            .with_context(|| format!("Failed to resume session {id}"))?,
            Origin::Snapshot(path) => QuizSession::with_state(
                read_snapshot(path)?,
                SystemClock::new(),
                store,
                config.sync.policy(),
            ),
            Origin::Empty => QuizSession::new(SystemClock::new(), store, config.sync.policy()),
        };
        drive(session, actions, true)?
    } else {
        let initial = match args.origin {
            Origin::Snapshot(path) => read_snapshot(path)?,
            Origin::Empty | Origin::Resume(_) => QuizState::new(),
        };
        let session = QuizSession::with_state(
            initial,
            SystemClock::new(),
            InMemorySnapshotStore::new(),
            SyncPolicy::manual(),
        );
        drive(session, actions, false)?
    };

    if let Some(out) = args.out {
        fs::write(out, state.to_json_pretty()?)
            .with_context(|| format!("Failed to write snapshot to {}", out.display()))?;
    }

    info!(
        actions = total,
        ignored = ignored.len(),
        hash = %state.state_hash_hex(),
        "replay finished"
    );

    match args.format {
        OutputFormat::Json => {
            let ignored_json: Vec<Value> = ignored
                .iter()
                .map(|i| {
                    serde_json::json!({
                        "index": i.index,
                        "action": i.action,
                        "reason": i.reason,
                    })
                })
                .collect();
            let report = serde_json::json!({
                "actions": total,
                "applied": total - ignored.len(),
                "ignored": ignored_json,
                "summary": report::state_json(&state),
                "state": state,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            print_success(&format!(
                "Replayed {total} actions ({} applied, {} ignored)",
                total - ignored.len(),
                ignored.len()
            ));
            for i in &ignored {
                print_warn(&format!("#{} {} ignored: {}", i.index, i.action, i.reason));
            }
            print_spacer();
            print_info_table(&report::state_entries(&state));
            if let Some(out) = args.out {
                print_hint(&format!("Snapshot written to {}", out.display()));
            }
            if durable {
                print_hint(&format!("Session stored under {}", snapshot_dir.display()));
            }
        }
    }

    if args.strict && !ignored.is_empty() {
        bail!("{} of {total} actions were ignored", ignored.len());
    }

    Ok(())
}

/// Dispatches every action, then syncs once more if asked.
fn drive<S: SnapshotStore>(
    mut session: QuizSession<SystemClock, S>,
    actions: Vec<Action>,
    sync_at_end: bool,
) -> Result<(QuizState, Vec<Ignored>)> {
    let mut ignored = Vec::new();

    for (index, action) in actions.into_iter().enumerate() {
        let name = action.name();
        let transition = session
            .dispatch(action)
            .with_context(|| format!("Action #{index} ({name}) failed"))?;
        if let Transition::Ignored(reason) = transition {
            ignored.push(Ignored {
                index,
                action: name,
                reason,
            });
        }
    }

    if sync_at_end {
        session.sync().context("Failed to store final snapshot")?;
    }

    Ok((session.into_state(), ignored))
}

/// Reads a JSON array of actions. An `INITIALIZE` without a `config` object
/// takes the project's quiz defaults.
fn read_actions(path: &Path, defaults: &QuizConfig) -> Result<Vec<Action>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read actions from {}", path.display()))?;
    let values: Vec<Value> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of actions", path.display()))?;

    let default_config = serde_json::to_value(defaults)?;

    values
        .into_iter()
        .enumerate()
        .map(|(index, mut value)| {
            if let Value::Object(fields) = &mut value
                && fields.get("type").and_then(Value::as_str) == Some("INITIALIZE")
                && !fields.contains_key("config")
            {
                fields.insert("config".to_string(), default_config.clone());
            }
            serde_json::from_value(value).with_context(|| format!("Action #{index} is malformed"))
        })
        .collect()
}

fn read_snapshot(path: &Path) -> Result<QuizState> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    QuizState::from_json(&json).with_context(|| format!("Snapshot {} is invalid", path.display()))
}
