#![no_main]

use libfuzzer_sys::fuzz_target;

use pathquiz_kernel::{Action, QuizState, apply_action};
use pathquiz_types::{QuizConfig, QuizMode, QuizOption, QuizQuestion, Timestamp, Timing};

const QUESTIONS: usize = 4;

fn questions(count: usize) -> Vec<QuizQuestion> {
    (0..count)
        .map(|i| {
            QuizQuestion::new(
                format!("q{i}"),
                format!("question {i}"),
                vec![
                    QuizOption::new(format!("q{i}-a"), "a", true),
                    QuizOption::new(format!("q{i}-b"), "b", false),
                ],
                "fuzz",
            )
        })
        .collect()
}

fn u64_at(data: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    let n = data.len().min(8);
    buf[..n].copy_from_slice(&data[..n]);
    u64::from_le_bytes(buf)
}

/// Build an Action from raw bytes. The first byte selects the variant and
/// the rest fill its fields; ids stay in a small space so both valid and
/// dangling references occur.
fn action_from_bytes(data: &[u8]) -> Action {
    let variant = data[0] % 10;
    let arg = data.get(1).copied().unwrap_or(0);
    let rest = data.get(2..).unwrap_or(&[]);
    let question_id = format!("q{}", arg % (QUESTIONS as u8 + 2));

    match variant {
        0 => {
            let config = QuizConfig {
                mode: if arg & 1 == 0 {
                    QuizMode::Tutor
                } else {
                    QuizMode::Practice
                },
                timing: if arg & 2 == 0 {
                    Timing::Untimed
                } else {
                    Timing::Timed
                },
                time_limit_secs: Some(u64_at(rest) % 7200),
                show_explanations: arg & 4 == 0,
                allow_review: arg & 8 == 0,
            };
            let mut qs = questions(usize::from(arg >> 4) % (QUESTIONS + 1));
            // Occasionally repeat an id so the duplicate guard is exercised
            if arg & 0x80 != 0 && !qs.is_empty() {
                qs.push(qs[0].clone());
            }
            Action::initialize("fuzz", qs, config)
        }
        1 => Action::start(Timestamp::from_millis(u64_at(rest))),
        2 => {
            let option = if rest.first().copied().unwrap_or(0) & 1 == 0 {
                "a"
            } else {
                "b"
            };
            Action::submit_answer(
                question_id.clone(),
                format!("{question_id}-{option}"),
                u64_at(rest),
            )
        }
        3 => Action::navigate_to(u64_at(rest) as usize),
        4 => Action::NextQuestion,
        5 => Action::PreviousQuestion,
        6 => Action::toggle_flag(question_id),
        7 => Action::complete(Timestamp::from_millis(u64_at(rest))),
        8 => Action::abandon(Timestamp::from_millis(u64_at(rest))),
        _ => Action::sync_ack(u64::from(arg)),
    }
}

fuzz_target!(|data: &[u8]| {
    let mut state = QuizState::new();

    // Each 10-byte chunk is one action
    for chunk in data.chunks(10) {
        let before = state.clone();
        let (next, transition) = apply_action(state, action_from_bytes(chunk));

        if !transition.is_applied() {
            assert_eq!(next, before, "ignored action changed state");
        }
        if let Err(violation) = next.validate() {
            panic!("reachable state failed validation: {violation}");
        }
        state = next;
    }

    // Snapshots of reachable states always round-trip
    let json = state.to_json().expect("serialize reachable state");
    let restored = QuizState::from_json(&json).expect("restore reachable state");
    assert_eq!(restored.compute_state_hash(), state.compute_state_hash());
});
