//! Kani verification harnesses for the quiz reducer
//!
//! Bounded model checking proofs for the arithmetic and bounds properties
//! the reducer relies on.
//!
//! # Running Proofs
//!
//! ```bash
//! cargo kani --package pathquiz-kernel
//! cargo kani --harness verify_percentage_bounded
//! ```

#[cfg(kani)]
mod verification {
    use pathquiz_types::{QuizConfig, QuizOption, QuizQuestion, Timestamp};

    use crate::action::Action;
    use crate::kernel::apply_action;
    use crate::state::{QuizState, percentage};

    fn two_question_state() -> QuizState {
        let questions = vec![
            QuizQuestion::new(
                "q1",
                "q1",
                vec![QuizOption::new("a", "a", true), QuizOption::new("b", "b", false)],
                "c",
            ),
            QuizQuestion::new(
                "q2",
                "q2",
                vec![QuizOption::new("a", "a", true), QuizOption::new("b", "b", false)],
                "c",
            ),
        ];
        let (state, _) = apply_action(
            QuizState::new(),
            Action::initialize("s", questions, QuizConfig::default()),
        );
        state
    }

    /// **Proof 1: percentage never exceeds 100**
    #[kani::proof]
    fn verify_percentage_bounded() {
        let part: u16 = kani::any();
        let total: u16 = kani::any();
        kani::assume(part <= total);

        let pct = percentage(usize::from(part), usize::from(total));
        assert!(pct <= 100);
        if total == 0 {
            assert_eq!(pct, 0);
        }
        if part == total && total > 0 {
            assert_eq!(pct, 100);
        }
        if part < total {
            assert!(pct < 100);
        }
    }

    /// **Proof 2: navigation never moves the cursor out of bounds**
    #[kani::proof]
    #[kani::unwind(4)]
    fn verify_navigation_in_bounds() {
        let index: usize = kani::any();
        let (state, transition) = apply_action(two_question_state(), Action::navigate_to(index));

        assert!(state.current_question_index() < state.total_questions());
        if index >= 2 {
            assert!(!transition.is_applied());
        }
    }

    /// **Proof 3: time accumulates without overflow panics**
    #[kani::proof]
    #[kani::unwind(4)]
    fn verify_time_accumulation_saturates() {
        let first: u64 = kani::any();
        let second: u64 = kani::any();

        let (state, _) = apply_action(two_question_state(), Action::start(Timestamp::EPOCH));
        let (state, _) = apply_action(state, Action::submit_answer("q1", "a", first));
        let (state, _) = apply_action(state, Action::submit_answer("q1", "b", second));

        assert_eq!(state.total_time_spent_ms(), first.saturating_add(second));
        assert_eq!(state.progress().answered, 1);
    }
}
