//! Deterministic state hashing for quiz state.
//!
//! The hash is deterministic: same state → same hash. It backs the replay
//! checks (replaying an action log must land on the same hash) and lets the
//! CLI fingerprint snapshots.
//!
//! We use BLAKE3. Every field is hashed in a fixed order; strings are
//! length-prefixed so adjacent fields cannot alias, and maps and sets are
//! walked in their sorted order.

use blake3::Hasher;
use pathquiz_types::{QuizConfig, QuizQuestion, Timestamp};

use crate::state::QuizState;

impl QuizState {
    /// Computes a deterministic hash of the entire quiz state.
    ///
    /// # Examples
    ///
    /// ```
    /// use pathquiz_kernel::QuizState;
    ///
    /// let state1 = QuizState::new();
    /// let state2 = QuizState::new();
    ///
    /// // Same state → same hash
    /// assert_eq!(state1.compute_state_hash(), state2.compute_state_hash());
    /// ```
    pub fn compute_state_hash(&self) -> [u8; 32] {
        let mut hasher = Hasher::new();

        update_str(&mut hasher, self.session_id.as_str());
        update_str(&mut hasher, self.status.as_str());

        hasher.update(&(self.total_questions as u64).to_le_bytes());
        for question in &self.questions {
            update_question(&mut hasher, question);
        }
        hasher.update(&(self.current_question_index as u64).to_le_bytes());

        // BTreeMap iteration is sorted by question id
        hasher.update(&(self.answers.len() as u64).to_le_bytes());
        for (question_id, answer) in &self.answers {
            update_str(&mut hasher, question_id.as_str());
            update_str(&mut hasher, answer.selected_option_id.as_str());
            hasher.update(&[u8::from(answer.is_correct)]);
            hasher.update(&answer.time_spent_ms.to_le_bytes());
            hasher.update(&answer.attempts.to_le_bytes());
        }

        hasher.update(&(self.flagged.len() as u64).to_le_bytes());
        for question_id in &self.flagged {
            update_str(&mut hasher, question_id.as_str());
        }

        hasher.update(&(self.progress.answered as u64).to_le_bytes());
        hasher.update(&(self.progress.correct as u64).to_le_bytes());
        hasher.update(&(self.progress.incorrect as u64).to_le_bytes());
        hasher.update(&[self.progress.percentage]);

        update_timestamp(&mut hasher, self.start_time);
        update_timestamp(&mut hasher, self.completed_at);
        update_timestamp(&mut hasher, self.abandoned_at);
        hasher.update(&self.total_time_spent_ms.to_le_bytes());

        update_config(&mut hasher, &self.config);

        hasher.update(&[u8::from(self.sync_status.pending_changes)]);
        hasher.update(&self.sync_status.revision.to_le_bytes());
        update_optional_u64(&mut hasher, self.sync_status.last_synced_revision);

        *hasher.finalize().as_bytes()
    }

    /// Returns the state hash as lowercase hex.
    pub fn state_hash_hex(&self) -> String {
        self.compute_state_hash()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

fn update_str(hasher: &mut Hasher, s: &str) {
    hasher.update(&(s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn update_optional_u64(hasher: &mut Hasher, value: Option<u64>) {
    match value {
        Some(v) => {
            hasher.update(&[1u8]);
            hasher.update(&v.to_le_bytes());
        }
        None => {
            hasher.update(&[0u8]);
        }
    }
}

fn update_timestamp(hasher: &mut Hasher, ts: Option<Timestamp>) {
    update_optional_u64(hasher, ts.map(|t| t.as_millis()));
}

fn update_question(hasher: &mut Hasher, question: &QuizQuestion) {
    update_str(hasher, question.id.as_str());
    update_str(hasher, &question.text);
    update_str(hasher, &question.category);
    match &question.explanation {
        Some(explanation) => {
            hasher.update(&[1u8]);
            update_str(hasher, explanation);
        }
        None => {
            hasher.update(&[0u8]);
        }
    }
    hasher.update(&(question.options.len() as u64).to_le_bytes());
    for option in &question.options {
        update_str(hasher, option.id.as_str());
        update_str(hasher, &option.text);
        hasher.update(&[u8::from(option.is_correct)]);
    }
}

fn update_config(hasher: &mut Hasher, config: &QuizConfig) {
    update_str(hasher, config.mode.as_str());
    update_str(hasher, config.timing.as_str());
    update_optional_u64(hasher, config.time_limit_secs);
    hasher.update(&[
        u8::from(config.show_explanations),
        u8::from(config.allow_review),
    ]);
}

#[cfg(test)]
mod tests {
    use pathquiz_types::{QuizConfig, QuizOption, QuizQuestion};

    use crate::action::Action;
    use crate::kernel::quiz_state_reducer;
    use crate::state::QuizState;

    fn initialized() -> QuizState {
        let questions = vec![QuizQuestion::new(
            "q1",
            "Hallmark of apoptosis?",
            vec![
                QuizOption::new("a", "Nuclear fragmentation", true),
                QuizOption::new("b", "Cell swelling", false),
            ],
            "cell-injury",
        )];
        quiz_state_reducer(
            QuizState::new(),
            Action::initialize("s1", questions, QuizConfig::default()),
        )
    }

    #[test]
    fn hash_changes_when_state_changes() {
        let state = initialized();
        let before = state.compute_state_hash();
        let after = quiz_state_reducer(state, Action::submit_answer("q1", "a", 100));
        assert_ne!(before, after.compute_state_hash());
    }

    #[test]
    fn hash_is_stable_across_clones() {
        let state = initialized();
        assert_eq!(state.compute_state_hash(), state.clone().compute_state_hash());
    }

    #[test]
    fn hex_is_64_chars() {
        assert_eq!(QuizState::new().state_hash_hex().len(), 64);
    }
}
