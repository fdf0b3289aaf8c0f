#![no_main]

use libfuzzer_sys::fuzz_target;

use pathquiz_kernel::QuizState;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    // Arbitrary input must decode or fail cleanly, never panic
    if let Ok(state) = QuizState::from_json(json) {
        // Anything accepted satisfies every invariant and re-encodes losslessly
        assert!(state.validate().is_ok());
        let again = QuizState::from_json(&state.to_json().expect("re-encode accepted state"))
            .expect("re-decode accepted state");
        assert_eq!(again, state);
    }
});
