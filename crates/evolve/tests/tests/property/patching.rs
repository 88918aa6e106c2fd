//! Property tests: patch application is total, first-match and pure.

use maple_evolve_patch::{PatchEngine, PatchError};
use proptest::prelude::*;

fn arb_lines() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 1..12)
}

fn patch(search: &str, replace: &str) -> String {
    format!("<<<<<<< SEARCH\n{}\n=======\n{}\n>>>>>>> REPLACE", search, replace)
}

proptest! {
    /// An exact search block replaces its first occurrence and nothing else.
    #[test]
    fn exact_match_replaces_first_occurrence_only(
        lines in arb_lines(),
        pick in any::<prop::sample::Index>(),
        replace in "[A-Z]{1,8}",
    ) {
        let program = lines.join("\n");
        let search = pick.get(lines.as_slice()).clone();
        let applied = PatchEngine::new()
            .try_apply(&program, &patch(&search, &replace))
            .unwrap();
        prop_assert_eq!(applied.program, program.replacen(&search, &replace, 1));
    }

    /// Text without markers never changes the program.
    #[test]
    fn marker_free_text_is_malformed(lines in arb_lines(), text in "[a-z =]{0,40}") {
        let program = lines.join("\n");
        let outcome = PatchEngine::new().apply(&program, &text);
        prop_assert_eq!(&outcome.program, &program);
        prop_assert!(matches!(outcome.error(), Some(PatchError::Malformed(_))));
    }

    /// A search block absent from the program leaves it unchanged.
    #[test]
    fn absent_search_block_is_no_match(lines in arb_lines(), search in "[0-9]{1,6}") {
        let program = lines.join("\n");
        let outcome = PatchEngine::new().apply(&program, &patch(&search, "x"));
        prop_assert_eq!(&outcome.program, &program);
        prop_assert_eq!(outcome.error(), Some(&PatchError::NoMatch));
    }

    /// Applying the same patch twice gives the same result.
    #[test]
    fn application_is_deterministic(
        lines in arb_lines(),
        pick in any::<prop::sample::Index>(),
    ) {
        let program = lines.join("\n");
        let text = patch(pick.get(lines.as_slice()).as_str(), "Z");
        let engine = PatchEngine::new();
        prop_assert_eq!(engine.apply(&program, &text), engine.apply(&program, &text));
    }
}
