//! Property tests for deploy step compilation.

use proptest::prelude::*;

use apker::{StepCompiler, StepError};

fn word() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9._/-]{1,12}").unwrap()
}

fn valid_step() -> impl Strategy<Value = String> {
    prop_oneof![
        proptest::collection::vec(word(), 1..4).prop_map(|w| format!("run {}", w.join(" "))),
        (word(), word()).prop_map(|(a, b)| format!("copy {} {}", a, b)),
        proptest::collection::vec(word(), 1..4).prop_map(|w| format!("dir {}", w.join(" "))),
        (word(), "[a-z][a-z0-9_-]{0,8}").prop_map(|(src, name)| format!("action {} {}", src, name)),
    ]
}

fn unknown_verb() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z]{2,10}")
        .unwrap()
        .prop_filter("must not be a verb", |w| {
            !matches!(w.as_str(), "run" | "copy" | "dir" | "action" | "reboot")
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Compiling never panics on arbitrary input.
    #[test]
    fn property_compile_never_panics(lines in proptest::collection::vec("(?s).{0,64}", 0..6)) {
        let _ = StepCompiler::new().compile(&lines);
    }

    /// PROPERTY: Compilation is deterministic and keeps one step per line.
    #[test]
    fn property_compile_is_idempotent(lines in proptest::collection::vec(valid_step(), 0..8)) {
        let compiler = StepCompiler::new();
        let first = compiler.compile(&lines).unwrap();
        let second = compiler.compile(&lines).unwrap();

        prop_assert_eq!(first.len(), lines.len());
        prop_assert_eq!(first, second);
    }

    /// PROPERTY: `reboot` anywhere but last rejects the whole list.
    #[test]
    fn property_reboot_not_last_is_rejected(
        mut lines in proptest::collection::vec(valid_step(), 1..6),
        at in any::<prop::sample::Index>(),
    ) {
        let position = at.index(lines.len());
        lines.insert(position, "reboot".to_string());

        let result = StepCompiler::new().compile(&lines);
        prop_assert!(
            matches!(result, Err(StepError::RebootNotLast { .. })),
            "reboot at {} of {} should be rejected",
            position + 1,
            lines.len()
        );
    }

    /// PROPERTY: `reboot` as the final step is accepted.
    #[test]
    fn property_reboot_last_is_accepted(mut lines in proptest::collection::vec(valid_step(), 0..6)) {
        lines.push("reboot".to_string());
        prop_assert!(StepCompiler::new().compile(&lines).is_ok());
    }

    /// PROPERTY: An unknown verb is reported with the offending line verbatim.
    #[test]
    fn property_unknown_verb_names_the_line(
        before in proptest::collection::vec(valid_step(), 0..4),
        verb in unknown_verb(),
        rest in word(),
    ) {
        let bad = format!("{} {}", verb, rest);
        let mut lines = before;
        lines.push(bad.clone());

        match StepCompiler::new().compile(&lines) {
            Err(err @ StepError::UnknownVerb { .. }) => {
                prop_assert!(err.to_string().contains(&bad));
            }
            other => prop_assert!(false, "expected UnknownVerb, got {:?}", other),
        }
    }
}
