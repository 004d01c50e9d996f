//! Property tests for POSIX shell quoting.

use std::process::Command;

use proptest::prelude::*;

use apker::domain::services::shell::{quote, split_words};

/// What `sh` prints for `printf %s <word>`
fn sh_reads(word: &str) -> String {
    let output = Command::new("sh")
        .arg("-c")
        .arg(format!("printf %s {}", word))
        .output()
        .unwrap();
    String::from_utf8(output.stdout).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: A quoted string is one shell word equal to the original.
    #[test]
    fn property_quote_round_trips_through_split(s in "(?s)[^\\x00]{0,64}") {
        prop_assert_eq!(split_words(&quote(&s)).unwrap(), vec![s]);
    }

    /// PROPERTY: `sh` itself reads a quoted word back unchanged.
    #[test]
    fn property_quote_round_trips_through_sh(s in "[ -~]{0,32}") {
        prop_assert_eq!(sh_reads(&quote(&s)), s);
    }
}

#[test]
fn copy_with_quoted_source_keeps_the_space() {
    assert_eq!(
        split_words("copy \"a b\" c").unwrap(),
        vec!["copy".to_string(), "a b".to_string(), "c".to_string()]
    );
}
