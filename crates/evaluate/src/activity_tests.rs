use super::*;

#[test]
fn mentions_true_on_substring_match() {
    assert!(mentions("ship the release", "we finally ship the release tonight"));
}

#[test]
fn mentions_true_on_half_token_overlap() {
    assert!(mentions("ship the release cleanly", "release notes drafted"));
}

#[test]
fn mentions_false_when_unrelated() {
    assert!(!mentions("ship the release", "gardening notes for spring"));
}

#[test]
fn count_mentions_counts_matching_strings_only() {
    let strings = vec![
        "ship the release today".to_string(),
        "unrelated gardening note".to_string(),
        "release shipped successfully".to_string(),
    ];
    assert_eq!(count_mentions("ship the release", strings.iter()), 2);
}
