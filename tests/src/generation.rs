use std::collections::{HashMap, HashSet};

use regen_compiler::Config;
use regen_runtime::ParallelExecutor;

use crate::samples;

#[test]
fn should_generate_literal_patterns_exactly() {
    let input_output = [
        ("ab", "ab"),
        ("héllo wörld", "héllo wörld"),
        ("a\\.b\\*", "a.b*"),
        ("\\x{1F600}\\t", "\u{1F600}\t"),
        ("(abc)", "abc"),
        ("^ab$", "ab"),
        ("\\bfoo\\B", "foo"),
        ("", ""),
    ];

    for (test_id, (pattern, expected)) in input_output.into_iter().enumerate() {
        for sample in samples(pattern, &Config::default(), test_id as u64, 20) {
            assert_eq!((test_id, expected), (test_id, sample.as_str()));
        }
    }
}

#[test]
fn should_generate_only_and_every_class_member() {
    let input_output = [
        ("[a-c]", "abc"),
        ("[a-cx]", "abcx"),
        ("\\d", "0123456789"),
        ("[\\-\\]]", "-]"),
    ];

    for (test_id, (pattern, members)) in input_output.into_iter().enumerate() {
        let expected: HashSet<char> = members.chars().collect();
        let seen: HashSet<char> = samples(pattern, &Config::default(), 11, 1000)
            .into_iter()
            .map(|sample| {
                assert_eq!(1, sample.chars().count());
                sample.chars().next().unwrap()
            })
            .collect();

        assert_eq!((test_id, expected), (test_id, seen));
    }
}

#[test]
fn should_never_generate_excluded_characters() {
    for sample in samples("[^a]", &Config::default(), 3, 2000) {
        assert_eq!(1, sample.chars().count());
        assert_ne!("a", sample);
    }

    for sample in samples(".", &Config::default(), 4, 2000) {
        assert_eq!(1, sample.chars().count());
        assert_ne!("\n", sample);
        assert_ne!("\0", sample);
    }
}

#[test]
fn should_repeat_within_bounds() {
    let lengths: HashSet<usize> = samples("a{2,5}", &Config::default(), 5, 1000)
        .into_iter()
        .inspect(|sample| assert!(sample.chars().all(|c| c == 'a')))
        .map(|sample| sample.len())
        .collect();

    assert_eq!((2..=5).collect::<HashSet<_>>(), lengths);

    for sample in samples("x{3}", &Config::default(), 6, 20) {
        assert_eq!("xxx", sample);
    }
}

#[test]
fn should_reach_empty_string_and_respect_sentinel_for_star() {
    let config = Config::default().with_max_unbounded_repeat(4);
    let generated = samples("a*", &config, 7, 500);

    assert!(generated.iter().any(|sample| sample.is_empty()));
    assert!(generated.iter().any(|sample| sample.len() == 4));
    assert!(generated.iter().all(|sample| sample.len() <= 4));
}

#[test]
fn should_keep_unbounded_repetition_at_default_sentinel() {
    for sample in samples("[ab]+", &Config::default(), 8, 50) {
        let len = sample.chars().count();
        assert!((1..=Config::DEFAULT_MAX_UNBOUNDED_REPEAT as usize).contains(&len));
    }
}

#[test]
fn should_fix_repetition_count_at_minimum_above_sentinel() {
    let config = Config::default().with_max_unbounded_repeat(2);

    for sample in samples("a{5,}", &config, 9, 20) {
        assert_eq!("aaaaa", sample);
    }
}

#[test]
fn should_choose_alternatives_uniformly() {
    let draws = 4000;
    let mut counts: HashMap<String, usize> = HashMap::new();
    for sample in samples("a|b|c|d", &Config::default(), 10, draws) {
        *counts.entry(sample).or_default() += 1;
    }

    assert_eq!(4, counts.len());
    for (alternative, cnt) in counts {
        assert!(
            (850..=1150).contains(&cnt),
            "alternative {} drawn {} times",
            alternative,
            cnt
        );
    }
}

#[test]
fn should_generate_identical_output_for_identical_seed() {
    let first = samples("a(b|c)", &Config::default(), 12, 100);
    let second = samples("a(b|c)", &Config::default(), 12, 100);

    assert_eq!(first, second);
    assert!(first.iter().all(|sample| sample == "ab" || sample == "ac"));
}

#[test]
fn should_enumerate_finite_language() {
    let expected: HashSet<String> = ["a", "b", "aa", "ab", "ba", "bb"]
        .into_iter()
        .map(String::from)
        .collect();
    let seen: HashSet<String> = samples("[ab]{1,2}", &Config::default(), 13, 2000)
        .into_iter()
        .collect();

    assert_eq!(expected, seen);
}

#[test]
fn should_generate_deterministically_with_parallel_executor() {
    let config = Config::default().with_executor(ParallelExecutor::new());
    let pattern = "[a-z]{10,20}-(x|y){4}";

    let first = samples(pattern, &config, 14, 50);
    let second = samples(pattern, &config, 14, 50);

    assert_eq!(first, second);
    for sample in first {
        let (word, suffix) = sample.split_once('-').unwrap();
        assert!((10..=20).contains(&word.len()));
        assert!(word.chars().all(|c| c.is_ascii_lowercase()));
        assert_eq!(4, suffix.len());
        assert!(suffix.chars().all(|c| c == 'x' || c == 'y'));
    }
}

#[test]
fn should_match_sequential_output_for_fixed_patterns() {
    let parallel = Config::default().with_executor(ParallelExecutor::new());
    let pattern = "ab(c){3}(?:de){2}";

    assert_eq!(
        samples(pattern, &Config::default(), 15, 10),
        samples(pattern, &parallel, 15, 10)
    );
    assert_eq!("abcccdede", samples(pattern, &parallel, 15, 1)[0]);
}
