use regen_compiler::syntax::Op;
use regen_compiler::{compile_pattern, CompileError, Config, Error, ParseErr};

fn compile_error(pattern: &str) -> CompileError {
    match compile_pattern(pattern, &Config::default()) {
        Err(Error::Compile(err)) => err,
        other => panic!("expected /{}/ to fail compilation, found {:?}", pattern, other),
    }
}

#[test]
fn should_reject_patterns_without_generation_rule() {
    let inputs = [
        "\\1",
        "(a)\\1",
        "\\G",
        "\\p{L}",
        "x\\p{Greek}+",
        "[^\\x{0}-\\x{10FFFF}]",
    ];

    for (test_id, pattern) in inputs.into_iter().enumerate() {
        let err = compile_error(pattern);

        assert!(
            matches!(err.root_cause(), CompileError::UnsupportedPattern { .. }),
            "case {}: {:?}",
            test_id,
            err
        );
    }
}

#[test]
fn should_describe_unsupported_pattern() {
    let err = compile_error("\\p{L}");

    assert_eq!(
        "invalid generator pattern: /\\p{L}/ as /\\p{L}/\nunicode-class name=L\n",
        err.to_string()
    );
}

#[test]
fn should_name_enclosing_fragment_of_nested_failure() {
    match compile_error("a(b|\\1)") {
        CompileError::Subexpression { pattern, source } => {
            assert_eq!("a(b|\\1)", pattern);
            assert!(matches!(*source, CompileError::Subexpression { .. }));
        }
        other => panic!("expected subexpression error, found {:?}", other),
    }
}

#[test]
fn should_reject_invalid_repetition_bounds() {
    let inputs = [("a{-1}", "a{-1}"), ("a{3,1}", "a{3,1}"), ("b(a{-2,4})", "a{-2,4}")];

    for (test_id, (input, expected_pattern)) in inputs.into_iter().enumerate() {
        match compile_error(input).root_cause() {
            CompileError::MalformedPattern { op, pattern, .. } => {
                assert_eq!((test_id, Op::Repeat), (test_id, *op));
                assert_eq!((test_id, expected_pattern), (test_id, pattern.as_str()));
            }
            other => panic!("case {}: expected malformed pattern, found {:?}", test_id, other),
        }
    }
}

#[test]
fn should_report_parse_failures_with_offset() {
    let input_output = [("ab)", 2, ')'), ("a|*", 2, '*'), ("[ab", 0, '[')];

    for (test_id, (input, offset, character)) in input_output.into_iter().enumerate() {
        let res = compile_pattern(input, &Config::default());

        assert!(
            matches!(
                res,
                Err(Error::Parse(ParseErr::UnexpectedCharacter { offset: o, character: c }))
                    if o == offset && c == character
            ),
            "case {}: {:?}",
            test_id,
            res
        );
    }
}

#[test]
fn should_reject_oversized_patterns_before_generation() {
    let deeply_nested = format!("{}a{}", "(".repeat(20_000), ")".repeat(20_000));
    let inputs = ["a{1001}", "x(a{0,2147483647})", deeply_nested.as_str()];

    for (test_id, input) in inputs.into_iter().enumerate() {
        let res = compile_pattern(input, &Config::default());

        assert!(
            matches!(
                res,
                Err(Error::Parse(
                    ParseErr::InvalidRepeatCount { .. } | ParseErr::NestingTooDeep { .. }
                ))
            ),
            "case {}: {:?}",
            test_id,
            res
        );
    }
}
