mod common;

use avenger_interpreter::{Config, Error, ErrorKind, Value};
use common::*;
use pretty_assertions::assert_eq;

#[test]
fn arrays_pad_missing_values_with_zero() {
    assert_eq!(run("team t[5] = {1, 2}; t[1];"), num(2.0));
    assert_eq!(run("team t[5] = {1, 2}; t[4];"), num(0.0));
    assert_eq!(run("team t[5] = {1, 2}; len(t);"), num(5.0));
}

#[test]
fn arrays_reject_excess_initializers() {
    assert_eq!(
        error_kind("team t[3] = {1, 2, 3, 4, 5};"),
        ErrorKind::ExcessInitializers {
            name: "t".into(),
            size: 3,
            provided: 5
        }
    );
}

#[test]
fn array_sizes_are_validated() {
    assert_eq!(
        error_kind("team t[0] = {};"),
        ErrorKind::InvalidArraySize {
            name: "t".into(),
            size: "0".into()
        }
    );
    assert_eq!(
        error_kind("team t[2.5] = {};"),
        ErrorKind::InvalidArraySize {
            name: "t".into(),
            size: "2.5".into()
        }
    );
    assert_eq!(
        error_kind("team t[\"x\"] = {};"),
        ErrorKind::InvalidArraySize {
            name: "t".into(),
            size: "string".into()
        }
    );
    assert_eq!(
        error_kind("team t[10000001] = {};"),
        ErrorKind::SegFaultSimulated {
            name: "t".into(),
            size: 10_000_001.0
        }
    );
}

#[test]
fn array_elements_are_resolved_at_declaration() {
    let source = r#"
        newAvenger x = 1;
        team t[1] = {x};
        x = 2;
        t[0];
    "#;
    assert_eq!(run(source), num(1.0));
}

#[test]
fn arrays_that_contain_themselves_stay_reportable() {
    assert_eq!(
        error_kind("team a[1] = {0}; a[0] = a; team b[a] = {};"),
        ErrorKind::InvalidArraySize {
            name: "b".into(),
            size: "array".into()
        }
    );
    let source = r#"
        team a[2] = {1, 2};
        a[1] = a;
        a;
    "#;
    assert_eq!(run(source).to_string(), "[1, [...]]");
}

#[test]
fn arrays_are_shared_between_bindings() {
    let source = r#"
        team t[2] = {1, 2};
        newAvenger u = t;
        u[0] = 9;
        t[0] * 10 + t[1];
    "#;
    assert_eq!(run(source), num(92.0));
}

#[test]
fn functions_mutate_arrays_in_place() {
    let source = r#"
        team t[2] = {1, 2};
        assemble bump(xs) { xs[1] = xs[1] + 1; }
        bump(t);
        bump(t);
        t[1];
    "#;
    assert_eq!(run(source), num(4.0));
}

#[test]
fn array_indices_are_checked() {
    assert_eq!(
        error_kind("team t[2] = {1, 2}; t[2];"),
        ErrorKind::IndexOutOfRange { index: 2.0, len: 2 }
    );
    assert_eq!(
        error_kind("team t[2] = {1, 2}; t[<MINUS>1] = 0;"),
        ErrorKind::IndexOutOfRange { index: -1.0, len: 2 }
    );
    assert_eq!(
        error_kind("team t[2] = {1, 2}; t[\"0\"];"),
        ErrorKind::InvalidIndexType {
            target: "array",
            found: "string"
        }
    );
    assert!(matches!(error_kind("newAvenger n = 5; n[0];"), ErrorKind::TypeError(_)));
}

#[test]
fn strings_index_by_character() {
    assert_eq!(run("newAvenger s = \"hero\"; s[0];"), text("h"));
    assert_eq!(run("newAvenger s = \"hero\"; s[0] = \"z\"; s;"), text("zero"));
    assert_eq!(run("newAvenger s = \"hero\"; s[1] = 3; s;"), text("h3ro"));
    assert_eq!(
        error_kind("newAvenger s = \"hero\"; s[4];"),
        ErrorKind::IndexOutOfRange { index: 4.0, len: 4 }
    );
}

#[test]
fn string_writes_need_a_variable() {
    assert_eq!(
        error_kind("\"abc\"[0] = \"x\";"),
        ErrorKind::InvalidAssignmentTarget
    );
    assert_eq!(error_kind("1 = 2;"), ErrorKind::InvalidAssignmentTarget);
}

#[test]
fn string_repetition_keeps_one_fewer_copy() {
    assert_eq!(run("3 * \"ab\";"), text("abab"));
    assert_eq!(run("\"ab\" * 2;"), text("ab"));
    assert_eq!(run("1 * \"ab\";"), text(""));
}

#[test]
fn string_repetition_respects_the_iteration_limit() {
    let config = Config {
        iteration_limit: 100,
        ..Config::default()
    };
    match run_with(config, "\"x\" * 1000;") {
        Err(Error::Eval(err)) => assert_eq!(err.kind, ErrorKind::IterationLimitExceeded(100)),
        other => panic!("expected the guard to trip, got {:?}", other),
    }
}

#[test]
fn mixed_addition_concatenates() {
    assert_eq!(run("\"n=\" + 4;"), text("n=4"));
    assert_eq!(run("1.5 + \"x\";"), text("1.5x"));
}

#[test]
fn meaningless_arithmetic_falls_back() {
    assert_eq!(run("\"a\" - \"b\";"), text("NaN"));
    assert_eq!(run("\"a\" + \"b\";"), text("NaN"));
    assert_eq!(run("2 - \"b\";"), text("NaN"));
    assert_eq!(run("SHIELD + 1;"), Value::Null);
    assert_eq!(run("1 == \"1\";"), Value::Null);
    assert_eq!(run("!1;"), Value::Null);
}

#[test]
fn number_arithmetic() {
    assert_eq!(run("3 ^ 2;"), num(9.0));
    assert_eq!(run("7 % 2;"), num(1.0));
    assert_eq!(run("1 / 0;"), num(f64::INFINITY));
    assert_eq!(run("(1 + 2) * 3;"), num(9.0));
    assert_eq!(run("<MINUS>(2 + 3);"), num(-5.0));
}

#[test]
fn huge_and_tiny_numbers_print_in_exponent_form() {
    assert_eq!(run("1e21 + \"\";"), text("1e+21"));
    assert_eq!(run("\"\" + 1e-7;"), text("1e-7"));
    assert_eq!(run("\"\" + 123456;"), text("123456"));
}

#[test]
fn unary_minus_needs_a_number() {
    assert!(matches!(error_kind("<MINUS>\"a\";"), ErrorKind::TypeError(_)));
}

#[test]
fn comparisons_and_logic() {
    assert_eq!(run("\"abc\" < \"abd\";"), Value::Boolean(true));
    assert_eq!(run("2 >= 3;"), Value::Boolean(false));
    assert_eq!(run("!(1 == 1);"), Value::Boolean(false));
    assert_eq!(run("1 < 2 && 2 < 3;"), Value::Boolean(true));
}

#[test]
fn compound_assignment_needs_matching_numbers() {
    assert_eq!(run("newAvenger n = 2; n ^= 3;"), num(8.0));
    assert_eq!(run("newAvenger n = 7; n %= 4; n;"), num(3.0));
    assert_eq!(
        error_kind("newAvenger s = \"a\"; s += 1;"),
        ErrorKind::TypeMismatch {
            op: "+=".into(),
            current: "string",
            value: "number"
        }
    );
    assert_eq!(
        error_kind("newAvenger n = 1; n -= \"x\";"),
        ErrorKind::TypeMismatch {
            op: "-=".into(),
            current: "number",
            value: "string"
        }
    );
    assert_eq!(
        error_kind("newEternal n = 1; n += 1;"),
        ErrorKind::ConstReassignment("n".into())
    );
}

#[test]
fn natives_are_reachable_from_scripts() {
    assert_eq!(run("typeOf(vision);"), text("function"));
    assert_eq!(run("subStr(\"avenger\", 0, 1) + len(\"abc\");"), text("a3"));
    assert_eq!(run("parseInt(\"42\") + 1;"), num(43.0));
    assert!(matches!(
        error_kind("assertEqual(1, 2);"),
        ErrorKind::AssertionFailed { .. }
    ));
}

#[test]
fn syntax_errors_are_reported_before_running() {
    match run_with(Config::default(), "vision(1);\nif (SHIELD) { }") {
        Err(Error::Syntax(err)) => {
            assert_eq!(err.line, 2);
            assert!(err.message.contains("did you mean 'ifWorthy'"));
        }
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn showcase_script_runs() {
    let source = include_str!("../demos/showcase.avenger");
    assert_eq!(run(source), text("done"));
}
