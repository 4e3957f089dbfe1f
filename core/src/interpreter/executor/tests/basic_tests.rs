//! Tests for straight-line statements

use super::helpers::{env, run_source, run_with_config, run_with_globals};
use crate::config::Config;
use crate::interpreter::executor::{Snapshot, Value};
use maplit::hashmap;

#[test]
fn test_empty_program() {
    let run = run_source("");

    assert_eq!(run.result, Ok(true));
    assert!(run.vm.env.is_empty());
}

#[test]
fn test_clear_declares_missing_variable() {
    let run = run_source("clear x;");

    assert_eq!(run.result, Ok(true));
    assert_eq!(run.var("x"), Some(&Value::Int(0)));
}

#[test]
fn test_incr_decr_clear() {
    let run = run_source(
        r#"
        clear x;
        incr x;
        incr x;
        incr x;
        decr x;
        init y to 7;
        clear y;
    "#,
    );

    assert_eq!(run.result, Ok(true));
    assert_eq!(run.vm.env, env(hashmap! { "x" => Value::Int(2), "y" => Value::Int(0) }));
}

#[test]
fn test_decr_stops_at_zero() {
    let run = run_source("clear x; decr x; decr x;");

    assert_eq!(run.var("x"), Some(&Value::Int(0)));
}

#[test]
fn test_float_mutation_keeps_type() {
    let run = run_source("init f to 1.5; incr f; init g to 0.5; decr g; init h to 2.5; clear h;");

    assert_eq!(run.var("f"), Some(&Value::Float(2.5)));
    assert_eq!(run.var("g"), Some(&Value::Float(-0.5)));
    assert_eq!(run.var("h"), Some(&Value::Float(0.0)));
}

#[test]
fn test_init_classifies_literal() {
    let run = run_source(
        r#"
        init a to 5;
        init b to 4.0;
        init c to 2.75;
        init d to true;
        init e to "hello world";
        init f to word;
    "#,
    );

    assert_eq!(
        run.vm.env,
        env(hashmap! {
            "a" => Value::Int(5),
            "b" => Value::Int(4),
            "c" => Value::Float(2.75),
            "d" => Value::Bool(true),
            "e" => Value::Str("hello world".into()),
            "f" => Value::Str("word".into()),
        })
    );
}

#[test]
fn test_set_overwrites_with_any_value() {
    let run = run_source(
        r#"
        init a to 1;
        init b to 0;
        set a to 9;
        set b to a;
        set a to "text";
        set a to false;
    "#,
    );

    assert_eq!(run.result, Ok(true));
    assert_eq!(run.var("a"), Some(&Value::Bool(false)));
    assert_eq!(run.var("b"), Some(&Value::Int(9)));
}

#[test]
fn test_copy_creates_and_overwrites() {
    let run = run_source(
        r#"
        init a to 2.5;
        copy a to b;
        init c to "x";
        copy a to c;
    "#,
    );

    assert_eq!(run.result, Ok(true));
    assert_eq!(run.var("a"), Some(&Value::Float(2.5)));
    assert_eq!(run.var("b"), Some(&Value::Float(2.5)));
    assert_eq!(run.var("c"), Some(&Value::Float(2.5)));
}

#[test]
fn test_copy_is_by_value() {
    let run = run_source("init a to 1; copy a to b; incr a;");

    assert_eq!(run.var("a"), Some(&Value::Int(2)));
    assert_eq!(run.var("b"), Some(&Value::Int(1)));
}

#[test]
fn test_print_literals_and_variables() {
    let run = run_source(
        r#"
        init x to 5;
        init s to "a b";
        print "hello world";
        print x;
        print "x is" x;
        print s "and" x;
        print;
    "#,
    );

    assert_eq!(run.result, Ok(true));
    assert_eq!(run.lines(), vec!["hello world", "5", "x is 5", "a b and 5", ""]);
}

#[test]
fn test_print_escaped_quote() {
    let run = run_source(r#"print "say \"hi\"";"#);

    assert_eq!(run.lines(), vec![r#"say "hi""#]);
}

#[test]
fn test_print_eval_consumes_rest() {
    let run = run_source("init x to 3; print \"result\" eval x * 2 + 1;");

    assert_eq!(run.lines(), vec!["result 7"]);
}

#[test]
fn test_globals_are_visible() {
    let run = run_with_globals("incr n; print n;", hashmap! { "n" => Value::Int(41) });

    assert_eq!(run.result, Ok(true));
    assert_eq!(run.lines(), vec!["42"]);
}

#[test]
fn test_comments_and_blank_fragments() {
    let run = run_source(
        "# header comment\nclear x; # trailing comment\nincr x;;\n\n  # indented comment; incr x;\nincr x;",
    );

    assert_eq!(run.result, Ok(true));
    assert_eq!(run.var("x"), Some(&Value::Int(2)));
}

#[test]
fn test_separator_inside_string() {
    let run = run_source(r#"init s to "a;b"; print s;"#);

    assert_eq!(run.var("s"), Some(&Value::Str("a;b".into())));
    assert_eq!(run.lines(), vec!["a;b"]);
}

#[test]
fn test_verbose_snapshots() {
    let config = Config {
        verbose: true,
        ..Config::default()
    };
    let run = run_with_config("clear x; while x to 0; end; incr x;", config);

    let points: Vec<Snapshot> = run.output.snapshots().into_iter().map(|(p, _)| p).collect();
    assert_eq!(
        points,
        vec![
            Snapshot::Initial,
            Snapshot::AfterStatement { address: 0 },
            Snapshot::AfterStatement { address: 3 },
            Snapshot::Final,
        ]
    );

    let snapshots = run.output.snapshots();
    assert!(snapshots[0].1.is_empty());
    assert_eq!(snapshots[3].1, env(hashmap! { "x" => Value::Int(1) }));
}

#[test]
fn test_no_snapshots_without_verbose() {
    let run = run_source("clear x; incr x;");

    assert!(run.output.snapshots().is_empty());
}
