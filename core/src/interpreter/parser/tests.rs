//! Parser tests - verify structuring of source text into statements
//!
//! These tests do NOT execute anything - that's covered by the executor tests.

use super::*;

fn parse(source: &str) -> Program {
    Program::parse(source).expect("Should parse")
}

fn operations(program: &Program) -> Vec<&str> {
    program.statements().map(|s| s.operation.as_str()).collect()
}

/* ===================== Statement Splitting ===================== */

#[test]
fn test_parse_single_statement() {
    let program = parse("incr x;");

    assert_eq!(program.len(), 1);
    let statement = program.get(0).unwrap();
    assert_eq!(statement.operation, "incr");
    assert_eq!(statement.arguments, vec!["x"]);
    assert_eq!(statement.text, "incr x");
    assert_eq!(statement.line, 1);
}

#[test]
fn test_parse_drops_empty_fragments() {
    let program = parse("clear x;;\n;\r\n;incr x;\n");

    assert_eq!(operations(&program), vec!["clear", "incr"]);
}

#[test]
fn test_parse_trailing_statement_without_separator() {
    let program = parse("clear x;\nincr x");

    assert_eq!(operations(&program), vec!["clear", "incr"]);
}

#[test]
fn test_parse_collapses_whitespace() {
    let program = parse("init   x \t to\n 5;");

    let statement = program.get(0).unwrap();
    assert_eq!(statement.arguments, vec!["x", "to", "5"]);
    assert_eq!(statement.text, "init x to 5");
}

#[test]
fn test_parse_tracks_lines() {
    let program = parse("clear x;\n\n  incr x;\n\nwhile x not 0 do;\n");

    let lines: Vec<usize> = program.statements().map(|s| s.line).collect();
    assert_eq!(lines, vec![1, 3, 5]);
}

/* ===================== Comments ===================== */

#[test]
fn test_parse_skips_comment_lines() {
    let source = "# setup\nclear x;\n  # bump it\nincr x;";
    let program = parse(source);

    assert_eq!(operations(&program), vec!["clear", "incr"]);
}

#[test]
fn test_parse_comment_after_separator_ends_at_newline() {
    let program = parse("clear x; # reset\nincr x;");

    assert_eq!(operations(&program), vec!["clear", "incr"]);
    assert_eq!(program.get(1).unwrap().line, 2);
}

#[test]
fn test_parse_comment_may_contain_separators() {
    let program = parse("# a; b; c\nclear x;");

    assert_eq!(operations(&program), vec!["clear"]);
}

/* ===================== Quoted Strings ===================== */

#[test]
fn test_parse_merges_quoted_string() {
    let program = parse(r#"print "hello big   world" x;"#);

    let statement = program.get(0).unwrap();
    assert_eq!(statement.arguments, vec![r#""hello big world""#, "x"]);
}

#[test]
fn test_parse_single_word_string() {
    let program = parse(r#"print "hi";"#);

    assert_eq!(program.get(0).unwrap().arguments, vec![r#""hi""#]);
}

#[test]
fn test_parse_separator_inside_string() {
    let program = parse(r#"print "a; b"; clear x;"#);

    assert_eq!(operations(&program), vec!["print", "clear"]);
    assert_eq!(program.get(0).unwrap().arguments, vec![r#""a; b""#]);
}

#[test]
fn test_parse_escaped_quote_does_not_close_string() {
    let program = parse(r#"print "say \" hi" x;"#);

    assert_eq!(
        program.get(0).unwrap().arguments,
        vec![r#""say \" hi""#, "x"]
    );
}

#[test]
fn test_parse_unterminated_string() {
    let err = Program::parse("clear x;\nprint \"oops there;").unwrap_err();

    assert!(matches!(err, ParseError::UnterminatedString { line: 2, .. }));
}

/* ===================== Block Matching ===================== */

#[test]
fn test_block_end_simple_loop() {
    let program = parse("while x not 0 do; decr x; end; print x;");

    assert_eq!(program.block_end(0), Some(2));
    assert_eq!(program.block_end(1), None);
}

#[test]
fn test_block_end_nested_blocks() {
    let source = "
        while x not 0 do;
            while y not 0 do;
                decr y;
            end;
            if x = 2;
                print x;
            end;
            decr x;
        end;
    ";
    let program = parse(source);

    assert_eq!(program.block_end(0), Some(8));
    assert_eq!(program.block_end(1), Some(3));
    assert_eq!(program.block_end(4), Some(6));
}

#[test]
fn test_block_end_if_chain() {
    let program = parse("if a = 1; print a; end; elif a = 2; print a; end; else; print a; end;");

    assert_eq!(program.block_end(0), Some(2));
    assert_eq!(program.block_end(3), Some(5));
    assert_eq!(program.block_end(6), Some(8));
}

#[test]
fn test_block_end_unmatched() {
    let program = parse("while x not 0 do; decr x;");

    assert_eq!(program.block_end(0), None);
}

#[test]
fn test_stray_end_is_ignored_by_matcher() {
    let program = parse("end; while x not 0 do; decr x; end;");

    assert_eq!(program.block_end(1), Some(3));
}

/* ===================== Slicing & Serialization ===================== */

#[test]
fn test_slice_rebuilds_block_table() {
    let program = parse("func Loop n do; while n not 0 do; decr n; end; end;");
    let body = program.slice(1..4);

    assert_eq!(operations(&body), vec!["while", "decr", "end"]);
    assert_eq!(body.block_end(0), Some(2));
}

#[test]
fn test_source_text_reparses_to_same_statements() {
    let program = parse(r#"init s to "a; b"; print s;"#);
    let reparsed = parse(&program.source_text());

    assert_eq!(operations(&program), operations(&reparsed));
    assert_eq!(
        program.get(0).unwrap().arguments,
        reparsed.get(0).unwrap().arguments
    );
}

#[test]
fn test_program_serializes_as_statement_list() {
    let program = parse("clear x; incr x;");
    let json = serde_json::to_value(&program).expect("Program serialization failed");

    assert_eq!(json[1]["operation"], "incr");
    assert_eq!(json[1]["arguments"][0], "x");

    let back: Program = serde_json::from_value(json).expect("Program deserialization failed");
    assert_eq!(back, program);
}
