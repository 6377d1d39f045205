//! Diagnostic messages, translation hook, and span highlighting.

use cee_parser::diag::{highlight, render};
use cee_parser::{parse, DiagnosticKind};

#[test]
fn unexpected_token_message_names_have_and_want() {
    let (_, diags) = parse("var 123 int\n");
    assert_eq!(diags.len(), 1);
    let msg = diags[0].kind.to_string();
    assert!(msg.contains("unexpected token"), "msg: {msg}");
    assert!(msg.contains("123"), "msg: {msg}");
    assert!(msg.contains("identifier"), "msg: {msg}");
}

#[test]
fn render_includes_position_and_message() {
    let src = "val s = \"abc";
    let (_, diags) = parse(src);
    let out = render(&diags[0], Some(src), |msg| msg.to_string());
    assert!(out.starts_with("8:0:8 "), "out: {out}");
    assert!(out.contains("not closed"), "out: {out}");
    // The source line is echoed below the message.
    assert!(out.contains("val s = "), "out: {out}");
}

#[test]
fn render_routes_messages_through_the_translator() {
    let src = "val n = 0x";
    let (_, diags) = parse(src);
    assert_eq!(diags[0].kind, DiagnosticKind::Format);
    let out = render(&diags[0], None, |msg| format!("[[{msg}]]"));
    assert!(out.contains("[[format error]]"), "out: {out}");
}

#[test]
fn highlight_wraps_the_span_in_color_codes() {
    let out = highlight("val x = oops", 8, 12);
    assert!(out.starts_with("val x = "), "out: {out:?}");
    assert!(out.contains("oops"));
    assert!(out.contains('\u{1b}'), "no escape codes in {out:?}");
}

#[test]
fn highlight_clamps_out_of_range_columns() {
    let out = highlight("ab", 1, 99);
    assert!(out.contains('a'));
    assert!(out.contains('b'));
}
