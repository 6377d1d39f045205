//! Structured diagnostics and their terminal rendering.
//!
//! The parser accumulates diagnostics in source order; lexical failures are
//! converted from [`ScanError`]. Message text routes through a caller-supplied
//! translation hook (identity by default); rendering highlights the offending
//! span of the source line in red.

use std::fmt;

use owo_colors::OwoColorize;
use thiserror::Error;

use crate::scanner::ScanError;
use crate::token::{PosRange, Position, Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub range: PosRange,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagnosticKind {
    #[error("syntax error: unexpected token: {have}, want: {}", kind_list(.want))]
    UnexpectedToken { have: Token, want: Vec<TokenKind> },
    #[error("unknown operator: {literal}")]
    UnknownOperator { literal: String },
    #[error("unknown escape char: {ch:?}")]
    UnknownEscapeChar { ch: char },
    #[error("the string is not closed")]
    NonClosedQuote,
    #[error("format error")]
    Format,
    #[error("unexpected end of file")]
    Eof,
}

fn kind_list(kinds: &[TokenKind]) -> String {
    kinds
        .iter()
        .map(|k| k.spelling())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Diagnostic {
    pub fn unexpected(have: Token, want: &[TokenKind]) -> Self {
        Self {
            range: have.range,
            kind: DiagnosticKind::UnexpectedToken {
                have,
                want: want.to_vec(),
            },
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.range.from, self.kind)
    }
}

fn one_char(pos: Position) -> PosRange {
    let to = Position {
        offset: pos.offset + 1,
        line: pos.line,
        column: pos.column + 1,
    };
    PosRange::new(pos, to)
}

impl From<ScanError> for Diagnostic {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Eof { pos } => Diagnostic {
                range: PosRange::new(pos, pos),
                kind: DiagnosticKind::Eof,
            },
            ScanError::UnknownOperator { pos, literal } => {
                let len = literal.chars().count() as u32;
                let to = Position {
                    offset: pos.offset + len,
                    line: pos.line,
                    column: pos.column + len,
                };
                Diagnostic {
                    range: PosRange::new(pos, to),
                    kind: DiagnosticKind::UnknownOperator { literal },
                }
            }
            ScanError::UnknownEscapeChar { pos, ch } => Diagnostic {
                range: one_char(pos),
                kind: DiagnosticKind::UnknownEscapeChar { ch },
            },
            ScanError::NonClosedQuote { pos } => Diagnostic {
                range: one_char(pos),
                kind: DiagnosticKind::NonClosedQuote,
            },
            ScanError::Format { pos } => Diagnostic {
                range: one_char(pos),
                kind: DiagnosticKind::Format,
            },
        }
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Highlights `[from_col, to_col)` of a source line in red.
pub fn highlight(line: &str, from_col: usize, to_col: usize) -> String {
    let chars: Vec<char> = line.chars().collect();
    let from = from_col.min(chars.len());
    let to = to_col.clamp(from, chars.len());

    let head: String = chars[..from].iter().collect();
    let mid: String = chars[from..to].iter().collect();
    let tail: String = chars[to..].iter().collect();
    format!("{head}{}{tail}", mid.red())
}

/// Renders a diagnostic as `offset:line:column message`, followed by the
/// source line with the offending span highlighted when `line` is available.
/// `translate` localizes the message; pass the identity for the default.
pub fn render(
    diag: &Diagnostic,
    line: Option<&str>,
    translate: impl Fn(&str) -> String,
) -> String {
    let mut out = format!("{} {}", diag.range.from, translate(&diag.kind.to_string()));
    if let Some(line) = line {
        let from_col = diag.range.from.column as usize;
        let to_col = if diag.range.to.line == diag.range.from.line {
            diag.range.to.column as usize
        } else {
            line.chars().count()
        };
        out.push('\n');
        out.push_str(&highlight(line, from_col, to_col));
    }
    out
}
