//! Raw lexical scanner.
//!
//! Produces untyped lexemes: words (identifier-class, promoted to keywords by
//! the tokenizer), mark sequences (resolved to operators by the tokenizer),
//! integer literals with a base tag, char/string literals with escape
//! decoding, comments, and single-character delimiters. Whitespace (space,
//! tab, carriage return) is skipped; newline is a delimiter token here.

use thiserror::Error;
use unicode_ident::{is_xid_continue, is_xid_start};

use crate::source::Cursor;
use crate::token::{PosRange, Position, TokenKind};

// =============================================================================
// Errors
// =============================================================================

/// Lexical failures. Each is fatal to the current token only; the cursor has
/// always made progress, so scanning may resume after the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("{pos}: unexpected end of file")]
    Eof { pos: Position },
    #[error("{pos}: unknown operator: {literal}")]
    UnknownOperator { pos: Position, literal: String },
    #[error("{pos}: unknown escape char: {ch:?}")]
    UnknownEscapeChar { pos: Position, ch: char },
    #[error("{pos}: the string is not closed")]
    NonClosedQuote { pos: Position },
    #[error("{pos}: format error")]
    Format { pos: Position },
}

impl ScanError {
    pub fn position(&self) -> Position {
        match *self {
            ScanError::Eof { pos }
            | ScanError::UnknownOperator { pos, .. }
            | ScanError::UnknownEscapeChar { pos, .. }
            | ScanError::NonClosedQuote { pos }
            | ScanError::Format { pos } => pos,
        }
    }
}

// =============================================================================
// Raw tokens
// =============================================================================

/// Numeric base of an integer literal, selected by the `0x`/`0o`/`0b` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntBase {
    Dec,
    Hex,
    Oct,
    Bin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    Line,
    Block,
}

/// Raw lexeme class, before keyword promotion and operator resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKind {
    /// Identifier-class word; may be promoted to a keyword.
    Word,
    /// Maximal run of punctuation/symbol characters that are not delimiters.
    Mark,
    Int(IntBase),
    Char,
    Str,
    Comment(CommentStyle),
    /// Single-character delimiter, including newline.
    Delim(TokenKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub range: PosRange,
    pub kind: RawKind,
    /// Verbatim source text of the lexeme (quotes included for char/string).
    pub literal: String,
}

// =============================================================================
// Character classes
// =============================================================================

#[inline]
fn is_word_start(ch: char) -> bool {
    ch == '_' || is_xid_start(ch)
}

#[inline]
fn is_word_continue(ch: char) -> bool {
    ch == '_' || is_xid_continue(ch)
}

/// Mark characters: anything that is not whitespace, not a word or digit
/// character, not a quote, and not a delimiter.
#[inline]
fn is_mark(ch: char) -> bool {
    !(ch.is_whitespace()
        || ch.is_alphanumeric()
        || ch == '_'
        || ch == '"'
        || ch == '\''
        || TokenKind::delimiter(ch).is_some())
}

#[inline]
fn base_digit(base: IntBase, ch: char) -> bool {
    match base {
        IntBase::Dec => ch.is_ascii_digit(),
        IntBase::Hex => ch.is_ascii_hexdigit(),
        IntBase::Oct => ('0'..='7').contains(&ch),
        IntBase::Bin => ch == '0' || ch == '1',
    }
}

// =============================================================================
// Scanner
// =============================================================================

pub struct Scanner {
    cursor: Cursor,
}

impl Scanner {
    pub fn new(src: &str) -> Self {
        Self {
            cursor: Cursor::new(src),
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    pub fn line_text(&self, line: usize) -> Option<String> {
        self.cursor.line_text(line)
    }

    /// Scans the next raw token. `Ok(None)` is clean end of input; an `Err`
    /// is a lexical failure inside a token (the spanned prefix is consumed).
    pub fn scan_token(&mut self) -> Result<Option<RawToken>, ScanError> {
        self.skip_whitespace();

        let from = self.cursor.position();
        let Some(ch) = self.cursor.peek() else {
            return Ok(None);
        };

        let tok = match ch {
            c if c.is_ascii_digit() => self.scan_number(from)?,
            c if is_word_start(c) => self.scan_word(from)?,
            '"' => self.scan_string(from)?,
            '\'' => self.scan_char(from)?,
            '/' if matches!(self.cursor.peek2(), Some('/') | Some('*')) => {
                self.scan_comment(from)?
            }
            c => {
                if let Some(kind) = TokenKind::delimiter(c) {
                    self.cursor.advance()?;
                    self.raw(from, RawKind::Delim(kind), c.to_string())
                } else {
                    self.scan_mark_seq(from)?
                }
            }
        };

        Ok(Some(tok))
    }

    fn raw(&self, from: Position, kind: RawKind, literal: String) -> RawToken {
        RawToken {
            range: PosRange::new(from, self.cursor.position()),
            kind,
            literal,
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.cursor.peek(), Some(' ' | '\t' | '\r')) {
            let _ = self.cursor.advance();
        }
    }

    fn scan_word(&mut self, from: Position) -> Result<RawToken, ScanError> {
        let mut literal = String::new();
        literal.push(self.cursor.advance()?);
        while self.cursor.peek().is_some_and(is_word_continue) {
            literal.push(self.cursor.advance()?);
        }
        Ok(self.raw(from, RawKind::Word, literal))
    }

    /// Scans a maximal run of mark characters. The run is resolved against
    /// the operator table by the tokenizer, not here.
    fn scan_mark_seq(&mut self, from: Position) -> Result<RawToken, ScanError> {
        let mut literal = String::new();
        while self.cursor.peek().is_some_and(is_mark) {
            literal.push(self.cursor.advance()?);
        }
        Ok(self.raw(from, RawKind::Mark, literal))
    }

    fn scan_number(&mut self, from: Position) -> Result<RawToken, ScanError> {
        let mut literal = String::new();
        let first = self.cursor.advance()?;
        literal.push(first);

        let mut base = IntBase::Dec;
        if first == '0' {
            if let Some(prefix @ ('x' | 'o' | 'b')) = self.cursor.peek() {
                base = match prefix {
                    'x' => IntBase::Hex,
                    'o' => IntBase::Oct,
                    _ => IntBase::Bin,
                };
                literal.push(self.cursor.advance()?);
                if self.scan_digits(base, &mut literal) == 0 {
                    return Err(ScanError::Format {
                        pos: self.cursor.position(),
                    });
                }
                return Ok(self.raw(from, RawKind::Int(base), literal));
            }
        }

        self.scan_digits(base, &mut literal);
        Ok(self.raw(from, RawKind::Int(base), literal))
    }

    fn scan_digits(&mut self, base: IntBase, literal: &mut String) -> usize {
        let mut count = 0;
        while self.cursor.peek().is_some_and(|c| base_digit(base, c)) {
            literal.push(self.cursor.advance().expect("peeked digit"));
            count += 1;
        }
        count
    }

    /// Advance inside a quoted literal; EOF means the quote never closed.
    fn advance_quoted(&mut self, quote_pos: Position) -> Result<char, ScanError> {
        self.cursor
            .advance()
            .map_err(|_| ScanError::NonClosedQuote { pos: quote_pos })
    }

    fn scan_string(&mut self, from: Position) -> Result<RawToken, ScanError> {
        self.cursor.advance()?; // opening quote
        let mut literal = String::from('"');
        loop {
            match self.advance_quoted(from)? {
                '\\' => {
                    literal.push('\\');
                    self.scan_escape(&mut literal, from)?;
                }
                '"' => {
                    literal.push('"');
                    break;
                }
                ch => literal.push(ch),
            }
        }
        Ok(self.raw(from, RawKind::Str, literal))
    }

    /// A char literal must decode to exactly one code point.
    fn scan_char(&mut self, from: Position) -> Result<RawToken, ScanError> {
        self.cursor.advance()?; // opening quote
        let mut literal = String::from('\'');
        let mut decoded = 0usize;
        loop {
            match self.advance_quoted(from)? {
                '\\' => {
                    literal.push('\\');
                    self.scan_escape(&mut literal, from)?;
                    decoded += 1;
                }
                '\'' => {
                    literal.push('\'');
                    break;
                }
                ch => {
                    literal.push(ch);
                    decoded += 1;
                }
            }
        }
        if decoded != 1 {
            return Err(ScanError::Format { pos: from });
        }
        Ok(self.raw(from, RawKind::Char, literal))
    }

    /// Consumes one escape sequence after the backslash and returns the code
    /// point it denotes. The raw spelling is appended to `literal`.
    fn scan_escape(
        &mut self,
        literal: &mut String,
        quote_pos: Position,
    ) -> Result<char, ScanError> {
        let pos = self.cursor.position();
        let ch = self.advance_quoted(quote_pos)?;
        literal.push(ch);
        match ch {
            'n' => Ok('\n'),
            't' => Ok('\t'),
            'r' => Ok('\r'),
            '\\' => Ok('\\'),
            '"' | '\'' => Ok(ch),
            'x' => self.scan_unicode_hex(2, literal, quote_pos),
            'u' => self.scan_unicode_hex(4, literal, quote_pos),
            'U' => self.scan_unicode_hex(8, literal, quote_pos),
            _ => Err(ScanError::UnknownEscapeChar { pos, ch }),
        }
    }

    /// `\xHH`, `\uHHHH`, `\UHHHHHHHH`: exactly `count` hex digits denoting a
    /// Unicode scalar value.
    fn scan_unicode_hex(
        &mut self,
        count: usize,
        literal: &mut String,
        quote_pos: Position,
    ) -> Result<char, ScanError> {
        let mut value: u32 = 0;
        for _ in 0..count {
            let pos = self.cursor.position();
            let ch = self.advance_quoted(quote_pos)?;
            literal.push(ch);
            let digit = ch.to_digit(16).ok_or(ScanError::Format { pos })?;
            value = (value << 4) | digit;
        }
        char::from_u32(value).ok_or(ScanError::Format {
            pos: self.cursor.position(),
        })
    }

    fn scan_comment(&mut self, from: Position) -> Result<RawToken, ScanError> {
        self.cursor.advance()?; // '/'
        let style = match self.cursor.advance()? {
            '/' => CommentStyle::Line,
            _ => CommentStyle::Block,
        };

        let mut literal = String::from(match style {
            CommentStyle::Line => "//",
            CommentStyle::Block => "/*",
        });

        match style {
            CommentStyle::Line => {
                // Up to, not including, the newline.
                while self.cursor.peek().is_some_and(|c| c != '\n') {
                    literal.push(self.cursor.advance()?);
                }
            }
            CommentStyle::Block => loop {
                // Escape processing does not apply; no nesting.
                let ch = self.cursor.advance()?;
                literal.push(ch);
                if ch == '*' && self.cursor.peek() == Some('/') {
                    literal.push(self.cursor.advance()?);
                    break;
                }
            },
        }

        Ok(self.raw(from, RawKind::Comment(style), literal))
    }
}
