//! Tokenizer layer over the raw scanner.
//!
//! Promotes identifier-class words to keyword kinds, resolves mark sequences
//! against the operator table, discards comments, and performs automatic
//! semicolon insertion: a newline whose preceding emitted token can legally
//! end a statement becomes a `;` token spanning the newline; any other
//! newline is dropped.

use crate::scanner::{RawKind, RawToken, ScanError, Scanner};
use crate::token::{PosRange, Token, TokenKind};

pub struct Tokenizer {
    scanner: Scanner,
    current: Token,
    /// Kind of the most recently emitted (non-suppressed) token. Starts as
    /// the `Illegal` sentinel, which is outside the insertion trigger set.
    prev: TokenKind,
}

impl Tokenizer {
    pub fn new(src: &str) -> Self {
        Self {
            scanner: Scanner::new(src),
            current: Token::new(PosRange::default(), TokenKind::Illegal, ""),
            prev: TokenKind::Illegal,
        }
    }

    /// The token most recently produced by [`advance`](Self::advance).
    #[inline]
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Fetches the next token into `current`. At end of input `current`
    /// becomes a zero-width `Eof` token. On a lexical failure `current`
    /// becomes an `Illegal` token covering the failed span and the error is
    /// returned; scanning may continue afterwards.
    pub fn advance(&mut self) -> Result<(), ScanError> {
        loop {
            let raw = match self.scanner.scan_token() {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    self.current = Token::eof(self.scanner.position());
                    self.prev = TokenKind::Eof;
                    return Ok(());
                }
                Err(err) => {
                    let from = err.position();
                    let range = PosRange::new(from, self.scanner.position());
                    return self.fail(range, err);
                }
            };

            let range = raw.range;
            match self.cook(raw) {
                Ok(Some(token)) => {
                    self.prev = token.kind;
                    self.current = token;
                    return Ok(());
                }
                Ok(None) => {}
                Err(err) => return self.fail(range, err),
            }
        }
    }

    fn fail(&mut self, range: PosRange, err: ScanError) -> Result<(), ScanError> {
        self.current = Token::new(range, TokenKind::Illegal, "");
        self.prev = TokenKind::Illegal;
        Err(err)
    }

    /// Resolves a raw lexeme to a token, or `None` for suppressed trivia
    /// (comments and non-inserting newlines).
    fn cook(&mut self, raw: RawToken) -> Result<Option<Token>, ScanError> {
        let token = match raw.kind {
            RawKind::Word => {
                let kind = TokenKind::lookup_keyword(&raw.literal).unwrap_or(TokenKind::Ident);
                Token::new(raw.range, kind, raw.literal)
            }
            RawKind::Mark => match TokenKind::lookup_operator(&raw.literal) {
                Some(kind) => Token::new(raw.range, kind, raw.literal),
                None => {
                    return Err(ScanError::UnknownOperator {
                        pos: raw.range.from,
                        literal: raw.literal,
                    })
                }
            },
            RawKind::Int(_) => Token::new(raw.range, TokenKind::Int, raw.literal),
            RawKind::Char => Token::new(raw.range, TokenKind::Char, raw.literal),
            RawKind::Str => Token::new(raw.range, TokenKind::Str, raw.literal),
            RawKind::Comment(_) => return Ok(None),
            RawKind::Delim(TokenKind::Newline) => {
                if self.prev.can_insert_semicolon() {
                    Token::new(raw.range, TokenKind::Semicolon, ";")
                } else {
                    return Ok(None);
                }
            }
            RawKind::Delim(kind) => Token::new(raw.range, kind, raw.literal),
        };
        Ok(Some(token))
    }
}

// =============================================================================
// Lazy token stream for tooling
// =============================================================================

/// Iterator over resolved tokens, for tooling. Lexical failures do not stop
/// the stream: an `Illegal` token is yielded and the error is recorded.
pub struct Tokens {
    tokenizer: Tokenizer,
    errors: Vec<ScanError>,
    done: bool,
}

impl Tokens {
    pub fn new(src: &str) -> Self {
        Self {
            tokenizer: Tokenizer::new(src),
            errors: Vec::new(),
            done: false,
        }
    }

    /// Lexical errors encountered so far.
    pub fn take_errors(&mut self) -> Vec<ScanError> {
        std::mem::take(&mut self.errors)
    }
}

impl Iterator for Tokens {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        match self.tokenizer.advance() {
            Ok(()) => {
                let token = self.tokenizer.current().clone();
                if token.kind == TokenKind::Eof {
                    self.done = true;
                    return None;
                }
                Some(token)
            }
            Err(err) => {
                self.errors.push(err);
                Some(self.tokenizer.current().clone())
            }
        }
    }
}
