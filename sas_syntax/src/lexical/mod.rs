//! Lexical classifier
//!
//! Classifies the token at an arbitrary offset in either direction. Comment
//! and string awareness comes from the buffer's `LexicalMap`; code tokens
//! are lexed on demand, so nothing is tokenised ahead of the query.

pub mod map;
pub mod scanner;

use crate::buffer::{floor_char_boundary, TextBuffer};
use crate::logging::codes;
use crate::tokens::{Token, TokenKind};

pub use map::{LexicalMap, Region, SkipKind, SkipSpan, SyntaxContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The token at or after the offset
    Forward,
    /// The token ending at or before the offset
    Backward,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("Offset {offset} is outside the buffer (length {len})")]
    OutOfRange { offset: usize, len: usize },
}

impl LexError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexError::OutOfRange { .. } => codes::lexical::OFFSET_OUT_OF_RANGE,
        }
    }
}

pub type LexResult<T> = Result<T, LexError>;

/// Validate an offset and snap it to a character boundary
pub fn check_offset(buffer: &dyn TextBuffer, offset: usize) -> LexResult<usize> {
    let len = buffer.len();
    if offset > len {
        return Err(LexError::OutOfRange { offset, len });
    }
    Ok(floor_char_boundary(buffer.text(), offset))
}

/// Classify the token next to `offset`
///
/// Whitespace is skipped in the scan direction. An offset inside a comment
/// or string yields the whole comment or string. Running off either end of
/// the buffer yields `None`.
pub fn classify(
    buffer: &dyn TextBuffer,
    offset: usize,
    direction: Direction,
) -> LexResult<Option<Token>> {
    let offset = check_offset(buffer, offset)?;
    Ok(match direction {
        Direction::Forward => classify_forward(buffer, offset),
        Direction::Backward => classify_backward(buffer, offset),
    })
}

fn span_token(text: &str, span: &SkipSpan) -> Token {
    let kind = match span.kind.region() {
        Region::String => TokenKind::StringLiteral,
        _ => TokenKind::Comment,
    };
    Token::new(&text[span.start..span.end], kind, span.start, span.end)
}

fn classify_forward(buffer: &dyn TextBuffer, offset: usize) -> Option<Token> {
    let text = buffer.text();
    let map = buffer.lexical_map();

    if let Some(span) = map.span_at(offset) {
        return Some(span_token(text, span));
    }

    let bytes = text.as_bytes();
    let start = bytes[offset..]
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map(|p| offset + p)?;

    if let Some(span) = map.span_at(start) {
        return Some(span_token(text, span));
    }

    // An offset inside a token yields the whole token
    let mut pos = run_start(bytes, map, start);
    loop {
        let token = scanner::lex_code_token(text, pos);
        if token.end > start || token.end <= pos {
            return Some(token);
        }
        pos = token.end;
    }
}

/// Start of the run of non-blank code bytes that ends at `end`
fn run_start(bytes: &[u8], map: &LexicalMap, end: usize) -> usize {
    let mut start = end;
    while start > 0 && !bytes[start - 1].is_ascii_whitespace() && map.is_code(start - 1) {
        start -= 1;
    }
    start
}

fn classify_backward(buffer: &dyn TextBuffer, offset: usize) -> Option<Token> {
    let text = buffer.text();
    let bytes = text.as_bytes();
    let map = buffer.lexical_map();

    if offset > 0 {
        if let Some(span) = map.span_at(offset - 1) {
            return Some(span_token(text, span));
        }
    }

    let mut limit = offset;
    loop {
        let mut end = limit;
        while end > 0 && bytes[end - 1].is_ascii_whitespace() {
            end -= 1;
        }
        if end == 0 {
            return None;
        }
        if let Some(span) = map.span_at(end - 1) {
            return Some(span_token(text, span));
        }

        // Lex the whole non-blank run forward so both directions agree on
        // token boundaries
        let run_start = run_start(bytes, map, end);

        let mut pos = run_start;
        let mut last = None;
        while pos < end {
            let token = scanner::lex_code_token(text, pos);
            if token.end > end {
                break;
            }
            pos = token.end;
            last = Some(token);
        }

        if last.is_some() {
            return last;
        }
        // `end` fell inside the run's first token
        limit = run_start;
    }
}

/// Forward iterator over every token, comments included
pub struct Tokens<'b> {
    buffer: &'b dyn TextBuffer,
    offset: usize,
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.offset >= self.buffer.len() {
            return None;
        }
        let token = classify_forward(self.buffer, self.offset)?;
        self.offset = token.end;
        Some(token)
    }
}

/// Iterate the tokens from `offset` to the end of the buffer
pub fn tokens_from(buffer: &dyn TextBuffer, offset: usize) -> LexResult<Tokens<'_>> {
    let offset = check_offset(buffer, offset)?;
    Ok(Tokens { buffer, offset })
}

pub fn tokens(buffer: &dyn TextBuffer) -> Tokens<'_> {
    Tokens { buffer, offset: 0 }
}
