//! Presentation of classified tokens
//!
//! Classification never consults this table; swapping the `StyleMap`
//! changes only the faces attached to spans.

use serde::Serialize;
use std::fmt;

use crate::buffer::TextBuffer;
use crate::lexical::tokens;
use crate::tokens::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Face {
    Plain,
    Keyword,
    BlockKeyword,
    MacroKeyword,
    Operator,
    Comment,
    String,
    Number,
    MacroVariable,
    Bracket,
    Delimiter,
}

impl Face {
    pub const fn as_str(self) -> &'static str {
        match self {
            Face::Plain => "plain",
            Face::Keyword => "keyword",
            Face::BlockKeyword => "block-keyword",
            Face::MacroKeyword => "macro-keyword",
            Face::Operator => "operator",
            Face::Comment => "comment",
            Face::String => "string",
            Face::Number => "number",
            Face::MacroVariable => "macro-variable",
            Face::Bracket => "bracket",
            Face::Delimiter => "delimiter",
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait StyleMap {
    fn face_for(&self, kind: TokenKind) -> Face;

    /// Face for a concrete token; override to look past the kind
    fn face(&self, token: &Token) -> Face {
        self.face_for(token.kind)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStyleMap;

impl StyleMap for DefaultStyleMap {
    fn face_for(&self, kind: TokenKind) -> Face {
        match kind {
            TokenKind::Identifier => Face::Plain,
            TokenKind::Keyword => Face::Keyword,
            TokenKind::BlockOpener | TokenKind::BlockCloser => Face::BlockKeyword,
            TokenKind::AssignmentTarget => Face::Keyword,
            TokenKind::Operator => Face::Operator,
            TokenKind::StatementEnd | TokenKind::Punctuation => Face::Delimiter,
            TokenKind::Comment => Face::Comment,
            TokenKind::StringLiteral => Face::String,
            TokenKind::Number => Face::Number,
            TokenKind::OpenParen | TokenKind::CloseParen => Face::Bracket,
            TokenKind::MacroVariable => Face::MacroVariable,
        }
    }

    fn face(&self, token: &Token) -> Face {
        if token.kind.is_keyword_like() && token.lexeme.starts_with('%') {
            return Face::MacroKeyword;
        }
        self.face_for(token.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyledSpan {
    pub start: usize,
    pub end: usize,
    pub face: Face,
}

/// Styled spans for every token, skipping plain ones
pub fn highlight(buffer: &dyn TextBuffer, map: &dyn StyleMap) -> Vec<StyledSpan> {
    tokens(buffer)
        .filter_map(|token| {
            let face = map.face(&token);
            (face != Face::Plain).then_some(StyledSpan {
                start: token.start,
                end: token.end,
                face,
            })
        })
        .collect()
}
