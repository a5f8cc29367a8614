//! Classified tokens
//!
//! Tokens are produced on demand from a buffer offset and never stored in a
//! document-wide list. Offsets are byte offsets, `end` exclusive.
use super::keywords::Keyword;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    Identifier,
    Keyword,
    Operator,
    BlockOpener,
    BlockCloser,
    StatementEnd,
    Comment,
    StringLiteral,
    Number,
    OpenParen,
    CloseParen,
    Punctuation,
    /// `&name` macro variable reference
    MacroVariable,
    /// Logical `data =` token built by the resolver
    AssignmentTarget,
}

impl TokenKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Keyword => "keyword",
            Self::Operator => "operator",
            Self::BlockOpener => "block-opener",
            Self::BlockCloser => "block-closer",
            Self::StatementEnd => "statement-end",
            Self::Comment => "comment",
            Self::StringLiteral => "string-literal",
            Self::Number => "number",
            Self::OpenParen => "open-paren",
            Self::CloseParen => "close-paren",
            Self::Punctuation => "punctuation",
            Self::MacroVariable => "macro-variable",
            Self::AssignmentTarget => "assignment-target",
        }
    }

    /// Kinds that carry a keyword spelling
    pub const fn is_keyword_like(self) -> bool {
        matches!(self, Self::Keyword | Self::BlockOpener | Self::BlockCloser)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub lexeme: String,
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(lexeme: impl Into<String>, kind: TokenKind, start: usize, end: usize) -> Self {
        Self {
            lexeme: lexeme.into(),
            kind,
            start,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_comment(&self) -> bool {
        self.kind == TokenKind::Comment
    }

    /// The reserved word this token spells, if any
    pub fn keyword(&self) -> Option<Keyword> {
        if self.kind.is_keyword_like() {
            Keyword::lookup(&self.lexeme)
        } else {
            None
        }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.keyword() == Some(keyword)
    }

    /// Identifier-like tokens that can name a procedure or macro
    pub fn is_name(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Identifier
                | TokenKind::Keyword
                | TokenKind::BlockOpener
                | TokenKind::BlockCloser
                | TokenKind::MacroVariable
        ) || (self.kind == TokenKind::Operator && self.lexeme.bytes().all(|b| b.is_ascii_alphabetic()))
    }

    /// Terminal name in the indentation grammar; empty for atoms
    ///
    /// Keywords and mnemonic operators map to their lowercase spelling,
    /// brackets to `(`/`)`, and the resolver's assignment target to
    /// `dataequal`. Whether a non-empty name is actually a grammar
    /// terminal is decided by the grammar.
    pub fn grammar_name(&self) -> String {
        match self.kind {
            TokenKind::AssignmentTarget => "dataequal".to_string(),
            TokenKind::Keyword | TokenKind::BlockOpener | TokenKind::BlockCloser => {
                self.lexeme.to_ascii_lowercase()
            }
            TokenKind::Operator => self.lexeme.to_ascii_lowercase(),
            TokenKind::StatementEnd => ";".to_string(),
            TokenKind::OpenParen => "(".to_string(),
            TokenKind::CloseParen => ")".to_string(),
            TokenKind::Punctuation if self.lexeme == "," => ",".to_string(),
            _ => String::new(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' {}..{}", self.kind, self.lexeme, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup_respects_kind() {
        let opener = Token::new("PROC", TokenKind::BlockOpener, 0, 4);
        assert_eq!(opener.keyword(), Some(Keyword::Proc));

        let ident = Token::new("proc", TokenKind::Identifier, 0, 4);
        assert_eq!(ident.keyword(), None);
    }

    #[test]
    fn test_grammar_names() {
        assert_eq!(Token::new("Then", TokenKind::Keyword, 0, 4).grammar_name(), "then");
        assert_eq!(Token::new("data =", TokenKind::AssignmentTarget, 0, 6).grammar_name(), "dataequal");
        assert_eq!(Token::new("[", TokenKind::OpenParen, 0, 1).grammar_name(), "(");
        assert_eq!(Token::new("}", TokenKind::CloseParen, 0, 1).grammar_name(), ")");
        assert_eq!(Token::new(",", TokenKind::Punctuation, 0, 1).grammar_name(), ",");
        assert_eq!(Token::new("EQ", TokenKind::Operator, 0, 2).grammar_name(), "eq");
        assert_eq!(Token::new("x", TokenKind::Identifier, 0, 1).grammar_name(), "");
        assert_eq!(Token::new("'a'", TokenKind::StringLiteral, 0, 3).grammar_name(), "");
    }

    #[test]
    fn test_name_tokens() {
        assert!(Token::new("print", TokenKind::Identifier, 0, 5).is_name());
        assert!(Token::new("&m", TokenKind::MacroVariable, 0, 2).is_name());
        assert!(Token::new("in", TokenKind::Operator, 0, 2).is_name());
        assert!(!Token::new(";", TokenKind::StatementEnd, 0, 1).is_name());
        assert!(!Token::new("<=", TokenKind::Operator, 0, 2).is_name());
    }

    #[test]
    fn test_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&TokenKind::BlockOpener).unwrap();
        assert_eq!(json, "\"block-opener\"");
    }
}
