//! Context-sensitive token resolver
//!
//! Wraps the classifier to produce the logical token stream the block
//! locator and indentation grammar consume. Comments are transparent.
//! `data` followed by `=` becomes a single `dataequal` token spanning the
//! keyword through the `=`, and `output` directly followed by `;` is an
//! ordinary atom rather than the start of an output statement. `select`
//! opens a `select ... end` group only when `(` or `;` follows it; the
//! `proc sql` query clause is an atom. Each token
//! is resolved by its own local lookahead, so scanning forward or backward
//! across the same text yields the same logical tokens.

use crate::buffer::TextBuffer;
use crate::lexical::{classify, Direction};
use crate::tokens::{Keyword, Token, TokenKind};

/// Next logical token at or after `offset` and the offset just past it
///
/// Offsets past the end of the buffer yield `None`.
pub fn forward_token(buffer: &dyn TextBuffer, offset: usize) -> Option<(Token, usize)> {
    let mut pos = offset;
    loop {
        let token = classify(buffer, pos, Direction::Forward).ok()??;
        if token.is_comment() {
            pos = token.end;
            continue;
        }

        if token.is_keyword(Keyword::Data) {
            if let Some(equals) = next_code_token(buffer, token.end).filter(is_equals) {
                let end = equals.end;
                return Some((assignment_target(buffer, &token, &equals), end));
            }
        }

        let end = token.end;
        return Some((demote_statement_keyword(buffer, token), end));
    }
}

/// Previous logical token ending at or before `offset` and its start
pub fn backward_token(buffer: &dyn TextBuffer, offset: usize) -> Option<(Token, usize)> {
    let mut pos = offset;
    loop {
        let token = classify(buffer, pos, Direction::Backward).ok()??;
        if token.is_comment() {
            pos = token.start;
            continue;
        }

        if is_equals(&token) {
            if let Some(data) = previous_code_token(buffer, token.start)
                .filter(|t| t.is_keyword(Keyword::Data))
            {
                let start = data.start;
                return Some((assignment_target(buffer, &data, &token), start));
            }
        }

        // Only reached when `offset` sits between `data` and its `=`
        if token.is_keyword(Keyword::Data) {
            if let Some(equals) = next_code_token(buffer, token.end).filter(is_equals) {
                let start = token.start;
                return Some((assignment_target(buffer, &token, &equals), start));
            }
        }

        let start = token.start;
        return Some((demote_statement_keyword(buffer, token), start));
    }
}

/// Resolve the logical token that starts exactly at `offset`
pub fn token_at(buffer: &dyn TextBuffer, offset: usize) -> Option<Token> {
    forward_token(buffer, offset)
        .map(|(token, _)| token)
        .filter(|token| token.start == offset)
}

fn is_equals(token: &Token) -> bool {
    token.kind == TokenKind::Operator && token.lexeme == "="
}

/// Every hop passes a whole comment span, so the walk is bounded by the
/// number of comments in the gap
fn next_code_token(buffer: &dyn TextBuffer, offset: usize) -> Option<Token> {
    let mut pos = offset;
    loop {
        let token = classify(buffer, pos, Direction::Forward).ok()??;
        if !token.is_comment() {
            return Some(token);
        }
        pos = token.end;
    }
}

fn previous_code_token(buffer: &dyn TextBuffer, offset: usize) -> Option<Token> {
    let mut pos = offset;
    loop {
        let token = classify(buffer, pos, Direction::Backward).ok()??;
        if !token.is_comment() {
            return Some(token);
        }
        pos = token.start;
    }
}

fn assignment_target(buffer: &dyn TextBuffer, data: &Token, equals: &Token) -> Token {
    Token::new(
        &buffer.text()[data.start..equals.end],
        TokenKind::AssignmentTarget,
        data.start,
        equals.end,
    )
}

/// `output;` and a `select` without `(` or `;` after it are atoms
fn demote_statement_keyword(buffer: &dyn TextBuffer, token: Token) -> Token {
    let demote = match token.keyword().filter(|k| k.is_context_sensitive()) {
        Some(Keyword::Output) => next_code_token(buffer, token.end)
            .is_some_and(|next| next.kind == TokenKind::StatementEnd),
        Some(Keyword::Select) => !next_code_token(buffer, token.end).is_some_and(|next| {
            matches!(next.kind, TokenKind::StatementEnd | TokenKind::OpenParen)
        }),
        _ => false,
    };
    if demote {
        Token {
            kind: TokenKind::Identifier,
            ..token
        }
    } else {
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SourceBuffer;

    fn forward_all(text: &str) -> Vec<Token> {
        let buffer = SourceBuffer::new(text);
        let mut tokens = Vec::new();
        let mut offset = 0;
        while let Some((token, next)) = forward_token(&buffer, offset) {
            tokens.push(token);
            offset = next;
        }
        tokens
    }

    fn backward_all(text: &str) -> Vec<Token> {
        let buffer = SourceBuffer::new(text);
        let mut tokens = Vec::new();
        let mut offset = text.len();
        while let Some((token, next)) = backward_token(&buffer, offset) {
            tokens.push(token);
            offset = next;
        }
        tokens.reverse();
        tokens
    }

    #[test]
    fn test_data_equal_is_one_token() {
        let tokens = forward_all("proc print data = x; run;");
        assert_eq!(tokens[2].kind, TokenKind::AssignmentTarget);
        assert_eq!(tokens[2].lexeme, "data =");
        assert_eq!((tokens[2].start, tokens[2].end), (11, 17));
        assert_eq!(tokens[2].grammar_name(), "dataequal");
    }

    #[test]
    fn test_disambiguation_is_symmetric() {
        let text = "data = x;";
        let forward = forward_all(text);
        let backward = backward_all(text);

        assert_eq!(forward, backward);
        assert_eq!(forward[0].kind, TokenKind::AssignmentTarget);
        assert_eq!(forward.len(), 3);
    }

    #[test]
    fn test_data_equals_data_resolves_each_occurrence() {
        let text = "set data = data;";
        let forward = forward_all(text);
        let backward = backward_all(text);

        assert_eq!(forward, backward);
        let kinds: Vec<TokenKind> = forward.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::AssignmentTarget,
                TokenKind::BlockOpener,
                TokenKind::StatementEnd,
            ]
        );
    }

    #[test]
    fn test_comments_are_transparent() {
        let text = "data /* target */ = x; /* tail */";
        let forward = forward_all(text);
        assert_eq!(forward.len(), 3);
        assert_eq!(forward[0].kind, TokenKind::AssignmentTarget);
        assert_eq!(forward, backward_all(text));
    }

    #[test]
    fn test_backward_between_data_and_equals() {
        let buffer = SourceBuffer::new("data = x;");
        let (token, start) = backward_token(&buffer, 4).unwrap();
        assert_eq!(token.kind, TokenKind::AssignmentTarget);
        assert_eq!(start, 0);
    }

    #[test]
    fn test_plain_data_stays_opener() {
        let tokens = forward_all("data work.a;");
        assert_eq!(tokens[0].kind, TokenKind::BlockOpener);
        assert_eq!(tokens[0].grammar_name(), "data");
    }

    #[test]
    fn test_bare_output_is_an_atom() {
        let tokens = forward_all("if x then output;");
        assert_eq!(tokens[3].lexeme, "output");
        assert_eq!(tokens[3].kind, TokenKind::Identifier);
        assert_eq!(tokens[3].grammar_name(), "");

        let tokens = forward_all("output out = stats;");
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[0].grammar_name(), "output");
        assert_eq!(forward_all("output;"), backward_all("output;"));
    }

    #[test]
    fn test_select_opens_only_before_paren_or_semicolon() {
        let tokens = forward_all("select (x); when (1) y = 2; end;");
        assert_eq!(tokens[0].grammar_name(), "select");
        assert_eq!(forward_all("select;")[0].grammar_name(), "select");

        let query = "select x from b;";
        let tokens = forward_all(query);
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].grammar_name(), "");
        assert_eq!(tokens, backward_all(query));
    }

    #[test]
    fn test_many_comments_between_data_and_equals() {
        let comments: String = (1..=12).map(|i| format!("/*{}*/ ", i)).collect();
        let text = format!("proc print data {}= x;", comments);
        let forward = forward_all(&text);
        assert_eq!(forward[2].kind, TokenKind::AssignmentTarget);
        assert_eq!(forward[2].end, text.find('=').unwrap() + 1);
        assert_eq!(forward, backward_all(&text));
    }

    #[test]
    fn test_token_at_requires_exact_start() {
        let buffer = SourceBuffer::new("  data = x;");
        assert_eq!(
            token_at(&buffer, 2).map(|t| t.kind),
            Some(TokenKind::AssignmentTarget)
        );
        assert_eq!(token_at(&buffer, 0), None);
    }

    #[test]
    fn test_past_end_is_none() {
        let buffer = SourceBuffer::new("x;");
        assert!(forward_token(&buffer, 10).is_none());
        assert!(backward_token(&buffer, 0).is_none());
    }
}
