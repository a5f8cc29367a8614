//! Lexing of a single code token
//!
//! Callers guarantee the start offset is neither whitespace nor inside a
//! comment or string. Every branch consumes at least one byte, and token
//! edges always fall on ASCII bytes or the end of a run of non-ASCII
//! bytes, so tokens never split a UTF-8 sequence.

use crate::tokens::{is_mnemonic_operator, Keyword, Token, TokenKind, SYMBOL_OPERATORS};

pub(crate) fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

fn is_word_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn word_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| !is_word_byte(b))
        .map(|p| from + p)
        .unwrap_or(bytes.len())
}

pub fn lex_code_token(text: &str, start: usize) -> Token {
    let bytes = text.as_bytes();
    let b = bytes[start];
    let next = bytes.get(start + 1).copied();

    if b.is_ascii_digit() || (b == b'.' && next.is_some_and(|c| c.is_ascii_digit())) {
        let end = number_end(bytes, start);
        return Token::new(&text[start..end], TokenKind::Number, start, end);
    }

    if is_word_start(b) {
        let end = word_end(bytes, start);
        let word = &text[start..end];
        return Token::new(word, word_kind(word), start, end);
    }

    if b == b'%' && next.is_some_and(is_word_start) {
        let end = word_end(bytes, start + 1);
        let word = &text[start..end];
        // `%name` that is not reserved is a macro call, an atom for the grammar
        return Token::new(word, word_kind(word), start, end);
    }

    if b == b'&' {
        let name_start = bytes[start..]
            .iter()
            .position(|&c| c != b'&')
            .map(|p| start + p)
            .unwrap_or(bytes.len());
        if bytes.get(name_start).copied().is_some_and(is_word_start) {
            let mut end = word_end(bytes, name_start);
            if bytes.get(end) == Some(&b'.') {
                end += 1;
            }
            return Token::new(&text[start..end], TokenKind::MacroVariable, start, end);
        }
    }

    let single = |kind: TokenKind| Token::new(&text[start..start + 1], kind, start, start + 1);
    match b {
        b';' => single(TokenKind::StatementEnd),
        b'(' | b'[' | b'{' => single(TokenKind::OpenParen),
        b')' | b']' | b'}' => single(TokenKind::CloseParen),
        _ => {
            let rest = &text[start..];
            match SYMBOL_OPERATORS.iter().find(|op| rest.starts_with(**op)) {
                Some(op) => Token::new(*op, TokenKind::Operator, start, start + op.len()),
                None => single(TokenKind::Punctuation),
            }
        }
    }
}

fn word_kind(word: &str) -> TokenKind {
    let lower = word.to_ascii_lowercase();
    match Keyword::from_str(&lower) {
        Some(keyword) if keyword.is_block_start() => TokenKind::BlockOpener,
        Some(keyword) if keyword.is_block_end() => TokenKind::BlockCloser,
        Some(_) => TokenKind::Keyword,
        None if is_mnemonic_operator(&lower) => TokenKind::Operator,
        None => TokenKind::Identifier,
    }
}

/// Digits, decimal points, suffix letters and signed exponents
fn number_end(bytes: &[u8], start: usize) -> usize {
    let mut j = start + 1;
    while j < bytes.len() {
        let c = bytes[j];
        if is_word_byte(c) || c == b'.' {
            j += 1;
            continue;
        }
        let signed_exponent = (c == b'+' || c == b'-')
            && matches!(bytes[j - 1], b'e' | b'E')
            && bytes[start..j - 1].iter().all(|d| d.is_ascii_digit() || *d == b'.')
            && bytes.get(j + 1).is_some_and(|d| d.is_ascii_digit());
        if signed_exponent {
            j += 2;
            continue;
        }
        break;
    }
    j
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(text: &str) -> (String, TokenKind) {
        let token = lex_code_token(text, 0);
        (token.lexeme, token.kind)
    }

    #[test]
    fn test_words() {
        assert_eq!(lex("PROC print"), ("PROC".into(), TokenKind::BlockOpener));
        assert_eq!(lex("run;"), ("run".into(), TokenKind::BlockCloser));
        assert_eq!(lex("then x"), ("then".into(), TokenKind::Keyword));
        assert_eq!(lex("EQ 1"), ("EQ".into(), TokenKind::Operator));
        assert_eq!(lex("sashelp.class"), ("sashelp".into(), TokenKind::Identifier));
        assert_eq!(lex("_n_"), ("_n_".into(), TokenKind::Identifier));
    }

    #[test]
    fn test_macro_words() {
        assert_eq!(lex("%macro m;"), ("%macro".into(), TokenKind::BlockOpener));
        assert_eq!(lex("%MEND;"), ("%MEND".into(), TokenKind::BlockCloser));
        assert_eq!(lex("%let x"), ("%let".into(), TokenKind::Keyword));
        assert_eq!(lex("%setup(1)"), ("%setup".into(), TokenKind::Identifier));
        assert_eq!(lex("&dsn..x"), ("&dsn.".into(), TokenKind::MacroVariable));
        assert_eq!(lex("&&var&i"), ("&&var".into(), TokenKind::MacroVariable));
        assert_eq!(lex("% x"), ("%".into(), TokenKind::Punctuation));
    }

    #[test]
    fn test_greedy_operators() {
        assert_eq!(lex("**2"), ("**".into(), TokenKind::Operator));
        assert_eq!(lex("<=b"), ("<=".into(), TokenKind::Operator));
        assert_eq!(lex("^=b"), ("^=".into(), TokenKind::Operator));
        assert_eq!(lex("||b"), ("||".into(), TokenKind::Operator));
        assert_eq!(lex("=:'a'"), ("=:".into(), TokenKind::Operator));
        assert_eq!(lex("<b"), ("<".into(), TokenKind::Operator));
        assert_eq!(lex("& b"), ("&".into(), TokenKind::Operator));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(lex("1.5e-3 "), ("1.5e-3".into(), TokenKind::Number));
        assert_eq!(lex(".5;"), (".5".into(), TokenKind::Number));
        assert_eq!(lex("10-2"), ("10".into(), TokenKind::Number));
        assert_eq!(lex("2e+"), ("2e".into(), TokenKind::Number));
    }

    #[test]
    fn test_brackets_and_punctuation() {
        assert_eq!(lex("[1]"), ("[".into(), TokenKind::OpenParen));
        assert_eq!(lex("}"), ("}".into(), TokenKind::CloseParen));
        assert_eq!(lex(", y"), (",".into(), TokenKind::Punctuation));
        assert_eq!(lex(";"), (";".into(), TokenKind::StatementEnd));
    }

    #[test]
    fn test_non_ascii_words_stay_whole() {
        let token = lex_code_token("größe = 1", 0);
        assert_eq!(token.lexeme, "größe");
        assert_eq!(token.end, "größe".len());
    }
}
