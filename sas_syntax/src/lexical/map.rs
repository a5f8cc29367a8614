//! Comment and string span index
//!
//! One forward pass over the buffer records every comment and string
//! literal plus the offsets of the statement terminators that are real
//! code. Queries afterwards are binary searches, so the backward scanners
//! can test each candidate match without rescanning from the buffer start.

use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::{log_debug, log_warning};
use serde::Serialize;

/// Which of the three lexical regions an offset is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Code,
    Comment,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipKind {
    /// `/* ... */`
    BlockComment,
    /// `* ... ;` or `%* ... ;` at statement start; the `;` is not part of it
    StatementComment,
    StringLiteral,
}

impl SkipKind {
    pub fn region(self) -> Region {
        match self {
            SkipKind::BlockComment | SkipKind::StatementComment => Region::Comment,
            SkipKind::StringLiteral => Region::String,
        }
    }
}

/// A comment or string literal; the opening delimiter belongs to the span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipSpan {
    pub start: usize,
    pub end: usize,
    pub kind: SkipKind,
    /// False when the span runs to the end of the buffer
    pub terminated: bool,
}

impl SkipSpan {
    pub fn is_comment(&self) -> bool {
        self.kind.region() == Region::Comment
    }
}

/// Lexical context of one offset, recomputed per query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyntaxContext {
    pub region: Region,
    /// Open brackets since the start of the statement
    pub paren_depth: usize,
}

impl SyntaxContext {
    pub fn is_code(&self) -> bool {
        self.region == Region::Code
    }

    pub fn is_comment(&self) -> bool {
        self.region == Region::Comment
    }

    pub fn is_string(&self) -> bool {
        self.region == Region::String
    }
}

#[derive(Debug, Clone, Default)]
pub struct LexicalMap {
    spans: Vec<SkipSpan>,
    terminators: Vec<usize>,
    len: usize,
}

impl LexicalMap {
    pub fn build(text: &str, preferences: &LexicalPreferences) -> Self {
        let bytes = text.as_bytes();
        let n = bytes.len();
        let mut spans = Vec::new();
        let mut terminators = Vec::new();
        let mut at_statement_start = true;
        let mut i = 0;

        while i < n {
            let b = bytes[i];

            if b.is_ascii_whitespace() {
                i += 1;
                continue;
            }

            if b == b'/' && bytes.get(i + 1) == Some(&b'*') {
                let (end, terminated) = match text[i + 2..].find("*/") {
                    Some(p) => (i + 2 + p + 2, true),
                    None => (n, false),
                };
                spans.push(SkipSpan {
                    start: i,
                    end,
                    kind: SkipKind::BlockComment,
                    terminated,
                });
                i = end;
                continue;
            }

            let star_comment = b == b'*'
                || (b == b'%'
                    && preferences.recognize_macro_comments
                    && bytes.get(i + 1) == Some(&b'*'));
            if at_statement_start && star_comment {
                // Stops before the `;`, which the next iteration records as a terminator
                let (end, terminated) = match bytes[i + 1..].iter().position(|&c| c == b';') {
                    Some(p) => (i + 1 + p, true),
                    None => (n, false),
                };
                spans.push(SkipSpan {
                    start: i,
                    end,
                    kind: SkipKind::StatementComment,
                    terminated,
                });
                i = end;
                continue;
            }

            if b == b'\'' || (b == b'"' && preferences.double_quoted_strings) {
                let (end, terminated) = scan_quoted(bytes, i);
                spans.push(SkipSpan {
                    start: i,
                    end,
                    kind: SkipKind::StringLiteral,
                    terminated,
                });
                at_statement_start = false;
                i = end;
                continue;
            }

            if b == b';' {
                terminators.push(i);
                at_statement_start = true;
            } else {
                at_statement_start = false;
            }
            i += 1;
        }

        for span in spans.iter().filter(|s| !s.terminated) {
            let (code, message) = match span.kind {
                SkipKind::StringLiteral => {
                    (codes::lexical::UNTERMINATED_STRING, "Unterminated string literal")
                }
                _ => (codes::lexical::UNTERMINATED_COMMENT, "Unterminated comment"),
            };
            log_warning!(code = code, message, "start" => span.start);
        }

        log_debug!(
            "Lexical map built",
            "bytes" => n,
            "spans" => spans.len(),
            "terminators" => terminators.len()
        );

        Self {
            spans,
            terminators,
            len: n,
        }
    }

    pub fn spans(&self) -> &[SkipSpan] {
        &self.spans
    }

    /// Code `;` offsets in ascending order
    pub fn terminators(&self) -> &[usize] {
        &self.terminators
    }

    /// The comment or string covering `offset`
    pub fn span_at(&self, offset: usize) -> Option<&SkipSpan> {
        let idx = self.spans.partition_point(|s| s.start <= offset);
        let span = self.spans.get(idx.checked_sub(1)?)?;
        (offset < span.end).then_some(span)
    }

    pub fn region_at(&self, offset: usize) -> Region {
        self.span_at(offset)
            .map(|s| s.kind.region())
            .unwrap_or(Region::Code)
    }

    pub fn is_code(&self, offset: usize) -> bool {
        self.span_at(offset).is_none()
    }

    /// Last code `;` strictly before `offset`
    pub fn previous_terminator(&self, offset: usize) -> Option<usize> {
        let idx = self.terminators.partition_point(|&t| t < offset);
        idx.checked_sub(1).map(|i| self.terminators[i])
    }

    /// First code `;` at or after `offset`
    pub fn next_terminator(&self, offset: usize) -> Option<usize> {
        let idx = self.terminators.partition_point(|&t| t < offset);
        self.terminators.get(idx).copied()
    }

    /// Whether only whitespace and comments separate `offset` from the
    /// previous code `;` or the buffer start
    pub fn is_statement_start(&self, text: &str, offset: usize) -> bool {
        let bytes = text.as_bytes();
        let mut pos = offset.min(self.len);

        loop {
            while pos > 0 && bytes[pos - 1].is_ascii_whitespace() {
                pos -= 1;
            }
            if pos == 0 {
                return true;
            }
            match self.span_at(pos - 1) {
                Some(span) if span.is_comment() => pos = span.start,
                Some(_) => return false,
                None => return bytes[pos - 1] == b';',
            }
        }
    }

    pub fn context_at(&self, text: &str, offset: usize) -> SyntaxContext {
        let offset = offset.min(self.len);
        let span = self.span_at(offset);
        let region = span.map(|s| s.kind.region()).unwrap_or(Region::Code);
        let limit = span.map(|s| s.start).unwrap_or(offset);
        let from = self.previous_terminator(limit).map(|t| t + 1).unwrap_or(0);

        SyntaxContext {
            region,
            paren_depth: self.paren_depth(text.as_bytes(), from, limit),
        }
    }

    fn paren_depth(&self, bytes: &[u8], from: usize, limit: usize) -> usize {
        let mut depth = 0usize;
        let mut i = from;
        let mut next_span = self.spans.partition_point(|s| s.end <= from);

        while i < limit {
            if let Some(span) = self.spans.get(next_span) {
                if span.start <= i {
                    i = span.end;
                    next_span += 1;
                    continue;
                }
            }
            match bytes[i] {
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                _ => {}
            }
            i += 1;
        }

        depth
    }
}

/// Quoted literal starting at `start`; a doubled quote continues it
fn scan_quoted(bytes: &[u8], start: usize) -> (usize, bool) {
    let quote = bytes[start];
    let mut j = start + 1;

    loop {
        match bytes[j..].iter().position(|&c| c == quote) {
            None => return (bytes.len(), false),
            Some(p) => {
                let close = j + p;
                if bytes.get(close + 1) == Some(&quote) {
                    j = close + 2;
                } else {
                    return (close + 1, true);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(text: &str) -> LexicalMap {
        LexicalMap::build(text, &LexicalPreferences::default())
    }

    #[test]
    fn test_block_comment_and_string_spans() {
        let text = "x = 'a;b'; /* ; */ y;";
        let m = map(text);

        assert_eq!(m.spans().len(), 2);
        assert_eq!(m.spans()[0].kind, SkipKind::StringLiteral);
        assert_eq!((m.spans()[0].start, m.spans()[0].end), (4, 9));
        assert_eq!(m.spans()[1].kind, SkipKind::BlockComment);
        assert_eq!(m.terminators(), &[9, 20]);
    }

    #[test]
    fn test_doubled_quote_stays_in_literal() {
        let text = "put 'it''s;'; x;";
        let m = map(text);

        assert_eq!(m.spans().len(), 1);
        assert_eq!((m.spans()[0].start, m.spans()[0].end), (4, 12));
        assert_eq!(m.terminators(), &[12, 15]);
    }

    #[test]
    fn test_star_comment_only_at_statement_start() {
        let text = "* note; y = a * b;";
        let m = map(text);

        assert_eq!(m.spans().len(), 1);
        assert_eq!(m.spans()[0].kind, SkipKind::StatementComment);
        assert_eq!((m.spans()[0].start, m.spans()[0].end), (0, 6));
        assert_eq!(m.terminators(), &[6, 17]);
    }

    #[test]
    fn test_macro_comment_follows_preference() {
        let text = "%* note; x;";
        assert_eq!(map(text).spans().len(), 1);

        let preferences = LexicalPreferences {
            recognize_macro_comments: false,
            ..LexicalPreferences::default()
        };
        let m = LexicalMap::build(text, &preferences);
        assert!(m.spans().is_empty());
        assert_eq!(m.terminators(), &[7, 10]);
    }

    #[test]
    fn test_star_comment_after_block_comment_and_whitespace() {
        let text = "x;\n  /* c */ * skip;";
        let m = map(text);

        assert_eq!(m.spans().len(), 2);
        assert_eq!(m.spans()[1].kind, SkipKind::StatementComment);
    }

    #[test]
    fn test_unterminated_spans_run_to_end() {
        let m = map("x; /* open");
        assert_eq!(m.spans()[0].end, 10);
        assert!(!m.spans()[0].terminated);

        let m = map("y = 'open;");
        assert_eq!(m.spans()[0].end, 10);
        assert!(m.terminators().is_empty());
    }

    #[test]
    fn test_region_queries() {
        let text = "a = \"s\"; /* c */";
        let m = map(text);

        assert_eq!(m.region_at(0), Region::Code);
        assert_eq!(m.region_at(5), Region::String);
        assert_eq!(m.region_at(11), Region::Comment);
        assert_eq!(m.region_at(16), Region::Code);
        assert!(m.is_code(7));
    }

    #[test]
    fn test_terminator_neighbours() {
        let m = map("a; b; c;");
        assert_eq!(m.previous_terminator(4), Some(1));
        assert_eq!(m.previous_terminator(1), None);
        assert_eq!(m.next_terminator(2), Some(4));
        assert_eq!(m.next_terminator(8), None);
    }

    #[test]
    fn test_statement_start_detection() {
        let text = "x; /* c */ proc print; y = data;";
        let m = map(text);

        assert!(m.is_statement_start(text, 0));
        assert!(m.is_statement_start(text, text.find("proc").unwrap()));
        assert!(!m.is_statement_start(text, text.find("print").unwrap()));
        assert!(!m.is_statement_start(text, text.find("data").unwrap()));
    }

    #[test]
    fn test_paren_depth_resets_per_statement() {
        let text = "x = f(a, (b; y = g(c";
        let m = map(text);

        assert_eq!(m.context_at(text, 8).paren_depth, 1);
        assert_eq!(m.context_at(text, 11).paren_depth, 2);
        assert_eq!(m.context_at(text, 13).paren_depth, 0);
        assert_eq!(m.context_at(text, text.len()).paren_depth, 1);
    }

    #[test]
    fn test_paren_depth_ignores_strings() {
        let text = "x = f('(((', ";
        let m = map(text);
        assert_eq!(m.context_at(text, text.len()).paren_depth, 1);
        assert!(m.context_at(text, 7).is_string());
    }
}
