//! Buffer abstraction consumed by every scanner
//!
//! The engine never owns documents. It reads through `TextBuffer`, which
//! gives random access to characters, anchored regex search in both
//! directions, and the comment/string context of an offset. All offsets
//! are byte offsets.

pub mod loader;
pub mod source;

use crate::lexical::{LexicalMap, SyntaxContext};
use crate::utils::SourceMap;
use regex::Regex;
use std::ops::Range;

pub use loader::{check_limits, load_file, BufferError};
pub use source::SourceBuffer;

/// Display width of a tab stop when measuring indentation
pub const TAB_WIDTH: usize = 8;

pub trait TextBuffer {
    fn text(&self) -> &str;

    /// Comment/string span index for the current text
    fn lexical_map(&self) -> &LexicalMap;

    fn source_map(&self) -> &SourceMap;

    fn len(&self) -> usize {
        self.text().len()
    }

    fn is_empty(&self) -> bool {
        self.text().is_empty()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.text().get(offset..)?.chars().next()
    }

    fn char_before(&self, offset: usize) -> Option<char> {
        self.text().get(..offset)?.chars().next_back()
    }

    /// First match starting at or after `anchor`
    fn search_forward(&self, pattern: &Regex, anchor: usize) -> Option<Range<usize>> {
        let text = self.text();
        if anchor > text.len() {
            return None;
        }
        pattern
            .find_at(text, floor_char_boundary(text, anchor))
            .map(|m| m.range())
    }

    /// Last match ending at or before `anchor`
    ///
    /// Searches windows of doubling size behind the anchor so a hit near
    /// the anchor does not cost a scan from the buffer start.
    fn search_backward(&self, pattern: &Regex, anchor: usize) -> Option<Range<usize>> {
        let text = self.text();
        let anchor = floor_char_boundary(text, anchor.min(text.len()));
        let mut window = 4096usize;

        loop {
            let window_start = floor_char_boundary(text, anchor.saturating_sub(window));
            let mut last = None;
            let mut pos = window_start;

            while let Some(m) = pattern.find_at(text, pos) {
                if m.end() > anchor {
                    break;
                }
                last = Some(m.range());
                pos = if m.end() > m.start() {
                    m.end()
                } else {
                    match text[m.end()..].chars().next() {
                        Some(ch) => m.end() + ch.len_utf8(),
                        None => break,
                    }
                };
            }

            if last.is_some() || window_start == 0 {
                return last;
            }
            window = window.saturating_mul(2);
        }
    }

    fn context_at(&self, offset: usize) -> SyntaxContext {
        self.lexical_map().context_at(self.text(), offset)
    }

    fn line_start(&self, offset: usize) -> usize {
        let map = self.source_map();
        map.line_start(map.line_index(offset)).unwrap_or(0)
    }

    /// End of the line containing `offset`, excluding the newline
    fn line_end(&self, offset: usize) -> usize {
        let map = self.source_map();
        map.line_end(map.line_index(offset)).unwrap_or_else(|| self.len())
    }

    /// Display column of `offset` with tabs expanded
    fn column_of(&self, offset: usize) -> usize {
        let text = self.text();
        let offset = floor_char_boundary(text, offset.min(text.len()));
        let start = self.line_start(offset);
        display_width(&text[start..offset])
    }

    /// Offset of the first non-blank character on the line of `offset`
    fn first_non_blank(&self, offset: usize) -> usize {
        let text = self.text();
        let start = self.line_start(offset);
        let end = self.line_end(offset);
        text[start..end]
            .bytes()
            .position(|b| b != b' ' && b != b'\t')
            .map(|p| start + p)
            .unwrap_or(end)
    }

    /// Width of the leading whitespace of the line containing `offset`
    fn current_indentation(&self, offset: usize) -> usize {
        let first = self.first_non_blank(offset);
        self.column_of(first)
    }
}

/// Largest char boundary not after `offset`
pub fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Columns occupied by `segment` starting at column 0
pub fn display_width(segment: &str) -> usize {
    segment.chars().fold(0, |column, ch| match ch {
        '\t' => column + TAB_WIDTH - column % TAB_WIDTH,
        _ => column + 1,
    })
}
