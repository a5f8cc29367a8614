//! In-memory buffer over a borrowed string

use super::TextBuffer;
use crate::config::runtime::LexicalPreferences;
use crate::lexical::LexicalMap;
use crate::utils::SourceMap;
use std::cell::OnceCell;

/// Read-only view of one document version
///
/// The line index is built eagerly; the comment/string map is built on
/// first use. An edited document needs a new `SourceBuffer`.
pub struct SourceBuffer<'a> {
    text: &'a str,
    preferences: LexicalPreferences,
    source_map: SourceMap,
    lexical_map: OnceCell<LexicalMap>,
}

impl<'a> SourceBuffer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::with_preferences(text, LexicalPreferences::default())
    }

    pub fn with_preferences(text: &'a str, preferences: LexicalPreferences) -> Self {
        Self {
            text,
            preferences,
            source_map: SourceMap::new(text),
            lexical_map: OnceCell::new(),
        }
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    pub fn line_count(&self) -> usize {
        self.source_map.line_count()
    }
}

impl TextBuffer for SourceBuffer<'_> {
    fn text(&self) -> &str {
        self.text
    }

    fn lexical_map(&self) -> &LexicalMap {
        self.lexical_map
            .get_or_init(|| LexicalMap::build(self.text, &self.preferences))
    }

    fn source_map(&self) -> &SourceMap {
        &self.source_map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::Region;

    #[test]
    fn test_lexical_map_is_built_lazily_and_reused() {
        let buffer = SourceBuffer::new("x = 'a;b'; /* c */");
        let first = buffer.lexical_map() as *const LexicalMap;
        let second = buffer.lexical_map() as *const LexicalMap;
        assert_eq!(first, second);
        assert_eq!(buffer.context_at(6).region, Region::String);
        assert_eq!(buffer.context_at(13).region, Region::Comment);
    }

    #[test]
    fn test_preferences_change_string_recognition() {
        let preferences = LexicalPreferences {
            double_quoted_strings: false,
            ..LexicalPreferences::default()
        };
        let buffer = SourceBuffer::with_preferences("x = \"a;b\";", preferences);
        assert_eq!(buffer.context_at(6).region, Region::Code);
        assert_eq!(buffer.line_count(), 1);
    }
}
