//! Editing facade
//!
//! The operations an editor binds to commands: classify, locate, indent,
//! reindent, submit and navigate. `Editor` carries the scan and indent
//! preferences; the free functions use the defaults.

use serde::Serialize;
use std::ops::Range;

use crate::buffer::TextBuffer;
use crate::config::runtime::{IndentPreferences, RuntimeConfig, ScanPreferences};
use crate::indent::{Indenter, IndentResult, LineIndent};
use crate::lexical::{self, Direction, LexResult};
use crate::logging::codes;
use crate::resolver::forward_token;
use crate::scanning::{statement_at, Block, BlockLocator, ScanError, ScanResult};
use crate::tokens::Token;
use crate::{log_debug, log_error, log_success};

/// Text to hand to an interpreter for the cursor position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub start: usize,
    pub end: usize,
    /// The enclosing block, or `None` when falling back to the line
    pub block: Option<Block>,
}

impl Submission {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn is_line(&self) -> bool {
        self.block.is_none()
    }
}

pub struct Editor {
    locator: BlockLocator,
    indenter: Indenter,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::with_preferences(ScanPreferences::default(), IndentPreferences::default())
    }

    pub fn with_preferences(scanning: ScanPreferences, indentation: IndentPreferences) -> Self {
        Self {
            locator: BlockLocator::with_preferences(scanning),
            indenter: Indenter::with_preferences(indentation),
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::with_preferences(config.scanning.clone(), config.indentation.clone())
    }

    pub fn indenter(&self) -> &Indenter {
        &self.indenter
    }

    /// Token at or after `offset`
    pub fn classify(&self, buffer: &dyn TextBuffer, offset: usize) -> LexResult<Option<Token>> {
        let token = lexical::classify(buffer, offset, Direction::Forward)?;
        if let Some(token) = &token {
            log_debug!("Classified token",
                "offset" => offset,
                "kind" => token.kind.as_str(),
                "lexeme" => &token.lexeme
            );
        }
        Ok(token)
    }

    /// Every token in the buffer, comments included
    pub fn tokens(&self, buffer: &dyn TextBuffer) -> Vec<Token> {
        let tokens: Vec<Token> = lexical::tokens(buffer).collect();
        log_success!(
            codes::success::CLASSIFICATION_COMPLETE,
            "Buffer classified",
            "tokens" => tokens.len()
        );
        tokens
    }

    /// The resolver's view: comments dropped, `data =` merged
    pub fn logical_tokens(&self, buffer: &dyn TextBuffer) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut offset = 0;
        while let Some((token, next)) = forward_token(buffer, offset) {
            if next <= offset {
                break;
            }
            offset = next;
            tokens.push(token);
        }
        log_success!(
            codes::success::CLASSIFICATION_COMPLETE,
            "Buffer resolved",
            "tokens" => tokens.len()
        );
        tokens
    }

    pub fn statement(&self, buffer: &dyn TextBuffer, offset: usize) -> ScanResult<Range<usize>> {
        statement_at(buffer, offset)
    }

    pub fn locate_enclosing_block(&self, buffer: &dyn TextBuffer, offset: usize) -> ScanResult<Block> {
        self.locator
            .locate_enclosing_block(buffer, offset)
            .inspect_err(|err| {
                log_error!(err.error_code(), "Block location failed",
                    "offset" => offset,
                    "error" => err
                );
            })
    }

    pub fn block_extent(&self, buffer: &dyn TextBuffer, block: &Block) -> ScanResult<(usize, usize)> {
        self.locator.block_extent(buffer, block)
    }

    pub fn indent_for(&self, buffer: &dyn TextBuffer, offset: usize) -> IndentResult<usize> {
        match self.indenter.indent_for(buffer, offset) {
            Ok(column) => {
                log_success!(
                    codes::success::INDENTATION_COMPUTED,
                    "Indentation computed",
                    "offset" => offset,
                    "column" => column
                );
                Ok(column)
            }
            Err(err) => {
                log_error!(err.error_code(), "Indentation failed",
                    "offset" => offset,
                    "error" => &err
                );
                Err(err)
            }
        }
    }

    pub fn reindent_region(
        &self,
        buffer: &dyn TextBuffer,
        start: usize,
        end: usize,
    ) -> IndentResult<Vec<LineIndent>> {
        match self.indenter.reindent_region(buffer, start, end) {
            Ok(lines) => {
                log_success!(
                    codes::success::REGION_REINDENTED,
                    "Region reindented",
                    "lines" => lines.len(),
                    "changed" => lines.iter().filter(|line| line.needs_change()).count()
                );
                Ok(lines)
            }
            Err(err) => {
                log_error!(err.error_code(), "Region reindent failed",
                    "start" => start,
                    "end" => end,
                    "error" => &err
                );
                Err(err)
            }
        }
    }

    /// The enclosing block's extent, or the current line when the block
    /// cannot be classified
    pub fn submission(&self, buffer: &dyn TextBuffer, offset: usize) -> ScanResult<Submission> {
        let block = match self.locator.locate_enclosing_block(buffer, offset) {
            Ok(block) => Some(block),
            Err(ScanError::RetryLimit { .. }) => None,
            Err(err) => return Err(err),
        };

        match block {
            Some(block) if block.kind.is_opener() => Ok(Submission {
                start: block.start,
                end: block.end,
                block: Some(block),
            }),
            other => {
                if let Some(block) = other {
                    log_debug!("Submitting line instead of block",
                        "offset" => offset,
                        "kind" => block.kind.as_str()
                    );
                }
                let offset = lexical::check_offset(buffer, offset)?;
                Ok(Submission {
                    start: buffer.line_start(offset),
                    end: buffer.line_end(offset),
                    block: None,
                })
            }
        }
    }

    pub fn next_block(&self, buffer: &dyn TextBuffer, offset: usize) -> ScanResult<Option<Block>> {
        self.locator.next_block(buffer, offset)
    }

    pub fn previous_block(&self, buffer: &dyn TextBuffer, offset: usize) -> ScanResult<Option<Block>> {
        self.locator.previous_block(buffer, offset)
    }
}

pub fn classify(buffer: &dyn TextBuffer, offset: usize) -> LexResult<Option<Token>> {
    Editor::new().classify(buffer, offset)
}

/// The buffer text with every changed line's leading whitespace replaced
///
/// `lines` must be in buffer order, as `reindent_region` returns them.
pub fn apply_indentation(buffer: &dyn TextBuffer, lines: &[LineIndent]) -> String {
    let text = buffer.text();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    for line in lines.iter().filter(|line| line.needs_change()) {
        if line.offset < copied {
            continue;
        }
        out.push_str(&text[copied..line.offset]);
        out.push_str(&" ".repeat(line.target));
        copied = buffer.first_non_blank(line.offset);
    }
    out.push_str(&text[copied..]);
    out
}

pub fn locate_enclosing_block(buffer: &dyn TextBuffer, offset: usize) -> ScanResult<Block> {
    Editor::new().locate_enclosing_block(buffer, offset)
}

pub fn block_extent(buffer: &dyn TextBuffer, block: &Block) -> ScanResult<(usize, usize)> {
    Editor::new().block_extent(buffer, block)
}

pub fn indent_for(buffer: &dyn TextBuffer, offset: usize) -> IndentResult<usize> {
    Editor::new().indent_for(buffer, offset)
}

pub fn reindent_region(
    buffer: &dyn TextBuffer,
    start: usize,
    end: usize,
) -> IndentResult<Vec<LineIndent>> {
    Editor::new().reindent_region(buffer, start, end)
}

pub fn submission(buffer: &dyn TextBuffer, offset: usize) -> ScanResult<Submission> {
    Editor::new().submission(buffer, offset)
}

pub fn next_block(buffer: &dyn TextBuffer, offset: usize) -> ScanResult<Option<Block>> {
    Editor::new().next_block(buffer, offset)
}

pub fn previous_block(buffer: &dyn TextBuffer, offset: usize) -> ScanResult<Option<Block>> {
    Editor::new().previous_block(buffer, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SourceBuffer;
    use crate::indent::IndentError;
    use crate::lexical::LexError;
    use crate::scanning::BlockKind;
    use crate::tokens::TokenKind;
    use assert_matches::assert_matches;

    #[test]
    fn test_classify_skips_leading_whitespace() {
        let buffer = SourceBuffer::new("  x = 1;");
        let token = classify(&buffer, 0).unwrap().unwrap();
        assert_eq!(token.lexeme, "x");
        assert_eq!(token.start, 2);
        assert_eq!(token.kind, TokenKind::Identifier);
        assert!(classify(&buffer, 8).unwrap().is_none());
    }

    #[test]
    fn test_block_round_trip() {
        let buffer = SourceBuffer::new("proc print; run;");
        let block = locate_enclosing_block(&buffer, 3).unwrap();
        assert_eq!(block.kind, BlockKind::Proc("print".to_string()));
        assert_eq!(block_extent(&buffer, &block).unwrap(), (0, 16));
    }

    #[test]
    fn test_submission_sends_block() {
        let text = "data a;\n  x = 1;\nrun;\ny = 2;";
        let buffer = SourceBuffer::new(text);
        let submitted = submission(&buffer, text.find('x').unwrap()).unwrap();
        assert_eq!(submitted.range(), 0..text.find("\ny").unwrap());
        assert_matches!(submitted.block, Some(Block { kind: BlockKind::Data, .. }));
    }

    #[test]
    fn test_submission_falls_back_to_line() {
        let buffer = SourceBuffer::new("proc ; run;");
        let submitted = submission(&buffer, 0).unwrap();
        assert!(submitted.is_line());
        assert_eq!(submitted.range(), 0..11);

        let text = "x = 1;\ny = 2;";
        let buffer = SourceBuffer::new(text);
        let submitted = submission(&buffer, 8).unwrap();
        assert!(submitted.is_line());
        assert_eq!(submitted.range(), 7..text.len());
    }

    #[test]
    fn test_submission_rejects_out_of_range() {
        let buffer = SourceBuffer::new("run;");
        assert_matches!(
            submission(&buffer, 10),
            Err(ScanError::Lex(LexError::OutOfRange { offset: 10, len: 4 }))
        );
    }

    #[test]
    fn test_editor_uses_configured_width() {
        let config = RuntimeConfig::from_toml_str("[indentation]\nbasic_offset = 2\n").unwrap();
        let editor = Editor::from_config(&config);
        let text = "data a;\nx = 1;\nrun;";
        let buffer = SourceBuffer::new(text);
        assert_eq!(editor.indent_for(&buffer, text.find('x').unwrap()).unwrap(), 2);
        assert_matches!(
            editor.indent_for(&buffer, 100),
            Err(IndentError::Lex(LexError::OutOfRange { .. }))
        );
    }

    #[test]
    fn test_reindent_reports_changes() {
        let text = "proc sort data = a;\nby x;\n  run;";
        let buffer = SourceBuffer::new(text);
        let lines = reindent_region(&buffer, 0, text.len()).unwrap();
        let targets: Vec<usize> = lines.iter().map(|line| line.target).collect();
        assert_eq!(targets, vec![0, 4, 0]);
        assert_eq!(lines.iter().filter(|line| line.needs_change()).count(), 2);
    }

    #[test]
    fn test_apply_indentation_rewrites_changed_lines() {
        let text = "data a;\nx = 1;\n  run;\n";
        let buffer = SourceBuffer::new(text);
        let lines = reindent_region(&buffer, 0, text.len()).unwrap();
        assert_eq!(apply_indentation(&buffer, &lines), "data a;\n    x = 1;\nrun;\n");
    }

    #[test]
    fn test_logical_tokens_merge_data_assignment() {
        let buffer = SourceBuffer::new("proc sort data = a; /* c */ run;");
        let editor = Editor::new();
        let lexemes: Vec<TokenKind> = editor
            .logical_tokens(&buffer)
            .into_iter()
            .map(|token| token.kind)
            .collect();
        assert!(lexemes.contains(&TokenKind::AssignmentTarget));
        assert!(!lexemes.contains(&TokenKind::Comment));
        assert!(editor.tokens(&buffer).iter().any(|token| token.is_comment()));
    }

    #[test]
    fn test_navigation() {
        let text = "data a; run;\nproc print; run;";
        let buffer = SourceBuffer::new(text);
        let next = next_block(&buffer, 0).unwrap().unwrap();
        assert_eq!(next.start, 13);
        let previous = previous_block(&buffer, next.start).unwrap().unwrap();
        assert_eq!(previous.kind, BlockKind::Data);
    }
}
