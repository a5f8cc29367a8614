//! Block boundary locator
//!
//! Finds the step or macro definition around an offset by searching
//! backward for the block keywords, classifying the match, and searching
//! forward for its closer. Every retry loop moves its anchor strictly in
//! one direction; the compile-time retry cap turns a runaway search into
//! an `ambiguous-error` block instead of a hang. Malformed headers are
//! reported as block kinds, never as panics or errors.

use super::error::{ScanError, ScanResult};
use super::statement::end_of_statement;
use crate::buffer::TextBuffer;
use crate::config::compile_time::scanning::MAX_SEARCH_RETRIES;
use crate::config::runtime::ScanPreferences;
use crate::lexical::check_offset;
use crate::logging::codes;
use crate::resolver::{forward_token, token_at};
use crate::tokens::TokenKind;
use crate::{log_debug, log_error, log_success, log_warning};
use regex::Regex;
use serde::Serialize;
use std::ops::Range;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "kebab-case")]
pub enum BlockKind {
    Proc(String),
    Data,
    /// `data =` option, not a step
    DataAssignment,
    Macro(String),
    /// `run;` or `quit;`
    ClosingRun,
    /// `%mend ...;`
    ClosingMacro,
    NotFound,
    /// `proc` or `%macro` without a name
    Error,
    AmbiguousError,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Proc(_) => "proc",
            BlockKind::Data => "data",
            BlockKind::DataAssignment => "data-assignment",
            BlockKind::Macro(_) => "macro",
            BlockKind::ClosingRun => "closing-run",
            BlockKind::ClosingMacro => "closing-macro",
            BlockKind::NotFound => "not-found",
            BlockKind::Error => "error",
            BlockKind::AmbiguousError => "ambiguous-error",
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            BlockKind::Proc(name) | BlockKind::Macro(name) => Some(name),
            _ => None,
        }
    }

    /// Kinds that start a block with a closer to look for
    pub fn is_opener(&self) -> bool {
        matches!(self, BlockKind::Proc(_) | BlockKind::Data | BlockKind::Macro(_))
    }

    pub fn is_closer(&self) -> bool {
        matches!(self, BlockKind::ClosingRun | BlockKind::ClosingMacro)
    }

    /// Classification failures the caller must fall back from
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            BlockKind::NotFound | BlockKind::Error | BlockKind::AmbiguousError
        )
    }
}

/// A located block
///
/// `header_end` is just past the opener keyword (and its name when it has
/// one). `end` is just past the closing terminator once resolved by
/// `locate_enclosing_block`, or the buffer end when no closer exists.
/// Blocks returned by `beginning_of_block` carry `end == header_end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    #[serde(flatten)]
    pub kind: BlockKind,
    pub start: usize,
    pub header_end: usize,
    pub end: usize,
}

impl Block {
    pub fn new(kind: BlockKind, start: usize, header_end: usize) -> Self {
        Self {
            kind,
            start,
            header_end,
            end: header_end,
        }
    }

    pub fn not_found() -> Self {
        Self::new(BlockKind::NotFound, 0, 0)
    }

    pub fn extent(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// `run;` or `quit;`, optionally with options on the same line such as
/// `run cancel;`. A following `=` makes it an assignment instead.
fn step_closer_pattern(closers: &str) -> String {
    format!(r"\b(?:{})\b\s*(?:[^=;\s][^;\n]*)?;", closers)
}

fn block_keywords(include_quit: bool) -> &'static Regex {
    static WITH_QUIT: OnceLock<Regex> = OnceLock::new();
    static RUN_ONLY: OnceLock<Regex> = OnceLock::new();
    let (cell, closers) = if include_quit {
        (&WITH_QUIT, "run|quit")
    } else {
        (&RUN_ONLY, "run")
    };
    cell.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)\b(?:proc|data)\b|%macro\b|{}|%mend\b[^;]*;",
            step_closer_pattern(closers)
        ))
        .expect("block keyword pattern is valid")
    })
}

fn step_closers(include_quit: bool) -> &'static Regex {
    static WITH_QUIT: OnceLock<Regex> = OnceLock::new();
    static RUN_ONLY: OnceLock<Regex> = OnceLock::new();
    let (cell, closers) = if include_quit {
        (&WITH_QUIT, "run|quit")
    } else {
        (&RUN_ONLY, "run")
    };
    cell.get_or_init(|| {
        Regex::new(&format!("(?i){}", step_closer_pattern(closers)))
            .expect("step closer pattern is valid")
    })
}

fn macro_keywords() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)%macro\b|%mend\b[^;]*;").expect("macro keyword pattern is valid")
    })
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Name written after `%mend`, if any
fn mend_name(matched: &str) -> &str {
    matched
        .get("%mend".len()..matched.len().saturating_sub(1))
        .unwrap_or("")
        .trim()
}

/// Offset past the code `;` ending a closer match; the pattern alone may
/// stop at a `;` inside a comment among the options
fn closer_end(buffer: &dyn TextBuffer, found: &Range<usize>) -> usize {
    end_of_statement(buffer, found.start).unwrap_or(found.end)
}

pub struct BlockLocator {
    preferences: ScanPreferences,
}

impl Default for BlockLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockLocator {
    pub fn new() -> Self {
        Self::with_preferences(ScanPreferences::default())
    }

    pub fn with_preferences(preferences: ScanPreferences) -> Self {
        Self { preferences }
    }

    /// Nearest block keyword at or before the statement containing `offset`
    pub fn beginning_of_block(&self, buffer: &dyn TextBuffer, offset: usize) -> ScanResult<Block> {
        let offset = check_offset(buffer, offset)?;
        let anchor = end_of_statement(buffer, offset)?;
        Ok(self.search_block_backward(buffer, anchor))
    }

    /// Offset just past the closer of `block`
    ///
    /// Steps close at `run;` (or `quit;`), macros at the `%mend` that
    /// balances nested definitions. Without a closer the block runs to the
    /// buffer end. Kinds that are not openers end where they start.
    pub fn end_of_block(&self, buffer: &dyn TextBuffer, block: &Block) -> ScanResult<usize> {
        match &block.kind {
            BlockKind::Proc(_) | BlockKind::Data => self.find_step_end(buffer, block.header_end),
            BlockKind::Macro(name) => self.find_macro_end(buffer, block.header_end, name),
            _ => Ok(block.header_end),
        }
    }

    /// The block enclosing `offset`, with its end resolved
    ///
    /// `data =` options are skipped. A closer resolves to the block it
    /// closes.
    pub fn locate_enclosing_block(
        &self,
        buffer: &dyn TextBuffer,
        offset: usize,
    ) -> ScanResult<Block> {
        let mut block = self.beginning_of_block(buffer, offset)?;
        let mut retries = 0usize;

        loop {
            block = match block.kind {
                BlockKind::DataAssignment => self.search_block_backward(buffer, block.start),
                BlockKind::ClosingRun => self.opener_of_step(buffer, block.start),
                BlockKind::ClosingMacro => self.opener_of_macro(buffer, block.start),
                _ => break,
            };

            retries += 1;
            if retries >= MAX_SEARCH_RETRIES {
                log_error!(
                    codes::scanning::SEARCH_RETRY_LIMIT,
                    "Block search retry limit reached",
                    "offset" => offset
                );
                block = Block::new(BlockKind::AmbiguousError, block.start, block.start);
                break;
            }
        }

        if block.kind.is_opener() {
            block.end = self.end_of_block(buffer, &block)?;
        }

        log_success!(
            codes::success::BLOCK_LOCATED,
            "Block located",
            "kind" => block.kind.as_str(),
            "start" => block.start,
            "end" => block.end
        );
        Ok(block)
    }

    /// `(start, end)` of `block` with the closer searched afresh
    pub fn block_extent(&self, buffer: &dyn TextBuffer, block: &Block) -> ScanResult<(usize, usize)> {
        let end = self.end_of_block(buffer, block)?;
        Ok((block.start, end.max(block.start)))
    }

    /// First step or macro opener starting after `offset`, end resolved
    pub fn next_block(&self, buffer: &dyn TextBuffer, offset: usize) -> ScanResult<Option<Block>> {
        let offset = check_offset(buffer, offset)?;
        let text = buffer.text();
        let mut anchor = text[offset..]
            .chars()
            .next()
            .map_or(offset, |c| offset + c.len_utf8());
        let pattern = block_keywords(self.preferences.quit_closes_steps);

        for _ in 0..MAX_SEARCH_RETRIES {
            let found = match self.search_accepted(buffer, pattern, anchor, SearchDirection::Forward) {
                Ok(Some(found)) => found,
                Ok(None) => return Ok(None),
                Err(limit) => {
                    return Err(ScanError::RetryLimit {
                        offset: limit,
                        limit: MAX_SEARCH_RETRIES,
                    })
                }
            };
            anchor = found.end;
            if let Some(block) = self.navigable(buffer, found)? {
                return Ok(Some(block));
            }
        }
        Err(ScanError::RetryLimit {
            offset,
            limit: MAX_SEARCH_RETRIES,
        })
    }

    /// Last step or macro opener starting before `offset`, end resolved
    pub fn previous_block(
        &self,
        buffer: &dyn TextBuffer,
        offset: usize,
    ) -> ScanResult<Option<Block>> {
        let offset = check_offset(buffer, offset)?;
        let mut anchor = offset;
        let pattern = block_keywords(self.preferences.quit_closes_steps);

        for _ in 0..MAX_SEARCH_RETRIES {
            let found = match self.search_accepted(buffer, pattern, anchor, SearchDirection::Backward) {
                Ok(Some(found)) => found,
                Ok(None) => return Ok(None),
                Err(limit) => {
                    return Err(ScanError::RetryLimit {
                        offset: limit,
                        limit: MAX_SEARCH_RETRIES,
                    })
                }
            };
            anchor = found.start;
            if found.start >= offset {
                continue;
            }
            if let Some(block) = self.navigable(buffer, found)? {
                return Ok(Some(block));
            }
        }
        Err(ScanError::RetryLimit {
            offset,
            limit: MAX_SEARCH_RETRIES,
        })
    }

    /// Openers (including headers without a name) are places to stop;
    /// closers and `data =` options are not
    fn navigable(&self, buffer: &dyn TextBuffer, found: Range<usize>) -> ScanResult<Option<Block>> {
        let mut block = self.classify_match(buffer, found);
        if block.kind.is_opener() {
            block.end = self.end_of_block(buffer, &block)?;
            return Ok(Some(block));
        }
        Ok((block.kind == BlockKind::Error).then_some(block))
    }

    /// Last accepted keyword match ending at or before `anchor`, classified
    fn search_block_backward(&self, buffer: &dyn TextBuffer, anchor: usize) -> Block {
        let pattern = block_keywords(self.preferences.quit_closes_steps);
        match self.search_accepted(buffer, pattern, anchor, SearchDirection::Backward) {
            Ok(Some(found)) => self.classify_match(buffer, found),
            Ok(None) => Block::not_found(),
            Err(limit_offset) => {
                log_error!(
                    codes::scanning::AMBIGUOUS_BLOCK,
                    "Too many rejected block keywords",
                    "offset" => limit_offset
                );
                Block::new(BlockKind::AmbiguousError, limit_offset, limit_offset)
            }
        }
    }

    /// Run a search, skipping matches in comments, strings or (when
    /// anchoring is on) away from a statement start. `Err` carries the
    /// anchor at which the retry cap was hit.
    fn search_accepted(
        &self,
        buffer: &dyn TextBuffer,
        pattern: &Regex,
        anchor: usize,
        direction: SearchDirection,
    ) -> Result<Option<Range<usize>>, usize> {
        let map = buffer.lexical_map();
        let text = buffer.text();
        let mut anchor = anchor;

        for _ in 0..MAX_SEARCH_RETRIES {
            let found = match direction {
                SearchDirection::Backward => buffer.search_backward(pattern, anchor),
                SearchDirection::Forward => buffer.search_forward(pattern, anchor),
            };
            let Some(found) = found else {
                return Ok(None);
            };

            let rejected = if !map.is_code(found.start) {
                Some("inside comment or string")
            } else if self.preferences.anchor_keywords_at_statement_start
                && !map.is_statement_start(text, found.start)
            {
                Some("not at statement start")
            } else {
                None
            };

            match rejected {
                None => return Ok(Some(found)),
                Some(reason) => {
                    if self.preferences.log_rejected_matches {
                        log_debug!(
                            "Rejected block keyword",
                            "match" => &text[found.clone()],
                            "offset" => found.start,
                            "reason" => reason
                        );
                    }
                    anchor = match direction {
                        SearchDirection::Backward => found.start,
                        SearchDirection::Forward => found.end,
                    };
                }
            }
        }

        Err(anchor)
    }

    fn classify_match(&self, buffer: &dyn TextBuffer, found: Range<usize>) -> Block {
        let matched = &buffer.text()[found.clone()];

        if starts_with_ignore_case(matched, "%mend") {
            return Block::new(BlockKind::ClosingMacro, found.start, found.end);
        }
        if starts_with_ignore_case(matched, "data") {
            return match token_at(buffer, found.start) {
                Some(token) if token.kind == TokenKind::AssignmentTarget => {
                    Block::new(BlockKind::DataAssignment, found.start, token.end)
                }
                _ => Block::new(BlockKind::Data, found.start, found.end),
            };
        }
        if starts_with_ignore_case(matched, "proc") || starts_with_ignore_case(matched, "%macro") {
            let is_macro = matched.starts_with('%');
            return match forward_token(buffer, found.end) {
                Some((name, end)) if name.is_name() => {
                    let kind = if is_macro {
                        BlockKind::Macro(name.lexeme)
                    } else {
                        BlockKind::Proc(name.lexeme)
                    };
                    Block::new(kind, found.start, end)
                }
                _ => {
                    log_error!(
                        codes::scanning::MALFORMED_BLOCK_HEADER,
                        "Block header has no name",
                        "keyword" => matched,
                        "offset" => found.start
                    );
                    Block::new(BlockKind::Error, found.start, found.end)
                }
            };
        }
        // run; or quit;
        let end = closer_end(buffer, &found);
        Block::new(BlockKind::ClosingRun, found.start, end)
    }

    /// Opener of the step closed by the `run;` at `closer_start`
    fn opener_of_step(&self, buffer: &dyn TextBuffer, closer_start: usize) -> Block {
        let mut anchor = closer_start;
        for _ in 0..MAX_SEARCH_RETRIES {
            let block = self.search_block_backward(buffer, anchor);
            match block.kind {
                BlockKind::DataAssignment | BlockKind::ClosingRun => anchor = block.start,
                BlockKind::NotFound | BlockKind::ClosingMacro => {
                    log_warning!(
                        code = codes::scanning::AMBIGUOUS_BLOCK,
                        "Step closer without an opener",
                        "offset" => closer_start
                    );
                    return Block::new(BlockKind::AmbiguousError, closer_start, closer_start);
                }
                _ => return block,
            }
        }
        Block::new(BlockKind::AmbiguousError, closer_start, closer_start)
    }

    /// `%macro` balancing the `%mend` at `mend_start`
    fn opener_of_macro(&self, buffer: &dyn TextBuffer, mend_start: usize) -> Block {
        let text = buffer.text();
        let mut depth = 1usize;
        let mut anchor = mend_start;

        loop {
            match self.search_accepted(buffer, macro_keywords(), anchor, SearchDirection::Backward) {
                Ok(Some(found)) => {
                    if starts_with_ignore_case(&text[found.clone()], "%mend") {
                        depth += 1;
                    } else {
                        depth -= 1;
                        if depth == 0 {
                            return self.classify_match(buffer, found);
                        }
                    }
                    anchor = found.start;
                }
                Ok(None) | Err(_) => {
                    log_warning!(
                        code = codes::scanning::AMBIGUOUS_BLOCK,
                        "%mend without a matching %macro",
                        "offset" => mend_start
                    );
                    return Block::new(BlockKind::AmbiguousError, mend_start, mend_start);
                }
            }
        }
    }

    fn find_step_end(&self, buffer: &dyn TextBuffer, from: usize) -> ScanResult<usize> {
        let pattern = step_closers(self.preferences.quit_closes_steps);
        match self.search_accepted(buffer, pattern, from, SearchDirection::Forward) {
            Ok(Some(found)) => Ok(closer_end(buffer, &found)),
            Ok(None) => Ok(buffer.len()),
            Err(offset) => Err(ScanError::RetryLimit {
                offset,
                limit: MAX_SEARCH_RETRIES,
            }),
        }
    }

    fn find_macro_end(&self, buffer: &dyn TextBuffer, from: usize, name: &str) -> ScanResult<usize> {
        let text = buffer.text();
        let mut depth = 1usize;
        let mut anchor = from;

        loop {
            match self.search_accepted(buffer, macro_keywords(), anchor, SearchDirection::Forward) {
                Ok(Some(found)) => {
                    let matched = &text[found.clone()];
                    if starts_with_ignore_case(matched, "%mend") {
                        depth -= 1;
                        if depth == 0 {
                            let closing = mend_name(matched);
                            if !closing.is_empty() && !closing.eq_ignore_ascii_case(name) {
                                log_warning!(
                                    code = codes::scanning::MISMATCHED_MACRO_END,
                                    "%mend names a different macro",
                                    "expected" => name,
                                    "found" => closing
                                );
                            }
                            return Ok(found.end);
                        }
                    } else {
                        depth += 1;
                    }
                    anchor = found.end;
                }
                Ok(None) => return Ok(buffer.len()),
                Err(offset) => {
                    return Err(ScanError::RetryLimit {
                        offset,
                        limit: MAX_SEARCH_RETRIES,
                    })
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchDirection {
    Forward,
    Backward,
}
