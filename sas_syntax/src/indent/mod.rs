//! Indentation engine
//!
//! A line's column is computed from an anchor found by the backward
//! parser: the opener a closer pairs with, the opener enclosing a
//! statement list, the bracket around an argument list, or the start of
//! the statement a continuation line belongs to. The anchor's own line is
//! indented recursively, so results never depend on how the buffer is
//! currently indented, only lines inside multi-line comments and strings
//! keep their existing indentation.

pub mod error;
pub mod parser;
pub mod rules;

use std::collections::HashMap;
use std::ops::Range;

use serde::Serialize;

use crate::buffer::TextBuffer;
use crate::config::compile_time::indentation::{MAX_INDENT_RECURSION, MAX_SEXP_STEPS};
use crate::config::runtime::IndentPreferences;
use crate::grammar::{sas_grammar, Category, PrecedenceGrammar};
use crate::lexical::{check_offset, classify, Direction};
use crate::log_debug;
use crate::resolver::{backward_token, forward_token, token_at};
use crate::scanning::beginning_of_statement;
use crate::tokens::Token;

pub use error::{IndentError, IndentResult};
pub use parser::{SexpParser, SexpStop};
pub use rules::{Action, IndentRule, Matcher, Transition};

/// Computed indentation for one line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineIndent {
    /// 1-based line number
    pub line: usize,
    /// Offset of the line start
    pub offset: usize,
    pub current: usize,
    pub target: usize,
}

impl LineIndent {
    pub fn needs_change(&self) -> bool {
        self.current != self.target
    }
}

#[derive(Debug, Clone, Default)]
pub struct Indenter {
    preferences: IndentPreferences,
}

impl Indenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: IndentPreferences) -> Self {
        Self { preferences }
    }

    pub fn preferences(&self) -> &IndentPreferences {
        &self.preferences
    }

    /// Target column for the line containing `offset`
    pub fn indent_for(&self, buffer: &dyn TextBuffer, offset: usize) -> IndentResult<usize> {
        let offset = check_offset(buffer, offset)?;
        let mut context = IndentContext::new(&self.preferences, sas_grammar()?, buffer);
        context.line_indent(buffer.line_start(offset), 0)
    }

    /// Target columns for every non-blank line overlapping `start..end`
    pub fn reindent_region(
        &self,
        buffer: &dyn TextBuffer,
        start: usize,
        end: usize,
    ) -> IndentResult<Vec<LineIndent>> {
        let start = check_offset(buffer, start)?;
        let end = check_offset(buffer, end)?.max(start);
        let mut context = IndentContext::new(&self.preferences, sas_grammar()?, buffer);

        let mut lines = Vec::new();
        let mut line_start = buffer.line_start(start);
        loop {
            let line_end = buffer.line_end(line_start);
            if buffer.first_non_blank(line_start) < line_end {
                let target = context.line_indent(line_start, 0)?;
                lines.push(LineIndent {
                    line: buffer.source_map().line_index(line_start) + 1,
                    offset: line_start,
                    current: buffer.current_indentation(line_start),
                    target,
                });
            }
            if line_end >= end || line_end >= buffer.len() {
                break;
            }
            line_start = line_end + 1;
        }
        Ok(lines)
    }
}

pub fn indent_for(buffer: &dyn TextBuffer, offset: usize) -> IndentResult<usize> {
    Indenter::new().indent_for(buffer, offset)
}

pub fn reindent_region(
    buffer: &dyn TextBuffer,
    start: usize,
    end: usize,
) -> IndentResult<Vec<LineIndent>> {
    Indenter::new().reindent_region(buffer, start, end)
}

/// Per-call state: the parser and the columns already computed, by line
struct IndentContext<'a> {
    preferences: &'a IndentPreferences,
    grammar: &'static PrecedenceGrammar,
    parser: SexpParser<'static>,
    buffer: &'a dyn TextBuffer,
    memo: HashMap<usize, usize>,
}

impl<'a> IndentContext<'a> {
    fn new(
        preferences: &'a IndentPreferences,
        grammar: &'static PrecedenceGrammar,
        buffer: &'a dyn TextBuffer,
    ) -> Self {
        Self {
            preferences,
            grammar,
            parser: SexpParser::new(grammar, MAX_SEXP_STEPS),
            buffer,
            memo: HashMap::new(),
        }
    }

    fn line_indent(&mut self, line_start: usize, depth: usize) -> IndentResult<usize> {
        let line = self.buffer.source_map().line_index(line_start);
        if let Some(&column) = self.memo.get(&line) {
            return Ok(column);
        }
        if depth > MAX_INDENT_RECURSION {
            return Err(IndentError::RecursionLimit {
                offset: line_start,
                limit: MAX_INDENT_RECURSION,
            });
        }

        let column = self.compute(line_start, depth)?;
        log_debug!("Line indentation computed", "line" => line + 1, "column" => column);
        self.memo.insert(line, column);
        Ok(column)
    }

    fn compute(&mut self, line_start: usize, depth: usize) -> IndentResult<usize> {
        let buffer = self.buffer;
        let first = buffer.first_non_blank(line_start);

        if let Some(span) = buffer.lexical_map().span_at(first) {
            if span.start < line_start {
                return Ok(buffer.current_indentation(line_start));
            }
        }

        let Some((previous, _)) = backward_token(buffer, first) else {
            return Ok(0);
        };

        if let Some(token) = self.first_code_token(first) {
            if let Some(column) = self.before(&token, line_start, depth)? {
                return Ok(column);
            }
        }
        self.after(&previous, depth)
    }

    /// The line's leading token, unless the line opens with a comment
    fn first_code_token(&self, first: usize) -> Option<Token> {
        let raw = classify(self.buffer, first, Direction::Forward).ok()??;
        if raw.is_comment() {
            return None;
        }
        token_at(self.buffer, first)
    }

    /// Rules keyed on the line's own first token
    fn before(
        &mut self,
        token: &Token,
        line_start: usize,
        depth: usize,
    ) -> IndentResult<Option<usize>> {
        let name = token.grammar_name();
        let category = self.grammar.category(&name);

        if matches!(category, Category::Closer | Category::BinaryOperator) {
            let stop = self
                .parser
                .backward_sexp(self.buffer, token.start, Some(&name))?;
            if let SexpStop::Opener { pos, .. } = stop {
                let action = rules::find(Transition::Before, &name, category)
                    .unwrap_or(Action::Inherit);
                return self.apply(action, pos..pos, depth).map(Some);
            }
        }

        match category {
            Category::Separator if name == "," => match self.enclosing_paren(token.start)? {
                Some(paren) => {
                    let action = rules::find(Transition::Before, &name, category)
                        .unwrap_or(Action::AlignAnchor);
                    self.apply(action, paren, depth).map(Some)
                }
                None => Ok(None),
            },
            Category::Separator | Category::BinaryOperator => {
                let start = beginning_of_statement(self.buffer, token.start)?;
                if start >= line_start {
                    return Ok(None);
                }
                let action = rules::find(Transition::Before, &name, category)
                    .unwrap_or(Action::Continuation);
                self.apply(action, start..start, depth).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Rules keyed on the token that ends the previous line
    fn after(&mut self, previous: &Token, depth: usize) -> IndentResult<usize> {
        let name = previous.grammar_name();
        let category = self.grammar.category(&name);

        match name.as_str() {
            ";" => self.statement_list(previous.start, depth),
            "," => match self.enclosing_paren(previous.start)? {
                Some(paren) => {
                    let action = rules::find(Transition::Element, &name, category)
                        .unwrap_or(Action::AlignNext);
                    self.apply(action, paren, depth)
                }
                None => self.continuation(previous.start, depth),
            },
            _ => match rules::find(Transition::After, &name, category) {
                Some(Action::Continuation) | None => self.continuation(previous.start, depth),
                Some(action) => self.apply(action, previous.start..previous.end, depth),
            },
        }
    }

    /// A new statement: indent relative to the enclosing opener
    fn statement_list(&mut self, separator: usize, depth: usize) -> IndentResult<usize> {
        let mut from = separator;
        for _ in 0..MAX_SEXP_STEPS {
            match self.parser.backward_sexp(self.buffer, from, Some(";"))? {
                SexpStop::Parent { pos, token, .. } if token == ";" => {
                    if let Some(column) = self.known_sibling(pos) {
                        return Ok(column);
                    }
                    from = pos;
                }
                SexpStop::Parent { pos, token, .. } => {
                    let category = self.grammar.category(&token);
                    let action = rules::find(Transition::After, &token, category)
                        .unwrap_or(Action::Basic(1));
                    let end = pos + token.len();
                    return self.apply(action, pos..end, depth);
                }
                SexpStop::Opener { pos, .. } | SexpStop::Skipped { pos } => from = pos,
                SexpStop::Boundary => return Ok(0),
            }
        }
        Err(IndentError::SexpStepLimit {
            offset: separator,
            limit: MAX_SEXP_STEPS,
        })
    }

    /// Column already computed for the statement after `separator`, when
    /// that statement starts its own line
    fn known_sibling(&self, separator: usize) -> Option<usize> {
        let (next, _) = forward_token(self.buffer, separator + 1)?;
        if self.buffer.first_non_blank(next.start) != next.start {
            return None;
        }
        let line = self.buffer.source_map().line_index(next.start);
        self.memo.get(&line).copied()
    }

    fn enclosing_paren(&self, separator: usize) -> IndentResult<Option<Range<usize>>> {
        let mut from = separator;
        for _ in 0..MAX_SEXP_STEPS {
            match self.parser.backward_sexp(self.buffer, from, Some(","))? {
                SexpStop::Parent { pos, token, .. } if token == "," => from = pos,
                SexpStop::Parent { pos, token, .. } if token == "(" => {
                    return Ok(Some(pos..pos + 1))
                }
                _ => return Ok(None),
            }
        }
        Err(IndentError::SexpStepLimit {
            offset: separator,
            limit: MAX_SEXP_STEPS,
        })
    }

    fn continuation(&mut self, inside: usize, depth: usize) -> IndentResult<usize> {
        let start = beginning_of_statement(self.buffer, inside)?;
        self.apply(Action::Continuation, start..start, depth)
    }

    fn apply(&mut self, action: Action, anchor: Range<usize>, depth: usize) -> IndentResult<usize> {
        let unit = self.preferences.basic_offset;
        match action {
            Action::Basic(units) => Ok(self.virtual_indent(anchor.start, depth)? + units * unit),
            Action::Continuation => Ok(self.virtual_indent(anchor.start, depth)?
                + self.preferences.continuation_units * unit),
            Action::Inherit => self.virtual_indent(anchor.start, depth),
            Action::AlignAnchor => self.column_at(anchor.start, depth),
            Action::AlignNext => {
                let anchor_line = self.buffer.line_start(anchor.start);
                match forward_token(self.buffer, anchor.end) {
                    Some((next, _)) if self.buffer.line_start(next.start) == anchor_line => {
                        self.column_at(next.start, depth)
                    }
                    _ => Ok(self.virtual_indent(anchor.start, depth)? + unit),
                }
            }
        }
    }

    /// Indentation of the line holding `pos`; a token that does not start
    /// its line is placed by the line it hangs from
    fn virtual_indent(&mut self, pos: usize, depth: usize) -> IndentResult<usize> {
        let line_start = self.buffer.line_start(pos);
        self.line_indent(line_start, depth + 1)
    }

    /// Column `pos` will have once its line is reindented
    fn column_at(&mut self, pos: usize, depth: usize) -> IndentResult<usize> {
        let indent = self.virtual_indent(pos, depth)?;
        let offset_in_line = self
            .buffer
            .column_of(pos)
            .saturating_sub(self.buffer.current_indentation(pos));
        Ok(indent + offset_in_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SourceBuffer;
    use assert_matches::assert_matches;

    /// Target column of every line, blank lines included
    fn targets(text: &str) -> Vec<usize> {
        let buffer = SourceBuffer::new(text);
        let mut offset = 0;
        let mut columns = Vec::new();
        for line in text.split('\n') {
            columns.push(indent_for(&buffer, offset).unwrap());
            offset += line.len() + 1;
        }
        columns
    }

    #[test]
    fn test_step_bodies_get_one_unit() {
        let text = "data a;\nset b;\nx = 1;\nrun;\nproc print;\nvar x;\nrun;";
        assert_eq!(targets(text), vec![0, 4, 4, 0, 0, 4, 0]);
    }

    #[test]
    fn test_nested_do_blocks_indent_by_depth() {
        let text = "data a;\ndo i = 1 to 3;\ndo j = 1 to 3;\ndo k = 1 to 3;\nx = i * j * k;\nend;\nend;\nend;\nrun;";
        assert_eq!(targets(text), vec![0, 4, 8, 12, 16, 12, 8, 4, 0]);
    }

    #[test]
    fn test_macro_body_and_mend() {
        let text = "%macro m(a);\n%let x = &a;\n%put &x;\n%mend m;";
        assert_eq!(targets(text), vec![0, 4, 4, 0]);
    }

    #[test]
    fn test_if_then_else_bodies() {
        let text = "data a;\nif x then\ny = 1;\nelse\ny = 2;\nrun;";
        assert_eq!(targets(text), vec![0, 4, 8, 4, 8, 0]);
    }

    #[test]
    fn test_then_on_its_own_line() {
        let text = "if x > 1\nthen y = 2;";
        assert_eq!(targets(text), vec![0, 4]);
    }

    #[test]
    fn test_hanging_do_uses_its_line() {
        let text = "data a;\nif x then do;\ny = 1;\nend;\nrun;";
        assert_eq!(targets(text), vec![0, 4, 8, 4, 0]);
    }

    #[test]
    fn test_continuation_lines() {
        let text = "data a;\nx = a +\nb;\ny = 2;\nrun;";
        assert_eq!(targets(text), vec![0, 4, 8, 4, 0]);

        let leading = "x = a\n+ b;";
        assert_eq!(targets(leading), vec![0, 4]);
    }

    #[test]
    fn test_dataequal_adds_nothing() {
        let text = "proc print data =\nwork.a;\nrun;";
        assert_eq!(targets(text), vec![0, 0, 0]);
    }

    #[test]
    fn test_sql_select_clause_does_not_open_a_group() {
        let text = "proc sql;\ncreate table a as\nselect x\nfrom b;\nquit;\ndata c;\nx = 1;\nrun;";
        assert_eq!(targets(text), vec![0, 4, 8, 8, 0, 0, 4, 0]);

        let group = "data a;\nselect (x);\nwhen (1) y = 2;\nend;\nrun;";
        assert_eq!(targets(group), vec![0, 4, 8, 4, 0]);
    }

    #[test]
    fn test_argument_lists() {
        let aligned = "x = f(a,\nb);";
        assert_eq!(targets(aligned), vec![0, 6]);

        let hanging = "x = f(\na,\nb\n);";
        assert_eq!(targets(hanging), vec![0, 4, 4, 0]);
    }

    #[test]
    fn test_comments_do_not_disturb_statements() {
        let text = "data a;\n/* note */\nx = 1;\nrun;";
        assert_eq!(targets(text), vec![0, 4, 4, 0]);
    }

    #[test]
    fn test_block_comment_interior_is_kept() {
        let text = "/* first\n      second */\nx;";
        assert_eq!(targets(text), vec![0, 6, 0]);
    }

    #[test]
    fn test_current_indentation_is_ignored() {
        let flat = "data a;\ndo;\nx = 1;\nend;\nrun;";
        let messy = "   data a;\n do;\n          x = 1;\n  end;\n        run;";
        assert_eq!(targets(flat), targets(messy));
    }

    #[test]
    fn test_custom_unit() {
        let indenter = Indenter::with_preferences(IndentPreferences {
            basic_offset: 2,
            continuation_units: 2,
        });
        let buffer = SourceBuffer::new("data a;\nx = 1 +\n2;\nrun;");
        assert_eq!(indenter.indent_for(&buffer, 8).unwrap(), 2);
        assert_eq!(indenter.indent_for(&buffer, 16).unwrap(), 6);
    }

    #[test]
    fn test_reindent_region_reports_changes() {
        let text = "data a;\n\nx = 1;\n    run;";
        let buffer = SourceBuffer::new(text);
        let lines = reindent_region(&buffer, 0, text.len()).unwrap();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].line, 3);
        assert_eq!((lines[1].current, lines[1].target), (0, 4));
        assert!(lines[1].needs_change());
        assert_eq!((lines[2].current, lines[2].target), (4, 0));
        assert!(!lines[0].needs_change());
    }

    #[test]
    fn test_out_of_range() {
        let buffer = SourceBuffer::new("x;");
        assert_matches!(indent_for(&buffer, 5), Err(IndentError::Lex(_)));
    }
}
