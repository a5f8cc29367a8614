//! Backward operator precedence parser
//!
//! Scans logical tokens right to left keeping a stack of pending left
//! levels. Atoms are skipped, closers push their level, and an opener or
//! operator whose right level is too low to be inside the pending
//! construct stops the scan.

use super::error::{IndentError, IndentResult};
use crate::buffer::TextBuffer;
use crate::grammar::PrecedenceGrammar;
use crate::resolver::backward_token;

/// Where a backward scan stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SexpStop {
    /// Passed one atom with nothing pending; `pos` is its start
    Skipped { pos: usize },
    /// Closed the pending construct at an opener starting at `pos`
    Opener { pos: usize, token: String },
    /// Could not pass `token` at `pos`; `level` is its left level,
    /// `None` when it is an opener
    Parent {
        pos: usize,
        token: String,
        level: Option<u32>,
    },
    /// Reached the start of the buffer
    Boundary,
}

pub struct SexpParser<'g> {
    grammar: &'g PrecedenceGrammar,
    max_steps: usize,
}

impl<'g> SexpParser<'g> {
    pub fn new(grammar: &'g PrecedenceGrammar, max_steps: usize) -> Self {
        Self { grammar, max_steps }
    }

    /// Scan backward from `from`
    ///
    /// With `pending`, parse as if that token had just been passed, so the
    /// scan runs until the construct it belongs to is closed or left.
    pub fn backward_sexp(
        &self,
        buffer: &dyn TextBuffer,
        from: usize,
        pending: Option<&str>,
    ) -> IndentResult<SexpStop> {
        let mut levels: Vec<u32> = pending
            .and_then(|name| self.grammar.levels(name))
            .and_then(|levels| levels.left)
            .into_iter()
            .collect();
        let mut pos = from;

        for _ in 0..self.max_steps {
            let Some((token, start)) = backward_token(buffer, pos) else {
                return Ok(SexpStop::Boundary);
            };
            pos = start;
            let name = token.grammar_name();

            let Some(toklevels) = self.grammar.levels(&name) else {
                if levels.is_empty() {
                    return Ok(SexpStop::Skipped { pos });
                }
                continue;
            };

            let Some(back) = toklevels.right else {
                levels.extend(toklevels.left);
                continue;
            };

            while levels.last().is_some_and(|&top| back < top) {
                levels.pop();
            }
            if levels.is_empty() {
                return Ok(SexpStop::Parent {
                    pos,
                    token: name,
                    level: toklevels.left,
                });
            }

            if levels.last() == Some(&back) {
                levels.pop();
            }
            if !levels.is_empty() {
                levels.extend(toklevels.left);
                continue;
            }

            match toklevels.left {
                None => return Ok(SexpStop::Opener { pos, token: name }),
                Some(left) if toklevels.is_associative() => {
                    return Ok(SexpStop::Parent {
                        pos,
                        token: name,
                        level: Some(left),
                    })
                }
                Some(left) => levels.push(left),
            }
        }

        Err(IndentError::SexpStepLimit {
            offset: from,
            limit: self.max_steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SourceBuffer;
    use crate::grammar::sas_grammar;
    use assert_matches::assert_matches;

    fn scan(text: &str, from: usize, pending: Option<&str>) -> SexpStop {
        let parser = SexpParser::new(sas_grammar().unwrap(), 10_000);
        parser
            .backward_sexp(&SourceBuffer::new(text), from, pending)
            .unwrap()
    }

    #[test]
    fn test_closer_finds_its_opener() {
        let text = "data a; do; x = 1; do; end; end";
        let outer_end = text.rfind("end").unwrap();
        assert_matches!(
            scan(text, outer_end, Some("end")),
            SexpStop::Opener { pos: 8, ref token } if token == "do"
        );
    }

    #[test]
    fn test_run_matches_proc() {
        let text = "proc print data = x; var a; run";
        assert_matches!(
            scan(text, text.len() - 3, Some("run")),
            SexpStop::Opener { pos: 0, ref token } if token == "proc"
        );
    }

    #[test]
    fn test_statement_list_stops_at_sibling_then_parent() {
        let text = "data a; x = 1; y = 2;";
        let last_semi = text.len() - 1;
        let sibling = scan(text, last_semi, Some(";"));
        assert_matches!(sibling, SexpStop::Parent { pos: 13, ref token, .. } if token == ";");

        assert_matches!(
            scan(text, 13, Some(";")),
            SexpStop::Parent { pos: 6, ref token, .. } if token == ";"
        );
        assert_matches!(
            scan(text, 6, Some(";")),
            SexpStop::Parent { pos: 0, ref token, level: None } if token == "data"
        );
    }

    #[test]
    fn test_then_pairs_with_if() {
        let text = "if x > 1 then";
        assert_matches!(
            scan(text, 9, Some("then")),
            SexpStop::Opener { pos: 0, ref token } if token == "if"
        );
    }

    #[test]
    fn test_atoms_and_boundary() {
        assert_eq!(scan("a b", 3, None), SexpStop::Skipped { pos: 2 });
        assert_eq!(scan("x;", 1, Some(";")), SexpStop::Boundary);
        assert_eq!(scan("", 0, None), SexpStop::Boundary);
    }

    #[test]
    fn test_inside_parens_stops_at_open_paren() {
        let text = "f(a, b";
        assert_matches!(
            scan(text, 3, Some(",")),
            SexpStop::Parent { pos: 1, ref token, level: None } if token == "("
        );
    }
}
