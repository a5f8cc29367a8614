//! Operator precedence grammar driving indentation
//!
//! Built once from the statement rules and the precedence table. Each
//! terminal gets a left and right level; openers have no left level and
//! closers no right level, which is what lets the parser treat `proc` ..
//! `run` or `do` .. `end` like a pair of parentheses.

pub mod bnf;
pub mod error;
pub mod levels;
pub mod precedence;

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use crate::logging::codes;
use crate::{log_success, log_warning};

pub use bnf::{sas_bnf, Bnf, Rule, Symbol};
pub use error::GrammarError;
pub use precedence::{sas_precedence_table, Assoc, PrecedenceTable, Relation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLevels {
    /// `None` for openers
    pub left: Option<u32>,
    /// `None` for closers
    pub right: Option<u32>,
}

impl TokenLevels {
    pub fn is_opener(&self) -> bool {
        self.left.is_none()
    }

    pub fn is_closer(&self) -> bool {
        self.right.is_none()
    }

    /// Same level on both sides, as for `;` and `,`
    pub fn is_associative(&self) -> bool {
        self.left.is_some() && self.left == self.right
    }
}

/// Broad role of a grammar name, used to select indentation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Opener,
    Closer,
    Separator,
    BinaryOperator,
    Atom,
}

/// A relation pair the rules derived both ways with no table entry to
/// settle it; the first derived relation is kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub left: String,
    pub right: String,
    pub kept: Relation,
    pub rejected: Relation,
}

#[derive(Debug, Clone)]
pub struct PrecedenceGrammar {
    levels: HashMap<String, TokenLevels>,
    conflicts: Vec<Conflict>,
}

impl PrecedenceGrammar {
    pub fn build(bnf: &Bnf, table: &PrecedenceTable) -> Result<Self, GrammarError> {
        bnf.validate()?;

        let first = bnf.first_ops();
        let last = bnf.last_ops();
        let resolvers = table.relations();
        let mut relations: BTreeMap<(&'static str, &'static str), Relation> = BTreeMap::new();
        let mut conflicts = Vec::new();

        let mut record = |a: &'static str, b: &'static str, relation: Relation| {
            match relations.get(&(a, b)).copied() {
                None => {
                    relations.insert((a, b), relation);
                }
                Some(existing) if existing == relation => {}
                Some(existing) => match resolvers.get(&(a, b)) {
                    Some(resolved) => {
                        relations.insert((a, b), *resolved);
                    }
                    None => {
                        let kept = existing;
                        if !conflicts.iter().any(|c: &Conflict| c.left == a && c.right == b) {
                            conflicts.push(Conflict {
                                left: a.to_string(),
                                right: b.to_string(),
                                kept,
                                rejected: relation,
                            });
                        }
                    }
                },
            }
        };

        for rule in bnf.rules() {
            let rhs = &rule.rhs;
            for (i, symbol) in rhs.iter().enumerate() {
                match (symbol, rhs.get(i + 1)) {
                    (Symbol::Terminal(a), Some(Symbol::Terminal(b))) => record(*a, *b, Relation::Eq),
                    (Symbol::Terminal(a), Some(Symbol::NonTerminal(nt))) => {
                        for f in first.get(nt).into_iter().flatten() {
                            record(*a, *f, Relation::Lt);
                        }
                        if let Some(Symbol::Terminal(b)) = rhs.get(i + 2) {
                            record(*a, *b, Relation::Eq);
                        }
                    }
                    (Symbol::NonTerminal(nt), Some(Symbol::Terminal(b))) => {
                        for l in last.get(nt).into_iter().flatten() {
                            record(*l, *b, Relation::Gt);
                        }
                    }
                    _ => {}
                }
            }
        }

        let terminals: Vec<&'static str> = bnf.terminals().into_iter().collect();
        let solved = levels::solve(&terminals, &relations)?;

        let mut openers = Vec::new();
        let mut closers = Vec::new();
        for rule in bnf.rules() {
            if let Some(Symbol::Terminal(t)) = rule.rhs.first() {
                openers.push(*t);
            }
            if let Some(Symbol::Terminal(t)) = rule.rhs.last() {
                closers.push(*t);
            }
        }

        let levels = solved
            .into_iter()
            .map(|(terminal, (left, right))| {
                let levels = TokenLevels {
                    left: (!openers.contains(&terminal)).then_some(left),
                    right: (!closers.contains(&terminal)).then_some(right),
                };
                (terminal.to_string(), levels)
            })
            .collect();

        Ok(Self { levels, conflicts })
    }

    /// Levels for a grammar name; `None` means the token is an atom
    pub fn levels(&self, name: &str) -> Option<TokenLevels> {
        if name.is_empty() {
            return None;
        }
        self.levels.get(name).copied()
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.levels(name).is_some()
    }

    pub fn category(&self, name: &str) -> Category {
        match self.levels(name) {
            None => Category::Atom,
            Some(levels) if levels.is_opener() => Category::Opener,
            Some(levels) if levels.is_closer() => Category::Closer,
            Some(_) if name == ";" || name == "," => Category::Separator,
            Some(_) => Category::BinaryOperator,
        }
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn terminal_count(&self) -> usize {
        self.levels.len()
    }
}

static SAS_GRAMMAR: OnceLock<Result<PrecedenceGrammar, GrammarError>> = OnceLock::new();

/// The language grammar, constructed on first use
pub fn sas_grammar() -> Result<&'static PrecedenceGrammar, GrammarError> {
    SAS_GRAMMAR
        .get_or_init(|| {
            let table = sas_precedence_table();
            let grammar = PrecedenceGrammar::build(&sas_bnf(&table), &table)?;
            for conflict in grammar.conflicts() {
                log_warning!(code = codes::grammar::PRECEDENCE_CONFLICT,
                    "Unresolved precedence conflict",
                    "pair" => format!("{} {}", conflict.left, conflict.right),
                    "kept" => conflict.kept.as_str(),
                    "rejected" => conflict.rejected.as_str()
                );
            }
            log_success!(
                codes::success::GRAMMAR_CONSTRUCTED,
                "Precedence grammar constructed",
                "terminals" => grammar.terminal_count()
            );
            Ok(grammar)
        })
        .as_ref()
        .map_err(Clone::clone)
}
