//! Context-free rules for the statement and expression structure
//!
//! Terminals are grammar names as produced by `Token::grammar_name`.
//! Atoms (identifiers, numbers, strings) never appear as terminals; the
//! `exp` nonterminal stands in for them.

use std::collections::{BTreeSet, HashMap};

use super::error::GrammarError;
use super::precedence::{Assoc, PrecedenceTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(&'static str),
    NonTerminal(&'static str),
}

impl Symbol {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Symbol::Terminal(name) | Symbol::NonTerminal(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub lhs: &'static str,
    pub rhs: Vec<Symbol>,
}

pub type OpSets = HashMap<&'static str, BTreeSet<&'static str>>;

#[derive(Debug, Clone, Default)]
pub struct Bnf {
    rules: Vec<Rule>,
}

impl Bnf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(&mut self, lhs: &'static str, rhs: Vec<Symbol>) -> &mut Self {
        self.rules.push(Rule { lhs, rhs });
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Every terminal mentioned by some rule, sorted
    pub fn terminals(&self) -> BTreeSet<&'static str> {
        self.rules
            .iter()
            .flat_map(|rule| rule.rhs.iter())
            .filter(|symbol| symbol.is_terminal())
            .map(Symbol::name)
            .collect()
    }

    /// Operator precedence parsing cannot tell where one nonterminal ends
    /// and the next begins, so adjacent nonterminals are rejected.
    pub fn validate(&self) -> Result<(), GrammarError> {
        for rule in &self.rules {
            let adjacent = rule
                .rhs
                .windows(2)
                .any(|pair| !pair[0].is_terminal() && !pair[1].is_terminal());
            if adjacent {
                return Err(GrammarError::AdjacentNonterminals {
                    lhs: rule.lhs.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Terminals that can appear first in each nonterminal's expansion
    pub fn first_ops(&self) -> OpSets {
        self.edge_ops(|rhs| rhs.to_vec())
    }

    /// Terminals that can appear last in each nonterminal's expansion
    pub fn last_ops(&self) -> OpSets {
        self.edge_ops(|rhs| rhs.iter().rev().copied().collect())
    }

    /// Fixpoint over the rules seen from one end: a leading terminal, or the
    /// ops of a leading nonterminal plus the terminal right after it.
    fn edge_ops(&self, oriented: impl Fn(&[Symbol]) -> Vec<Symbol>) -> OpSets {
        let mut sets: OpSets = HashMap::new();
        for rule in &self.rules {
            sets.entry(rule.lhs).or_default();
        }

        let mut changed = true;
        while changed {
            changed = false;
            for rule in &self.rules {
                let rhs = oriented(&rule.rhs);
                let mut found: Vec<&'static str> = Vec::new();
                match rhs.first() {
                    Some(Symbol::Terminal(t)) => found.push(t),
                    Some(Symbol::NonTerminal(nt)) => {
                        if let Some(inner) = sets.get(nt) {
                            found.extend(inner.iter().copied());
                        }
                        if let Some(Symbol::Terminal(t)) = rhs.get(1) {
                            found.push(t);
                        }
                    }
                    None => {}
                }

                let entry = sets.entry(rule.lhs).or_default();
                for op in found {
                    changed |= entry.insert(op);
                }
            }
        }
        sets
    }
}

use Symbol::{NonTerminal as N, Terminal as T};

/// Statement and expression rules of the language
///
/// Binary operator rules are generated from the precedence table so the
/// two cannot drift apart; the unary level contributes prefix rules.
pub fn sas_bnf(table: &PrecedenceTable) -> Bnf {
    let mut bnf = Bnf::new();

    bnf.rule("insts", vec![N("insts"), T(";"), N("insts")])
        .rule("insts", vec![N("inst")]);

    for (opener, closer) in [
        ("proc", "run"),
        ("proc", "quit"),
        ("data", "run"),
        ("%macro", "%mend"),
        ("do", "end"),
        ("%do", "%end"),
        ("select", "end"),
    ] {
        bnf.rule("inst", vec![T(opener), N("insts"), T(closer)]);
    }

    bnf.rule("inst", vec![T("if"), N("exp"), T("then"), N("inst")])
        .rule("inst", vec![T("else"), N("inst")])
        .rule("inst", vec![T("%if"), N("exp"), T("%then"), N("inst")])
        .rule("inst", vec![T("%else"), N("inst")])
        .rule("inst", vec![T("output"), N("exp")])
        .rule("inst", vec![T("dataequal"), N("exp")])
        .rule("inst", vec![N("exp")]);

    for level in table.levels() {
        for op in &level.ops {
            match (level.assoc, *op) {
                (_, ";") | (_, ",") => {}
                (Assoc::NonAssoc, op) if table.is_unary(op) => {
                    bnf.rule("exp", vec![T(op), N("exp")]);
                }
                (_, op) => {
                    bnf.rule("exp", vec![N("exp"), T(op), N("exp")]);
                }
            }
        }
    }

    bnf.rule("exp", vec![T("("), N("exps"), T(")")])
        .rule("exps", vec![N("exps"), T(","), N("exps")])
        .rule("exps", vec![N("exp")]);

    bnf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::precedence::sas_precedence_table;
    use assert_matches::assert_matches;

    #[test]
    fn test_sas_bnf_is_valid() {
        let bnf = sas_bnf(&sas_precedence_table());
        assert!(bnf.validate().is_ok());

        let terminals = bnf.terminals();
        for name in ["proc", "run", "%mend", "dataequal", "then", ";", ",", "**", "("] {
            assert!(terminals.contains(name), "missing {}", name);
        }
        assert!(!terminals.contains("to"));
    }

    #[test]
    fn test_adjacent_nonterminals_rejected() {
        let mut bnf = Bnf::new();
        bnf.rule("a", vec![N("b"), N("c")]);
        assert_matches!(
            bnf.validate(),
            Err(GrammarError::AdjacentNonterminals { lhs }) if lhs == "a"
        );
    }

    #[test]
    fn test_first_and_last_ops() {
        let bnf = sas_bnf(&sas_precedence_table());
        let first = bnf.first_ops();
        let last = bnf.last_ops();

        let insts_first = &first["insts"];
        assert!(insts_first.contains(";"));
        assert!(insts_first.contains("proc"));
        assert!(insts_first.contains("+"));
        assert!(!insts_first.contains("run"));

        let inst_last = &last["inst"];
        assert!(inst_last.contains("run"));
        assert!(inst_last.contains("then"));
        assert!(inst_last.contains("dataequal"));
        assert!(!inst_last.contains("if"));

        assert!(last["exp"].contains(")"));
        assert!(last["exp"].contains("not"));
    }
}
