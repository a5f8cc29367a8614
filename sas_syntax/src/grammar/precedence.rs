//! Operator precedence table
//!
//! Levels run from loosest to tightest binding. The table only settles
//! relations the rules leave ambiguous; it never overrides a relation the
//! rules derive unambiguously.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
    Assoc,
    NonAssoc,
}

/// Relation between the right side of one terminal and the left side of
/// the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Relation {
    Lt,
    Eq,
    Gt,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Lt => "<",
            Relation::Eq => "=",
            Relation::Gt => ">",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecLevel {
    pub assoc: Assoc,
    pub ops: Vec<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct PrecedenceTable {
    levels: Vec<PrecLevel>,
    unary: Vec<&'static str>,
}

impl PrecedenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, assoc: Assoc, ops: &[&'static str]) -> Self {
        self.levels.push(PrecLevel {
            assoc,
            ops: ops.to_vec(),
        });
        self
    }

    /// Like `level`, but the operators are prefix rather than infix
    pub fn unary_level(mut self, ops: &[&'static str]) -> Self {
        self.unary.extend_from_slice(ops);
        self.level(Assoc::NonAssoc, ops)
    }

    pub fn levels(&self) -> &[PrecLevel] {
        &self.levels
    }

    pub fn is_unary(&self, op: &str) -> bool {
        self.unary.contains(&op)
    }

    pub fn contains(&self, op: &str) -> bool {
        self.levels.iter().any(|level| level.ops.contains(&op))
    }

    /// Pairwise relations implied by the table
    ///
    /// Within a level: left gives `>`, right `<`, associative `=`.
    /// Non-associative operators have no defined chaining; they resolve as
    /// `>`, which groups them like left-associative ones.
    pub fn relations(&self) -> HashMap<(&'static str, &'static str), Relation> {
        let mut relations = HashMap::new();

        for level in &self.levels {
            let within = match level.assoc {
                Assoc::Left | Assoc::NonAssoc => Relation::Gt,
                Assoc::Right => Relation::Lt,
                Assoc::Assoc => Relation::Eq,
            };
            for &a in &level.ops {
                for &b in &level.ops {
                    relations.insert((a, b), within);
                }
            }
        }

        for (i, lower) in self.levels.iter().enumerate() {
            for higher in &self.levels[i + 1..] {
                for &a in &lower.ops {
                    for &b in &higher.ops {
                        relations.insert((a, b), Relation::Lt);
                        relations.insert((b, a), Relation::Gt);
                    }
                }
            }
        }

        relations
    }
}

pub fn sas_precedence_table() -> PrecedenceTable {
    PrecedenceTable::new()
        .level(Assoc::Assoc, &[";"])
        .level(Assoc::Assoc, &[","])
        .level(Assoc::Left, &["or", "|", "!"])
        .level(Assoc::Left, &["and", "&"])
        .unary_level(&["not", "^", "~"])
        .level(
            Assoc::NonAssoc,
            &[
                "=", "eq", "ne", "^=", "~=", "<", "<=", ">", ">=", "lt", "le", "gt", "ge", "in",
                "=:",
            ],
        )
        .level(Assoc::Left, &["||", "!!"])
        .level(Assoc::Assoc, &["+", "-"])
        .level(Assoc::Assoc, &["*", "/"])
        .level(Assoc::Right, &["**", "<>", "><"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relations_follow_levels() {
        let relations = sas_precedence_table().relations();

        assert_eq!(relations[&(";", ";")], Relation::Eq);
        assert_eq!(relations[&(";", "+")], Relation::Lt);
        assert_eq!(relations[&("+", ";")], Relation::Gt);
        assert_eq!(relations[&("or", "or")], Relation::Gt);
        assert_eq!(relations[&("**", "**")], Relation::Lt);
        assert_eq!(relations[&("+", "-")], Relation::Eq);
        assert_eq!(relations[&("=", "eq")], Relation::Gt);
        assert_eq!(relations[&("and", "*")], Relation::Lt);
    }

    #[test]
    fn test_unary_membership() {
        let table = sas_precedence_table();
        assert!(table.is_unary("not"));
        assert!(!table.is_unary("="));
        assert!(table.contains("||"));
        assert!(!table.contains("then"));
    }
}
