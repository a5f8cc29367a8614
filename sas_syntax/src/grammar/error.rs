use crate::logging::codes;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("Precedence relations form a cycle through: {}", tokens.join(" "))]
    Cycle { tokens: Vec<String> },

    #[error("Rule for '{lhs}' has two adjacent nonterminals")]
    AdjacentNonterminals { lhs: String },
}

impl GrammarError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            GrammarError::Cycle { .. } => codes::grammar::PRECEDENCE_CYCLE,
            GrammarError::AdjacentNonterminals { .. } => codes::grammar::ADJACENT_NONTERMINALS,
        }
    }
}
