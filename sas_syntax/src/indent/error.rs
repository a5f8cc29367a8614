use crate::grammar::GrammarError;
use crate::lexical::LexError;
use crate::logging::codes;
use crate::scanning::ScanError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndentError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("Indentation depends on more than {limit} enclosing lines at offset {offset}")]
    RecursionLimit { offset: usize, limit: usize },

    #[error("Parser took more than {limit} steps scanning back from offset {offset}")]
    SexpStepLimit { offset: usize, limit: usize },
}

impl IndentError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            IndentError::Lex(err) => err.error_code(),
            IndentError::Scan(err) => err.error_code(),
            IndentError::Grammar(err) => err.error_code(),
            IndentError::RecursionLimit { .. } => codes::indentation::RECURSION_LIMIT,
            IndentError::SexpStepLimit { .. } => codes::indentation::SEXP_STEP_LIMIT,
        }
    }
}

pub type IndentResult<T> = Result<T, IndentError>;
