use crate::lexical::LexError;
use crate::logging::codes;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("Gave up after {limit} rejected matches near offset {offset}")]
    RetryLimit { offset: usize, limit: usize },
}

impl ScanError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ScanError::Lex(err) => err.error_code(),
            ScanError::RetryLimit { .. } => codes::scanning::SEARCH_RETRY_LIMIT,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
