//! Token model shared by the classifier, resolver and indentation engine

pub mod keywords;
pub mod token;

pub use keywords::{is_mnemonic_operator, Keyword, MNEMONIC_OPERATORS, SYMBOL_OPERATORS};
pub use token::{Token, TokenKind};
