// Internal modules
pub mod buffer;
pub mod config;
pub mod editing;
pub mod grammar;
pub mod indent;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod resolver;
pub mod scanning;
pub mod style;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use buffer::{load_file, BufferError, SourceBuffer, TextBuffer};
pub use config::runtime::RuntimeConfig;
pub use editing::{Editor, Submission};
pub use indent::{IndentError, LineIndent};
pub use lexical::{Direction, LexError};
pub use scanning::{Block, BlockKind, ScanError};
pub use style::{DefaultStyleMap, Face, StyleMap, StyledSpan};
pub use tokens::{Token, TokenKind};
