//! Line index shared by the buffer and the indentation engine

pub mod span;

pub use span::SourceMap;
