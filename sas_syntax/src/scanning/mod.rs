//! Statement and block boundary scanning
//!
//! The free functions use the default scan preferences; construct a
//! `BlockLocator` to supply others.

pub mod block;
pub mod error;
pub mod statement;

use crate::buffer::TextBuffer;

pub use block::{Block, BlockKind, BlockLocator};
pub use error::{ScanError, ScanResult};
pub use statement::{beginning_of_statement, end_of_statement, statement_at};

pub fn beginning_of_block(buffer: &dyn TextBuffer, offset: usize) -> ScanResult<Block> {
    BlockLocator::new().beginning_of_block(buffer, offset)
}

pub fn end_of_block(buffer: &dyn TextBuffer, block: &Block) -> ScanResult<usize> {
    BlockLocator::new().end_of_block(buffer, block)
}

pub fn locate_enclosing_block(buffer: &dyn TextBuffer, offset: usize) -> ScanResult<Block> {
    BlockLocator::new().locate_enclosing_block(buffer, offset)
}

pub fn block_extent(buffer: &dyn TextBuffer, block: &Block) -> ScanResult<(usize, usize)> {
    BlockLocator::new().block_extent(buffer, block)
}

pub fn next_block(buffer: &dyn TextBuffer, offset: usize) -> ScanResult<Option<Block>> {
    BlockLocator::new().next_block(buffer, offset)
}

pub fn previous_block(buffer: &dyn TextBuffer, offset: usize) -> ScanResult<Option<Block>> {
    BlockLocator::new().previous_block(buffer, offset)
}
