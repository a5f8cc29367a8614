//! Statement boundaries
//!
//! A statement ends at a `;` that is code. Terminators inside comments and
//! string literals are invisible here because the lexical map only records
//! code terminators. Running into either end of the buffer is a normal
//! boundary, not an error.

use super::error::ScanResult;
use crate::buffer::TextBuffer;
use crate::lexical::check_offset;
use std::ops::Range;

/// Start of the statement containing `offset`
///
/// Finds the previous code `;` (or the buffer start) and skips the
/// whitespace after it. Applying it to its own result returns the same
/// offset.
pub fn beginning_of_statement(buffer: &dyn TextBuffer, offset: usize) -> ScanResult<usize> {
    let offset = check_offset(buffer, offset)?;
    let start = buffer
        .lexical_map()
        .previous_terminator(offset)
        .map(|t| t + 1)
        .unwrap_or(0);

    let bytes = buffer.text().as_bytes();
    Ok(bytes[start..]
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map(|p| start + p)
        .unwrap_or(bytes.len()))
}

/// Offset just past the first code `;` at or after `offset`, or the
/// buffer end when the statement is unterminated
pub fn end_of_statement(buffer: &dyn TextBuffer, offset: usize) -> ScanResult<usize> {
    let offset = check_offset(buffer, offset)?;
    Ok(buffer
        .lexical_map()
        .next_terminator(offset)
        .map(|t| t + 1)
        .unwrap_or_else(|| buffer.len()))
}

pub fn statement_at(buffer: &dyn TextBuffer, offset: usize) -> ScanResult<Range<usize>> {
    let start = beginning_of_statement(buffer, offset)?;
    let end = end_of_statement(buffer, offset)?;
    Ok(start.min(end)..end)
}
