//! Source line index
//!
//! Offsets are byte offsets into the buffer; line numbers are 0-based.

/// Line index over a source text: byte offsets of line starts
#[derive(Debug, Clone)]
pub struct SourceMap {
    line_starts: Vec<usize>,
    len: usize,
}

impl SourceMap {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(offset, _)| offset + 1),
        );
        Self {
            line_starts,
            len: source.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 0-based line index containing `offset` (clamped to the last line)
    pub fn line_index(&self, offset: usize) -> usize {
        let offset = offset.min(self.len);
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        }
    }

    /// Byte offset where 0-based line `line` starts
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Byte offset of the line's end, excluding the newline
    pub fn line_end(&self, line: usize) -> Option<usize> {
        if line >= self.line_starts.len() {
            return None;
        }
        Some(match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index_lookup() {
        let source = "proc print;\nrun;\n";
        let map = SourceMap::new(source);

        assert_eq!(map.line_count(), 3);
        assert_eq!(map.line_index(0), 0);
        assert_eq!(map.line_index(11), 0);
        assert_eq!(map.line_index(12), 1);
        assert_eq!(map.line_start(1), Some(12));
        assert_eq!(map.line_end(1), Some(16));
        assert_eq!(map.line_end(2), Some(17));
        assert_eq!(map.line_start(3), None);
    }
}
