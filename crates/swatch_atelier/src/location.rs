//! Byte offset to line/column conversion.

/// Line start table for one source text.
pub(crate) struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(memchr::memchr_iter(b'\n', source.as_bytes()).map(|i| i + 1));
        Self { line_starts }
    }

    /// 0-based line containing `offset`.
    fn line_of(&self, offset: usize) -> usize {
        self.line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    /// 1-based line and 1-based character column, for error messages.
    pub(crate) fn line_col(&self, source: &str, offset: usize) -> (u32, u32) {
        let line = self.line_of(offset);
        let start = self.line_starts[line];
        let column = source[start..offset].chars().count() + 1;
        (line as u32 + 1, column as u32)
    }

    /// 0-based line and 0-based UTF-16 column, for source maps.
    pub(crate) fn utf16_position(&self, source: &str, offset: usize) -> (u32, u32) {
        let line = self.line_of(offset);
        let start = self.line_starts[line];
        let column = source[start..offset].encode_utf16().count();
        (line as u32, column as u32)
    }
}
