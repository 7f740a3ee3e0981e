//! Source Map v3 output for rewritten stylesheets.

use serde::{Deserialize, Serialize};

use crate::location::LineIndex;

/// Source Map revision 3 document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapV3 {
    pub version: u8,
    pub file: String,
    pub sources: Vec<String>,
    pub sources_content: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMapV3 {
    /// Single-source map for `file`.
    pub fn new(file: &str, source: &str, mappings: String) -> Self {
        Self {
            version: 3,
            file: file.to_string(),
            sources: vec![file.to_string()],
            sources_content: vec![source.to_string()],
            names: Vec::new(),
            mappings,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

const BASE64_DIGITS: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Write `value` as a base64 VLQ.
fn push_vlq(out: &mut String, value: i64) {
    let mut rest = if value < 0 {
        ((-value as u64) << 1) | 1
    } else {
        (value as u64) << 1
    };
    loop {
        let mut digit = (rest & 0b1_1111) as usize;
        rest >>= 5;
        if rest > 0 {
            digit |= 0b10_0000;
        }
        out.push(BASE64_DIGITS[digit] as char);
        if rest == 0 {
            break;
        }
    }
}

/// Encodes the `mappings` field incrementally.
///
/// Generated positions must be added in non-decreasing order.
#[derive(Debug, Default)]
pub(crate) struct MappingsBuilder {
    mappings: String,
    gen_line: u32,
    prev_gen_col: u32,
    prev_src_line: u32,
    prev_src_col: u32,
    line_has_segment: bool,
    last_gen: Option<(u32, u32)>,
}

impl MappingsBuilder {
    pub(crate) fn add(&mut self, gen: (u32, u32), src: (u32, u32)) {
        // first mapping at a generated position wins
        if self.last_gen == Some(gen) {
            return;
        }
        self.last_gen = Some(gen);

        let (gen_line, gen_col) = gen;
        while self.gen_line < gen_line {
            self.mappings.push(';');
            self.gen_line += 1;
            self.prev_gen_col = 0;
            self.line_has_segment = false;
        }
        if self.line_has_segment {
            self.mappings.push(',');
        }

        let (src_line, src_col) = src;
        push_vlq(&mut self.mappings, gen_col as i64 - self.prev_gen_col as i64);
        push_vlq(&mut self.mappings, 0);
        push_vlq(&mut self.mappings, src_line as i64 - self.prev_src_line as i64);
        push_vlq(&mut self.mappings, src_col as i64 - self.prev_src_col as i64);

        self.prev_gen_col = gen_col;
        self.prev_src_line = src_line;
        self.prev_src_col = src_col;
        self.line_has_segment = true;
    }

    pub(crate) fn finish(self) -> String {
        self.mappings
    }
}

/// Output buffer that copies untouched source text and splices in
/// replacements, optionally recording where each piece came from.
///
/// Replacements must be applied in source order.
pub(crate) struct Emitter<'s> {
    source: &'s str,
    lines: &'s LineIndex,
    out: String,
    cursor: usize,
    gen_line: u32,
    gen_col: u32,
    mappings: Option<MappingsBuilder>,
}

impl<'s> Emitter<'s> {
    pub(crate) fn new(source: &'s str, lines: &'s LineIndex, with_map: bool) -> Self {
        Self {
            source,
            lines,
            out: String::with_capacity(source.len() + source.len() / 2),
            cursor: 0,
            gen_line: 0,
            gen_col: 0,
            mappings: with_map.then(MappingsBuilder::default),
        }
    }

    fn mark(&mut self, src_offset: usize) {
        if let Some(mappings) = self.mappings.as_mut() {
            let src = self.lines.utf16_position(self.source, src_offset);
            mappings.add((self.gen_line, self.gen_col), src);
        }
    }

    fn advance(&mut self, text: &str) {
        match text.rfind('\n') {
            Some(pos) => {
                self.gen_line += memchr::memchr_iter(b'\n', text.as_bytes()).count() as u32;
                self.gen_col = text[pos + 1..].encode_utf16().count() as u32;
            }
            None => self.gen_col += text.encode_utf16().count() as u32,
        }
    }

    /// Copy source text up to `offset` unchanged.
    pub(crate) fn flush_to(&mut self, offset: usize) {
        if offset <= self.cursor {
            return;
        }
        let source = self.source;
        let mut start = self.cursor;
        for newline in memchr::memchr_iter(b'\n', &source.as_bytes()[start..offset]) {
            let end = start + newline + 1;
            self.mark(start);
            self.out.push_str(&source[start..end]);
            self.advance(&source[start..end]);
            start = end;
        }
        if start < offset {
            self.mark(start);
            self.out.push_str(&source[start..offset]);
            self.advance(&source[start..offset]);
        }
        self.cursor = offset;
    }

    /// Replace `source[start..end]` with `text`.
    pub(crate) fn replace(&mut self, start: usize, end: usize, text: &str) {
        self.flush_to(start);
        if !text.is_empty() {
            self.mark(start);
            self.out.push_str(text);
            self.advance(text);
        }
        self.cursor = end;
    }

    /// Copy the remaining source and return the output with its mappings.
    pub(crate) fn finish(mut self) -> (String, Option<String>) {
        self.flush_to(self.source.len());
        (self.out, self.mappings.map(MappingsBuilder::finish))
    }
}
