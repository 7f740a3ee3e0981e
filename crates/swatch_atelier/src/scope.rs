//! Local scoping of class and id selectors.
//!
//! Walks the block structure of a stylesheet, finds the selector of every
//! style rule and renames the local class and id names in it.
//! `:global(...)` / `:local(...)` set the scoping of what they wrap; bare
//! `:global` / `:local` set it for the rest of the comma-separated selector.
//! Declarations, at-rule preludes and keyframe selectors are never touched.

use memchr::memmem;
use phf::phf_set;
use swatch_carton::ident::{is_ident_char, is_ident_start, unescape_ident};
use swatch_carton::{smallvec, CompactString, FxHashSet, FxIndexMap, SmallVec};

use crate::error::CompileError;
use crate::location::LineIndex;
use crate::naming::LocalNamer;
use crate::options::ScopeMode;
use crate::source_map::Emitter;

/// At-rules whose block holds further rules.
static RULE_LIST_AT_RULES: phf::Set<&'static str> = phf_set! {
    "media",
    "supports",
    "layer",
    "container",
    "document",
    "-moz-document",
    "scope",
    "starting-style",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    /// Top level or a conditional group rule
    Rules,
    /// Style rule body: declarations and nested rules
    Style,
    /// `@keyframes` body
    Keyframes,
    /// Declarations only (`@font-face`, keyframe blocks, ...)
    Declarations,
}

/// Result of rewriting one stylesheet.
pub(crate) struct ScopedCss {
    pub(crate) css: String,
    pub(crate) mappings: Option<String>,
    /// Local name to emitted name, in declaration order
    pub(crate) exports: FxIndexMap<CompactString, CompactString>,
    /// Class names written as global
    pub(crate) globals: FxHashSet<CompactString>,
}

/// Rename every local class and id selector in `source`.
pub(crate) fn rewrite_local_names(
    source: &str,
    filename: &str,
    mode: ScopeMode,
    namer: &LocalNamer<'_>,
    with_map: bool,
) -> Result<ScopedCss, CompileError> {
    let lines = LineIndex::new(source);
    let mut rewriter = Rewriter {
        source,
        bytes: source.as_bytes(),
        filename,
        lines: &lines,
        mode,
        namer,
        emitter: Emitter::new(source, &lines, with_map),
        exports: FxIndexMap::default(),
        globals: FxHashSet::default(),
    };
    rewriter.walk()?;

    let Rewriter {
        emitter,
        exports,
        globals,
        ..
    } = rewriter;
    let (css, mappings) = emitter.finish();
    Ok(ScopedCss {
        css,
        mappings,
        exports,
        globals,
    })
}

struct Rewriter<'s, 'n> {
    source: &'s str,
    bytes: &'s [u8],
    filename: &'s str,
    lines: &'s LineIndex,
    mode: ScopeMode,
    namer: &'n LocalNamer<'n>,
    emitter: Emitter<'s>,
    exports: FxIndexMap<CompactString, CompactString>,
    globals: FxHashSet<CompactString>,
}

impl<'s, 'n> Rewriter<'s, 'n> {
    fn walk(&mut self) -> Result<(), CompileError> {
        let bytes = self.bytes;
        // (block kind, offset of its `{`)
        let mut stack: SmallVec<[(Block, usize); 8]> = smallvec![];
        let mut prelude_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    i = self.skip_comment(i)?;
                    continue;
                }
                b'"' | b'\'' => {
                    i = self.skip_string(i)?;
                    continue;
                }
                b'\\' => {
                    i += 2;
                    continue;
                }
                b'{' => {
                    let parent = stack.last().map_or(Block::Rules, |&(block, _)| block);
                    let block = self.open_block(parent, prelude_start, i)?;
                    stack.push((block, i));
                    prelude_start = i + 1;
                }
                b'}' => {
                    if stack.pop().is_none() {
                        return Err(self.error(i, "Unexpected `}`"));
                    }
                    prelude_start = i + 1;
                }
                b';' => prelude_start = i + 1,
                _ => {}
            }
            i += 1;
        }

        if let Some(&(_, open)) = stack.last() {
            return Err(self.error(open, "Unclosed block"));
        }
        Ok(())
    }

    /// Classify the block opened at `end` and rewrite its prelude if it is a
    /// selector.
    fn open_block(&mut self, parent: Block, start: usize, end: usize) -> Result<Block, CompileError> {
        if matches!(parent, Block::Keyframes | Block::Declarations) {
            return Ok(Block::Declarations);
        }

        let head = self.skip_trivia(start, end)?;
        if head >= end {
            return Err(self.error(end, "Expected a selector before `{`"));
        }

        if self.bytes[head] == b'@' {
            let name_end = self.ident_tail(head + 1, end);
            let name = self.source[head + 1..name_end].to_ascii_lowercase();
            let block = if name.ends_with("keyframes") {
                Block::Keyframes
            } else if RULE_LIST_AT_RULES.contains(name.as_str()) {
                // a group rule nested in a style rule keeps the style rule's body
                if parent == Block::Style {
                    Block::Style
                } else {
                    Block::Rules
                }
            } else {
                Block::Declarations
            };
            return Ok(block);
        }

        self.rewrite_selector(start, end, self.mode == ScopeMode::Local)?;
        Ok(Block::Style)
    }

    fn rewrite_selector(
        &mut self,
        start: usize,
        end: usize,
        local_default: bool,
    ) -> Result<(), CompileError> {
        let bytes = self.bytes;
        let mut local = local_default;
        let mut depth = 0usize;
        let mut i = start;

        while i < end {
            match bytes[i] {
                b'/' if bytes.get(i + 1) == Some(&b'*') => i = self.skip_comment(i)?,
                b'"' | b'\'' => i = self.skip_string(i)?,
                b'[' => i = self.skip_attribute(i, end)?,
                b'\\' => i += 2,
                b'(' => {
                    depth += 1;
                    i += 1;
                }
                b')' => {
                    depth = depth.saturating_sub(1);
                    i += 1;
                }
                b',' => {
                    if depth == 0 {
                        local = local_default;
                    }
                    i += 1;
                }
                sigil @ (b'.' | b'#') => match self.scan_ident(i + 1, end) {
                    Some(ident_end) => {
                        let name = unescape_ident(&self.source[i + 1..ident_end]);
                        if local {
                            let emitted = self.export(name);
                            self.emitter.replace(i + 1, ident_end, &emitted);
                        } else if sigil == b'.' {
                            self.globals.insert(CompactString::from(name));
                        }
                        i = ident_end;
                    }
                    None => i += 1,
                },
                b':' => match self.scope_pseudo(i, end) {
                    Some((global, name_end)) if bytes.get(name_end) == Some(&b'(') && name_end < end => {
                        let close = self
                            .find_close_paren(name_end + 1, end)
                            .ok_or_else(|| self.error(i, "Unclosed `:global(` or `:local(`"))?;
                        self.emitter.replace(i, name_end + 1, "");
                        self.rewrite_selector(name_end + 1, close, !global)?;
                        self.emitter.replace(close, close + 1, "");
                        i = close + 1;
                    }
                    Some((global, name_end)) => {
                        let mut next = name_end;
                        while next < end && bytes[next].is_ascii_whitespace() {
                            next += 1;
                        }
                        self.emitter.replace(i, next, "");
                        local = !global;
                        i = next;
                    }
                    None => i += 1,
                },
                _ => i += 1,
            }
        }
        Ok(())
    }

    fn export(&mut self, name: String) -> CompactString {
        if let Some(emitted) = self.exports.get(name.as_str()) {
            return emitted.clone();
        }
        let emitted = self.namer.name(&name);
        self.exports
            .insert(CompactString::from(name), emitted.clone());
        emitted
    }

    /// `:global` / `:local` at `i`: whether it is global, and where its name ends.
    fn scope_pseudo(&self, i: usize, end: usize) -> Option<(bool, usize)> {
        if self.bytes.get(i + 1) == Some(&b':') {
            return None;
        }
        let name_end = self.ident_tail(i + 1, end);
        let name = &self.source[i + 1..name_end];
        if name.eq_ignore_ascii_case("global") {
            Some((true, name_end))
        } else if name.eq_ignore_ascii_case("local") {
            Some((false, name_end))
        } else {
            None
        }
    }

    /// End of the identifier starting at `pos`, if one starts there.
    fn scan_ident(&self, pos: usize, end: usize) -> Option<usize> {
        let bytes = self.bytes;
        let mut i = pos;
        if i < end && bytes[i] == b'-' {
            i += 1;
            if i < end && bytes[i] == b'-' {
                return Some(self.ident_tail(i + 1, end));
            }
        }
        if i >= end {
            return None;
        }

        if bytes[i] == b'\\' {
            if !self.is_valid_escape(i, end) {
                return None;
            }
        } else {
            let c = self.source[i..end].chars().next()?;
            if !is_ident_start(c) {
                return None;
            }
        }
        Some(self.ident_tail(i, end))
    }

    fn ident_tail(&self, mut i: usize, end: usize) -> usize {
        while i < end {
            if self.bytes[i] == b'\\' {
                if !self.is_valid_escape(i, end) {
                    break;
                }
                i = self.escape_end(i, end);
                continue;
            }
            match self.source[i..end].chars().next() {
                Some(c) if is_ident_char(c) => i += c.len_utf8(),
                _ => break,
            }
        }
        i
    }

    #[inline]
    fn is_valid_escape(&self, i: usize, end: usize) -> bool {
        i + 1 < end && self.bytes[i + 1] != b'\n'
    }

    fn escape_end(&self, i: usize, end: usize) -> usize {
        let hex_start = i + 1;
        let mut j = hex_start;
        while j < end && j - hex_start < 6 && self.bytes[j].is_ascii_hexdigit() {
            j += 1;
        }
        if j > hex_start {
            if j < end && matches!(self.bytes[j], b' ' | b'\t' | b'\n') {
                j += 1;
            }
            j
        } else {
            j + self.source[j..end].chars().next().map_or(1, char::len_utf8)
        }
    }

    fn skip_trivia(&self, mut i: usize, end: usize) -> Result<usize, CompileError> {
        while i < end {
            if self.bytes[i].is_ascii_whitespace() {
                i += 1;
            } else if self.bytes[i] == b'/' && self.bytes.get(i + 1) == Some(&b'*') {
                i = self.skip_comment(i)?;
            } else {
                break;
            }
        }
        Ok(i)
    }

    fn skip_comment(&self, i: usize) -> Result<usize, CompileError> {
        memmem::find(&self.bytes[i + 2..], b"*/")
            .map(|pos| i + 2 + pos + 2)
            .ok_or_else(|| self.error(i, "Unterminated comment"))
    }

    fn skip_string(&self, i: usize) -> Result<usize, CompileError> {
        let quote = self.bytes[i];
        let mut j = i + 1;
        while j < self.bytes.len() {
            match self.bytes[j] {
                b'\\' => j += 2,
                b'\n' => break,
                b if b == quote => return Ok(j + 1),
                _ => j += 1,
            }
        }
        Err(self.error(i, "Unterminated string"))
    }

    fn skip_attribute(&self, i: usize, end: usize) -> Result<usize, CompileError> {
        let mut j = i + 1;
        while j < end {
            match self.bytes[j] {
                b'"' | b'\'' => j = self.skip_string(j)?,
                b'\\' => j += 2,
                b']' => return Ok(j + 1),
                _ => j += 1,
            }
        }
        Err(self.error(i, "Unclosed attribute selector"))
    }

    /// Matching `)` for a group opened just before `from`.
    fn find_close_paren(&self, from: usize, end: usize) -> Option<usize> {
        let mut depth = 1u32;
        let mut j = from;
        while j < end {
            match self.bytes[j] {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(j);
                    }
                }
                b'"' | b'\'' => {
                    j = self.skip_string(j).ok()?;
                    continue;
                }
                b'/' if self.bytes.get(j + 1) == Some(&b'*') => {
                    j = self.skip_comment(j).ok()?;
                    continue;
                }
                b'\\' => {
                    j += 2;
                    continue;
                }
                _ => {}
            }
            j += 1;
        }
        None
    }

    fn error(&self, offset: usize, message: &str) -> CompileError {
        let (line, column) = self.lines.line_col(self.source, offset);
        CompileError::Parse {
            filename: self.filename.to_string(),
            line,
            column,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::NamingScheme;

    fn rewrite_in(source: &str, mode: ScopeMode) -> ScopedCss {
        let namer = LocalNamer::new(NamingScheme::Readable, "w.css");
        rewrite_local_names(source, "w.css", mode, &namer, false).unwrap()
    }

    fn rewrite(source: &str) -> String {
        rewrite_in(source, ScopeMode::Local).css
    }

    fn exported(scoped: &ScopedCss) -> Vec<(&str, &str)> {
        scoped
            .exports
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    fn parse_error(source: &str) -> (u32, u32, String) {
        let namer = LocalNamer::new(NamingScheme::Readable, "w.css");
        match rewrite_local_names(source, "w.css", ScopeMode::Local, &namer, false) {
            Err(CompileError::Parse {
                line,
                column,
                message,
                ..
            }) => (line, column, message),
            other => panic!("expected parse error, got {:?}", other.map(|s| s.css)),
        }
    }

    #[test]
    fn test_simple_class() {
        let scoped = rewrite_in(".button { color: red; }", ScopeMode::Local);
        assert_eq!(scoped.css, ".w__button { color: red; }");
        assert_eq!(exported(&scoped), vec![("button", "w__button")]);
    }

    #[test]
    fn test_compound_and_multiple_selectors() {
        assert_eq!(
            rewrite(".a .b, .a:hover > #c {}"),
            ".w__a .w__b, .w__a:hover > #w__c {}"
        );
    }

    #[test]
    fn test_repeated_name_exported_once() {
        let scoped = rewrite_in(".a {} .a:hover {} .b .a {}", ScopeMode::Local);
        assert_eq!(exported(&scoped), vec![("a", "w__a"), ("b", "w__b")]);
    }

    #[test]
    fn test_global_function() {
        let scoped = rewrite_in(".a :global(.b) {}", ScopeMode::Local);
        assert_eq!(scoped.css, ".w__a .b {}");
        assert_eq!(exported(&scoped), vec![("a", "w__a")]);
        assert!(scoped.globals.contains("b"));
    }

    #[test]
    fn test_bare_global_until_comma() {
        assert_eq!(rewrite(":global .x .y, .z {}"), ".x .y, .w__z {}");
    }

    #[test]
    fn test_global_mode_with_local() {
        let scoped = rewrite_in(".a :local(.b), .c {}", ScopeMode::Global);
        assert_eq!(scoped.css, ".a .w__b, .c {}");
        assert_eq!(exported(&scoped), vec![("b", "w__b")]);
    }

    #[test]
    fn test_global_mode_bare_local() {
        let scoped = rewrite_in(":local .a .b, .c {}", ScopeMode::Global);
        assert_eq!(scoped.css, ".w__a .w__b, .c {}");
    }

    #[test]
    fn test_media_query() {
        assert_eq!(
            rewrite("@media (max-width: 600px) { .a { color: red; } }"),
            "@media (max-width: 600px) { .w__a { color: red; } }"
        );
    }

    #[test]
    fn test_keyframes_untouched() {
        let css = "@keyframes spin { from { opacity: 0; } to { opacity: 1; } }\n.a { animation: spin 1s; }";
        assert_eq!(
            rewrite(css),
            "@keyframes spin { from { opacity: 0; } to { opacity: 1; } }\n.w__a { animation: spin 1s; }"
        );
    }

    #[test]
    fn test_font_face_untouched() {
        let css = "@font-face { font-family: \"A.B\"; src: url(a.woff2); }";
        assert_eq!(rewrite(css), css);
    }

    #[test]
    fn test_declarations_strings_and_attributes_untouched() {
        assert_eq!(
            rewrite(r#".a { background: url("x.png"); content: ".b"; } [data-x=".c"] .d {}"#),
            r#".w__a { background: url("x.png"); content: ".b"; } [data-x=".c"] .w__d {}"#
        );
    }

    #[test]
    fn test_nested_rules() {
        assert_eq!(
            rewrite(".a { color: red; &.b { color: blue; } .c & {} }"),
            ".w__a { color: red; &.w__b { color: blue; } .w__c & {} }"
        );
    }

    #[test]
    fn test_escaped_class_name() {
        let scoped = rewrite_in(r".sm\:flex {}", ScopeMode::Local);
        assert_eq!(scoped.css, ".w__sm_flex {}");
        assert_eq!(exported(&scoped), vec![("sm:flex", "w__sm_flex")]);
    }

    #[test]
    fn test_comment_before_selector() {
        assert_eq!(
            rewrite("/* .not-a-class */\n.a {}"),
            "/* .not-a-class */\n.w__a {}"
        );
    }

    #[test]
    fn test_pseudo_element_and_not() {
        assert_eq!(
            rewrite(".a::before, .b:not(.c) {}"),
            ".w__a::before, .w__b:not(.w__c) {}"
        );
    }

    #[test]
    fn test_statement_at_rules() {
        assert_eq!(
            rewrite("@import url(\"base.css\");\n.a {}"),
            "@import url(\"base.css\");\n.w__a {}"
        );
    }

    #[test]
    fn test_unclosed_block() {
        let (line, column, message) = parse_error(".a { color: red;");
        assert_eq!((line, column), (1, 4));
        assert_eq!(message, "Unclosed block");
    }

    #[test]
    fn test_unexpected_close_brace() {
        let (line, column, _) = parse_error(".a {}\n}");
        assert_eq!((line, column), (2, 1));
    }

    #[test]
    fn test_unterminated_comment() {
        let (line, column, message) = parse_error(".a {} /* .b {}");
        assert_eq!((line, column), (1, 7));
        assert_eq!(message, "Unterminated comment");
    }

    #[test]
    fn test_unterminated_string() {
        let (line, column, message) = parse_error(".a { content: \"x; }");
        assert_eq!((line, column), (1, 15));
        assert_eq!(message, "Unterminated string");
    }

    #[test]
    fn test_unclosed_global() {
        let (line, column, _) = parse_error(".a :global(.b {}");
        assert_eq!((line, column), (1, 4));
    }
}
