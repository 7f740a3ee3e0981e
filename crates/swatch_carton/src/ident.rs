//! CSS identifier helpers.
//!
//! Emitted class names are built only from identifier-safe characters, so
//! they can be written into a stylesheet without escaping.

/// Whether `c` may appear unescaped inside a CSS identifier.
#[inline]
pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

/// Whether `c` may start a CSS identifier (after an optional `-`).
#[inline]
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Append `s` to `out`, replacing every non-identifier character with `_`.
pub fn push_sanitized(out: &mut String, s: &str) {
    out.extend(s.chars().map(|c| if is_ident_char(c) { c } else { '_' }));
}

/// Whether `s` would not start a valid identifier and needs a `_` prefix.
pub fn needs_prefix(s: &str) -> bool {
    match s.as_bytes() {
        [] | [b'-'] => true,
        [d, ..] if d.is_ascii_digit() => true,
        [b'-', b'-', ..] => true,
        [b'-', d, ..] if d.is_ascii_digit() => true,
        _ => false,
    }
}

/// Turn a sanitized name into a valid identifier, prefixing `_` when needed.
pub fn into_css_ident(name: String) -> String {
    if needs_prefix(&name) {
        let mut out = String::with_capacity(name.len() + 1);
        out.push('_');
        out.push_str(&name);
        out
    } else {
        name
    }
}

/// Decode CSS escapes (`\31 0`, `\.`) in a raw identifier.
pub fn unescape_ident(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let mut code = 0u32;
        let mut digits = 0;
        while digits < 6 {
            match chars.peek().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    code = code * 16 + d;
                    digits += 1;
                    chars.next();
                }
                None => break,
            }
        }

        if digits > 0 {
            if matches!(chars.peek(), Some(' ' | '\t' | '\n')) {
                chars.next();
            }
            let decoded = match code {
                0 => None,
                _ => char::from_u32(code),
            };
            out.push(decoded.unwrap_or('\u{FFFD}'));
        } else if let Some(next) = chars.next() {
            out.push(next);
        }
    }
    out
}
