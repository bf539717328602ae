//! Escaping for double-quoted array elements.
//!
//! Inside a quoted element PostgreSQL only treats `\` and `"` specially, so
//! escaping prefixes each of them with a backslash and leaves everything
//! else untouched. Unescaping is applied to quoted elements only; bare
//! elements cannot contain either character.

use std::borrow::Cow;

/// Escape `raw` for placement between double quotes in an array literal.
pub fn escape_element(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['\\', '"']) {
        return Cow::Borrowed(raw);
    }

    let mut escaped = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        if c == '\\' || c == '"' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

/// Number of bytes `escape_element(raw)` occupies.
pub fn escaped_len(raw: &str) -> usize {
    raw.len() + raw.bytes().filter(|b| matches!(b, b'\\' | b'"')).count()
}

/// Reverse `escape_element`: `\\` becomes `\` and `\"` becomes `"`.
///
/// A backslash followed by any other character, or trailing at the end of
/// the input, is kept as is.
pub fn unescape_element(escaped: &str) -> Cow<'_, str> {
    if !escaped.contains('\\') {
        return Cow::Borrowed(escaped);
    }

    let mut raw = String::with_capacity(escaped.len());
    let mut chars = escaped.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next @ ('\\' | '"')) = chars.peek() {
                raw.push(next);
                chars.next();
                continue;
            }
        }
        raw.push(c);
    }
    Cow::Owned(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_quote_and_backslash() {
        assert_eq!(
            escape_element(r#"he said "hi"\now"#),
            r#"he said \"hi\"\\now"#
        );
    }

    #[test]
    fn test_escape_leaves_delimiters_alone() {
        assert_eq!(escape_element("a,b{c}"), "a,b{c}");
        assert!(matches!(escape_element("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escaped_len_matches() {
        for raw in ["", "plain", r#"\"#, r#""""#, "multi\u{e9}byte\\"] {
            assert_eq!(escaped_len(raw), escape_element(raw).len(), "{raw}");
        }
    }

    #[test]
    fn test_unescape_reverses_escape() {
        for raw in ["", r#"a\b"#, r#""quoted""#, r#"\\"#, "tail\\"] {
            assert_eq!(unescape_element(&escape_element(raw)), raw);
        }
    }

    #[test]
    fn test_unescape_keeps_other_backslashes() {
        assert_eq!(unescape_element(r#"a\nb"#), r#"a\nb"#);
        assert_eq!(unescape_element("end\\"), "end\\");
    }
}
