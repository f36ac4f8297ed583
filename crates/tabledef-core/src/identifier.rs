//! Identifier and string literal codec
//!
//! Converts between the quoted textual form used by `SHOW CREATE TABLE`
//! and plain strings. Backtick-quoted identifiers only escape the quote
//! mark itself (by doubling it). Single- and double-quoted string literals
//! additionally use the backslash escapes MariaDB writes for comments.

use crate::{Result, TableDefError};

const BACKTICK: char = '`';

/// Wrap `name` in backticks, doubling any backtick inside it.
///
/// An empty name is returned unchanged.
///
/// ```
/// use tabledef_core::quote_identifier;
///
/// assert_eq!(quote_identifier("users"), "`users`");
/// assert_eq!(quote_identifier("we`ird"), "`we``ird`");
/// assert_eq!(quote_identifier(""), "");
/// ```
pub fn quote_identifier(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push(BACKTICK);
    for ch in name.chars() {
        if ch == BACKTICK {
            quoted.push(BACKTICK);
        }
        quoted.push(ch);
    }
    quoted.push(BACKTICK);
    quoted
}

/// Strip the surrounding quote marks from an identifier or string literal.
///
/// The quote mark is taken from the first character and may be a backtick,
/// a single quote or a double quote. Doubled quote marks collapse to one.
/// String literals also have their backslash escapes resolved.
///
/// Input that does not start and end with the same quote mark is rejected
/// with [`TableDefError::InvalidIdentifier`].
///
/// ```
/// use tabledef_core::unquote_identifier;
///
/// assert_eq!(unquote_identifier("`my``col`").unwrap(), "my`col");
/// assert_eq!(unquote_identifier("'it''s'").unwrap(), "it's");
/// assert!(unquote_identifier("plain").is_err());
/// ```
pub fn unquote_identifier(quoted: &str) -> Result<String> {
    let quote = match quoted.chars().next() {
        Some(ch @ (BACKTICK | '\'' | '"')) => ch,
        _ => {
            return Err(TableDefError::InvalidIdentifier(format!(
                "{quoted:?} does not start with a quote mark"
            )));
        }
    };
    if quoted.len() < 2 || !quoted.ends_with(quote) {
        return Err(TableDefError::InvalidIdentifier(format!(
            "{quoted:?} is not terminated by {quote}"
        )));
    }

    let inner = &quoted[1..quoted.len() - 1];
    let resolve_backslash = quote != BACKTICK;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == quote && chars.peek() == Some(&quote) {
            chars.next();
            out.push(quote);
        } else if resolve_backslash && ch == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('0') => out.push('\0'),
                Some('Z') => out.push('\x1a'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    Ok(out)
}

/// Escape every single quote as `\'`.
pub fn escape_single_quote(value: &str) -> String {
    value.replace('\'', "\\'")
}

/// Render `value` as a single-quoted SQL string literal that
/// [`unquote_identifier`] decodes back to `value`.
///
/// Line breaks, tabs and NUL are written as backslash escapes so the
/// literal always stays on one line.
pub fn quote_string_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\0' => escaped.push_str("\\0"),
            '\x1a' => escaped.push_str("\\Z"),
            other => escaped.push(other),
        }
    }
    format!("'{}'", escape_single_quote(&escaped))
}
