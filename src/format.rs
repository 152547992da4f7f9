//! Token-level text formatting of the wire format.
//!
//! # Strings
//! Strings are always double-quoted. The two-character escapes `\"`, `\\`, `\b`, `\f`, `\n`,
//! `\r` and `\t` are used where they exist; every other code point below 32 or above 127 is
//! written as one `\uXXXX` escape per UTF-16 code unit, so the output is pure ASCII.
//!
//! # Numbers
//! Numbers use Rust's `Display`, which is locale independent: the decimal separator is always
//! `.` and no grouping characters are emitted.

use std::borrow::Cow;
use std::fmt::Write;

use crate::error::{JsonError, Result};
use crate::reflect::Float;

/// Appends `text` to `out` as a quoted, escaped JSON string.
pub fn write_quoted(out: &mut String, text: &str) {
    out.reserve(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 32 || (c as u32) > 127 => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    // Writing into a String cannot fail.
                    let _ = write!(out, "\\u{unit:04x}");
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Returns `text` as a quoted, escaped JSON string.
pub fn quote(text: &str) -> String {
    let mut out = String::new();
    write_quoted(&mut out, text);
    out
}

/// Appends a float. Non-finite values have no JSON form and are written as `null`.
pub fn write_float(out: &mut String, value: Float) {
    let _ = match value {
        Float::F32(v) if v.is_finite() => write!(out, "{v}"),
        Float::F64(v) if v.is_finite() => write!(out, "{v}"),
        _ => write!(out, "null"),
    };
}

/// Resolves the escapes of a string body (the text between the quotes).
///
/// Borrows when the body contains no escapes.
pub fn unescape(body: &str) -> Result<Cow<'_, str>> {
    if !body.contains('\\') {
        return Ok(Cow::Borrowed(body));
    }

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let high = read_hex4(&mut chars)?;
                let code = if (0xD800..0xDC00).contains(&high) {
                    // A high surrogate must be followed by `\uDC00`..`\uDFFF`.
                    if chars.next() != Some('\\') || chars.next() != Some('u') {
                        return Err(JsonError::invalid_operation(format!(
                            "unpaired surrogate \\u{high:04x} in string"
                        )));
                    }
                    let low = read_hex4(&mut chars)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(JsonError::invalid_operation(format!(
                            "invalid low surrogate \\u{low:04x} in string"
                        )));
                    }
                    0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                } else {
                    high
                };
                let c = char::from_u32(code).ok_or_else(|| {
                    JsonError::invalid_operation(format!("invalid code point \\u{code:04x}"))
                })?;
                out.push(c);
            }
            Some(other) => {
                return Err(JsonError::invalid_operation(format!(
                    "invalid escape sequence \\{other} in string"
                )));
            }
            None => {
                return Err(JsonError::invalid_operation(
                    "string ends with a dangling escape",
                ));
            }
        }
    }
    Ok(Cow::Owned(out))
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Result<u32> {
    let mut code = 0;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| JsonError::invalid_operation("malformed \\u escape in string"))?;
        code = code * 16 + digit;
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_standard_escapes() {
        assert_eq!(quote("a\"b\\c\n"), r#""a\"b\\c\n""#);
        assert_eq!(quote("\u{8}\u{c}\r\t"), r#""\b\f\r\t""#);
    }

    #[test]
    fn escapes_control_and_non_ascii() {
        assert_eq!(quote("\u{1}"), r#""\u0001""#);
        assert_eq!(quote("é"), r#""\u00e9""#);
        assert_eq!(quote("😀"), r#""\ud83d\ude00""#);
        assert_eq!(quote("\u{7f}/"), "\"\u{7f}/\"");
    }

    #[test]
    fn unescape_reverses_quote() {
        let text = "tab\there \"q\" back\\slash é 😀 \u{1}";
        let quoted = quote(text);
        let body = &quoted[1..quoted.len() - 1];
        assert_eq!(unescape(body).expect("valid escapes"), text);
        assert_eq!(unescape(r"\/Date(0)\/").expect("valid"), "/Date(0)/");
    }

    #[test]
    fn unescape_rejects_malformed() {
        assert!(unescape(r"\x").is_err());
        assert!(unescape(r"\u12").is_err());
        assert!(unescape(r"\ud83d").is_err());
    }

    #[test]
    fn floats_are_invariant() {
        let mut out = String::new();
        write_float(&mut out, Float::F64(1234.5));
        out.push(' ');
        write_float(&mut out, Float::F32(0.1));
        out.push(' ');
        write_float(&mut out, Float::F64(f64::NAN));
        assert_eq!(out, "1234.5 0.1 null");
    }
}
