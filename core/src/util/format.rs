//! Flat `key=value` property file format.
//!
//! Reads the usual property file syntax (comments, `=`/`:`/whitespace
//! separators, backslash escapes and line continuations) and writes one
//! `key=value` line per entry.

use crate::{
    error::{Error, Result},
    properties::PropertySet,
};
use std::str::Chars;

/// Parses property file text into an ordered set
/// ```
/// use gruntr::util::format::parse_properties;
/// let set = parse_properties("# comment\ndb.password = hunter2\nname:app\n").unwrap();
/// assert_eq!(set.get("db.password"), Some("hunter2"));
/// assert_eq!(set.get("name"), Some("app"));
/// ```
pub fn parse_properties(text: &str) -> Result<PropertySet, Error> {
    let mut set = PropertySet::new();
    let mut lines = text.lines().enumerate();

    while let Some((lineno, raw)) = lines.next() {
        let first = raw.trim_start();
        if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
            continue;
        }
        // join continuation lines
        let mut logical = String::from(first);
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start()),
                None => break,
            }
        }
        let (key, value) = split_entry(&logical);
        let key = unescape(key).map_err(|e| line_error(lineno, e))?;
        let value = unescape(value).map_err(|e| line_error(lineno, e))?;
        set.put(key, value);
    }
    Ok(set)
}

/// Formats the set as property file text, preserving entry order
/// ```
/// use gruntr::{properties::PropertySet, util::format::format_properties};
/// let mut set = PropertySet::new();
/// set.put("db.password", "vault:v1:abc=");
/// assert_eq!(format_properties(&set), "db.password=vault:v1:abc=\n");
/// ```
pub fn format_properties(set: &PropertySet) -> String {
    let mut out = String::new();
    for (key, value) in set.iter() {
        escape_into(&mut out, key, true);
        out.push('=');
        escape_into(&mut out, value, false);
        out.push('\n');
    }
    out
}

fn line_error(lineno: usize, msg: String) -> Error {
    Error::Format(format!("line {}: {}", lineno + 1, msg))
}

/// odd number of trailing backslashes means the line continues
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Splits a logical line into (raw key, raw value). Escapes are still present.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }
    let key = &line[..key_end];
    let rest = line[key_end..].trim_start_matches(|c| c == ' ' || c == '\t' || c == '\x0c');
    let rest = match rest.chars().next() {
        Some('=') | Some(':') => rest[1..].trim_start_matches(|c| c == ' ' || c == '\t' || c == '\x0c'),
        _ => rest,
    };
    (key, rest)
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => out.push(unicode_escape(&mut chars)?),
            Some(other) => out.push(other),
            // trailing lone backslash (continuation at end of input)
            None => {}
        }
    }
    Ok(out)
}

/// Exactly four ASCII hex digits
fn hex4(chars: &mut Chars<'_>) -> Result<u16, String> {
    let hex: String = chars.by_ref().take(4).collect();
    if hex.len() != 4 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("malformed \\uxxxx escape '\\u{}'", hex));
    }
    u16::from_str_radix(&hex, 16).map_err(|_| format!("malformed \\uxxxx escape '\\u{}'", hex))
}

/// Decodes the digits after `\u`. A high surrogate must be followed by a
/// `\u` low surrogate; the pair is one character.
fn unicode_escape(chars: &mut Chars<'_>) -> Result<char, String> {
    let unit = hex4(chars)?;
    let code = match unit {
        0xD800..=0xDBFF => {
            let mut rest = chars.clone();
            let low = match (rest.next(), rest.next()) {
                (Some('\\'), Some('u')) => hex4(&mut rest)?,
                _ => return Err(format!("unpaired surrogate '\\u{:04x}'", unit)),
            };
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(format!("unpaired surrogate '\\u{:04x}'", unit));
            }
            *chars = rest;
            0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00)
        }
        0xDC00..=0xDFFF => return Err(format!("unpaired surrogate '\\u{:04x}'", unit)),
        _ => u32::from(unit),
    };
    std::char::from_u32(code).ok_or_else(|| format!("invalid unicode escape '\\u{:04x}'", unit))
}

fn escape_into(out: &mut String, s: &str, is_key: bool) {
    for (i, c) in s.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' if is_key => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
}
