// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Line-oriented properties text format.
//!
//! # Reading
//!
//! - Lines whose first non-blank character is `#` or `!` are comments.
//! - The key ends at the first unescaped `=`, `:` or blank; blanks around
//!   the separator are skipped.
//! - A line ending in an odd number of backslashes continues on the next
//!   line, whose leading blanks are dropped.
//! - Escapes: `\t \n \r \f \uXXXX`; any other escaped character stands for
//!   itself.
//!
//! # Writing
//!
//! One `key=value` line per entry, in store order. Separators, comment
//! markers, backslashes, control and non-ASCII characters are escaped, as
//! are all spaces in keys and the leading spaces of values.

use crate::PropertiesError;
use hvalues::FlatMap;
use std::io::{self, BufRead, Read, Write};

/// Parse properties text into an insertion-ordered store.
pub fn parse(text: &str) -> Result<FlatMap, PropertiesError> {
    let mut store = FlatMap::new();
    let mut logical = String::new();
    let mut start_line = 0;
    let mut continuing = false;

    for (n, line) in text.lines().enumerate() {
        let line = line.trim_start_matches(is_blank);
        if !continuing {
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            start_line = n + 1;
        }

        let trailing = line.chars().rev().take_while(|&c| c == '\\').count();
        if trailing % 2 == 1 {
            logical.push_str(&line[..line.len() - 1]);
            continuing = true;
            continue;
        }

        logical.push_str(line);
        continuing = false;
        let (key, value) = split_entry(&logical, start_line)?;
        store.insert(key, value);
        logical.clear();
    }

    if continuing {
        let (key, value) = split_entry(&logical, start_line)?;
        store.insert(key, value);
    }
    log::trace!("[properties] parsed {} entries", store.len());
    Ok(store)
}

/// Read properties text from `reader`.
pub fn read<R: BufRead>(mut reader: R) -> Result<FlatMap, PropertiesError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse(&text)
}

/// Write `store` as properties text.
///
/// Each line of `header` is emitted as a `#` comment before the entries.
pub fn write<W: Write>(store: &FlatMap, header: Option<&str>, mut out: W) -> io::Result<()> {
    if let Some(header) = header {
        for line in header.lines() {
            writeln!(out, "#{}", line)?;
        }
    }
    for (key, value) in store.iter() {
        writeln!(out, "{}={}", escape(key, true), escape(value, false))?;
    }
    out.flush()
}

/// Render `store` as properties text without a header.
pub fn to_string(store: &FlatMap) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write(store, None, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

fn split_entry(logical: &str, line: usize) -> Result<(String, String), PropertiesError> {
    let mut chars = logical.char_indices().peekable();
    let mut key_end = logical.len();
    let mut value_start = logical.len();

    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
            continue;
        }
        if c == '=' || c == ':' || is_blank(c) {
            key_end = i;
            let mut hard = !is_blank(c);
            value_start = logical.len();
            while let Some(&(j, d)) = chars.peek() {
                if is_blank(d) {
                    chars.next();
                } else if !hard && (d == '=' || d == ':') {
                    hard = true;
                    chars.next();
                } else {
                    value_start = j;
                    break;
                }
            }
            break;
        }
    }

    let key = unescape(&logical[..key_end], line)?;
    let value = unescape(&logical[value_start..], line)?;
    Ok((key, value))
}

fn unescape(raw: &str, line: usize) -> Result<String, PropertiesError> {
    let mut out = String::with_capacity(raw.len());
    let mut units: Vec<u16> = Vec::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_units(&mut units, &mut out);
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            break;
        };
        if escaped == 'u' {
            let hex: String = chars.by_ref().take(4).collect();
            let unit = if hex.len() == 4 && hex.chars().all(|h| h.is_ascii_hexdigit()) {
                u16::from_str_radix(&hex, 16).ok()
            } else {
                None
            };
            match unit {
                Some(unit) => units.push(unit),
                None => {
                    return Err(PropertiesError::Malformed {
                        line,
                        reason: format!("malformed \\uXXXX escape '\\u{}'", hex),
                    })
                }
            }
            continue;
        }
        flush_units(&mut units, &mut out);
        out.push(match escaped {
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            'f' => '\x0c',
            other => other,
        });
    }
    flush_units(&mut units, &mut out);
    Ok(out)
}

/// `\uXXXX` escapes are UTF-16 code units; consecutive ones may form a
/// surrogate pair.
fn flush_units(units: &mut Vec<u16>, out: &mut String) {
    if units.is_empty() {
        return;
    }
    out.extend(
        char::decode_utf16(units.drain(..)).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)),
    );
}

fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut leading = true;
    for c in text.chars() {
        if c != ' ' {
            leading = false;
        }
        match c {
            ' ' if is_key || leading => out.push_str("\\ "),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '\\' | '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => {
                let mut buf = [0u16; 2];
                for unit in c.encode_utf16(&mut buf) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(store: &FlatMap) -> Vec<(&str, &str)> {
        store.iter().collect()
    }

    #[test]
    fn test_separators_and_comments() {
        let text = "# comment\n! also comment\n\na=1\nb: 2\nc 3\n  d = 4\ne\n";
        let store = parse(text).expect("parse");
        assert_eq!(
            entries(&store),
            vec![("a", "1"), ("b", "2"), ("c", "3"), ("d", "4"), ("e", "")]
        );
    }

    #[test]
    fn test_blank_then_hard_separator() {
        let store = parse("key  =  value\nother :x").expect("parse");
        assert_eq!(store.get("key"), Some("value"));
        assert_eq!(store.get("other"), Some("x"));
    }

    #[test]
    fn test_value_keeps_later_separators() {
        let store = parse("url=http://host:80/a=b").expect("parse");
        assert_eq!(store.get("url"), Some("http://host:80/a=b"));
    }

    #[test]
    fn test_line_continuation() {
        let text = "list = one, \\\n       two, \\\n       three\nnext=1";
        let store = parse(text).expect("parse");
        assert_eq!(store.get("list"), Some("one, two, three"));
        assert_eq!(store.get("next"), Some("1"));
    }

    #[test]
    fn test_even_backslashes_do_not_continue() {
        let store = parse("dir=C:\\\\\nnext=1").expect("parse");
        assert_eq!(store.get("dir"), Some("C:\\"));
        assert_eq!(store.get("next"), Some("1"));
    }

    #[test]
    fn test_escapes() {
        let store = parse("a\\ b\\=c=x\\ty\\u00e9\\#\nsmile=\\uD83D\\uDE00").expect("parse");
        assert_eq!(store.get("a b=c"), Some("x\ty\u{e9}#"));
        assert_eq!(store.get("smile"), Some("\u{1F600}"));
    }

    #[test]
    fn test_malformed_unicode_escape() {
        let err = parse("ok=1\nbad=\\u12G4").unwrap_err();
        assert!(matches!(err, PropertiesError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_later_duplicate_wins() {
        let store = parse("a=1\nb=2\na=3").expect("parse");
        assert_eq!(entries(&store), vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_escape_on_write() {
        let store: FlatMap = [
            ("plain.key", "value"),
            ("odd key:=", "  lead and trail  "),
            ("unicode", "caf\u{e9} \u{1F600}"),
            ("ctl", "a\nb\\c#d"),
        ]
        .into_iter()
        .collect();
        let text = to_string(&store);
        assert_eq!(
            text,
            "plain.key=value\n\
             odd\\ key\\:\\==\\ \\ lead and trail  \n\
             unicode=caf\\u00E9 \\uD83D\\uDE00\n\
             ctl=a\\nb\\\\c\\#d\n"
        );
        assert_eq!(parse(&text).expect("reparse"), store);
    }

    #[test]
    fn test_header_lines_are_comments() {
        let store: FlatMap = [("a", "1")].into_iter().collect();
        let mut buf = Vec::new();
        write(&store, Some("first\nsecond"), &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text, "#first\n#second\na=1\n");
        assert_eq!(parse(&text).expect("reparse"), store);
    }
}
