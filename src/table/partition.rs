//! Hive-style partition directory names
//!
//! A partition directory is `column=value`. Values are %-escaped with the
//! same character set Hive uses, and a null value is written as
//! `__HIVE_DEFAULT_PARTITION__`.

use regex::Regex;
use std::fmt::Write as _;
use std::sync::LazyLock;

/// Directory value used for a null partition key
pub const DEFAULT_PARTITION_NAME: &str = "__HIVE_DEFAULT_PARTITION__";

static ESCAPE_SEQUENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("%([0-9A-Fa-f]{2})").unwrap());

fn needs_escape(c: char) -> bool {
    matches!(
        c,
        '\u{01}'..='\u{1F}'
            | '"'
            | '#'
            | '%'
            | '\''
            | '*'
            | '/'
            | ':'
            | '='
            | '?'
            | '\\'
            | '\u{7F}'
            | '{'
            | '['
            | ']'
            | '^'
    )
}

/// Escape a partition value for use in a directory name
pub fn escape_partition_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if needs_escape(c) {
            let _ = write!(escaped, "%{:02X}", c as u32);
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// Reverse `escape_partition_value`
pub fn unescape_partition_value(value: &str) -> String {
    ESCAPE_SEQUENCE
        .replace_all(value, |caps: &regex::Captures<'_>| {
            u8::from_str_radix(&caps[1], 16)
                .map(|b| char::from(b).to_string())
                .unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// Build one `column=value` directory segment
pub fn partition_segment(column: &str, value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => format!(
            "{}={}",
            escape_partition_value(column),
            escape_partition_value(v)
        ),
        _ => format!("{}={DEFAULT_PARTITION_NAME}", escape_partition_value(column)),
    }
}

/// Parse a directory segment back into column and value
///
/// Returns `None` for segments that are not `column=value`.
pub fn parse_partition_segment(segment: &str) -> Option<(String, Option<String>)> {
    let (column, value) = segment.split_once('=')?;
    if column.is_empty() {
        return None;
    }
    let value = if value == DEFAULT_PARTITION_NAME {
        None
    } else {
        Some(unescape_partition_value(value))
    };
    Some((unescape_partition_value(column), value))
}
