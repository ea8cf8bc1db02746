//! Glob matching over object keys
//!
//! `*` and `?` never cross a `/`; `**` matches any number of segments.

use crate::error::{Error, Result};
use regex::Regex;

/// Compiled glob pattern
#[derive(Debug, Clone)]
pub struct GlobPattern {
    pattern: String,
    regex: Regex,
    literal_prefix: String,
}

impl GlobPattern {
    /// Compile a glob such as `song_data/*/*/*/*.json`
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = pattern.trim_start_matches('/');
        if pattern.is_empty() {
            return Err(Error::config("Glob pattern is empty"));
        }

        let mut re = String::with_capacity(pattern.len() * 2 + 2);
        re.push('^');
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '*' if chars.peek() == Some(&'*') => {
                    chars.next();
                    // `**/` also matches zero segments
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        re.push_str("(?:.*/)?");
                    } else {
                        re.push_str(".*");
                    }
                }
                '*' => re.push_str("[^/]*"),
                '?' => re.push_str("[^/]"),
                other => re.push_str(&regex::escape(&other.to_string())),
            }
        }
        re.push('$');

        let regex = Regex::new(&re)
            .map_err(|e| Error::config(format!("Invalid glob pattern '{pattern}': {e}")))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            literal_prefix: literal_prefix(pattern),
        })
    }

    /// The pattern as given
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Leading directory segments that contain no wildcard
    ///
    /// Listing can start here instead of at the store root.
    pub fn literal_prefix(&self) -> &str {
        &self.literal_prefix
    }

    /// Test a key relative to the location's base prefix
    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

fn literal_prefix(pattern: &str) -> String {
    let segments: Vec<&str> = pattern.split('/').collect();
    let literal: Vec<&str> = segments
        .iter()
        .take(segments.len().saturating_sub(1))
        .take_while(|s| !s.contains(['*', '?']))
        .copied()
        .collect();
    literal.join("/")
}
