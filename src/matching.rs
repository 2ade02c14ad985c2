//! Shared matching primitive.
//!
//! One [`pattern_matches`] function serves host matching, segment matching
//! and credential-query lookup; the three call sites must never diverge.
//!
//! Pattern forms:
//! - `/…/` - the interior is a regular expression, matched against the whole
//!   value;
//! - contains `*` - a glob; each `*` matches a run of word characters,
//!   digits, `_` or `-`;
//! - anything else - exact string equality.

use regex::Regex;

/// Escape table letting glob/regex metacharacters survive transit through a
/// generic URL parser. Applied before parsing, reversed after extraction.
const ESCAPES: &[(&str, &str)] = &[
    ("_OQ_", "["),
    ("_CQ_", "]"),
    ("_PL_", "+"),
    ("_ST_", "*"),
    ("_LN_", "-"),
    ("_OB_", "("),
    ("_CB_", ")"),
    ("_ESC_", "\\"),
];

/// What a `*` expands to in glob patterns.
const GLOB_CLASS: &str = r"[\w\d_\-]*";

/// Replaces URL-hostile metacharacters with sentinel tokens.
#[must_use]
pub fn escape_meta(text: &str) -> String {
    let mut result = text.to_string();
    for (sentinel, literal) in ESCAPES {
        result = result.replace(literal, sentinel);
    }
    result
}

/// Restores metacharacters from their sentinel tokens.
#[must_use]
pub fn unescape_meta(text: &str) -> String {
    let mut result = text.to_string();
    for (sentinel, literal) in ESCAPES {
        result = result.replace(sentinel, literal);
    }
    result
}

/// Matches `value` against `pattern` using regex, glob or exact semantics.
///
/// An uncompilable regex matches nothing: the overlay algorithm built on top
/// of this primitive must stay a total function.
#[must_use]
pub fn pattern_matches(pattern: &str, value: &str) -> bool {
    if pattern.len() >= 2 && pattern.starts_with('/') && pattern.ends_with('/') {
        return full_match(&pattern[1..pattern.len() - 1], value);
    }
    if pattern.contains('*') {
        return full_match(&pattern.replace('*', GLOB_CLASS), value);
    }
    pattern == value
}

fn full_match(body: &str, value: &str) -> bool {
    Regex::new(&format!("^(?:{body})$")).is_ok_and(|re| re.is_match(value))
}
