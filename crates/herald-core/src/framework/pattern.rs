//! Respond-pattern compiler.
//!
//! `robot.respond(...)` listeners only fire when the agent is addressed
//! directly ("hubname: do something", "@hubname do something"). This module
//! compiles the caller's pattern, which matches the remainder of the utterance
//! after the address, into the full directed-at-me expression.
//!
//! # Flag Handling
//!
//! An inline flag group at the start of the caller's pattern (for example
//! `(?i)` or `(?im)`) plays the role of regex modifiers: it is split off the
//! body and re-applied at the front of the composed pattern, so it governs
//! the injected address prefix as well.

use regex::Regex;
use tracing::warn;

use crate::foundation::error::{PatternError, PatternResult};

/// Compiles a directed-at-me pattern from the agent's name and alias.
///
/// The composed expression is `^\s*[@]?<addr>[:,]?\s*(?:<body>)`, where
/// `<addr>` is the escaped name, or an alternation of name and alias ordered
/// longest-first. Longest-first ordering matters when one of the two is a
/// prefix of the other: an alias "hal" inside a name "hal9000" must not
/// truncate the match and leak "9000:" into the body.
///
/// # Example
///
/// ```rust,ignore
/// let re = respond_pattern(r"(?i)open the (.*) doors", "Hal9000", Some("Hal"))?;
/// assert!(re.is_match("hal9000: open the pod bay doors"));
/// assert!(re.is_match("@hal open the pod bay doors"));
/// ```
pub fn respond_pattern(pattern: &str, name: &str, alias: Option<&str>) -> PatternResult<Regex> {
    let (flags, body) = split_inline_flags(pattern);

    if body.starts_with('^') {
        warn!(
            pattern = body,
            "anchors are not recommended in respond patterns; the compiled \
             pattern already anchors at the address prefix"
        );
    }

    let name = regex::escape(name);
    let composed = match alias {
        None => format!("{flags}^\\s*[@]?{name}[:,]?\\s*(?:{body})"),
        Some(alias) => {
            let alias = regex::escape(alias);
            // Longest alternative first, so the engine never settles for the
            // shorter address when the longer one is present.
            let (first, second) = if name.len() > alias.len() {
                (name, alias)
            } else {
                (alias, name)
            };
            format!("{flags}^\\s*[@]?(?:{first}[:,]?|{second}[:,]?)\\s*(?:{body})")
        }
    };

    Regex::new(&composed).map_err(PatternError::from)
}

/// Splits a leading inline flag group off a pattern.
///
/// Returns `("", pattern)` when the pattern does not start with a pure flag
/// group. A scoped group like `(?i:...)` is left in the body untouched.
fn split_inline_flags(pattern: &str) -> (&str, &str) {
    if let Some(rest) = pattern.strip_prefix("(?")
        && let Some(end) = rest.find(')')
    {
        let flags = &rest[..end];
        if !flags.is_empty() && flags.chars().all(|c| "imsxuUR-".contains(c)) {
            let split = end + 3;
            return (&pattern[..split], &pattern[split..]);
        }
    }
    ("", pattern)
}
