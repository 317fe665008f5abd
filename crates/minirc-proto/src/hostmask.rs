//! Hostmask matching.
//!
//! O-lines and other masks use fnmatch semantics: `*` matches any run,
//! `?` one character, `[...]` a character class. Hostnames compare
//! case-insensitively.

use glob::{MatchOptions, Pattern};

/// Match `mask` (e.g. `nick!user@host`) against a glob `pattern`.
///
/// Returns false for patterns that fail to compile.
pub fn matches(pattern: &str, mask: &str) -> bool {
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };
    Pattern::new(pattern)
        .map(|p| p.matches_with(mask, options))
        .unwrap_or(false)
}
