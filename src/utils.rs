//! String comparison helpers shared by filtering and ordering.

use std::cmp::Ordering;

/// Compare two strings case-insensitively without allocating.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Check whether `haystack` contains `needle`, ignoring the haystack's
/// case. The needle should already be lowercased.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
