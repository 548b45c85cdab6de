//! # Homie Identifiers
//!
//! Homie topic segments are restricted to lowercase ASCII letters, digits and
//! hyphens. This module validates caller-supplied ids, turns arbitrary labels
//! (metadata keys, display names) into such segments, and derives the default
//! display name of a device, node or property from its id.

use alloc::string::String;

/// Returns `true` if `id` matches `[a-z0-9][a-z0-9-]*`.
pub fn is_valid(id: &str) -> bool {
    let mut bytes = id.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_lowercase() || first.is_ascii_digit() => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Converts a human label into a topic-segment identifier.
///
/// The label is lower-cased, Polish diacritics are folded to their ASCII base
/// letter, every remaining character outside `[a-z0-9]` becomes `-`, and leading
/// hyphens are stripped. Trailing and repeated hyphens are kept as they are.
///
/// ```
/// assert_eq!(myrtio_homie::id::normalize("Zażółć gęślą"), "zazolc-gesla");
/// assert_eq!(myrtio_homie::id::normalize("  Main key"), "main-key");
/// ```
pub fn normalize(label: &str) -> String {
    let normalized: String = label
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_diacritic)
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            }
        })
        .collect();
    String::from(normalized.trim_start_matches('-'))
}

fn fold_diacritic(c: char) -> char {
    match c {
        'ą' => 'a',
        'ć' => 'c',
        'ę' => 'e',
        'ł' => 'l',
        'ń' => 'n',
        'ó' => 'o',
        'ś' => 's',
        'ź' | 'ż' => 'z',
        other => other,
    }
}

/// Derives a display name from an id: the first character is upper-cased, the
/// rest lower-cased, and hyphens become spaces (`"test-device"` → `"Test device"`).
pub fn default_name(id: &str) -> String {
    let mut chars = id.chars();
    let mut name = String::with_capacity(id.len());
    if let Some(first) = chars.next() {
        name.extend(first.to_uppercase());
    }
    for c in chars.flat_map(char::to_lowercase) {
        name.push(if c == '-' { ' ' } else { c });
    }
    name
}
