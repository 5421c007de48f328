//! Bullet splitting for work-experience descriptions.
//!
//! Descriptions are carried as a list of bullets. Older payloads and some
//! provider responses still send one newline-joined block of text; both the
//! request deserializer and the response normalizer split it with the same rule.

/// Splits a newline-joined description into bullets.
///
/// Each line is trimmed; empty and whitespace-only lines are dropped.
pub fn split_bullets(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
