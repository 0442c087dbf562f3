//! Textual `@name` mentions

use crate::profile::Roster;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Pre-compiled regex for @mention tokens (e.g., "@writer please draft")
static MENTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w@])@([\w-]+)").expect("MENTION_REGEX is a compile-time constant")
});

/// Broadcast tokens that address the whole team
const BROADCAST_TOKENS: &[&str] = &["everyone", "here"];

/// Roster agents addressed in `text`, by canonical name.
///
/// `@everyone` and `@here` address every agent; unknown names are ignored.
#[must_use]
pub fn extract_mentions(text: &str, roster: &Roster) -> BTreeSet<String> {
    let mut mentions = BTreeSet::new();
    for capture in MENTION_REGEX.captures_iter(text) {
        let token = &capture[1];
        if BROADCAST_TOKENS.iter().any(|b| b.eq_ignore_ascii_case(token)) {
            mentions.extend(roster.names().map(str::to_string));
        } else if let Some(name) = roster.resolve(token) {
            mentions.insert(name.to_string());
        }
    }
    mentions
}
