//! Common utilities for channel adapters

/// Maximum length of text to log (to prevent sensitive data exposure)
pub const MAX_LOG_TEXT_LENGTH: usize = 50;

/// Discord message character limit
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Patterns that indicate potentially sensitive content
pub const SENSITIVE_PATTERNS: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "token",
    "api_key",
    "apikey",
    "api-key",
    "bearer",
    "authorization",
    "credential",
    "private",
    "-----begin",
];

/// Mask potentially sensitive text for logging
///
/// Checks for sensitive patterns and truncates long messages
/// to prevent accidental exposure of sensitive data in logs.
///
/// # Examples
/// ```
/// use hive_channels::util::mask_for_logging;
///
/// // Sensitive content is redacted
/// assert!(mask_for_logging("my password is secret123").contains("REDACTED"));
///
/// // Normal short messages pass through
/// assert_eq!(mask_for_logging("Hello"), "Hello");
/// ```
#[must_use]
pub fn mask_for_logging(text: &str) -> String {
    let lower = text.to_lowercase();

    if SENSITIVE_PATTERNS.iter().any(|p| lower.contains(p)) {
        return "[REDACTED - potentially sensitive content]".to_string();
    }

    if text.chars().count() > MAX_LOG_TEXT_LENGTH {
        let head: String = text.chars().take(MAX_LOG_TEXT_LENGTH).collect();
        format!("{}...[truncated]", head)
    } else {
        text.to_string()
    }
}

/// Split `text` into pieces of at most `limit` characters.
///
/// Prefers to break after a newline, then after a space; never splits a
/// character.
///
/// # Examples
/// ```
/// use hive_channels::util::chunk_message;
///
/// assert_eq!(chunk_message("short", 2000), vec!["short"]);
/// assert_eq!(chunk_message("ab\ncd", 3), vec!["ab\n", "cd"]);
/// ```
#[must_use]
pub fn chunk_message(text: &str, limit: usize) -> Vec<&str> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > limit {
        let hard = rest
            .char_indices()
            .nth(limit)
            .map_or(rest.len(), |(i, _)| i);
        let window = &rest[..hard];
        let cut = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .map_or(hard, |i| i + 1);
        chunks.push(&rest[..cut]);
        rest = &rest[cut..];
    }
    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}
