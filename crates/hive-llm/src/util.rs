//! Common utilities for LLM providers

/// Minimum key length to display partial key
const MIN_KEY_LENGTH_FOR_PARTIAL_DISPLAY: usize = 8;

/// Number of characters to show at start/end of masked key
const KEY_MASK_VISIBLE_CHARS: usize = 4;

/// Sensitive patterns to filter from error messages
const SENSITIVE_PATTERNS: &[&str] = &[
    "api_key",
    "api-key",
    "apikey",
    "api key",
    "authorization",
    "bearer",
    "secret",
    "credential",
];

/// Mask API key for safe display in logs
///
/// # Examples
/// ```
/// use hive_llm::util::mask_api_key;
/// assert_eq!(mask_api_key("sk-1234567890abcdef"), "sk-1...cdef");
/// assert_eq!(mask_api_key("short"), "****");
/// ```
#[must_use]
pub fn mask_api_key(key: &str) -> String {
    if key.len() <= MIN_KEY_LENGTH_FOR_PARTIAL_DISPLAY || !key.is_ascii() {
        return "****".to_string();
    }
    format!(
        "{}...{}",
        &key[..KEY_MASK_VISIBLE_CHARS],
        &key[key.len() - KEY_MASK_VISIBLE_CHARS..]
    )
}

/// Strip provider error text that could leak credentials.
///
/// # Examples
/// ```
/// use hive_llm::util::sanitize_api_error;
/// assert_eq!(
///     sanitize_api_error("Invalid api_key provided"),
///     "API authentication error. Please check your API key."
/// );
/// assert_eq!(sanitize_api_error("model overloaded"), "model overloaded");
/// ```
#[must_use]
pub fn sanitize_api_error(error: &str) -> String {
    let lower = error.to_lowercase();

    if SENSITIVE_PATTERNS.iter().any(|p| lower.contains(p))
        || lower.contains("unauthorized")
        || lower.contains("authentication")
    {
        return "API authentication error. Please check your API key.".to_string();
    }

    if error.len() > 300 || error.contains("sk-") || error.contains("gsk_") {
        return "An API error occurred. Please try again.".to_string();
    }

    error.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("gsk_abcdefghijklmnop"), "gsk_...mnop");
        assert_eq!(mask_api_key("12345678"), "****");
        assert_eq!(mask_api_key(""), "****");
    }

    #[test]
    fn test_sanitize_hides_keys() {
        assert_eq!(
            sanitize_api_error("bad key sk-live-123"),
            "An API error occurred. Please try again."
        );
        assert_eq!(
            sanitize_api_error("401 Unauthorized"),
            "API authentication error. Please check your API key."
        );
        assert_eq!(sanitize_api_error("HTTP 500"), "HTTP 500");
    }
}
