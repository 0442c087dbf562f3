//! Tool Call Parser
//!
//! Agents request tools with an inline bracketed form:
//!
//! ```text
//! [TOOL: gmail | action: send | params: to=a@b.com, subject=Hi]
//! ```
//!
//! Parsing is pure. Well-formed calls are returned in order and cut from the
//! residual text; malformed occurrences are reported as warnings and stay in
//! the residual verbatim, so one bad call never hides a good one.

use hive_tools::ToolParams;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Opening of a tool call: `[TOOL:` with any case and spacing
static TOOL_OPEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[\s*tool\s*:").expect("TOOL_OPEN_REGEX is a compile-time constant")
});

/// A parsed, not yet authorized, tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Tool name (trimmed, case preserved)
    pub tool_name: String,
    /// Action (lower-cased)
    pub action: String,
    /// Parameters
    pub params: ToolParams,
}

/// What was wrong with a malformed occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ParseWarningKind {
    /// No closing `]` before the next call or the end of text
    Unterminated,
    /// Empty tool name
    MissingToolName,
    /// No `action:` section or an empty action
    MissingAction,
    /// No `params:` section
    MissingParams,
    /// A parameter item without `=` or with an empty key
    MalformedParam(String),
    /// More `|`-separated sections than expected, or an unknown section
    UnexpectedSection(String),
}

impl fmt::Display for ParseWarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unterminated => f.write_str("missing closing ']'"),
            Self::MissingToolName => f.write_str("missing tool name"),
            Self::MissingAction => f.write_str("missing action"),
            Self::MissingParams => f.write_str("missing params"),
            Self::MalformedParam(item) => write!(f, "malformed param '{}'", item),
            Self::UnexpectedSection(section) => write!(f, "unexpected section '{}'", section),
        }
    }
}

/// A dropped, malformed tool call occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// The offending text as it appeared
    pub fragment: String,
    /// What was wrong
    pub kind: ParseWarningKind,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {:?}", self.kind, self.fragment)
    }
}

/// Result of parsing one agent output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOutput {
    /// Well-formed calls, in order of appearance
    pub calls: Vec<ToolCallRequest>,
    /// Text with well-formed calls removed, trimmed
    pub residual: String,
    /// One warning per malformed occurrence
    pub warnings: Vec<ParseWarning>,
}

/// Extract tool calls from agent output.
pub fn parse_tool_calls(text: &str) -> ParsedOutput {
    let mut output = ParsedOutput::default();
    let mut residual = String::with_capacity(text.len());
    let mut pos = 0;

    while let Some(open) = TOOL_OPEN_REGEX.find_at(text, pos) {
        residual.push_str(&text[pos..open.start()]);

        let close = closing_bracket(&text[open.end()..]).map(|i| open.end() + i);
        let next_open = TOOL_OPEN_REGEX
            .find_at(text, open.end())
            .map(|m| m.start());

        let close = match (close, next_open) {
            (Some(close), Some(next)) if next < close => None,
            (close, _) => close,
        };

        let Some(close) = close else {
            let end = next_open.unwrap_or(text.len());
            let fragment = &text[open.start()..end];
            output.warnings.push(ParseWarning {
                fragment: fragment.to_string(),
                kind: ParseWarningKind::Unterminated,
            });
            residual.push_str(fragment);
            pos = end;
            continue;
        };

        let fragment = &text[open.start()..=close];
        match parse_body(&text[open.end()..close]) {
            Ok(call) => output.calls.push(call),
            Err(kind) => {
                output.warnings.push(ParseWarning {
                    fragment: fragment.to_string(),
                    kind,
                });
                residual.push_str(fragment);
            }
        }
        pos = close + 1;
    }

    residual.push_str(&text[pos..]);
    output.residual = residual.trim().to_string();
    output
}

/// Offset of the `]` that closes a call body. Brackets inside the body nest,
/// so `body=see [1] below` stays whole; an unbalanced `[` falls back to the
/// first `]`.
fn closing_bracket(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '[' => depth += 1,
            ']' if depth == 0 => return Some(i),
            ']' => depth -= 1,
            _ => {}
        }
    }
    body.find(']')
}

/// Parse `name | action: x | params: k=v, ...` (the part after `[TOOL:`).
fn parse_body(body: &str) -> Result<ToolCallRequest, ParseWarningKind> {
    let sections: Vec<&str> = body.split('|').map(str::trim).collect();

    let tool_name = sections[0];
    if tool_name.is_empty() {
        return Err(ParseWarningKind::MissingToolName);
    }

    let action = sections
        .get(1)
        .and_then(|s| section_value(s, "action"))
        .map(str::to_lowercase)
        .filter(|a| !a.is_empty())
        .ok_or(ParseWarningKind::MissingAction)?;

    let raw_params = sections
        .get(2)
        .ok_or(ParseWarningKind::MissingParams)
        .and_then(|s| {
            section_value(s, "params")
                .ok_or_else(|| ParseWarningKind::UnexpectedSection((*s).to_string()))
        })?;

    if let Some(extra) = sections.get(3) {
        return Err(ParseWarningKind::UnexpectedSection((*extra).to_string()));
    }

    Ok(ToolCallRequest {
        tool_name: tool_name.to_string(),
        action,
        params: parse_params(raw_params)?,
    })
}

/// Value of a `label: value` section, matching the label case-insensitively.
fn section_value<'a>(section: &'a str, label: &str) -> Option<&'a str> {
    let (head, value) = section.split_once(':')?;
    head.trim()
        .eq_ignore_ascii_case(label)
        .then(|| value.trim())
}

fn parse_params(raw: &str) -> Result<ToolParams, ParseWarningKind> {
    let mut params = ToolParams::new();
    if raw.is_empty() {
        return Ok(params);
    }

    for item in raw.split(',') {
        let (key, value) = item
            .split_once('=')
            .map(|(k, v)| (k.trim(), v.trim()))
            .filter(|(k, _)| !k.is_empty())
            .ok_or_else(|| ParseWarningKind::MalformedParam(item.trim().to_string()))?;
        params.insert(key.to_string(), value.to_string());
    }

    Ok(params)
}

#[cfg(test)]
mod tests;
