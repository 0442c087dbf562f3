use super::*;

fn params(pairs: &[(&str, &str)]) -> ToolParams {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_single_call_with_residual() {
    let parsed = parse_tool_calls("Done. [TOOL: gmail | action: send | params: to=a@b.com, subject=Hi]");
    assert_eq!(
        parsed.calls,
        vec![ToolCallRequest {
            tool_name: "gmail".to_string(),
            action: "send".to_string(),
            params: params(&[("to", "a@b.com"), ("subject", "Hi")]),
        }]
    );
    assert_eq!(parsed.residual, "Done.");
    assert!(parsed.warnings.is_empty());
}

#[test]
fn test_no_calls() {
    let parsed = parse_tool_calls("  Just chatting, no tools here.  ");
    assert!(parsed.calls.is_empty());
    assert!(parsed.warnings.is_empty());
    assert_eq!(parsed.residual, "Just chatting, no tools here.");
}

#[test]
fn test_missing_action_and_params() {
    let parsed = parse_tool_calls("[TOOL: unknownfmt]");
    assert!(parsed.calls.is_empty());
    assert_eq!(parsed.warnings.len(), 1);
    assert_eq!(parsed.warnings[0].kind, ParseWarningKind::MissingAction);
    assert_eq!(parsed.warnings[0].fragment, "[TOOL: unknownfmt]");
    // Malformed occurrences stay visible
    assert_eq!(parsed.residual, "[TOOL: unknownfmt]");
}

#[test]
fn test_one_good_one_bad_keeps_order() {
    let text = "First [TOOL: gmail | action: read | params: folder=inbox] then \
                [TOOL: calendar | action: write] and \
                [TOOL: drive | action: List | params: path=/docs]";
    let parsed = parse_tool_calls(text);

    let names: Vec<_> = parsed.calls.iter().map(|c| c.tool_name.as_str()).collect();
    assert_eq!(names, vec!["gmail", "drive"]);
    assert_eq!(parsed.calls[1].action, "list");
    assert_eq!(parsed.warnings.len(), 1);
    assert_eq!(parsed.warnings[0].kind, ParseWarningKind::MissingParams);
    assert_eq!(
        parsed.residual,
        "First  then [TOOL: calendar | action: write] and"
    );
}

#[test]
fn test_whitespace_and_case_tolerance() {
    let parsed = parse_tool_calls("[ tool :  gmail|ACTION:SEND|  Params :to = x@y.z ,body= hi there ]");
    assert_eq!(parsed.calls.len(), 1);
    let call = &parsed.calls[0];
    assert_eq!(call.tool_name, "gmail");
    assert_eq!(call.action, "send");
    assert_eq!(call.params, params(&[("to", "x@y.z"), ("body", "hi there")]));
    assert_eq!(parsed.residual, "");
}

#[test]
fn test_empty_params_section() {
    let parsed = parse_tool_calls("[TOOL: schedule | action: list | params:]");
    assert_eq!(parsed.calls.len(), 1);
    assert!(parsed.calls[0].params.is_empty());
}

#[test]
fn test_malformed_param_item() {
    let parsed = parse_tool_calls("[TOOL: gmail | action: send | params: to=a@b.com, urgent]");
    assert!(parsed.calls.is_empty());
    assert_eq!(
        parsed.warnings[0].kind,
        ParseWarningKind::MalformedParam("urgent".to_string())
    );

    let parsed = parse_tool_calls("[TOOL: gmail | action: send | params: =x]");
    assert!(matches!(parsed.warnings[0].kind, ParseWarningKind::MalformedParam(_)));
}

#[test]
fn test_unknown_delimiter() {
    let parsed = parse_tool_calls("[TOOL: gmail ; action: send ; params: to=a]");
    assert!(parsed.calls.is_empty());
    assert_eq!(parsed.warnings[0].kind, ParseWarningKind::MissingAction);

    let parsed = parse_tool_calls("[TOOL: gmail | action: send | args: to=a]");
    assert!(matches!(
        parsed.warnings[0].kind,
        ParseWarningKind::UnexpectedSection(_)
    ));

    let parsed = parse_tool_calls("[TOOL: gmail | action: send | params: to=a | extra]");
    assert_eq!(
        parsed.warnings[0].kind,
        ParseWarningKind::UnexpectedSection("extra".to_string())
    );
}

#[test]
fn test_unterminated_does_not_swallow_next_call() {
    let parsed = parse_tool_calls(
        "[TOOL: gmail | action: send | params: to=a [TOOL: drive | action: read | params: id=7]",
    );
    assert_eq!(parsed.calls.len(), 1);
    assert_eq!(parsed.calls[0].tool_name, "drive");
    assert_eq!(parsed.warnings.len(), 1);
    assert_eq!(parsed.warnings[0].kind, ParseWarningKind::Unterminated);
    assert_eq!(parsed.residual, "[TOOL: gmail | action: send | params: to=a");
}

#[test]
fn test_unterminated_at_end() {
    let parsed = parse_tool_calls("Let me check [TOOL: gmail | action: read");
    assert!(parsed.calls.is_empty());
    assert_eq!(parsed.warnings[0].kind, ParseWarningKind::Unterminated);
    assert_eq!(parsed.residual, "Let me check [TOOL: gmail | action: read");
}

#[test]
fn test_parsing_is_deterministic() {
    let text = "ok [TOOL: a | action: x | params: k=v] [TOOL: b]";
    assert_eq!(parse_tool_calls(text), parse_tool_calls(text));
}

#[test]
fn test_value_may_contain_equals() {
    let parsed = parse_tool_calls("[TOOL: http | action: get | params: url=https://x.io/?a=b]");
    assert_eq!(parsed.calls[0].params["url"], "https://x.io/?a=b");
}

#[test]
fn test_nested_brackets_stay_in_value() {
    let parsed = parse_tool_calls(
        "Sending. [TOOL: gmail | action: send | params: to=a@b.com, body=see [1] below] Done.",
    );
    assert!(parsed.warnings.is_empty());
    assert_eq!(
        parsed.calls[0].params,
        params(&[("to", "a@b.com"), ("body", "see [1] below")])
    );
    assert_eq!(parsed.residual, "Sending.  Done.");
}

#[test]
fn test_unbalanced_bracket_closes_at_first() {
    let parsed = parse_tool_calls("[TOOL: note | action: write | params: text=a [b]");
    assert!(parsed.warnings.is_empty());
    assert_eq!(parsed.calls[0].params["text"], "a [b");
}
