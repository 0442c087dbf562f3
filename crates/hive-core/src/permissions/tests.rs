use super::*;
use hive_tools::ToolParams;

fn request(tool: &str, action: &str) -> ToolCallRequest {
    ToolCallRequest {
        tool_name: tool.to_string(),
        action: action.to_string(),
        params: ToolParams::new(),
    }
}

fn writer() -> AgentProfile {
    AgentProfile::new("writer")
        .with_tool("gmail", ToolPermission::allow(["read", "send"]))
        .with_tool("drive", ToolPermission::allow(["read"]).disabled())
}

#[test]
fn test_allowed_action() {
    assert!(authorize(&writer(), &request("gmail", "send")).is_ok());
    assert!(authorize(&writer(), &request("gmail", "read")).is_ok());
}

#[test]
fn test_tool_not_granted() {
    let result = authorize(&writer(), &request("calendar", "read"));
    assert!(matches!(result, Err(PermissionDenial::ToolNotGranted { .. })));
}

#[test]
fn test_tool_disabled() {
    let result = authorize(&writer(), &request("drive", "read"));
    assert_eq!(
        result,
        Err(PermissionDenial::ToolDisabled {
            tool: "drive".to_string()
        })
    );
}

#[test]
fn test_action_not_allowed() {
    let read_only = AgentProfile::new("writer").with_tool("gmail", ToolPermission::allow(["read"]));
    let result = authorize(&read_only, &request("gmail", "send"));
    assert_eq!(
        result,
        Err(PermissionDenial::ActionNotAllowed {
            tool: "gmail".to_string(),
            action: "send".to_string()
        })
    );
}

#[test]
fn test_tool_names_match_exactly() {
    let result = authorize(&writer(), &request("Gmail", "send"));
    assert!(matches!(result, Err(PermissionDenial::ToolNotGranted { .. })));
}

#[test]
fn test_actions_normalized_on_grant() {
    let profile = AgentProfile::new("a").with_tool("gmail", ToolPermission::allow([" Send ", ""]));
    assert_eq!(
        profile.permissions["gmail"].allowed_actions,
        BTreeSet::from(["send".to_string()])
    );
}

#[test]
fn test_verdict_is_stable() {
    let profile = writer();
    let req = request("gmail", "delete");
    let first = authorize(&profile, &req);
    for _ in 0..10 {
        assert_eq!(authorize(&profile, &req), first);
    }
}

#[test]
fn test_denial_display() {
    let denial = PermissionDenial::ActionNotAllowed {
        tool: "gmail".to_string(),
        action: "send".to_string(),
    };
    assert_eq!(denial.to_string(), "action 'send' is not allowed on 'gmail'");
}
