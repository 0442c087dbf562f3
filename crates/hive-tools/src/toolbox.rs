//! ToolBox - routes an authorized call to the tool that serves it

use crate::bridge::{BridgeFailure, HttpToolBridge, ToolInvocation, ToolInvoker};
use crate::registry::ToolRegistry;
use crate::schedule::{ScheduleStore, ScheduleTool, SCHEDULE_TOOL};
use std::sync::Arc;
use tracing::{debug, warn};

/// Local tools first, then remote endpoints from the registry.
pub struct ToolBox {
    registry: ToolRegistry,
    bridge: HttpToolBridge,
    schedule: Option<ScheduleTool>,
}

impl ToolBox {
    /// Create a toolbox over `registry`, sending remote calls through `bridge`
    #[must_use]
    pub fn new(registry: ToolRegistry, bridge: HttpToolBridge) -> Self {
        Self {
            registry,
            bridge,
            schedule: None,
        }
    }

    /// Serve the built-in `schedule` tool from `store`
    #[must_use]
    pub fn with_schedule(mut self, store: Arc<ScheduleStore>) -> Self {
        self.schedule = Some(ScheduleTool::new(store));
        self
    }

    /// Remote endpoint registry
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Whether a call to `name` has somewhere to go
    #[must_use]
    pub fn serves(&self, name: &str) -> bool {
        (name == SCHEDULE_TOOL && self.schedule.is_some()) || self.registry.endpoint(name).is_some()
    }
}

#[async_trait::async_trait]
impl ToolInvoker for ToolBox {
    async fn invoke(
        &self,
        invocation: &ToolInvocation,
    ) -> Result<serde_json::Value, BridgeFailure> {
        if invocation.tool_name == SCHEDULE_TOOL {
            if let Some(schedule) = &self.schedule {
                debug!(agent = %invocation.agent, action = %invocation.action, "Local schedule call");
                return schedule.handle(invocation, chrono::Utc::now());
            }
        }

        let Some(endpoint) = self.registry.endpoint(&invocation.tool_name) else {
            warn!(tool = %invocation.tool_name, "No endpoint bound for tool");
            return Err(BridgeFailure::Unreachable(format!(
                "no endpoint configured for tool '{}'",
                invocation.tool_name
            )));
        };

        self.bridge.call(endpoint, &invocation.to_request()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn invocation(tool: &str, action: &str) -> ToolInvocation {
        ToolInvocation {
            agent: "writer".to_string(),
            tool_name: tool.to_string(),
            action: action.to_string(),
            params: Default::default(),
            channel_id: None,
        }
    }

    #[tokio::test]
    async fn test_unbound_tool_is_unreachable() {
        let toolbox = ToolBox::new(
            ToolRegistry::new(),
            HttpToolBridge::new(Duration::from_secs(1)).unwrap(),
        );
        assert!(!toolbox.serves("gmail"));
        let result = toolbox.invoke(&invocation("gmail", "send")).await;
        assert!(matches!(result, Err(BridgeFailure::Unreachable(_))));
    }

    #[tokio::test]
    async fn test_schedule_served_locally() {
        let store = Arc::new(ScheduleStore::new());
        let toolbox = ToolBox::new(
            ToolRegistry::new(),
            HttpToolBridge::new(Duration::from_secs(1)).unwrap(),
        )
        .with_schedule(store.clone());

        assert!(toolbox.serves(SCHEDULE_TOOL));
        let listed = toolbox.invoke(&invocation(SCHEDULE_TOOL, "list")).await.unwrap();
        assert_eq!(listed["jobs"].as_array().map(Vec::len), Some(0));
    }
}
