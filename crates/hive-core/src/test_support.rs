//! Recording fakes shared by the unit tests

use crate::orchestrator::OutboundSink;
use hive_tools::{BridgeFailure, ToolInvocation, ToolInvoker};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Tool invoker that records calls and answers from a queue (default: ok).
#[derive(Default)]
pub(crate) struct RecordingTools {
    pub(crate) calls: Mutex<Vec<ToolInvocation>>,
    replies: Mutex<VecDeque<Result<serde_json::Value, BridgeFailure>>>,
}

impl RecordingTools {
    pub(crate) fn reply(&self, reply: Result<serde_json::Value, BridgeFailure>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ToolInvoker for RecordingTools {
    async fn invoke(&self, invocation: &ToolInvocation) -> Result<serde_json::Value, BridgeFailure> {
        self.calls.lock().unwrap().push(invocation.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(serde_json::json!({"status": "sent"})))
    }
}

/// Outbound sink that records posts and channel switches
#[derive(Default)]
pub(crate) struct RecordingSink {
    pub(crate) posts: Mutex<Vec<(String, String)>>,
    pub(crate) channels: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub(crate) fn posts(&self) -> Vec<(String, String)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl OutboundSink for RecordingSink {
    async fn post(&self, agent: &str, text: &str) -> crate::Result<()> {
        self.posts
            .lock()
            .unwrap()
            .push((agent.to_string(), text.to_string()));
        Ok(())
    }

    fn focus(&self, channel: &str) {
        self.channels.lock().unwrap().push(channel.to_string());
    }
}
