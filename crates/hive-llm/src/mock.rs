//! Mock LLM Provider for testing
//!
//! Responses are served from a queue in order; once the queue is empty the
//! provider answers with a fixed default. Every request is recorded so tests
//! can inspect the prompts agents built.

use crate::completion::{CompletionRequest, CompletionResponse};
use crate::error::{Error, Result};
use crate::provider::LlmProvider;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

enum Scripted {
    Reply(String),
    Fail(String),
    Stall(Duration, String),
}

/// A mock LLM provider that returns queued responses or a default one.
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    default_reply: String,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a new mock provider.
    #[must_use]
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            default_reply: "mock response".to_string(),
        }
    }

    /// Reply used once the queue runs dry.
    #[must_use]
    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = reply.into();
        self
    }

    /// Queue a text response.
    pub fn add_response(&self, content: impl Into<String>) {
        self.push(Scripted::Reply(content.into()));
    }

    /// Queue a provider failure.
    pub fn add_error(&self, message: impl Into<String>) {
        self.push(Scripted::Fail(message.into()));
    }

    /// Queue a response that only arrives after `delay`.
    pub fn add_delayed_response(&self, delay: Duration, content: impl Into<String>) {
        self.push(Scripted::Stall(delay, content.into()));
    }

    /// Requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of completions requested.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn push(&self, item: Scripted) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(item);
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        let next = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        let content = match next {
            Some(Scripted::Reply(content)) => content,
            Some(Scripted::Fail(message)) => {
                return Err(Error::Rejected {
                    provider: "mock".to_string(),
                    status: 500,
                    message,
                })
            }
            Some(Scripted::Stall(delay, content)) => {
                tokio::time::sleep(delay).await;
                content
            }
            None => self.default_reply.clone(),
        };

        Ok(CompletionResponse::text(content, "mock-model"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    #[tokio::test]
    async fn test_queued_then_default() {
        let mock = MockProvider::new();
        mock.add_response("first");
        mock.add_error("boom");

        let req = CompletionRequest::new("").with_message(Message::user("hi"));
        assert_eq!(mock.complete(req.clone()).await.unwrap().content, "first");
        assert!(matches!(mock.complete(req.clone()).await, Err(Error::Rejected { status: 500, .. })));
        assert_eq!(mock.complete(req).await.unwrap().content, "mock response");
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_records_requests() {
        let mock = MockProvider::new().with_default_reply("NO");
        let req = CompletionRequest::new("m").with_message(Message::user("ping"));
        let reply = tokio_test::assert_ok!(mock.complete(req).await);
        assert_eq!(reply.content, "NO");
        let seen = mock.requests();
        assert_eq!(seen[0].messages[0].content, "ping");
    }
}
