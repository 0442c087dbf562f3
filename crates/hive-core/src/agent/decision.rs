use super::{AgentState, AgentUnit, Decision, Trigger};
use crate::context::{Author, ContextView, EntryId, LogEntry};
use hive_llm::{CompletionRequest, Message};
use tracing::{debug, warn};

/// Entries of history shown to the relevance check
const RELEVANCE_HISTORY: usize = 8;

impl AgentUnit {
    /// First entry this unit reads when deciding on `trigger` and taking a
    /// turn, with the log ending just before `end`.
    pub(crate) fn view_start(&self, trigger: EntryId, end: EntryId) -> EntryId {
        let history = trigger.saturating_sub(RELEVANCE_HISTORY as EntryId);
        let window = end.saturating_sub(self.settings.context_window as EntryId);
        history.min(window)
    }

    /// Decide whether to act on `entry`, read against `view`.
    ///
    /// Never acts on its own entries or on engine notices. A mention forces a
    /// turn without asking the LLM; any relevance failure means "stay idle".
    pub async fn evaluate(&self, entry: &LogEntry, view: &ContextView) -> Decision {
        if self.state() != AgentState::Idle {
            debug!(agent = %self.name(), entry_id = entry.id(), "Mid-cycle, skipping entry");
            return Decision::Idle;
        }

        if entry.producing_agent() == Some(self.name()) {
            return Decision::Idle;
        }

        if let LogEntry::Message(message) = entry {
            if message.author == Author::System {
                return Decision::Idle;
            }
            if message.mentions.contains(self.name()) {
                debug!(agent = %self.name(), entry_id = entry.id(), "Mentioned");
                return Decision::Act(Trigger::Mentioned);
            }
            if self.settings.mentions_are_exclusive && !message.mentions.is_empty() {
                return Decision::Idle;
            }
        }

        if self.is_relevant(entry, view).await {
            Decision::Act(Trigger::Relevant)
        } else {
            Decision::Idle
        }
    }

    async fn is_relevant(&self, entry: &LogEntry, view: &ContextView) -> bool {
        let recent: Vec<&LogEntry> = view
            .iter()
            .filter(|e| e.id() < entry.id())
            .rev()
            .take(RELEVANCE_HISTORY)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        let prompt = self.prompt.relevance_prompt(recent, entry);
        let request = CompletionRequest::new(&self.settings.model)
            .with_message(Message::user(prompt))
            .with_max_tokens(5);

        let answer =
            tokio::time::timeout(self.settings.relevance_timeout, self.llm.complete(request)).await;

        match answer {
            Ok(Ok(response)) => {
                let relevant = response
                    .content
                    .trim_start_matches(|c: char| !c.is_alphanumeric())
                    .to_uppercase()
                    .starts_with("YES");
                debug!(agent = %self.name(), entry_id = entry.id(), relevant, "Relevance check");
                relevant
            }
            Ok(Err(e)) => {
                warn!(agent = %self.name(), entry_id = entry.id(), error = %e, "Relevance check failed, staying idle");
                false
            }
            Err(_) => {
                warn!(agent = %self.name(), entry_id = entry.id(), "Relevance check timed out, staying idle");
                false
            }
        }
    }
}
