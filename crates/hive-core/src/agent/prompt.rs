use crate::context::{LogEntry, ToolOutcome, ToolResultEntry};
use crate::profile::{AgentProfile, Roster};
use hive_llm::Message;

const RULES: &str = "Rules:
- Be collaborative, mention teammates with @name if the task needs their skill
- Respond clearly and concisely
- Only use tools you have permission for
- Summarize what you did when done
- If you cannot do something, say who can
- If the user uses @everyone or @here, respond directly and do not delegate";

const TOOL_USAGE: &str = "To use a tool, include this in your response:
[TOOL: tool_name | action: read/write/send | params: key=value, key=value]
Example:
[TOOL: gmail | action: send | params: to=user@email.com, subject=Hello, body=Hi there]
Tool results are added to the conversation after your message.

Scheduling:
If the user asks to schedule a task, use the schedule tool.
Params for schedule:
- type=interval with interval_minutes
- type=cron with cron (minute hour * * *)
- task=<what to do>
- action: list to list schedules
- action: delete with job_id to remove a schedule
Example:
[TOOL: schedule | action: write | params: type=interval, interval_minutes=30, task=Check the inbox]";

/// Longest payload rendered into a prompt line
const MAX_PAYLOAD_CHARS: usize = 2000;

/// Builds the prompts one agent completes with
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    agent: String,
    persona_summary: String,
    system_prompt: String,
}

impl PromptBuilder {
    /// Build the system prompt for `profile` within `roster`
    #[must_use]
    pub fn new(profile: &AgentProfile, roster: &Roster) -> Self {
        let persona = if profile.persona.trim().is_empty() {
            format!("You are {}.", profile.name)
        } else {
            profile.persona.trim().to_string()
        };

        let teammates: Vec<String> = roster
            .iter()
            .filter(|a| a.name != profile.name)
            .map(|a| {
                let tools: Vec<&str> = a.enabled_tools().map(|(name, _)| name).collect();
                format!(
                    "- {}: skills=[{}], tools=[{}]",
                    a.name,
                    a.skills.join(", "),
                    tools.join(", ")
                )
            })
            .collect();

        let own_tools: Vec<String> = profile
            .enabled_tools()
            .map(|(name, permission)| {
                let actions: Vec<&str> =
                    permission.allowed_actions.iter().map(String::as_str).collect();
                format!("{}({})", name, actions.join(", "))
            })
            .collect();

        let parts = [
            persona,
            format!(
                "Your name is {}. You are part of a team called Hive. Teammates:",
                profile.name
            ),
            if teammates.is_empty() {
                "- (none)".to_string()
            } else {
                teammates.join("\n")
            },
            RULES.to_string(),
            TOOL_USAGE.to_string(),
            if own_tools.is_empty() {
                "Your tools: (none)".to_string()
            } else {
                format!("Your tools: {}", own_tools.join(", "))
            },
        ];

        Self {
            agent: profile.name.clone(),
            persona_summary: profile.persona_summary().to_string(),
            system_prompt: parts.join("\n\n"),
        }
    }

    /// System prompt
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Conversation for a full completion: system prompt, then the entries.
    ///
    /// The agent's own messages become assistant turns; everything else is
    /// a user turn prefixed with its author.
    pub fn build_messages<'a>(&self, entries: impl IntoIterator<Item = &'a LogEntry>) -> Vec<Message> {
        let mut messages = vec![Message::system(&self.system_prompt)];
        for entry in entries {
            match entry {
                LogEntry::Message(m) if m.author.agent() == Some(self.agent.as_str()) => {
                    messages.push(Message::assistant(&m.content));
                }
                other => messages.push(Message::user(render_entry(other))),
            }
        }
        messages
    }

    /// The binary question asked before acting on an unmentioned entry.
    #[must_use]
    pub fn relevance_prompt<'a>(
        &self,
        recent: impl IntoIterator<Item = &'a LogEntry>,
        entry: &LogEntry,
    ) -> String {
        let history: Vec<String> = recent.into_iter().map(render_entry).collect();
        let mut prompt = String::new();
        if !history.is_empty() {
            prompt.push_str("Recent conversation:\n");
            prompt.push_str(&history.join("\n"));
            prompt.push_str("\n\n");
        }
        prompt.push_str(&format!(
            "Given this message: '{}'\nAnd your role: {}\nShould you respond? Answer only: YES or NO",
            render_entry(entry),
            self.persona_summary
        ));
        prompt
    }
}

/// One-line rendering of an entry for prompts
pub(crate) fn render_entry(entry: &LogEntry) -> String {
    match entry {
        LogEntry::Message(m) => format!("[{}]: {}", m.author, m.content),
        LogEntry::ToolResult(t) => format!(
            "[tool result {}.{} by {}] {}",
            t.tool_name,
            t.action,
            t.requesting_agent,
            outcome_text(t)
        ),
    }
}

/// `ok: <payload>` or `failed: <reason>`
pub(crate) fn outcome_text(result: &ToolResultEntry) -> String {
    match &result.outcome {
        ToolOutcome::Success(payload) => {
            let mut text = payload.to_string();
            if text.chars().count() > MAX_PAYLOAD_CHARS {
                text = text.chars().take(MAX_PAYLOAD_CHARS).collect::<String>() + "…";
            }
            format!("ok: {}", text)
        }
        ToolOutcome::Failure(failure) => format!("failed: {}", failure),
    }
}
