use super::prompt::outcome_text;
use super::{AgentState, AgentUnit, TurnFailure, TurnReport};
use crate::context::{Author, ContextLog, ContextView, EntryDraft, EntryId, ToolFailure, ToolOutcome};
use crate::event_bus::TeamEvent;
use crate::mention::extract_mentions;
use crate::parser::{parse_tool_calls, ToolCallRequest};
use crate::permissions::authorize;
use hive_llm::CompletionRequest;
use hive_tools::ToolInvocation;
use tracing::{debug, info, instrument, warn};

impl AgentUnit {
    /// Take a turn on `view` (the log as of the decision), appending to `log`.
    ///
    /// Tool calls run one after another in the order they were written; each
    /// result is appended as soon as it resolves, the reply text last.
    /// `channel` is the chat channel of the run and is handed to every tool.
    #[instrument(skip_all, fields(agent = %self.profile.name, trigger = trigger_entry))]
    pub async fn act(
        &self,
        trigger_entry: EntryId,
        view: &ContextView,
        log: &ContextLog,
        channel: Option<&str>,
    ) -> TurnReport {
        self.set_state(AgentState::MustAct);

        let mut report = TurnReport {
            agent: self.profile.name.clone(),
            trigger_entry,
            appended: Vec::new(),
            outbound: None,
            tool_calls: 0,
            warnings: Vec::new(),
            failure: None,
        };

        let content = match self.complete(view).await {
            Ok(content) => content,
            Err(failure) => {
                warn!(error = %failure, "Completion failed");
                let notice = format!("⚠️ {} could not respond: {}", self.profile.name, failure);
                report.appended.push(log.append(EntryDraft::notice(&notice)));
                report.outbound = Some(notice);
                report.failure = Some(failure);
                self.set_state(AgentState::Idle);
                return report;
            }
        };

        self.set_state(AgentState::Producing);
        let parsed = parse_tool_calls(&content);

        for warning in &parsed.warnings {
            warn!(warning = %warning, "Dropped malformed tool call");
            self.publish(TeamEvent::ParseWarning {
                agent: self.profile.name.clone(),
                warning: warning.to_string(),
            });
        }
        report.warnings = parsed.warnings;

        let mut tool_lines = Vec::new();
        for call in parsed.calls {
            report.tool_calls += 1;
            let (id, line) = self.run_tool_call(call, log, channel).await;
            report.appended.extend(id);
            tool_lines.push(line);
        }

        if !parsed.residual.is_empty() {
            let mut mentions = extract_mentions(&parsed.residual, &self.roster);
            mentions.remove(self.profile.name.as_str());
            let id = log.append(EntryDraft::message(
                Author::Agent(self.profile.name.clone()),
                &parsed.residual,
                mentions,
            ));
            report.appended.push(id);
        }

        if report.tool_calls == 0 && parsed.residual.is_empty() {
            warn!("Completion was empty");
            let notice = format!("💬 {} produced an empty reply", self.profile.name);
            report.appended.push(log.append(EntryDraft::notice(&notice)));
            report.outbound = Some(notice);
        } else {
            report.outbound = compose_outbound(&parsed.residual, &tool_lines);
        }
        debug!(appended = report.appended.len(), tool_calls = report.tool_calls, "Turn finished");
        self.set_state(AgentState::Idle);
        report
    }

    async fn complete(&self, view: &ContextView) -> Result<String, TurnFailure> {
        let window = view.tail(self.settings.context_window);
        let mut request = CompletionRequest::new(&self.settings.model)
            .with_messages(self.prompt.build_messages(window.iter()));
        request.max_tokens = self.settings.max_tokens;

        let response = tokio::time::timeout(self.settings.completion_timeout, self.llm.complete(request))
            .await
            .map_err(|_| TurnFailure::Timeout(self.settings.completion_timeout))??;
        Ok(response.content)
    }

    /// Gate, dispatch and record one call. Returns the appended ids and the
    /// line posted for it.
    async fn run_tool_call(
        &self,
        call: ToolCallRequest,
        log: &ContextLog,
        channel: Option<&str>,
    ) -> (Vec<EntryId>, String) {
        let outcome = match authorize(&self.profile, &call) {
            Err(denial) => {
                warn!(tool = %call.tool_name, action = %call.action, reason = %denial, "Tool call denied");
                self.publish(TeamEvent::ToolDenied {
                    agent: self.profile.name.clone(),
                    tool: call.tool_name.clone(),
                    action: call.action.clone(),
                    reason: denial.to_string(),
                });
                ToolOutcome::Failure(ToolFailure::PermissionDenied(denial))
            }
            Ok(()) => {
                let invocation = ToolInvocation {
                    agent: self.profile.name.clone(),
                    tool_name: call.tool_name.clone(),
                    action: call.action.clone(),
                    params: call.params.clone(),
                    channel_id: channel.map(str::to_string),
                };
                match self.tools.invoke(&invocation).await {
                    Ok(payload) => {
                        info!(tool = %call.tool_name, action = %call.action, "Tool call succeeded");
                        ToolOutcome::Success(payload)
                    }
                    Err(failure) => {
                        warn!(tool = %call.tool_name, action = %call.action, error = %failure, "Tool call failed");
                        ToolOutcome::Failure(ToolFailure::Bridge(failure))
                    }
                }
            }
        };

        let bridge_failure = match &outcome {
            ToolOutcome::Failure(ToolFailure::Bridge(failure)) => Some(failure.to_string()),
            _ => None,
        };

        let tool_label = format!("{}.{}", call.tool_name, call.action);
        let result_id = log.append(EntryDraft::ToolResult {
            requesting_agent: self.profile.name.clone(),
            tool_name: call.tool_name,
            action: call.action,
            params: call.params,
            outcome,
        });

        let mut ids = vec![result_id];
        let line = match log.get(result_id).as_deref().and_then(|e| e.as_tool_result()) {
            Some(result) => format!("[Tool Result: {}] {}", tool_label, outcome_text(result)),
            None => format!("[Tool Result: {}]", tool_label),
        };

        if let Some(reason) = bridge_failure {
            ids.push(log.append(EntryDraft::notice(format!(
                "⚠️ {} could not complete {}: {}",
                self.profile.name, tool_label, reason
            ))));
        }

        (ids, line)
    }

    fn publish(&self, event: TeamEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }
}

fn compose_outbound(residual: &str, tool_lines: &[String]) -> Option<String> {
    let mut parts = Vec::new();
    if !residual.is_empty() {
        parts.push(residual.to_string());
    }
    if !tool_lines.is_empty() {
        parts.push(tool_lines.join("\n"));
    }
    (!parts.is_empty()).then(|| parts.join("\n\n"))
}
