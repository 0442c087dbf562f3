use super::*;
use crate::agent::AgentUnit;
use crate::context::{Author, LogEntry};
use crate::event_bus::{EventBus, TeamEvent};
use crate::permissions::ToolPermission;
use crate::profile::{AgentProfile, Roster};
use crate::test_support::{RecordingSink, RecordingTools};
use hive_llm::MockProvider;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

struct Team {
    orchestrator: Orchestrator,
    sink: Arc<RecordingSink>,
    tools: Arc<RecordingTools>,
    llms: Vec<Arc<MockProvider>>,
}

/// One unit per profile, each with its own mock whose default reply is given
fn team(members: Vec<(AgentProfile, &str)>, config: OrchestratorConfig) -> Team {
    let roster = Arc::new(Roster::new(members.iter().map(|(p, _)| p.clone()).collect()).unwrap());
    let tools = Arc::new(RecordingTools::default());
    let sink = Arc::new(RecordingSink::default());
    let mut llms = Vec::new();
    let mut units = Vec::new();
    for (profile, reply) in &members {
        let llm = Arc::new(MockProvider::new().with_default_reply(*reply));
        units.push(AgentUnit::new(
            Arc::clone(roster.get(&profile.name).unwrap()),
            Arc::clone(&roster),
            llm.clone(),
            tools.clone(),
            config.agent_settings(""),
        ));
        llms.push(llm);
    }
    let orchestrator = Orchestrator::new(roster, units, sink.clone(), config).unwrap();
    Team {
        orchestrator,
        sink,
        tools,
        llms,
    }
}

fn writer(actions: &[&str]) -> AgentProfile {
    AgentProfile::new("writer")
        .with_skills(["email"])
        .with_tool("gmail", ToolPermission::allow(actions.iter().copied()))
}

fn contents(orchestrator: &Orchestrator) -> Vec<String> {
    orchestrator
        .log()
        .snapshot()
        .iter()
        .map(|e| match e {
            LogEntry::Message(m) => format!("{}: {}", m.author, m.content),
            LogEntry::ToolResult(t) => format!("result {}.{}", t.tool_name, t.action),
        })
        .collect()
}

#[test]
fn test_orchestrator_config() {
    let config = OrchestratorConfig::new()
        .with_step_budget(3)
        .with_tool_results_trigger(false);
    assert_eq!(config.step_budget, 3);
    assert!(!config.tool_results_trigger);

    let settings = config.agent_settings("gpt-4o-mini");
    assert_eq!(settings.model, "gpt-4o-mini");
    assert_eq!(settings.context_window, config.context_window);
}

#[test]
fn test_units_must_match_roster() {
    let roster = Arc::new(Roster::new(vec![AgentProfile::new("a"), AgentProfile::new("b")]).unwrap());
    let llm = Arc::new(MockProvider::new());
    let tools = Arc::new(RecordingTools::default());
    let unit = |name: &str| {
        AgentUnit::new(
            Arc::new(AgentProfile::new(name)),
            Arc::clone(&roster),
            llm.clone(),
            tools.clone(),
            Default::default(),
        )
    };

    let missing = Orchestrator::new(
        Arc::clone(&roster),
        vec![unit("a")],
        Arc::new(RecordingSink::default()),
        OrchestratorConfig::default(),
    );
    assert!(matches!(missing, Err(crate::Error::Configuration(_))));

    let stray = Orchestrator::new(
        Arc::clone(&roster),
        vec![unit("a"), unit("b"), unit("c")],
        Arc::new(RecordingSink::default()),
        OrchestratorConfig::default(),
    );
    assert!(matches!(stray, Err(crate::Error::UnknownAgent(name)) if name == "c"));

    let ordered = Orchestrator::new(
        Arc::clone(&roster),
        vec![unit("b"), unit("a")],
        Arc::new(RecordingSink::default()),
        OrchestratorConfig::default(),
    )
    .unwrap();
    let names: Vec<_> = ordered.agents().iter().map(|a| a.name().to_string()).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[tokio::test]
async fn test_mentioned_agent_sends_email() {
    let t = team(
        vec![
            (writer(&["read", "send"]), "Done. [TOOL: gmail | action: send | params: to=a@b.com, subject=Hi]"),
            (AgentProfile::new("planner"), "NO"),
        ],
        OrchestratorConfig::default(),
    );

    let report = t
        .orchestrator
        .handle_event(InboundEvent::new("alice", "@writer email a@b.com please"))
        .await
        .unwrap();

    assert_eq!(report.agents(), vec!["writer"]);
    assert!(!report.budget_exhausted);
    assert_eq!(
        contents(&t.orchestrator),
        vec![
            "alice: @writer email a@b.com please",
            "result gmail.send",
            "writer: Done.",
        ]
    );
    assert_eq!(t.tools.call_count(), 1);

    let posts = t.sink.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].0, "writer");
    assert!(posts[0].1.starts_with("Done."));

    // planner skipped the addressed message and declined the two follow-ups
    assert_eq!(t.llms[1].call_count(), 2);
}

#[tokio::test]
async fn test_run_channel_reaches_sink_and_tools() {
    let t = team(
        vec![(writer(&["send"]), "[TOOL: gmail | action: send | params: to=a@b.com]")],
        OrchestratorConfig::default().with_tool_results_trigger(false),
    );

    t.orchestrator
        .handle_event(InboundEvent::new("alice", "@writer mail it").with_channel("42"))
        .await
        .unwrap();
    t.orchestrator
        .handle_event(InboundEvent::new("alice", "@writer again"))
        .await
        .unwrap();

    assert_eq!(*t.sink.channels.lock().unwrap(), vec!["42".to_string()]);
    let calls = t.tools.calls.lock().unwrap();
    assert_eq!(calls[0].channel_id.as_deref(), Some("42"));
    assert_eq!(calls[1].channel_id, None);
}

#[tokio::test]
async fn test_tool_results_can_stay_quiet() {
    let t = team(
        vec![
            (writer(&["send"]), "[TOOL: gmail | action: send | params: to=a@b.com]"),
            (AgentProfile::new("planner"), "NO"),
        ],
        OrchestratorConfig::default().with_tool_results_trigger(false),
    );

    let report = t
        .orchestrator
        .handle_event(InboundEvent::new("alice", "@writer send it"))
        .await
        .unwrap();

    assert_eq!(report.turn_count(), 1);
    assert_eq!(t.llms[1].call_count(), 0);
    // no residual text, so only the tool result was appended
    assert_eq!(t.orchestrator.log().len(), 2);
}

#[tokio::test]
async fn test_agent_does_not_retrigger_itself() {
    let t = team(
        vec![(AgentProfile::new("solo"), "Happy to help, I think about this a lot.")],
        OrchestratorConfig::default(),
    );

    let report = t
        .orchestrator
        .handle_event(InboundEvent::new("alice", "@solo hi"))
        .await
        .unwrap();

    assert_eq!(report.turn_count(), 1);
    assert_eq!(t.llms[0].call_count(), 1);
    assert_eq!(t.orchestrator.log().len(), 2);
}

#[tokio::test]
async fn test_step_budget_bounds_ping_pong() {
    let bus = EventBus::new(64);
    let mut events = bus.subscribe();
    let t = team(
        vec![
            (AgentProfile::new("a"), "@b ping"),
            (AgentProfile::new("b"), "@a pong"),
        ],
        OrchestratorConfig::default().with_step_budget(3),
    );
    let orchestrator = t.orchestrator.with_event_bus(bus);

    let report = orchestrator
        .handle_event(InboundEvent::new("alice", "@a start"))
        .await
        .unwrap();

    assert_eq!(report.agents(), vec!["a", "b", "a"]);
    assert!(report.budget_exhausted);
    assert_eq!(report.pending, 1);

    let log = orchestrator.log().snapshot();
    assert_eq!(log.len(), 5);
    let notice = log.entries()[4].as_message().unwrap();
    assert_eq!(notice.author, Author::System);
    assert!(notice.content.contains("Step budget of 3 turns"));

    let mut saw_budget = false;
    let mut last = None;
    while let Ok(event) = events.try_recv() {
        if matches!(event, TeamEvent::BudgetExhausted { budget: 3, .. }) {
            saw_budget = true;
        }
        last = Some(event);
    }
    assert!(saw_budget);
    assert!(matches!(last, Some(TeamEvent::RunFinished { turns: 3, .. })));

    // three turns plus the budget notice
    assert_eq!(t.sink.posts().len(), 4);
}

#[tokio::test]
async fn test_budget_caps_concurrent_actors() {
    let t = team(
        vec![
            (AgentProfile::new("a"), "ok"),
            (AgentProfile::new("b"), "ok"),
            (AgentProfile::new("c"), "ok"),
        ],
        OrchestratorConfig::default().with_step_budget(2),
    );

    let report = t
        .orchestrator
        .handle_event(InboundEvent::new("alice", "@everyone status?"))
        .await
        .unwrap();

    assert_eq!(report.agents(), vec!["a", "b"]);
    assert!(report.budget_exhausted);
    assert_eq!(t.llms[2].call_count(), 0);
}

#[tokio::test]
async fn test_budget_spent_on_last_actionable_entry() {
    let t = team(
        vec![(AgentProfile::new("a"), "done"), (AgentProfile::new("b"), "NO")],
        OrchestratorConfig::default().with_step_budget(1),
    );

    let report = t
        .orchestrator
        .handle_event(InboundEvent::new("alice", "@a wrap up"))
        .await
        .unwrap();

    // a's reply is still evaluated, but b declines it
    assert_eq!(report.agents(), vec!["a"]);
    assert!(!report.budget_exhausted);
    assert_eq!(report.pending, 0);
    assert_eq!(t.llms[1].call_count(), 1);
    assert_eq!(contents(&t.orchestrator), vec!["alice: @a wrap up", "a: done"]);
    assert_eq!(t.sink.posts().len(), 1);
}

#[tokio::test]
async fn test_long_log_reaches_units_windowed() {
    let t = team(
        vec![(writer(&["send"]), "sent")],
        OrchestratorConfig::default().with_context_window(2),
    );
    for i in 0..20 {
        t.llms[0].add_response("NO");
        t.orchestrator
            .handle_event(InboundEvent::new("alice", format!("chatter {}", i)))
            .await
            .unwrap();
    }

    let report = t
        .orchestrator
        .handle_event(InboundEvent::new("alice", "@writer send it"))
        .await
        .unwrap();

    assert_eq!(report.agents(), vec!["writer"]);
    let requests = t.llms[0].requests();
    let turn = requests.last().unwrap();
    // system prompt + two entries
    assert_eq!(turn.messages.len(), 3);
    assert_eq!(turn.messages[1].content, "[alice]: chatter 19");
    assert_eq!(turn.messages[2].content, "[alice]: @writer send it");
}

#[tokio::test]
async fn test_mentioned_agents_go_first() {
    let t = team(
        vec![
            (AgentProfile::new("eager"), "sure"),
            (AgentProfile::new("named"), "on it"),
        ],
        OrchestratorConfig::default()
            .with_step_budget(1)
            .with_exclusive_mentions(false),
    );
    t.llms[0].add_response("YES");

    let report = t
        .orchestrator
        .handle_event(InboundEvent::new("alice", "@named do the thing"))
        .await
        .unwrap();

    assert_eq!(report.agents(), vec!["named"]);
    assert!(report.budget_exhausted);
}

#[tokio::test]
async fn test_platform_mentions_resolved() {
    let t = team(
        vec![(AgentProfile::new("writer"), "hello"), (AgentProfile::new("planner"), "NO")],
        OrchestratorConfig::default(),
    );

    let report = t
        .orchestrator
        .handle_event(InboundEvent::new("alice", "hey you").with_mentions(["Writer", "ghost"]))
        .await
        .unwrap();

    assert_eq!(report.agents(), vec!["writer"]);
    let first = t.orchestrator.log().get(0).unwrap();
    let mentions: Vec<_> = first.as_message().unwrap().mentions.iter().cloned().collect();
    assert_eq!(mentions, vec!["writer"]);
}

#[tokio::test]
async fn test_nobody_acts() {
    let t = team(
        vec![(AgentProfile::new("a"), "NO"), (AgentProfile::new("b"), "no thanks")],
        OrchestratorConfig::default(),
    );

    let report = t
        .orchestrator
        .handle_event(InboundEvent::new("alice", "nice weather"))
        .await
        .unwrap();

    assert_eq!(report.turn_count(), 0);
    assert!(!report.budget_exhausted);
    assert_eq!(t.orchestrator.log().len(), 1);
    assert!(t.sink.posts().is_empty());
}

#[tokio::test]
async fn test_duplicate_and_blank_events_dropped() {
    let t = team(vec![(AgentProfile::new("a"), "NO")], OrchestratorConfig::default());

    let event = InboundEvent::new("alice", "hello").with_external_id("m-1");
    assert!(t.orchestrator.handle_event(event.clone()).await.is_some());
    assert!(t.orchestrator.handle_event(event).await.is_none());
    assert!(t.orchestrator.handle_event(InboundEvent::new("alice", "  ")).await.is_none());
    assert!(t.orchestrator.handle_event(InboundEvent::new("alice", "hello")).await.is_some());

    assert_eq!(t.orchestrator.log().len(), 2);
}

#[tokio::test]
async fn test_failed_completion_is_posted() {
    let t = team(vec![(AgentProfile::new("a"), "unused")], OrchestratorConfig::default());
    t.llms[0].add_error("invalid api key");

    let report = t
        .orchestrator
        .handle_event(InboundEvent::new("alice", "@a hi"))
        .await
        .unwrap();

    assert!(report.turns[0].failure.is_some());
    let posts = t.sink.posts();
    assert_eq!(posts.len(), 1);
    assert!(posts[0].1.contains("a could not respond"));
}

#[tokio::test]
async fn test_run_until_channel_closes() {
    let t = team(vec![(AgentProfile::new("a"), "hi")], OrchestratorConfig::default());
    let (tx, rx) = mpsc::channel(4);
    tx.send(InboundEvent::new("alice", "@a one")).await.unwrap();
    tx.send(InboundEvent::new(SCHEDULER_AUTHOR, "@a two")).await.unwrap();
    drop(tx);

    t.orchestrator.run(rx, CancellationToken::new()).await;

    assert_eq!(t.orchestrator.log().len(), 4);
    assert_eq!(t.sink.posts().len(), 2);
}

#[tokio::test]
async fn test_run_stops_on_shutdown() {
    let t = team(vec![(AgentProfile::new("a"), "hi")], OrchestratorConfig::default());
    let (_tx, rx) = mpsc::channel::<InboundEvent>(4);
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    t.orchestrator.run(rx, shutdown).await;
    assert!(t.orchestrator.log().is_empty());
}
