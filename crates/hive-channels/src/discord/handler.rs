use super::adapter::DiscordTeam;
use super::directory::IncomingMessage;
use crate::util::mask_for_logging;
use hive_core::InboundEvent;
use serenity::all::{Context, EventHandler, Message, Ready};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Event handler for one agent's bot connection
pub struct AgentHandler {
    agent: String,
    team: Arc<DiscordTeam>,
    inbound: mpsc::Sender<InboundEvent>,
}

impl AgentHandler {
    /// Create the handler for `agent`
    pub fn new(agent: &str, team: Arc<DiscordTeam>, inbound: mpsc::Sender<InboundEvent>) -> Self {
        Self {
            agent: agent.to_string(),
            team,
            inbound,
        }
    }
}

#[serenity::async_trait]
impl EventHandler for AgentHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(agent = %self.agent, bot = %ready.user.name, "Discord bot connected");
        self.team
            .directory()
            .register_bot(ready.user.id.get(), &self.agent);
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        let incoming = IncomingMessage::from_serenity(&msg);
        if !self.team.accepts(&incoming) {
            return;
        }
        let Some(event) = self.team.directory().to_inbound(&incoming) else {
            return;
        };

        // SECURITY: Mask potentially sensitive content in logs
        debug!(
            agent = %self.agent,
            channel_id = incoming.channel_id,
            user = %event.author_id,
            text = %mask_for_logging(&event.content),
            "Received Discord message"
        );

        if self.inbound.send(event).await.is_err() {
            warn!(agent = %self.agent, "Orchestrator inbound channel closed");
        }
    }
}
