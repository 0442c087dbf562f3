use super::config::{AgentConnection, DiscordConfig};
use super::directory::{IncomingMessage, TeamDirectory};
use super::handler::AgentHandler;
use crate::error::{Error, Result};
use crate::util::{chunk_message, DISCORD_MESSAGE_LIMIT};

use hive_core::{InboundEvent, OutboundSink};
use serenity::all::{ChannelId, Client, CreateMessage, GatewayIntents, Http, ShardManager};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Discord side of a team: one bot client per agent
pub struct DiscordTeam {
    pub(crate) config: DiscordConfig,
    connections: Vec<AgentConnection>,
    directory: TeamDirectory,
    http: RwLock<HashMap<String, Arc<Http>>>,
    last_channel: AtomicU64,
}

impl DiscordTeam {
    /// Create the adapter for `connections`; `agents` is the full roster
    #[must_use]
    pub fn new(config: DiscordConfig, connections: Vec<AgentConnection>, agents: Vec<String>) -> Self {
        Self {
            config,
            connections,
            directory: TeamDirectory::new(agents),
            http: RwLock::new(HashMap::new()),
            last_channel: AtomicU64::new(0),
        }
    }

    /// Bot id ↔ agent mapping
    #[must_use]
    pub fn directory(&self) -> &TeamDirectory {
        &self.directory
    }

    /// Whether a message is in the team's guild/channel
    #[must_use]
    pub fn accepts(&self, msg: &IncomingMessage) -> bool {
        self.config.accepts(msg.channel_id, msg.guild_id)
    }

    pub(crate) fn remember_channel(&self, channel_id: u64) {
        self.last_channel.store(channel_id, Ordering::SeqCst);
    }

    /// Channel agents post in: the configured one, else the last active one
    #[must_use]
    pub fn target_channel(&self) -> Option<u64> {
        self.config.channel_id.or_else(|| {
            let last = self.last_channel.load(Ordering::SeqCst);
            (last != 0).then_some(last)
        })
    }

    /// Log every agent in and forward messages to `inbound` until `shutdown`.
    #[instrument(skip_all, fields(agents = self.connections.len()))]
    pub async fn run(
        self: Arc<Self>,
        inbound: mpsc::Sender<InboundEvent>,
        shutdown: CancellationToken,
    ) -> Result<()> {
        info!("Starting Discord clients");

        let intents = GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let mut managers: Vec<Arc<ShardManager>> = Vec::new();
        let mut clients = JoinSet::new();
        for connection in &self.connections {
            let handler = AgentHandler::new(&connection.agent, Arc::clone(&self), inbound.clone());
            let mut client = Client::builder(&connection.token, intents)
                .event_handler(handler)
                .await
                .map_err(|e| {
                    Error::Discord(format!("Failed to create client for {}: {}", connection.agent, e))
                })?;

            self.http
                .write()
                .await
                .insert(connection.agent.clone(), client.http.clone());
            managers.push(client.shard_manager.clone());

            let agent = connection.agent.clone();
            clients.spawn(async move {
                let result = client.start().await;
                (agent, result)
            });
        }

        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Discord clients shutting down");
            }
            Some(joined) = clients.join_next() => {
                match joined {
                    Ok((agent, Err(e))) => error!(agent = %agent, error = %e, "Discord client stopped"),
                    Ok((agent, Ok(()))) => warn!(agent = %agent, "Discord client ended"),
                    Err(e) => error!(error = %e, "Discord client task failed"),
                }
            }
        }

        for manager in managers {
            manager.shutdown_all().await;
        }
        clients.shutdown().await;
        Ok(())
    }

    async fn http_for(&self, agent: &str) -> Result<Arc<Http>> {
        self.http
            .read()
            .await
            .get(agent)
            .cloned()
            .ok_or_else(|| Error::Discord(format!("agent '{}' is not connected", agent)))
    }
}

#[async_trait::async_trait]
impl OutboundSink for DiscordTeam {
    async fn post(&self, agent: &str, text: &str) -> hive_core::Result<()> {
        let channel = self
            .target_channel()
            .ok_or_else(|| Error::Discord("no channel to post in yet".to_string()))?;
        let http = self.http_for(agent).await?;
        let channel = ChannelId::new(channel);

        for chunk in chunk_message(text, DISCORD_MESSAGE_LIMIT) {
            channel
                .send_message(&http, CreateMessage::new().content(chunk))
                .await
                .map_err(|e| Error::Discord(format!("Failed to send message: {}", e)))?;
        }
        debug!(agent = %agent, channel_id = %channel, "Posted to Discord");
        Ok(())
    }

    fn focus(&self, channel: &str) {
        match channel.parse::<u64>() {
            Ok(id) if id != 0 => self.remember_channel(id),
            _ => warn!(channel = %channel, "Ignoring non-Discord channel id"),
        }
    }
}
