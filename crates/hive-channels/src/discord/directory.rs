//! Bot user id ↔ agent name mapping and message normalization

use chrono::Utc;
use hive_core::InboundEvent;
use serenity::all::Message;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// The parts of a Discord message the team cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Discord message id
    pub message_id: u64,
    /// Channel the message was posted in
    pub channel_id: u64,
    /// Guild, if not a DM
    pub guild_id: Option<u64>,
    /// Display name of the author
    pub author_name: String,
    /// Whether a bot (any bot, including the team's) wrote it
    pub author_is_bot: bool,
    /// Raw message content
    pub content: String,
    /// User ids mentioned
    pub mentioned_user_ids: Vec<u64>,
    /// `@everyone` / `@here`
    pub mention_everyone: bool,
}

impl IncomingMessage {
    /// Extract from a serenity message
    #[must_use]
    pub fn from_serenity(msg: &Message) -> Self {
        Self {
            message_id: msg.id.get(),
            channel_id: msg.channel_id.get(),
            guild_id: msg.guild_id.map(|g| g.get()),
            author_name: msg
                .author
                .global_name
                .clone()
                .unwrap_or_else(|| msg.author.name.clone()),
            author_is_bot: msg.author.bot,
            content: msg.content.clone(),
            mentioned_user_ids: msg.mentions.iter().map(|u| u.id.get()).collect(),
            mention_everyone: msg.mention_everyone,
        }
    }
}

/// Which bot user belongs to which agent
#[derive(Debug, Default)]
pub struct TeamDirectory {
    agents: Vec<String>,
    bots: RwLock<HashMap<u64, String>>,
}

impl TeamDirectory {
    /// Directory for the given agent names
    #[must_use]
    pub fn new(agents: Vec<String>) -> Self {
        Self {
            agents,
            bots: RwLock::new(HashMap::new()),
        }
    }

    /// Record the bot user id an agent logged in as
    pub fn register_bot(&self, user_id: u64, agent: &str) {
        self.bots
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user_id, agent.to_string());
    }

    /// Agent behind a bot user id
    #[must_use]
    pub fn agent_for(&self, user_id: u64) -> Option<String> {
        self.bots
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&user_id)
            .cloned()
    }

    /// Turn a platform message into an inbound event.
    ///
    /// Bot messages are dropped: the team's own posts are already in the log.
    /// Mentions of team bots become agent names and `<@id>` markup in the
    /// text is rewritten to `@agent`.
    #[must_use]
    pub fn to_inbound(&self, msg: &IncomingMessage) -> Option<InboundEvent> {
        if msg.author_is_bot {
            return None;
        }
        if msg.content.trim().is_empty() {
            debug!(message_id = msg.message_id, "Skipping empty message");
            return None;
        }

        let bots = self.bots.read().unwrap_or_else(|e| e.into_inner());
        let mentioned: Vec<String> = if msg.mention_everyone {
            self.agents.clone()
        } else {
            msg.mentioned_user_ids
                .iter()
                .filter_map(|id| bots.get(id).cloned())
                .collect()
        };

        let mut content = msg.content.clone();
        for (id, agent) in bots.iter() {
            let readable = format!("@{}", agent);
            content = content
                .replace(&format!("<@{}>", id), &readable)
                .replace(&format!("<@!{}>", id), &readable);
        }

        Some(InboundEvent {
            author_id: msg.author_name.clone(),
            content: content.trim().to_string(),
            mentioned_agent_ids: mentioned,
            timestamp: Utc::now(),
            external_id: Some(msg.message_id.to_string()),
            channel_id: Some(msg.channel_id.to_string()),
        })
    }
}
