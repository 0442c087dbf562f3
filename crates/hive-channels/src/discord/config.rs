use serde::Deserialize;
use std::fmt;

/// Team-wide Discord settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscordConfig {
    /// Only accept messages from this guild
    #[serde(default)]
    pub guild_id: Option<u64>,
    /// Only accept messages from this channel; also where agents post
    #[serde(default)]
    pub channel_id: Option<u64>,
}

impl DiscordConfig {
    /// Create an unrestricted configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a guild
    #[must_use]
    pub fn with_guild(mut self, guild_id: u64) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    /// Restrict to a channel
    #[must_use]
    pub fn with_channel(mut self, channel_id: u64) -> Self {
        self.channel_id = Some(channel_id);
        self
    }

    /// Whether a message from `channel_id` in `guild_id` is for the team
    #[must_use]
    pub fn accepts(&self, channel_id: u64, guild_id: Option<u64>) -> bool {
        let guild_ok = match (self.guild_id, guild_id) {
            (Some(wanted), Some(actual)) => wanted == actual,
            (Some(_), None) => false,
            (None, _) => true,
        };
        guild_ok && self.channel_id.is_none_or(|wanted| wanted == channel_id)
    }
}

/// One agent's bot login
#[derive(Clone, Deserialize)]
pub struct AgentConnection {
    /// Agent name on the roster
    pub agent: String,
    /// Bot token
    pub token: String,
}

impl AgentConnection {
    /// Create a connection for `agent`
    #[must_use]
    pub fn new(agent: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            token: token.into(),
        }
    }
}

// Custom Debug that masks the token
impl fmt::Debug for AgentConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConnection")
            .field("agent", &self.agent)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
