//! # Domain Traits
//!
//! Abstract interfaces for the chat protocol and for command plugins.
//! Allows for pluggable implementations in the Infrastructure and Interface layers.

use async_trait::async_trait;

use crate::application::arguments::{ArgumentSpec, ParsedArgs};
use crate::application::registry::CommandRegistry;
use crate::domain::config::AppConfig;
use crate::domain::types::{IncomingMessage, OutgoingMessage};

/// Abstract interface for a Chat Provider bound to a single room (e.g., a Matrix room).
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a message to the room, returning the new event ID
    async fn send(&self, message: OutgoingMessage) -> Result<String, String>;

    /// Join the room (used when accepting an invite)
    async fn join(&self) -> Result<(), String>;

    /// Get the current room ID
    fn room_id(&self) -> String;
}

/// Declarative description of a command: its names and argument schema.
#[derive(Debug, Clone, Default)]
pub struct CommandManifest {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub arguments: Vec<ArgumentSpec>,
}

impl CommandManifest {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn argument(mut self, spec: ArgumentSpec) -> Self {
        self.arguments.push(spec);
        self
    }
}

/// Everything a command handler gets to see for one invocation.
pub struct CommandContext<'a> {
    pub config: &'a AppConfig,
    pub registry: &'a CommandRegistry,
    pub chat: &'a dyn ChatProvider,
    pub event: &'a IncomingMessage,
    pub args: &'a ParsedArgs,
}

impl CommandContext<'_> {
    /// Reply to the triggering event, rendering `content` as Markdown.
    pub async fn reply(&self, content: &str) -> anyhow::Result<String> {
        self.chat
            .send(OutgoingMessage::text(content).in_reply_to(&self.event.event_id))
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

/// A command plugin.
#[async_trait]
pub trait Command: Send + Sync {
    fn manifest(&self) -> CommandManifest;

    async fn execute(&self, ctx: CommandContext<'_>) -> anyhow::Result<()>;
}
