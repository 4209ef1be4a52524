//! # Dispatcher
//!
//! Routes incoming messages either to a command plugin (when the body starts with the
//! command prefix) or to the cooldown-gated keyword responder, and handles invites.
//! Handler faults are contained here: they are logged and reported to the room, and
//! never escape to the event loop.

use anyhow::{Result, anyhow};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use crate::application::arguments::tokenize;
use crate::application::cooldown::CooldownGate;
use crate::application::errors::{ConfigError, ParseError};
use crate::application::registry::{CommandEntry, CommandRegistry};
use crate::domain::config::AppConfig;
use crate::domain::traits::{ChatProvider, CommandContext};
use crate::domain::types::{IncomingMessage, InviteEvent, Membership, OutgoingMessage};
use crate::strings::messages;

/// What happened to a message, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Own message or banned sender.
    Ignored,
    UnknownCommand,
    UsageError,
    Executed,
    HandlerFailed,
    KeywordReply,
    CooledDown,
    NoKeyword,
}

/// Sender patterns with `*` and `?` wildcards, matched against the whole sender ID.
#[derive(Debug, Default)]
pub struct BannedSenders {
    patterns: Vec<glob::Pattern>,
}

impl BannedSenders {
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                glob::Pattern::new(p)
                    .map_err(|e| ConfigError::Invalid(format!("banned sender `{p}`: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_banned(&self, sender: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(sender))
    }
}

pub struct Dispatcher {
    config: AppConfig,
    registry: Arc<CommandRegistry>,
    cooldown: CooldownGate,
    banned: BannedSenders,
    handler_timeout: Duration,
}

impl Dispatcher {
    pub fn new(config: AppConfig, registry: Arc<CommandRegistry>) -> Result<Self, ConfigError> {
        Ok(Self {
            cooldown: CooldownGate::new(config.response_cooldown),
            banned: BannedSenders::new(&config.banned_senders)?,
            handler_timeout: Duration::from_secs(config.handler_timeout_secs),
            registry,
            config,
        })
    }

    pub async fn on_message<C>(&self, chat: &C, event: &IncomingMessage) -> Result<DispatchOutcome>
    where
        C: ChatProvider,
    {
        if event.sender == self.config.user_id {
            return Ok(DispatchOutcome::Ignored);
        }
        if self.banned.is_banned(&event.sender) {
            tracing::debug!("Ignoring message from banned sender {}", event.sender);
            return Ok(DispatchOutcome::Ignored);
        }

        let body = event.body.trim();
        match body.strip_prefix(self.config.command_prefix.as_str()) {
            Some(command_text) => self.run_command(chat, event, command_text).await,
            None => self.run_keywords(chat, event).await,
        }
    }

    async fn run_command<C>(
        &self,
        chat: &C,
        event: &IncomingMessage,
        command_text: &str,
    ) -> Result<DispatchOutcome>
    where
        C: ChatProvider,
    {
        let command_text = command_text.trim_start();
        let (name, rest) = command_text
            .split_once(char::is_whitespace)
            .unwrap_or((command_text, ""));

        let Some(entry) = self.registry.resolve(name) else {
            tracing::debug!("Ignoring unknown command `{}` in {}", name, event.room_id);
            return Ok(DispatchOutcome::UnknownCommand);
        };
        let command = entry.manifest.name.as_str();

        tracing::info!(
            "Dispatching cmd='{}' args='{}' sender='{}' room='{}'",
            command,
            rest,
            event.sender,
            event.room_id
        );

        let parsed = tokenize(rest)
            .map_err(|kind| ParseError {
                kind,
                usage: entry.schema.usage(),
            })
            .and_then(|tokens| entry.schema.parse(&tokens));

        let args = match parsed {
            Ok(args) => args,
            Err(e) => {
                tracing::debug!("Usage error for `{}`: {}", command, e);
                let reply =
                    messages::usage_error(&e.to_string(), &self.config.command_prefix, &e.usage);
                self.reply(chat, event, reply).await?;
                return Ok(DispatchOutcome::UsageError);
            }
        };

        let ctx = CommandContext {
            config: &self.config,
            registry: &self.registry,
            chat,
            event,
            args: &args,
        };

        match self.invoke(entry, ctx).await {
            None => Ok(DispatchOutcome::Executed),
            Some(fault) => {
                tracing::error!("Error executing command {}: {}", command, fault);
                self.reply(chat, event, messages::command_failed(command, &fault))
                    .await?;
                Ok(DispatchOutcome::HandlerFailed)
            }
        }
    }

    /// Runs a handler under the timeout, turning errors, panics and timeouts into a fault description.
    async fn invoke(&self, entry: &CommandEntry, ctx: CommandContext<'_>) -> Option<String> {
        let call = AssertUnwindSafe(entry.handler.execute(ctx)).catch_unwind();
        match tokio::time::timeout(self.handler_timeout, call).await {
            Ok(Ok(Ok(()))) => None,
            Ok(Ok(Err(e))) => Some(format!("{e:#}")),
            Ok(Err(panic)) => Some(panic_message(&*panic)),
            Err(_) => Some(messages::handler_timed_out(self.handler_timeout.as_secs())),
        }
    }

    async fn run_keywords<C>(&self, chat: &C, event: &IncomingMessage) -> Result<DispatchOutcome>
    where
        C: ChatProvider,
    {
        if self.config.responses.is_empty() {
            return Ok(DispatchOutcome::NoKeyword);
        }
        if !self.cooldown.can_respond(&event.room_id, event.timestamp) {
            return Ok(DispatchOutcome::CooledDown);
        }

        let reply = self.config.responses.respond(&event.body, &mut rand::rng());
        match reply {
            Some(text) => {
                self.reply(chat, event, OutgoingMessage::text(text)).await?;
                Ok(DispatchOutcome::KeywordReply)
            }
            None => Ok(DispatchOutcome::NoKeyword),
        }
    }

    async fn reply<C>(&self, chat: &C, event: &IncomingMessage, message: OutgoingMessage) -> Result<()>
    where
        C: ChatProvider,
    {
        chat.send(message.in_reply_to(&event.event_id))
            .await
            .map(|_| ())
            .map_err(|e| anyhow!("failed to send reply to {}: {}", event.room_id, e))
    }

    /// Joins rooms the bot is invited to and greets them. Returns whether the room was joined.
    pub async fn on_invite<C>(&self, chat: &C, invite: &InviteEvent) -> bool
    where
        C: ChatProvider,
    {
        if invite.membership != Membership::Invite || invite.target != self.config.user_id {
            return false;
        }

        tracing::info!("Received invite to room {}", invite.room_id);
        if let Err(e) = chat.join().await {
            tracing::error!("Failed to join room {}: {}", invite.room_id, e);
            return false;
        }
        tracing::info!("Joined room {}", invite.room_id);

        let welcome = messages::welcome(&self.config.command_prefix);
        if let Err(e) = chat.send(OutgoingMessage::text(welcome)).await {
            tracing::warn!("Failed to greet room {}: {}", invite.room_id, e);
        }
        true
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
