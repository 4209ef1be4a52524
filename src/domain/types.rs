//! # Domain Types
//!
//! Protocol-independent shapes of the events the bot consumes and the replies it produces.

use chrono::{DateTime, Utc};

/// A text message delivered by the chat protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub sender: String,
    pub room_id: String,
    pub event_id: String,
    pub body: String,
    /// Local arrival time, used for cooldown bookkeeping.
    pub timestamp: DateTime<Utc>,
}

impl IncomingMessage {
    pub fn new(
        sender: impl Into<String>,
        room_id: impl Into<String>,
        event_id: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            room_id: room_id.into(),
            event_id: event_id.into(),
            body: body.into(),
            timestamp: Utc::now(),
        }
    }

    #[cfg(test)]
    pub fn at(mut self, t: DateTime<Utc>) -> Self {
        self.timestamp = t;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Invite,
    Join,
    Leave,
    Ban,
    Other,
}

/// A membership event targeting some identity in a room.
#[derive(Debug, Clone, PartialEq)]
pub struct InviteEvent {
    pub room_id: String,
    /// The identity the membership change applies to (the event's state key).
    pub target: String,
    pub membership: Membership,
}

/// A reply to be sent through the chat protocol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutgoingMessage {
    pub body: String,
    /// Pre-rendered HTML. When absent, the adapter renders `body` as Markdown.
    pub html: Option<String>,
    pub reply_to: Option<String>,
}

impl OutgoingMessage {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn html(body: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            html: Some(html.into()),
            reply_to: None,
        }
    }

    pub fn in_reply_to(mut self, event_id: impl Into<String>) -> Self {
        self.reply_to = Some(event_id.into());
        self
    }
}
