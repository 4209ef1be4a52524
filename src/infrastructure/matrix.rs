//! # Matrix Service Adapter
//!
//! Implements the `ChatProvider` trait for the Matrix protocol using the `matrix_sdk`.
//! This module acts as the bridge between the protocol-independent types used by the
//! dispatcher and the specific implementation details of the Matrix SDK.

use crate::domain::traits::ChatProvider;
use crate::domain::types::{IncomingMessage, InviteEvent, Membership, OutgoingMessage};
use anyhow::Result;
use async_trait::async_trait;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::EventId;
use matrix_sdk::ruma::events::relation::InReplyTo;
use matrix_sdk::ruma::events::room::member::{MembershipState, StrippedRoomMemberEvent};
use matrix_sdk::ruma::events::room::message::{
    MessageType, OriginalSyncRoomMessageEvent, Relation, RoomMessageEventContent,
};
use std::convert::TryFrom;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const JOIN_ATTEMPTS: u32 = 3;
const JOIN_BASE_DELAY: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct MatrixService {
    room: Room,
}

impl MatrixService {
    pub fn new(room: Room) -> Self {
        Self { room }
    }

    /// Builds the event content: explicit HTML when given, otherwise Markdown rendering,
    /// plus the reply relation.
    fn build_content(message: &OutgoingMessage) -> Result<RoomMessageEventContent> {
        let mut content = match &message.html {
            Some(html) => RoomMessageEventContent::text_html(message.body.clone(), html.clone()),
            None => RoomMessageEventContent::text_markdown(&message.body),
        };

        if let Some(reply_to) = &message.reply_to {
            let event_id = <&EventId>::try_from(reply_to.as_str())?;
            content.relates_to = Some(Relation::Reply {
                in_reply_to: InReplyTo::new(event_id.to_owned()),
            });
        }
        Ok(content)
    }
}

#[async_trait]
impl ChatProvider for MatrixService {
    fn room_id(&self) -> String {
        self.room.room_id().as_str().to_string()
    }

    async fn send(&self, message: OutgoingMessage) -> Result<String, String> {
        tracing::info!("Bot sending message to {}: {}", self.room_id(), message.body);
        let content = Self::build_content(&message).map_err(|e| e.to_string())?;
        self.room
            .send(content)
            .await
            .map(|resp| resp.event_id.to_string())
            .map_err(|e| e.to_string())
    }

    /// Joins with exponential backoff; invites are often seen before the server
    /// lets us in.
    async fn join(&self) -> Result<(), String> {
        let mut delay = JOIN_BASE_DELAY;
        let mut attempt = 1;
        loop {
            match self.room.join().await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < JOIN_ATTEMPTS => {
                    tracing::warn!(
                        "Failed to join room {} (attempt {}/{}), retrying in {}s: {}",
                        self.room_id(),
                        attempt,
                        JOIN_ATTEMPTS,
                        delay.as_secs(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e.to_string()),
            }
        }
    }
}

/// Whether an event predates `start`, i.e. is backlog replayed by the first sync.
pub fn is_backlog(origin_server_ts_ms: u64, start: SystemTime) -> bool {
    UNIX_EPOCH + Duration::from_millis(origin_server_ts_ms) < start
}

/// Plain text messages only; notices, media and edits are not dispatched.
pub fn text_body(content: &RoomMessageEventContent) -> Option<&str> {
    if matches!(content.relates_to, Some(Relation::Replacement(_))) {
        return None;
    }
    match &content.msgtype {
        MessageType::Text(text) => Some(&text.body),
        _ => None,
    }
}

pub fn to_incoming(room: &Room, ev: &OriginalSyncRoomMessageEvent) -> Option<IncomingMessage> {
    let body = text_body(&ev.content)?;
    Some(IncomingMessage::new(
        ev.sender.as_str(),
        room.room_id().as_str(),
        ev.event_id.as_str(),
        body,
    ))
}

pub fn to_invite(room: &Room, ev: &StrippedRoomMemberEvent) -> InviteEvent {
    let membership = match ev.content.membership {
        MembershipState::Invite => Membership::Invite,
        MembershipState::Join => Membership::Join,
        MembershipState::Leave => Membership::Leave,
        MembershipState::Ban => Membership::Ban,
        _ => Membership::Other,
    };
    InviteEvent {
        room_id: room.room_id().as_str().to_string(),
        target: ev.state_key.as_str().to_string(),
        membership,
    }
}
