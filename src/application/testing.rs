//! In-memory `ChatProvider` that records everything sent through it.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::traits::ChatProvider;
use crate::domain::types::OutgoingMessage;

pub struct RecordingChat {
    room_id: String,
    sent: Mutex<Vec<OutgoingMessage>>,
    joined: AtomicBool,
    fail_join: bool,
}

impl RecordingChat {
    pub fn new(room_id: &str) -> Self {
        Self {
            room_id: room_id.to_string(),
            sent: Mutex::new(Vec::new()),
            joined: AtomicBool::new(false),
            fail_join: false,
        }
    }

    pub fn failing_join(mut self) -> Self {
        self.fail_join = true;
        self
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn joined(&self) -> bool {
        self.joined.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for RecordingChat {
    async fn send(&self, message: OutgoingMessage) -> Result<String, String> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(message);
        Ok(format!("$sent{}", sent.len()))
    }

    async fn join(&self) -> Result<(), String> {
        if self.fail_join {
            return Err("M_FORBIDDEN: You are not invited to this room.".to_string());
        }
        self.joined.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn room_id(&self) -> String {
        self.room_id.clone()
    }
}
