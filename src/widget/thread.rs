// src/widget/thread.rs
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Hands out wall-clock millisecond ids, bumped so two calls in the same
/// millisecond still differ.
#[derive(Debug)]
pub struct IdClock {
    last: AtomicU64,
}

impl IdClock {
    pub fn new() -> Self {
        Self { last: AtomicU64::new(1) }
    }

    pub fn next(&self) -> MessageId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
            .unwrap_or_else(|last| last);
        MessageId(now.max(prev + 1))
    }
}

impl Default for IdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Bot,
}

/// Cosmetic delivery label shown under user messages. Ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sending,
    Sent,
    Delivered,
    Read,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub from: MessageRole,
    pub text: String,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeliveryStatus>,
}

impl ChatMessage {
    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            from: MessageRole::User,
            text: text.into(),
            time: clock_label(),
            status: Some(DeliveryStatus::Sending),
        }
    }

    pub fn bot(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            from: MessageRole::Bot,
            text: text.into(),
            time: clock_label(),
            status: None,
        }
    }
}

/// Local `HH:MM`.
pub fn clock_label() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}

/// Append-only message list.
#[derive(Debug, Clone, Default)]
pub struct Thread {
    messages: Vec<ChatMessage>,
}

impl Thread {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, msg: ChatMessage) {
        self.messages.push(msg);
    }

    /// Moves the message forward to `status`. Returns `false` when the id is
    /// unknown, the message carries no status, or `status` is not ahead.
    pub fn update_status(&mut self, id: MessageId, status: DeliveryStatus) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(ChatMessage { status: Some(current), .. }) if *current < status => {
                *current = status;
                true
            }
            _ => false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}
