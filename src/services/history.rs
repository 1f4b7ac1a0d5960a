// src/services/history.rs
use std::collections::{HashMap, VecDeque};

use tokio::sync::RwLock;

/// Conversations kept in memory before the least recently used one is dropped.
pub const MAX_CONVERSATIONS: usize = 1024;
/// Turns kept per conversation; older ones fall off the front.
pub const MAX_TURNS: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { speaker: Speaker::User, text: text.into() }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self { speaker: Speaker::Bot, text: text.into() }
    }
}

#[derive(Debug, Default)]
struct Log {
    turns: HashMap<String, VecDeque<Turn>>,
    // Least recently used first.
    recency: VecDeque<String>,
}

impl Log {
    fn touch(&mut self, session_id: &str) {
        if let Some(pos) = self.recency.iter().position(|s| s == session_id) {
            self.recency.remove(pos);
        }
        self.recency.push_back(session_id.to_string());
    }
}

/// Recent turns per client `sessionId`, bounded in both directions.
#[derive(Debug)]
pub struct ConversationLog {
    inner: RwLock<Log>,
    max_conversations: usize,
    max_turns: usize,
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::with_limits(MAX_CONVERSATIONS, MAX_TURNS)
    }
}

impl ConversationLog {
    pub fn with_limits(max_conversations: usize, max_turns: usize) -> Self {
        Self {
            inner: RwLock::new(Log::default()),
            max_conversations: max_conversations.max(1),
            max_turns: max_turns.max(1),
        }
    }

    /// Turns recorded so far for `session_id`, oldest first.
    pub async fn recent(&self, session_id: &str) -> Vec<Turn> {
        self.inner
            .read()
            .await
            .turns
            .get(session_id)
            .map(|t| t.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Appends one exchange: the user's text followed by the bot's replies.
    pub async fn record_exchange(&self, session_id: &str, user_text: &str, replies: &[String]) {
        let mut log = self.inner.write().await;
        log.touch(session_id);

        let turns = log.turns.entry(session_id.to_string()).or_default();
        turns.push_back(Turn::user(user_text));
        turns.extend(replies.iter().map(Turn::bot));
        while turns.len() > self.max_turns {
            turns.pop_front();
        }

        while log.recency.len() > self.max_conversations {
            if let Some(evicted) = log.recency.pop_front() {
                log.turns.remove(&evicted);
            }
        }
    }

    pub async fn conversations(&self) -> usize {
        self.inner.read().await.turns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exchange_is_recorded_in_order() {
        let log = ConversationLog::default();
        log.record_exchange("s_a", "hi", &["hello".into(), "how can I help?".into()]).await;

        assert_eq!(
            log.recent("s_a").await,
            vec![Turn::user("hi"), Turn::bot("hello"), Turn::bot("how can I help?")]
        );
        assert!(log.recent("s_b").await.is_empty());
    }

    #[tokio::test]
    async fn old_turns_fall_off() {
        let log = ConversationLog::with_limits(4, 3);
        log.record_exchange("s_a", "one", &["1".into()]).await;
        log.record_exchange("s_a", "two", &["2".into()]).await;

        assert_eq!(
            log.recent("s_a").await,
            vec![Turn::bot("1"), Turn::user("two"), Turn::bot("2")]
        );
    }
}
