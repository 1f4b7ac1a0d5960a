// src/state.rs
use std::sync::Arc;

use crate::services::chatbot::{KeywordResponder, Responder};
use crate::services::history::ConversationLog;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub history: ConversationLog,
    pub responder: Arc<dyn Responder>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_responder(Arc::new(KeywordResponder))
    }

    pub fn with_responder(responder: Arc<dyn Responder>) -> Self {
        Self {
            history: ConversationLog::default(),
            responder,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
