// src/widget/mod.rs
//! Headless model of the floating chat widget.
//!
//! [`ChatWidget`] owns everything the launcher and message thread render:
//! visibility, the message list, the input buffer, the sending and typing
//! flags and the scroll anchor. A view layer reads [`ChatWidget::snapshot`]
//! and forwards user events to the widget.
//!
//! Each call to [`ChatWidget::send_message`] is one request/response cycle.
//! Cycles may overlap; their delivery-status and typing timers are keyed by
//! the user message id in a per-widget [`TimerRegistry`].

pub mod session;
pub mod thread;
pub mod timers;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::message::ChatRequest;
use session::{SessionStore, StoreError};
use thread::{ChatMessage, DeliveryStatus, IdClock, MessageId, Thread};
use timers::{TimerKey, TimerRegistry};
use transport::ChatTransport;

pub const GREETING: &str = "Hello! I'm the NIET Assistant — how can I help you today?";
pub const ERROR_NOTICE: &str = "There was an error contacting the chat server. Please try again later.";

/// Delays of one send cycle, measured from the moment the user message is
/// appended (except `reply_delay`, which starts when the response arrives).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub sent: Duration,
    pub delivered: Duration,
    pub read: Duration,
    pub typing: Duration,
    pub reply_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            sent: Duration::from_millis(400),
            delivered: Duration::from_millis(900),
            read: Duration::from_millis(1600),
            typing: Duration::from_millis(200),
            reply_delay: Duration::from_millis(700),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

impl KeyPress {
    pub fn enter() -> Self {
        Self { key: Key::Enter, shift: false }
    }

    pub fn shift_enter() -> Self {
        Self { key: Key::Enter, shift: true }
    }
}

/// What a renderer needs to draw the widget.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetSnapshot {
    pub open: bool,
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub is_sending: bool,
    pub typing: bool,
    pub session_id: Option<String>,
    pub scroll_top: usize,
    pub scroll_height: usize,
}

#[derive(Debug)]
struct WidgetState {
    open: bool,
    thread: Thread,
    input: String,
    is_sending: bool,
    typing: bool,
    scroll_top: usize,
}

impl WidgetState {
    fn new() -> Self {
        let mut thread = Thread::new();
        thread.push(ChatMessage::bot(MessageId(1), GREETING));
        let mut state = Self {
            open: false,
            thread,
            input: String::new(),
            is_sending: false,
            typing: false,
            scroll_top: 0,
        };
        state.pin_to_bottom();
        state
    }

    // One row per message, plus the typing bubble.
    fn scroll_height(&self) -> usize {
        self.thread.messages().len() + usize::from(self.typing)
    }

    fn pin_to_bottom(&mut self) {
        self.scroll_top = self.scroll_height();
    }

    fn set_typing(&mut self, typing: bool) {
        self.typing = typing;
        self.pin_to_bottom();
    }

    fn push(&mut self, msg: ChatMessage) {
        self.thread.push(msg);
        self.pin_to_bottom();
    }
}

/// Cloneable handle; clones share state and timers.
pub struct ChatWidget<T> {
    state: Arc<RwLock<WidgetState>>,
    transport: Arc<T>,
    session_id: Option<String>,
    timers: Arc<TimerRegistry>,
    ids: Arc<IdClock>,
    timing: Timing,
}

impl<T> Clone for ChatWidget<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            transport: Arc::clone(&self.transport),
            session_id: self.session_id.clone(),
            timers: Arc::clone(&self.timers),
            ids: Arc::clone(&self.ids),
            timing: self.timing,
        }
    }
}

impl<T: ChatTransport> ChatWidget<T> {
    pub fn new(transport: T, session_id: Option<String>) -> Self {
        Self {
            state: Arc::new(RwLock::new(WidgetState::new())),
            transport: Arc::new(transport),
            session_id,
            timers: Arc::new(TimerRegistry::new()),
            ids: Arc::new(IdClock::new()),
            timing: Timing::default(),
        }
    }

    /// Builds a widget whose session token comes from `store`, creating and
    /// persisting one when the store has none.
    pub fn mount(transport: T, store: &dyn SessionStore) -> Result<Self, StoreError> {
        let sid = session::get_or_create(store)?;
        Ok(Self::new(transport, Some(sid)))
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Cancels every pending status and typing timer.
    pub fn unmount(&self) -> usize {
        let cancelled = self.timers.cancel_all();
        debug!(cancelled, "chat widget unmounted");
        cancelled
    }

    pub async fn toggle_open(&self) -> bool {
        let mut state = self.state.write().await;
        state.open = !state.open;
        state.pin_to_bottom();
        state.open
    }

    pub async fn set_input(&self, text: impl Into<String>) {
        self.state.write().await.input = text.into();
    }

    /// User scroll inside the message list, clamped to the content height.
    pub async fn scroll_to(&self, offset: usize) {
        let mut state = self.state.write().await;
        state.scroll_top = offset.min(state.scroll_height());
    }

    pub async fn snapshot(&self) -> WidgetSnapshot {
        let state = self.state.read().await;
        WidgetSnapshot {
            open: state.open,
            messages: state.thread.messages().to_vec(),
            input: state.input.clone(),
            is_sending: state.is_sending,
            typing: state.typing,
            session_id: self.session_id.clone(),
            scroll_top: state.scroll_top,
            scroll_height: state.scroll_height(),
        }
    }

    /// Form submission: sends the current input buffer.
    pub async fn submit(&self) -> bool {
        let text = self.state.read().await.input.clone();
        self.send_message(&text).await
    }

    /// Enter without Shift submits. Returns whether the key was consumed.
    pub async fn key_down(&self, press: KeyPress) -> bool {
        if press.key == Key::Enter && !press.shift {
            self.submit().await;
            true
        } else {
            false
        }
    }

    /// Runs one send cycle to completion. Returns `false` without touching
    /// any state when `text` is blank.
    pub async fn send_message(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        let id = self.ids.next();
        {
            let mut state = self.state.write().await;
            state.push(ChatMessage::user(id, text));
            state.input.clear();
            state.is_sending = true;
        }
        self.advance_status(id);
        self.schedule_typing(id);

        let request = ChatRequest {
            message: text.to_string(),
            session_id: self.session_id.clone(),
        };

        match self.transport.send(request).await {
            Ok(response) => {
                let texts = response.bot_texts();
                tokio::time::sleep(self.timing.reply_delay).await;
                self.timers.cancel(TimerKey::Typing(id));

                let mut state = self.state.write().await;
                state.set_typing(false);
                for text in texts {
                    state.push(ChatMessage::bot(self.ids.next(), text));
                }
                state.is_sending = false;
            }
            Err(err) => {
                error!(error = %err, message_id = %id, "chat request failed");
                self.timers.cancel(TimerKey::Typing(id));

                let mut state = self.state.write().await;
                state.set_typing(false);
                state.push(ChatMessage::bot(self.ids.next(), ERROR_NOTICE));
                state.is_sending = false;
            }
        }
        true
    }

    fn advance_status(&self, id: MessageId) {
        let steps = [
            (self.timing.sent, DeliveryStatus::Sent),
            (self.timing.delivered, DeliveryStatus::Delivered),
            (self.timing.read, DeliveryStatus::Read),
        ];
        for (delay, status) in steps {
            let state = Arc::clone(&self.state);
            self.timers.schedule(TimerKey::Status(id), delay, async move {
                let mut state = state.write().await;
                if state.thread.update_status(id, status) {
                    state.pin_to_bottom();
                }
            });
        }
    }

    fn schedule_typing(&self, id: MessageId) {
        let state = Arc::clone(&self.state);
        self.timers.schedule(TimerKey::Typing(id), self.timing.typing, async move {
            state.write().await.set_typing(true);
        });
    }
}
