// src/widget/transport.rs
use std::future::Future;

use thiserror::Error;

use crate::message::{ChatRequest, ChatResponse};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("server error: {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unreadable reply: {0}")]
    Decode(#[from] serde_json::Error),
}

/// How the widget reaches the chat endpoint.
pub trait ChatTransport: Send + Sync + 'static {
    fn send(&self, request: ChatRequest) -> impl Future<Output = Result<ChatResponse, TransportError>> + Send;
}

/// Posts JSON to `POST /chatBot/message`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self { client, endpoint: endpoint.into() }
    }
}

impl ChatTransport for HttpTransport {
    async fn send(&self, request: ChatRequest) -> Result<ChatResponse, TransportError> {
        let res = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        let body = res.bytes().await?;
        let value: serde_json::Value = serde_json::from_slice(&body)?;
        Ok(ChatResponse::from_value(value))
    }
}
