// src/config.rs
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),
}

/// Server settings read from the environment (and `.env`, when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            _ => DEFAULT_PORT,
        };
        Ok(Self { port })
    }
}

/// Settings for the terminal client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub store_path: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            endpoint: env_or(
                "NIET_CHAT_URL",
                &format!("http://localhost:{DEFAULT_PORT}/chatBot/message"),
            ),
            store_path: env_or("NIET_CHAT_STORE", ".niet_chat_session.json"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
