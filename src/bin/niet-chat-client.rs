//! Terminal front end for the chat widget.
//!
//! Each stdin line is submitted like the widget's Enter key; `/toggle` opens or
//! closes the thread and `/quit` exits.

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use niet_chat::{
    config::ClientConfig,
    widget::{
        ChatWidget, KeyPress,
        session::FileStore,
        thread::{ChatMessage, DeliveryStatus, MessageRole},
        transport::HttpTransport,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env();
    let store = FileStore::new(&config.store_path);
    let widget = ChatWidget::mount(HttpTransport::new(&config.endpoint), &store)
        .with_context(|| format!("failed to read session store {}", config.store_path))?;

    widget.toggle_open().await;
    println!(
        "NIET Virtual Assistant (session {})",
        widget.session_id().unwrap_or("-")
    );

    let mut shown = print_new(&widget, 0).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/toggle" => {
                let open = widget.toggle_open().await;
                println!("[chat {}]", if open { "opened" } else { "closed" });
                if open {
                    shown = print_new(&widget, 0).await;
                }
            }
            _ => {
                widget.set_input(line.clone()).await;
                widget.key_down(KeyPress::enter()).await;
                shown = print_new(&widget, shown).await;
            }
        }
    }

    widget.unmount();
    Ok(())
}

async fn print_new(widget: &ChatWidget<HttpTransport>, from: usize) -> usize {
    let snapshot = widget.snapshot().await;
    if !snapshot.open {
        return snapshot.messages.len();
    }
    for msg in snapshot.messages.iter().skip(from) {
        println!("{}", format_line(msg));
    }
    snapshot.messages.len()
}

fn format_line(msg: &ChatMessage) -> String {
    let who = match msg.from {
        MessageRole::User => "you",
        MessageRole::Bot => "niet",
    };
    let status = match msg.status {
        Some(DeliveryStatus::Sending) => " (sending)",
        Some(DeliveryStatus::Sent) => " (sent)",
        Some(DeliveryStatus::Delivered) => " (delivered)",
        Some(DeliveryStatus::Read) => " (read)",
        None => "",
    };
    format!("[{}] {who}: {}{status}", msg.time, msg.text)
}
