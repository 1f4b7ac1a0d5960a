use niet_chat::message::{ChatRequest, FALLBACK_REPLY};
use niet_chat::routes::create_router;
use niet_chat::state::AppState;
use niet_chat::widget::session::MemoryStore;
use niet_chat::widget::thread::MessageRole;
use niet_chat::widget::transport::{ChatTransport, HttpTransport, TransportError};
use niet_chat::widget::{ChatWidget, ERROR_NOTICE, Timing};

use axum::{Router, http::StatusCode, routing::post};
use std::sync::Arc;
use std::time::Duration;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/chatBot/message")
}

fn quick() -> Timing {
    Timing {
        sent: Duration::from_millis(10),
        delivered: Duration::from_millis(20),
        read: Duration::from_millis(30),
        typing: Duration::from_millis(5),
        reply_delay: Duration::from_millis(15),
    }
}

#[tokio::test]
async fn http_transport_talks_to_the_endpoint() {
    let state = Arc::new(AppState::new());
    let url = serve(create_router().with_state(state.clone())).await;

    let transport = HttpTransport::new(&url);
    let resp = transport
        .send(ChatRequest {
            message: "what are the admission fees?".into(),
            session_id: Some("s_transport1".into()),
        })
        .await
        .unwrap();

    assert_eq!(resp.session_id.as_deref(), Some("s_transport1"));
    assert_eq!(resp.bot_texts().len(), 2);
    assert_eq!(state.history.recent("s_transport1").await.len(), 3);
}

#[tokio::test]
async fn widget_round_trip_over_http() {
    let state = Arc::new(AppState::new());
    let url = serve(create_router().with_state(state.clone())).await;

    let store = MemoryStore::new();
    let widget = ChatWidget::mount(HttpTransport::new(url), &store)
        .unwrap()
        .with_timing(quick());

    assert!(widget.send_message("hello").await);

    let snap = widget.snapshot().await;
    assert_eq!(snap.messages.len(), 3);
    assert_eq!(snap.messages[2].from, MessageRole::Bot);
    assert_ne!(snap.messages[2].text, ERROR_NOTICE);

    let sid = widget.session_id().unwrap();
    assert_eq!(state.history.recent(sid).await.len(), 2);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let app = Router::new().route(
        "/chatBot/message",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let url = serve(app).await;

    let err = HttpTransport::new(&url)
        .send(ChatRequest { message: "hi".into(), session_id: None })
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Status(500)));

    let widget = ChatWidget::new(HttpTransport::new(url), None).with_timing(quick());
    widget.send_message("hi").await;
    let snap = widget.snapshot().await;
    assert_eq!(snap.messages.len(), 3);
    assert_eq!(snap.messages[2].text, ERROR_NOTICE);
    assert!(!snap.typing);
}

#[tokio::test]
async fn malformed_json_is_an_error() {
    let app = Router::new().route("/chatBot/message", post(|| async { "not json" }));
    let url = serve(app).await;

    let err = HttpTransport::new(url)
        .send(ChatRequest { message: "hi".into(), session_id: None })
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Decode(_)));
}

#[tokio::test]
async fn non_object_reply_shows_the_fallback() {
    let app = Router::new().route(
        "/chatBot/message",
        post(|| async { axum::Json(serde_json::json!("ok")) }),
    );
    let url = serve(app).await;

    let resp = HttpTransport::new(&url)
        .send(ChatRequest { message: "hi".into(), session_id: None })
        .await
        .unwrap();
    assert_eq!(resp.bot_texts(), vec![FALLBACK_REPLY]);

    let widget = ChatWidget::new(HttpTransport::new(url), None).with_timing(quick());
    assert!(widget.send_message("hi").await);
    let snap = widget.snapshot().await;
    assert_eq!(snap.messages[2].text, FALLBACK_REPLY);
}

#[tokio::test]
async fn numeric_reply_is_displayed() {
    let app = Router::new().route(
        "/chatBot/message",
        post(|| async { axum::Json(serde_json::json!({"text": 42})) }),
    );
    let url = serve(app).await;

    let widget = ChatWidget::new(HttpTransport::new(url), None).with_timing(quick());
    widget.send_message("how many?").await;
    let snap = widget.snapshot().await;
    assert_eq!(snap.messages[2].text, "42");
}

#[tokio::test]
async fn unreachable_server_is_an_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let widget = ChatWidget::new(
        HttpTransport::new(format!("http://{addr}/chatBot/message")),
        None,
    )
    .with_timing(quick());
    widget.send_message("anyone?").await;

    let snap = widget.snapshot().await;
    assert_eq!(snap.messages.last().unwrap().text, ERROR_NOTICE);
    assert!(!snap.is_sending);
}
