// src/routes/mod.rs
pub mod chat;

use crate::state::SharedState;
use axum::{
    Json, Router,
    routing::{get, post},
};
use chat::message_handler;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router() -> Router<SharedState> {
    let chat_routes = Router::new().route("/message", post(message_handler));

    Router::new()
        .route("/", get(root_handler))
        .nest("/chatBot", chat_routes)
        .layer(TraceLayer::new_for_http())
}

/// The complete service the server binary runs.
pub fn build_app(state: SharedState) -> Router {
    create_router()
        .with_state(state)
        .layer(CorsLayer::very_permissive())
}

async fn root_handler() -> Json<Value> {
    Json(json!({ "msg": "hello world" }))
}
