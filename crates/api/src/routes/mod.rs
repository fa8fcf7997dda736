pub mod conversation;
pub mod health;
pub mod knowledge;

use axum::{http::StatusCode, Router};
use sre_copilot_core::AssistantCore;
use std::sync::Arc;

pub fn create_routes(core: Arc<AssistantCore>) -> Router {
    Router::new()
        .nest("/health", health::routes(core.clone()))
        .nest("/api/v1", api_routes(core))
}

fn api_routes(core: Arc<AssistantCore>) -> Router {
    Router::new()
        .nest("/knowledge", knowledge::routes(core.clone()))
        .nest("/conversation", conversation::routes(core))
}

pub async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}
