use crate::{create_success_response, HealthCheck};
use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;
use sre_copilot_common::ApiResponse;
use sre_copilot_core::AssistantCore;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::debug;

static STARTED: OnceLock<Instant> = OnceLock::new();

fn uptime_seconds() -> u64 {
    STARTED.get_or_init(Instant::now).elapsed().as_secs()
}

pub fn routes(core: Arc<AssistantCore>) -> Router {
    uptime_seconds();
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
        .with_state(core)
}

async fn health_check(State(core): State<Arc<AssistantCore>>) -> Json<ApiResponse<HealthCheck>> {
    debug!("Health check requested");

    create_success_response(HealthCheck {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime_seconds(),
        documents: core.knowledge.store().len(),
        providers: core.router.provider_names(),
    })
}

/// Ready once at least one document is loaded.
async fn readiness_check(State(core): State<Arc<AssistantCore>>) -> Json<serde_json::Value> {
    debug!("Readiness check requested");

    let documents = core.knowledge.store().len();
    let status = if documents > 0 { "ready" } else { "not_ready" };

    Json(json!({
        "status": status,
        "timestamp": chrono::Utc::now(),
        "checks": {
            "knowledge": if documents > 0 { "ready" } else { "empty" },
            "providers": core.router.provider_names().len(),
        }
    }))
}

async fn liveness_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "alive",
        "timestamp": chrono::Utc::now(),
        "uptime_seconds": uptime_seconds()
    }))
}
