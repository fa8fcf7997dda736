use crate::{
    create_success_response,
    error::{validation_error, ApiResult},
};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sre_copilot_common::{ApiResponse, Intent};
use sre_copilot_core::{AssistantCore, ProviderConfig};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

pub const MAX_MESSAGE_LENGTH: usize = 10_000;

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub source: String,
    pub intent: Intent,
    pub processing_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderConfig>,
    pub active: Vec<&'static str>,
}

pub fn routes(core: Arc<AssistantCore>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/providers", get(providers))
        .with_state(core)
}

async fn chat(
    State(core): State<Arc<AssistantCore>>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ApiResponse<ChatResponse>>> {
    let start_time = Instant::now();
    debug!("Chat request: {}", request.message);

    if request.message.trim().is_empty() {
        return Err(validation_error("Message cannot be empty"));
    }
    if request.message.len() > MAX_MESSAGE_LENGTH {
        return Err(validation_error("Message too long"));
    }

    let routed = core.router.route(&request.message).await?;
    let processing_time_ms = start_time.elapsed().as_millis() as u64;
    info!("Chat answered by {} in {}ms", routed.source, processing_time_ms);

    Ok(create_success_response(ChatResponse {
        response: routed.text,
        source: routed.source.to_string(),
        intent: routed.intent,
        processing_time_ms,
    }))
}

async fn providers(State(core): State<Arc<AssistantCore>>) -> Json<ApiResponse<ProvidersResponse>> {
    create_success_response(ProvidersResponse {
        providers: core.providers.clone(),
        active: core.router.provider_names(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{body_json, get, post_json, test_core};
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_chat_falls_back_to_local() {
        let response = routes(test_core())
            .oneshot(post_json("/chat", json!({ "message": "What is a CUJ?" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["source"], "local");
        assert_eq!(body["data"]["intent"]["primary"], "cuj");
        assert_eq!(body["data"]["intent"]["questionType"], "what");
        assert!(body["data"]["response"].as_str().unwrap().contains("1 CUJs"));
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected() {
        let response = routes(test_core())
            .oneshot(post_json("/chat", json!({ "message": "   " })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error_code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_overlong_message_is_rejected() {
        let message = "a".repeat(MAX_MESSAGE_LENGTH + 1);
        let response = routes(test_core())
            .oneshot(post_json("/chat", json!({ "message": message })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_providers_listing_hides_keys() {
        let response = routes(test_core()).oneshot(get("/providers")).await.unwrap();
        let body = body_json(response).await;

        let names: Vec<&str> = body["data"]["providers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["anthropic", "openai", "gemini"]);
        assert!(body["data"]["providers"][0].get("api_key").is_none());
        assert_eq!(body["data"]["active"], json!([]));
    }
}
