use crate::{create_success_response, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use sre_copilot_common::{ApiResponse, Document, KnowledgeStats, SearchResponse};
use sre_copilot_core::AssistantCore;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub category: Option<String>,
}

pub fn routes(core: Arc<AssistantCore>) -> Router {
    Router::new()
        .route("/search", get(search))
        .route("/stats", get(stats))
        .route("/documents/*id", get(get_document))
        .with_state(core)
}

async fn search(
    State(core): State<Arc<AssistantCore>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<ApiResponse<SearchResponse>>> {
    debug!("Search '{}' in {:?}", query.q, query.category);
    let response = core.knowledge.search(&query.q, query.category.as_deref())?;
    Ok(create_success_response(response))
}

async fn stats(State(core): State<Arc<AssistantCore>>) -> Json<ApiResponse<KnowledgeStats>> {
    create_success_response(core.knowledge.stats())
}

async fn get_document(
    State(core): State<Arc<AssistantCore>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Document>>> {
    let document = core.knowledge.store().get(&id)?;
    Ok(create_success_response(document.clone()))
}
