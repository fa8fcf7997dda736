use crate::{
    middleware::{cors_layer, request_id_middleware, request_logging_middleware},
    routes::{create_routes, not_found_handler},
    websocket::{websocket_handler, WebSocketManager},
    ApiConfig,
};
use axum::{routing::get, Router};
use sre_copilot_core::AssistantCore;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub struct ApiServer {
    config: ApiConfig,
    core: Arc<AssistantCore>,
    websocket_manager: Arc<WebSocketManager>,
}

impl ApiServer {
    pub fn new(config: ApiConfig, core: Arc<AssistantCore>) -> Self {
        let websocket_manager = Arc::new(WebSocketManager::new(core.clone()));

        Self {
            config,
            core,
            websocket_manager,
        }
    }

    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = self.create_app();
        let addr = self.config.bind_address();

        info!("Starting API server on {}", addr);
        info!("CORS origins: {:?}", self.config.cors_origins);
        info!("WebSocket support: {}", self.config.enable_websockets);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("API server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server stopped");
        Ok(())
    }

    pub fn create_app(&self) -> Router {
        let mut app = create_routes(self.core.clone());

        if self.config.enable_websockets {
            app = app.merge(
                Router::new()
                    .route("/ws", get(websocket_handler))
                    .with_state(self.websocket_manager.clone()),
            );
        }

        app.fallback(not_found_handler).layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&self.config))
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(axum::middleware::from_fn(request_logging_middleware)),
        )
    }

    pub fn get_config(&self) -> &ApiConfig {
        &self.config
    }

    pub async fn get_metrics(&self) -> serde_json::Value {
        let stats = self.core.knowledge.stats();
        serde_json::json!({
            "timestamp": chrono::Utc::now(),
            "api": {
                "active_websocket_connections": self.websocket_manager.get_active_connections().await,
                "websockets_enabled": self.config.enable_websockets
            },
            "knowledge": stats,
            "providers": self.core.router.provider_names(),
        })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        },
    }
}
