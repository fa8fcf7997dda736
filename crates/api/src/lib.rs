pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod websocket;

use axum::Json;
use sre_copilot_common::ApiResponse;
use sre_copilot_core::Settings;

pub use error::{ApiError, ApiResult};
pub use server::ApiServer;

pub use sre_copilot_common;
pub use sre_copilot_core;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub enable_websockets: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            cors_origins: vec!["*".to_string()],
            enable_websockets: true,
        }
    }
}

impl ApiConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            ..Self::default()
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Serialize)]
pub struct HealthCheck {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub documents: usize,
    pub providers: Vec<&'static str>,
}

pub fn create_success_response<T: serde::Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_config_default() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:8081");
        assert!(config.enable_websockets);
    }

    #[test]
    fn test_config_from_settings() {
        let settings = Settings {
            port: 9000,
            host: "127.0.0.1".to_string(),
            ..Settings::default()
        };
        assert_eq!(ApiConfig::from_settings(&settings).bind_address(), "127.0.0.1:9000");
    }

    #[test]
    fn test_success_response_creation() {
        let response = create_success_response(json!({"message": "test"}));
        assert!(response.0.success);
        assert!(response.0.error.is_none());
    }
}
