use serde::{Deserialize, Serialize};
use sre_copilot_common::{AssistantError, Result};
use std::path::PathBuf;
use std::time::Duration;

const ENV_PREFIX: &str = "SRE_COPILOT";

/// Process settings: defaults overridden by `SRE_COPILOT_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub docs_dir: PathBuf,
    pub provider_timeout_secs: u64,
    pub max_tokens: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            docs_dir: PathBuf::from("./docs"),
            provider_timeout_secs: 30,
            max_tokens: 800,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    fn load_from(environment: config::Environment) -> Result<Self> {
        let defaults = Settings::default();
        let settings = config::Config::builder()
            .set_default("host", defaults.host)
            .and_then(|b| b.set_default("port", defaults.port as i64))
            .and_then(|b| b.set_default("docs_dir", defaults.docs_dir.to_string_lossy().to_string()))
            .and_then(|b| b.set_default("provider_timeout_secs", defaults.provider_timeout_secs as i64))
            .and_then(|b| b.set_default("max_tokens", defaults.max_tokens as i64))
            .map_err(|e| AssistantError::Configuration(e.to_string()))?
            .add_source(environment)
            .build()
            .map_err(|e| AssistantError::Configuration(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| AssistantError::Configuration(e.to_string()))
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
    Gemini,
}

/// Fixed preference order; the first available provider is tried first.
pub const PROVIDER_PRIORITY: [ProviderKind; 3] =
    [ProviderKind::Anthropic, ProviderKind::OpenAi, ProviderKind::Gemini];

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
        }
    }

    fn env_prefix(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "ANTHROPIC",
            ProviderKind::OpenAi => "OPENAI",
            ProviderKind::Gemini => "GEMINI",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "https://api.anthropic.com/v1/messages",
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "claude-3-haiku-20240307",
            ProviderKind::OpenAi => "gpt-3.5-turbo",
            ProviderKind::Gemini => "gemini-1.5-flash",
        }
    }
}

/// One entry of the provider list. Availability is decided once, from the
/// presence of credentials, and never changes afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub name: String,
    pub available: bool,
    pub endpoint: String,
    pub model: String,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl ProviderConfig {
    /// Resolve one provider from a variable lookup (`<PREFIX>_API_KEY`,
    /// `<PREFIX>_ENDPOINT`, `<PREFIX>_MODEL`).
    pub fn resolve<F>(kind: ProviderKind, lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| {
            lookup(&format!("{}_{}", kind.env_prefix(), suffix))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = var("API_KEY");
        Self {
            kind,
            name: kind.name().to_string(),
            available: api_key.is_some(),
            endpoint: var("ENDPOINT").unwrap_or_else(|| kind.default_endpoint().to_string()),
            model: var("MODEL").unwrap_or_else(|| kind.default_model().to_string()),
            api_key,
        }
    }

    /// The full provider list in priority order.
    pub fn detect_all<F>(lookup: F) -> Vec<ProviderConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        PROVIDER_PRIORITY
            .iter()
            .map(|kind| ProviderConfig::resolve(*kind, &lookup))
            .collect()
    }

    pub fn from_env() -> Vec<ProviderConfig> {
        Self::detect_all(|key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.port, 8081);
        assert_eq!(settings.provider_timeout(), Duration::from_secs(30));
        assert_eq!(settings.bind_address(), "0.0.0.0:8081");
    }

    #[test]
    fn test_settings_from_environment_source() {
        let env = config::Environment::default()
            .try_parsing(true)
            .source(Some(
                [
                    ("port".to_string(), "9090".to_string()),
                    ("docs_dir".to_string(), "/srv/docs".to_string()),
                ]
                .into_iter()
                .collect(),
            ));

        let settings = Settings::load_from(env).unwrap();
        assert_eq!(settings.port, 9090);
        assert_eq!(settings.docs_dir, PathBuf::from("/srv/docs"));
        assert_eq!(settings.provider_timeout_secs, 30);
    }

    #[test]
    fn test_priority_order_is_fixed() {
        let configs = ProviderConfig::detect_all(lookup(&[]));
        let names: Vec<&str> = configs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["anthropic", "openai", "gemini"]);
        assert!(configs.iter().all(|c| !c.available));
    }

    #[test]
    fn test_availability_from_credentials() {
        let configs = ProviderConfig::detect_all(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("GEMINI_API_KEY", "   "),
        ]));

        let openai = &configs[1];
        assert!(openai.available);
        assert_eq!(openai.model, "gpt-4o-mini");
        assert_eq!(openai.endpoint, "https://api.openai.com/v1");

        assert!(!configs[0].available);
        assert!(!configs[2].available, "blank keys do not count as credentials");
    }

    #[test]
    fn test_api_key_never_serialized() {
        let config = ProviderConfig::resolve(ProviderKind::Anthropic, &lookup(&[("ANTHROPIC_API_KEY", "secret")]));
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"available\":true"));
    }
}
