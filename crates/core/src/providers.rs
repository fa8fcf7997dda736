use crate::config::{ProviderConfig, ProviderKind, Settings};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use sre_copilot_common::{AssistantError, Result};
use std::sync::Arc;
use tracing::{debug, info};

const TEMPERATURE: f32 = 0.7;
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Everything a remote model needs to answer one chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub context: String,
    pub message: String,
}

impl Prompt {
    /// The user turn: knowledge context followed by the question.
    pub fn user_content(&self) -> String {
        if self.context.is_empty() {
            return self.message.clone();
        }
        format!(
            "Knowledge base context:\n{}\n\nQuestion: {}",
            self.context, self.message
        )
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, prompt: &Prompt) -> Result<String>;
}

fn non_empty(provider: &str, text: Option<&str>) -> Result<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AssistantError::provider(provider, "response contained no text"))
}

async fn post_json(
    provider: &'static str,
    request: reqwest::RequestBuilder,
    body: &Value,
) -> Result<Value> {
    let response = request
        .json(body)
        .send()
        .await
        .map_err(|e| AssistantError::provider(provider, e))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(AssistantError::provider(
            provider,
            format!("HTTP {}: {}", status, detail),
        ));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| AssistantError::provider(provider, e))
}

pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u16,
}

impl OpenAiProvider {
    pub fn new(api_key: String, endpoint: &str, model: String, max_tokens: u16) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(endpoint.trim_end_matches('/'));

        Self {
            client: Client::with_config(config),
            model,
            max_tokens,
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &'static str {
        ProviderKind::OpenAi.name()
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        let fail = |e: async_openai::error::OpenAIError| AssistantError::provider(self.name(), e);

        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(prompt.system.clone())
                    .build()
                    .map_err(fail)?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt.user_content())
                    .build()
                    .map_err(fail)?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(self.max_tokens)
            .temperature(TEMPERATURE)
            .build()
            .map_err(fail)?;

        let response = self.client.chat().create(request).await.map_err(fail)?;
        let text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref());

        non_empty(self.name(), text)
    }
}

pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u16,
}

impl AnthropicProvider {
    pub fn new(api_key: String, endpoint: String, model: String, max_tokens: u16) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint,
            model,
            max_tokens,
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &'static str {
        ProviderKind::Anthropic.name()
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": TEMPERATURE,
            "system": prompt.system,
            "messages": [{ "role": "user", "content": prompt.user_content() }],
        });

        let request = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION);

        let payload = post_json(self.name(), request, &body).await?;
        non_empty(self.name(), payload["content"][0]["text"].as_str())
    }
}

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u16,
}

impl GeminiProvider {
    pub fn new(api_key: String, endpoint: String, model: String, max_tokens: u16) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint,
            model,
            max_tokens,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &'static str {
        ProviderKind::Gemini.name()
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        let body = json!({
            "systemInstruction": { "parts": [{ "text": prompt.system }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt.user_content() }] }],
            "generationConfig": {
                "maxOutputTokens": self.max_tokens,
                "temperature": TEMPERATURE,
            },
        });

        let request = self
            .client
            .post(self.url())
            .query(&[("key", self.api_key.as_str())]);

        let payload = post_json(self.name(), request, &body).await?;
        non_empty(
            self.name(),
            payload["candidates"][0]["content"]["parts"][0]["text"].as_str(),
        )
    }
}

/// Instantiate adapters for every available provider, keeping priority order.
pub fn build_providers(configs: &[ProviderConfig], settings: &Settings) -> Result<Vec<Arc<dyn Provider>>> {
    let mut providers: Vec<Arc<dyn Provider>> = Vec::new();

    for config in configs.iter().filter(|c| c.available) {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AssistantError::provider(&config.name, "missing API key"))?;

        let provider: Arc<dyn Provider> = match config.kind {
            ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(
                api_key,
                &config.endpoint,
                config.model.clone(),
                settings.max_tokens,
            )),
            ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(
                api_key,
                config.endpoint.clone(),
                config.model.clone(),
                settings.max_tokens,
            )),
            ProviderKind::Gemini => Arc::new(GeminiProvider::new(
                api_key,
                config.endpoint.clone(),
                config.model.clone(),
                settings.max_tokens,
            )),
        };

        debug!("Configured provider {} ({})", config.name, config.model);
        providers.push(provider);
    }

    info!("{} AI provider(s) available", providers.len());
    Ok(providers)
}
