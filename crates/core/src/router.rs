use crate::intent::IntentClassifier;
use crate::providers::{Prompt, Provider};
use crate::responder::{supporting_snippets, LocalResponder};
use serde::{Serialize, Serializer};
use sre_copilot_common::{Intent, Result};
use sre_copilot_knowledge::KnowledgeBase;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const SYSTEM_PROMPT: &str = "You are an expert Site Reliability Engineering assistant. \
Answer questions about critical user journeys (CUJs), service level indicators (SLIs), \
service level objectives (SLOs), error budgets and observability. Ground your answer in the \
knowledge base context when it is relevant, keep it concise and practical, and say so when \
the context does not cover the question.";

/// Where a response came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseSource {
    Provider { name: String },
    Local,
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseSource::Provider { name } => write!(f, "provider:{}", name),
            ResponseSource::Local => write!(f, "local"),
        }
    }
}

impl Serialize for ResponseSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutedResponse {
    pub text: String,
    pub source: ResponseSource,
    pub intent: Intent,
}

/// Tries each configured provider in priority order, then falls back to the
/// local responder. Holds no per-message state.
pub struct ResponseRouter {
    knowledge: Arc<KnowledgeBase>,
    providers: Vec<Arc<dyn Provider>>,
    classifier: IntentClassifier,
    responder: LocalResponder,
    provider_timeout: Duration,
}

impl ResponseRouter {
    pub fn new(
        knowledge: Arc<KnowledgeBase>,
        providers: Vec<Arc<dyn Provider>>,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            knowledge,
            providers,
            classifier: IntentClassifier::new(),
            responder: LocalResponder::new(),
            provider_timeout,
        }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub async fn respond(&self, message: &str) -> Result<String> {
        Ok(self.route(message).await?.text)
    }

    pub async fn route(&self, message: &str) -> Result<RoutedResponse> {
        let intent = self.classifier.classify(message);

        if let Some((name, text)) = self.try_providers(message, &intent).await {
            info!("Answered with provider {}", name);
            return Ok(RoutedResponse {
                text,
                source: ResponseSource::Provider { name: name.to_string() },
                intent,
            });
        }

        let text = self.responder.synthesize(message, &intent, &self.knowledge)?;
        info!("Answered with local responder");
        Ok(RoutedResponse {
            text,
            source: ResponseSource::Local,
            intent,
        })
    }

    async fn try_providers(&self, message: &str, intent: &Intent) -> Option<(&'static str, String)> {
        if self.providers.is_empty() {
            debug!("No providers configured");
            return None;
        }

        let prompt = Prompt {
            system: SYSTEM_PROMPT.to_string(),
            context: self.context_summary(intent),
            message: message.to_string(),
        };

        for provider in &self.providers {
            let name = provider.name();
            match tokio::time::timeout(self.provider_timeout, provider.generate(&prompt)).await {
                Ok(Ok(text)) if !text.trim().is_empty() => return Some((name, text)),
                Ok(Ok(_)) => warn!("Provider {} returned an empty response", name),
                Ok(Err(e)) => warn!("{}", e),
                Err(_) => warn!(
                    "Provider {} timed out after {:?}",
                    name, self.provider_timeout
                ),
            }
        }

        None
    }

    /// Knowledge base counts plus a few excerpts relevant to the message topic.
    pub fn context_summary(&self, intent: &Intent) -> String {
        let stats = self.knowledge.stats();
        let mut summary = format!(
            "Documents: {}\nCUJs: {}\nSLIs: {}\nSLOs: {}\nBest practices: {}\nPDFs: {}",
            stats.documents, stats.cujs, stats.slis, stats.slos, stats.best_practices, stats.pdfs
        );

        for excerpt in supporting_snippets(&self.knowledge, intent.primary) {
            summary.push_str("\n- ");
            summary.push_str(&excerpt);
        }
        summary
    }
}
