pub mod config;
pub mod intent;
pub mod providers;
pub mod responder;
pub mod router;

pub use config::{ProviderConfig, ProviderKind, Settings};
pub use intent::IntentClassifier;
pub use providers::{Prompt, Provider};
pub use responder::LocalResponder;
pub use router::{ResponseRouter, ResponseSource, RoutedResponse};

use sre_copilot_common::{Intent, Result};
use sre_copilot_knowledge::KnowledgeBase;
use std::sync::Arc;

/// The loaded knowledge base plus the router answering questions over it.
pub struct AssistantCore {
    pub knowledge: Arc<KnowledgeBase>,
    pub router: Arc<ResponseRouter>,
    pub providers: Vec<ProviderConfig>,
    pub intent_classifier: Arc<IntentClassifier>,
}

impl AssistantCore {
    pub fn new(knowledge: KnowledgeBase, settings: &Settings, configs: Vec<ProviderConfig>) -> Result<Self> {
        let adapters = providers::build_providers(&configs, settings)?;
        Ok(Self::with_providers(knowledge, adapters, configs, settings))
    }

    /// Build around already constructed provider adapters.
    pub fn with_providers(
        knowledge: KnowledgeBase,
        adapters: Vec<Arc<dyn Provider>>,
        providers: Vec<ProviderConfig>,
        settings: &Settings,
    ) -> Self {
        let knowledge = Arc::new(knowledge);
        let router = Arc::new(ResponseRouter::new(
            knowledge.clone(),
            adapters,
            settings.provider_timeout(),
        ));

        Self {
            knowledge,
            router,
            providers,
            intent_classifier: Arc::new(IntentClassifier::new()),
        }
    }

    pub fn classify(&self, message: &str) -> Intent {
        self.intent_classifier.classify(message)
    }

    pub async fn respond(&self, message: &str) -> Result<String> {
        self.router.respond(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sre_copilot_common::Topic;

    #[tokio::test]
    async fn test_core_without_credentials_answers_locally() {
        let providers = ProviderConfig::detect_all(|_| None);
        let core = AssistantCore::new(KnowledgeBase::new().unwrap(), &Settings::default(), providers).unwrap();

        assert!(core.router.provider_names().is_empty());
        assert_eq!(core.providers.len(), 3);
        assert_eq!(core.classify("how do I build dashboards").primary, Topic::Observability);

        let text = core.respond("What is an SLI?").await.unwrap();
        assert!(text.contains("Service Level Indicator"));
    }
}
