use anyhow::Result;
use sre_copilot_api::{ApiConfig, ApiServer};
use sre_copilot_core::{AssistantCore, ProviderConfig, Settings};
use sre_copilot_knowledge::{FsTextLoader, KnowledgeBase};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sre_copilot=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SRE Copilot...");

    let settings = Settings::load()?;
    let providers = ProviderConfig::from_env();
    for provider in &providers {
        info!(
            "Provider {}: {} ({})",
            provider.name,
            if provider.available { "available" } else { "no credentials" },
            provider.model
        );
    }

    let mut knowledge = KnowledgeBase::new()?;
    match knowledge.load_directory(&settings.docs_dir, &FsTextLoader).await {
        Ok(report) => info!(
            "Knowledge base ready: {} documents, {} concepts",
            report.loaded, report.concepts_added
        ),
        Err(e) => {
            warn!("{}", e);
            info!("Starting with an empty knowledge base");
        }
    }

    let core = Arc::new(AssistantCore::new(knowledge, &settings, providers)?);
    let server = ApiServer::new(ApiConfig::from_settings(&settings), core);

    server.start().await.map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}
