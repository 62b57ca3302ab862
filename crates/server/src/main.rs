//! Test harness for the recommendation orchestrator.
//!
//! Loads the catalog and embedding index named by the environment, then
//! runs one query end to end (the first argument, or a default horror query).

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use data_loader::CatalogStore;
use server::{RecommendationOrchestrator, RecommenderConfig};

const DEFAULT_QUERY: &str = "A horror movie where the hero loses his mind.";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,sources=debug,pipeline=debug")),
        )
        .init();

    info!("Starting semantic recommender test harness");

    let config = RecommenderConfig::from_env().context("Failed to load configuration")?;

    info!("Loading catalog and embedding index...");
    let store = CatalogStore::load(&config.catalog_path, &config.embeddings_path)
        .context("Failed to load catalog store")?;
    info!(
        "Loaded {} items, {} embeddings",
        store.catalog.len(),
        store.embeddings.len()
    );

    let orchestrator = RecommendationOrchestrator::from_config(&config, store)?;

    let query = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_QUERY.to_string());
    info!("Recommending for '{}' (top_k: {})", query, config.default_top_k);

    let result = match orchestrator.recommend(&query, config.default_top_k).await {
        Ok(result) => result,
        Err(e) => {
            error!("{}", e);
            anyhow::bail!(e.user_message());
        }
    };

    for degradation in &result.degradations {
        warn!("Degraded: {}", degradation);
    }
    let labels: Vec<&str> = result.labels.iter().map(|g| g.label()).collect();
    info!("Predicted genres: {}", labels.join(", "));

    info!("Received {} recommendations:", result.items.len());
    for (i, rec) in result.items.iter().enumerate() {
        info!(
            "{}. {} ({})",
            i + 1,
            rec.title,
            rec.year.map(|y| y.to_string()).unwrap_or_else(|| "????".to_string())
        );
        info!("   {}", rec.explanation);
    }

    Ok(())
}
