//! Loads a recipe file into the catalog and backfills food embeddings.
//!
//! Usage: `ingest <recipes.json>`

use std::path::PathBuf;

use anyhow::Context;
use swipe_api::{
    config::Config,
    db::{create_pool, run_migrations, PgSwipeStore},
    services::{
        ingest::{
            backfill_embeddings, ingest_recipes, RecipeRecord, EMBEDDING_BATCH_PAUSE,
            EMBEDDING_BATCH_SIZE,
        },
        OpenAiEmbedder,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("swipe_api=info,ingest=info")),
        )
        .init();

    let path: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: ingest <recipes.json>")?;

    let config = Config::from_env()?;

    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records: Vec<RecipeRecord> =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))?;

    let pool = create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("failed to connect to Postgres")?;
    run_migrations(&pool).await?;
    let store = PgSwipeStore::new(pool);

    let report = ingest_recipes(&store, &records).await?;
    tracing::info!(
        categories = report.categories,
        foods = report.foods,
        path = %path.display(),
        "Catalog loaded"
    );

    let Some(api_key) = config.openai_api_key.clone() else {
        tracing::warn!("OPENAI_API_KEY not set, skipping embedding backfill");
        return Ok(());
    };

    let embedder = OpenAiEmbedder::new(api_key, config.openai_api_url, config.embedding_model);
    let embedded =
        backfill_embeddings(&store, &embedder, EMBEDDING_BATCH_SIZE, EMBEDDING_BATCH_PAUSE).await?;
    tracing::info!(embedded, "Embedding backfill finished");

    Ok(())
}
