use std::{sync::Arc, time::Duration};

use anyhow::Context;
use swipe_api::{
    config::Config,
    db::{create_pool, create_redis_client, run_migrations, Cache, CacheWriterHandle, PgSwipeStore},
    routes::{create_router, AppState},
    services::{
        CachedNarrator, NarrativeGenerator, OpenAiNarrator, RandomPicker, SessionRegistry,
        TemplateNarrator,
    },
};
use tracing_subscriber::EnvFilter;

async fn build_narrator(
    config: &Config,
) -> anyhow::Result<(Arc<dyn NarrativeGenerator>, Option<CacheWriterHandle>)> {
    let base: Arc<dyn NarrativeGenerator> = match &config.openai_api_key {
        Some(key) => Arc::new(OpenAiNarrator::new(
            key.clone(),
            config.openai_api_url.clone(),
            config.insight_model.clone(),
        )),
        None => {
            tracing::warn!("OPENAI_API_KEY not set, using template insights");
            Arc::new(TemplateNarrator)
        }
    };

    let Some(redis_url) = &config.redis_url else {
        return Ok((base, None));
    };

    let client = create_redis_client(redis_url).context("failed to create Redis client")?;
    let (cache, handle) = Cache::new(client).await;
    tracing::info!(generator = base.name(), "Insight caching enabled");

    Ok((Arc::new(CachedNarrator::new(base, cache)), Some(handle)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("swipe_api=debug,tower_http=debug")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Connect to Postgres and bring the schema up to date
    let pool = create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("failed to connect to Postgres")?;
    run_migrations(&pool).await?;

    // Build services
    let store = Arc::new(PgSwipeStore::new(pool));
    let (narrator, cache_handle) = build_narrator(&config).await?;

    let sessions = SessionRegistry::new(store.clone(), Duration::from_secs(config.session_ttl_secs));
    // Sweep a few times per TTL so idle entries do not linger much past it
    let sweeper = sessions.spawn_sweeper(Duration::from_secs((config.session_ttl_secs / 4).max(1)));

    let state = AppState::new(store, Arc::new(RandomPicker), narrator, sessions);
    let app = create_router(state, &config.cors_origin_list());

    // Start the server
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Stop background tasks, flushing pending cache writes
    sweeper.shutdown().await;
    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}
