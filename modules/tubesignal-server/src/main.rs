use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tubesignal_common::{Config, TrendData};
use tubesignal_engine::{Engine, WarmupWorker};
use tubesignal_runtime::{MemoryStateStore, PostgresStateStore, StateStore};
use tubesignal_server::{graphql, routes};
use tubesignal_sources::clients::suggest::SuggestScope;
use tubesignal_sources::clients::{
    GoogleAdsClient, RedditClient, SerperClient, SuggestClient, TimedTextClient, TrendsClient,
    YouTubeClient,
};
use tubesignal_sources::{KeyRing, SourceAdapters, TrendsApi};

#[derive(Parser)]
#[command(name = "tubesignal-server", about = "Keyword opportunity analysis server")]
struct Cli {
    /// Run without the trending warm-up worker (no initial round, no daily
    /// schedule).
    #[arg(long)]
    skip_warmup: bool,
}

/// Stand-in when no trends sidecar is configured: the demand classifier
/// runs on neutral data.
struct DisabledTrends;

#[async_trait]
impl TrendsApi for DisabledTrends {
    async fn interest(&self, _keyword: &str, _region: &str) -> Result<Option<TrendData>> {
        Ok(None)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    info!("Starting tubesignal-server");
    let cli = Cli::parse();

    let config = Config::from_env();
    config.log_redacted();

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .context("building HTTP client")?;

    let trends: Arc<dyn TrendsApi> = match &config.trends_service_url {
        Some(url) => Arc::new(TrendsClient::new(http.clone(), url.clone())),
        None => {
            warn!("TRENDS_SERVICE_URL not set, trend signals disabled");
            Arc::new(DisabledTrends)
        }
    };

    let ring = Arc::new(KeyRing::new(config.google_ads_api_keys.clone()));
    if ring.is_empty() {
        warn!("GOOGLE_ADS_API_KEYS not set, keyword metrics disabled");
    }

    let adapters = SourceAdapters {
        video: Arc::new(YouTubeClient::new(http.clone(), config.youtube_api_key.clone())),
        youtube_suggest: Arc::new(SuggestClient::new(http.clone(), SuggestScope::YouTube)),
        google_suggest: Arc::new(SuggestClient::new(http.clone(), SuggestScope::Google)),
        trends,
        planner: Arc::new(GoogleAdsClient::new(
            http.clone(),
            ring,
            config.google_ads_customer_id.clone(),
        )),
        captions: Arc::new(TimedTextClient::new(http.clone())),
        forum: Arc::new(RedditClient::new(http.clone())),
        web_video: Arc::new(SerperClient::new(http.clone(), config.serper_api_key.clone())),
    };

    let store: Arc<dyn StateStore> = match &config.database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("connecting to Postgres")?;
            let store = PostgresStateStore::new(pool);
            store.ensure_schema().await?;
            info!("Durable actor state: Postgres");
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set, durable actor state is in-memory only");
            Arc::new(MemoryStateStore::new())
        }
    };

    let default_region = config
        .regions
        .first()
        .cloned()
        .unwrap_or_else(|| "US".to_string());
    let engine = Engine::new(adapters, store, default_region);

    // Trending warm-up: once now, then daily at the configured UTC hour.
    let cancelled = Arc::new(AtomicBool::new(false));
    let worker = WarmupWorker::new(
        engine.clone(),
        config.regions.clone(),
        config.warmup_hour_utc,
        cancelled.clone(),
    );
    let warmup_handle = if cli.skip_warmup {
        info!("Warm-up worker disabled by flag");
        None
    } else {
        Some(tokio::spawn(worker.run()))
    };

    let schema = graphql::build_schema(engine);
    let app = routes::router(schema);

    let addr = format!("{}:{}", config.web_host, config.web_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(addr = addr.as_str(), "GraphQL server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    cancelled.store(true, Ordering::Relaxed);
    if let Some(handle) = warmup_handle {
        handle.abort();
    }
    info!("tubesignal-server stopped");
    Ok(())
}
