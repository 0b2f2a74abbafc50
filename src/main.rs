use anyhow::Result;
use axum::{routing::get, Router};
use chainwatch::{
    config::Config,
    handlers::*,
    services::*,
};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting chainwatch v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Monitoring wallets: base={} solana={}",
        config.base_wallet,
        config.solana_wallet
    );

    // One shared HTTP client; the timeout bounds every upstream call so a
    // stalled feed cannot wedge the scheduler.
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    // Initialize services
    let store = Arc::new(TransactionStore::open(Path::new(&config.db_path))?);
    let oracle = Arc::new(PriceOracle::new(
        client.clone(),
        &config.coingecko_url,
        &config.dexscreener_url,
    ));
    let base = Arc::new(BaseService::new(
        client.clone(),
        &config.base_rpc_url,
        &config.base_wallet,
        oracle.clone(),
    ));
    let solana = Arc::new(SolanaService::new(
        client.clone(),
        &config.solana_rpc_url,
        &config.solana_wallet,
        oracle,
    ));
    let notifier = Arc::new(Notifier::new(client, config.discord_webhook.clone()));

    // Start the ingestion scheduler
    let monitor = Monitor::new(base, solana, store.clone(), notifier);
    tokio::spawn(async move { monitor.run().await });

    // Build application state
    let app_state = AppState {
        store,
        alchemy_configured: config.alchemy_api_key.is_some(),
        discord_configured: config.discord_webhook.is_some(),
        started_at: Instant::now(),
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/stats", get(get_stats))
        .route("/api/transactions", get(list_transactions))
        .route("/api/activity", get(get_activity))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl+c");
    tracing::info!("Shutting down gracefully...");
}
