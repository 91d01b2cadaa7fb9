use std::sync::Arc;
use std::time::Duration;

use idx_signal::api;
use idx_signal::config::Config;
use idx_signal::logging::init_logging;
use idx_signal::services::{SignalService, SymbolService};
use idx_signal::sources::{BacktestProvider, InvestingClient, StaticBacktestProvider};
use idx_signal::AppState;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

const CACHE_PURGE_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Arc::new(Config::from_env());
    init_logging(config.environment);
    info!(
        "Starting IDX Signal server on {}:{} ({})",
        config.host,
        config.port,
        config.environment.as_str()
    );

    let investing = Arc::new(InvestingClient::from_config(&config)?);

    let backtests: Arc<dyn BacktestProvider> = match &config.backtest_file {
        Some(path) => match StaticBacktestProvider::from_file(path) {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                warn!("Could not load backtest summaries from {}: {}", path, e);
                Arc::new(StaticBacktestProvider::empty())
            }
        },
        None => {
            info!("No BACKTEST_SUMMARY_FILE set, scoring without empirical bonus");
            Arc::new(StaticBacktestProvider::empty())
        }
    };

    let service = Arc::new(SignalService::from_config(&config, investing.clone(), backtests));
    let symbols = Arc::new(SymbolService::from_config(&config, investing));

    // Periodically drop expired reports and search results
    {
        let service = service.clone();
        let symbols = symbols.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(CACHE_PURGE_INTERVAL_SECS)).await;
                let purged = service.purge_expired() + symbols.purge_expired();
                if purged > 0 {
                    debug!("Purged {} expired cache entries", purged);
                }
            }
        });
    }

    let state = AppState::new(config.clone(), service, symbols);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("IDX Signal server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
