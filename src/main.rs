//! Matchday News: binary entrypoint.
//! Boots the Axum HTTP server, wiring config, the news service, metrics and
//! the optional background refresh.

use shuttle_axum::ShuttleAxum;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use matchday_news::api::{self, AppState};
use matchday_news::config::AppConfig;
use matchday_news::ingest::scheduler::spawn_refresh_scheduler;
use matchday_news::metrics::Metrics;

/// Compact logs by default, JSON lines when LOG_FORMAT=json.
/// Shuttle may already own the global subscriber, so failures are ignored.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news=info,ingest=info,cache=info,sources=info,warn"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load_default()?;
    let metrics = Metrics::init(cfg.cache.ttl_secs)?;
    let service = Arc::new(matchday_news::build_service(&cfg)?);

    if let Some(every) = cfg.refresh.interval() {
        tracing::info!(target: "ingest", interval_secs = cfg.refresh.interval_secs, "background refresh enabled");
        spawn_refresh_scheduler(service.clone(), every, cfg.refresh.categories.clone());
    }

    let router = api::router(AppState::new(service)).merge(metrics.router());
    Ok(router.into())
}
