use std::process::ExitCode;
use std::sync::Arc;

use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use warp::Filter;

use domo::{
    bot::DomoBot,
    config::{Config, RelayConfig},
    health::HealthChecker,
    metrics::MetricsRegistry,
};

type DynErr = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("domo bot stopped: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), DynErr> {
    let cfg = Config::from_env()?;
    let relay_cfg = RelayConfig::load(&cfg.config_path)?;

    let mut bot = DomoBot::new(&cfg.discord_token, &relay_cfg).await?;

    if let Some(port) = cfg.metrics_port {
        tokio::spawn(serve_metrics(port, bot.health()));
    }

    let stop = bot.stop_handle();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {err}");
            return;
        }
        info!("Shutdown signal received");
        stop.stop().await;
    });

    bot.start().await?;
    info!("domo bot has shut down");
    Ok(())
}

async fn serve_metrics(port: u16, health_checker: HealthChecker) {
    let metrics_registry = Arc::new(MetricsRegistry::new());
    info!("Starting metrics server on port {}...", port);

    let metrics_route = warp::path("metrics")
        .and(warp::get())
        .and(warp::any().map(move || metrics_registry.clone()))
        .and_then(handle_metrics);

    let health_route = warp::path("health")
        .and(warp::get())
        .and(warp::any().map(move || health_checker.clone()))
        .and_then(handle_health);

    warp::serve(metrics_route.or(health_route))
        .run(([0, 0, 0, 0], port))
        .await;
}

async fn handle_metrics(metrics: Arc<MetricsRegistry>) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::with_header(
        metrics.gather_metrics(),
        "Content-Type",
        "text/plain; version=0.0.4; charset=utf-8",
    ))
}

async fn handle_health(health_checker: HealthChecker) -> Result<impl warp::Reply, warp::Rejection> {
    let health_status = health_checker.get_overall_health().await;
    Ok(warp::reply::json(&health_status))
}
