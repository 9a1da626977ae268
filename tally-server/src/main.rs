use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use tally_persistence::{AliasRepository, ResultRepository, connect_and_migrate};
use tally_server::{config::Config, create_routes, ingest::IngestService};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Wordle tally server...");

    let config = match Config::new() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize database connection and run migrations
    let db = match connect_and_migrate(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };
    let result_repository = Arc::new(ResultRepository::new(db.clone()));
    let alias_repository = Arc::new(AliasRepository::new(db));

    if let Some(path) = &config.aliases_file {
        info!("Seeding aliases from {}", path);
        let seeded = match tokio::fs::read_to_string(path).await {
            Ok(json) => alias_repository.seed_from_json(&json).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = seeded {
            tracing::error!("Failed to seed aliases from '{}': {:#}", path, e);
            std::process::exit(1);
        }
    }

    let ingest_service = Arc::new(IngestService::new(
        result_repository.clone(),
        alias_repository.clone(),
        config.summary_author_id.clone(),
    ));

    // Build the directory before accepting summaries
    if let Err(e) = ingest_service.refresh_aliases().await {
        tracing::error!("Failed to load aliases: {:#}", e);
        std::process::exit(1);
    }

    let routes = create_routes(
        config.clone(),
        ingest_service.clone(),
        result_repository,
        alias_repository,
    );

    // Start alias refresh task
    let refresh_service = ingest_service.clone();
    let refresh_period = Duration::from_secs(config.alias_refresh_seconds.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(refresh_period);
        // first tick fires immediately and the directory is already fresh
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = refresh_service.refresh_aliases().await {
                tracing::warn!("Alias refresh failed, keeping previous directory: {:#}", e);
            }
        }
    });

    info!("Server starting on {}:{}", config.host, config.port);

    let ip = match config.host.parse::<std::net::IpAddr>() {
        Ok(ip) => ip,
        Err(e) => {
            tracing::error!("Invalid HOST '{}': {}", config.host, e);
            std::process::exit(1);
        }
    };

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown((ip, config.port), async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let (Ok(mut sigint), Ok(mut sigterm)) = (
                signal::unix::signal(signal::unix::SignalKind::interrupt()),
                signal::unix::signal(signal::unix::SignalKind::terminate()),
            ) else {
                tracing::error!("Failed to install signal handlers");
                return std::future::pending::<()>().await;
            };

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            if signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl+C, shutting down gracefully...");
            }
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
