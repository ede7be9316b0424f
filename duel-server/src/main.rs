use std::sync::Arc;
use tokio::signal;
use tracing::info;

use duel_persistence::connection::connect_and_migrate;
use duel_server::{
    config::Config, create_routes, identity::IdentityService, room_manager::RoomManager,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Code Duel server...");

    let config = Config::new();

    // Initialize database connection and run migrations
    let db = match connect_and_migrate().await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };

    let identity = IdentityService::new(
        &config.guest_token_secret,
        config.guest_token_ttl_minutes,
    );
    let room_manager = Arc::new(RoomManager::new(db, identity, config.stale_after_seconds));

    let routes = create_routes(room_manager.clone());

    // Background sweep so rooms nobody polls still drop stale players
    let sweep_manager = room_manager.clone();
    let sweep_interval = config.sweep_interval_seconds;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(sweep_interval));
        loop {
            interval.tick().await;
            match sweep_manager.sweep_stale().await {
                Ok(0) => {}
                Ok(evicted) => info!("Sweep evicted {} stale player(s)", evicted),
                Err(e) => tracing::error!("Stale sweep failed: {}", e),
            }
        }
    });

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = (
        config.host.parse::<std::net::IpAddr>().unwrap(),
        config.port,
    );

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).unwrap();
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).unwrap();

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
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
