use keygate::{
    router, AppConfig, AppState, InMemoryUserRepository, PostgresUserRepository, TokenService,
    UserRepository,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keygate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting keygate auth server");

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };
    info!(?config, "Configuration loaded");

    // The pool is owned here and closed on shutdown
    let pool = match &config.database_url {
        Some(url) => Some(PgPoolOptions::new().max_connections(10).connect(url).await?),
        None => None,
    };

    let user_repository: Arc<dyn UserRepository> = match &pool {
        Some(pool) => {
            info!("Using PostgreSQL user store");
            Arc::new(PostgresUserRepository::new(pool.clone()))
        }
        None => {
            warn!("DATABASE_URL not set, users are kept in memory only");
            Arc::new(InMemoryUserRepository::new())
        }
    };

    let app_state = AppState::new(
        user_repository,
        TokenService::from_config(&config),
        config.password_hash_cost,
    );
    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Server running on http://{}", config.bind_address);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = &served {
        error!(error = %e, "Server stopped with an error");
    }

    if let Some(pool) = pool {
        pool.close().await;
        info!("Database pool closed");
    }

    served?;
    Ok(())
}
