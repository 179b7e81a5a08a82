use std::sync::Arc;

use student_hub::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    server::directory::{DirectoryState, InMemoryDirectory, demo_accounts},
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Starts the reference Auth Service: configuration, logging, directory, HTTP server.
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "student_hub=debug,tower_http=info".into());

    // Pretty output locally, JSON for log aggregation in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Auth Service starting in {:?} mode", config.env);

    let directory = match config.env {
        Env::Local => {
            let accounts = demo_accounts(config.bcrypt_cost)
                .expect("FATAL: could not hash demo account passwords");
            for account in &accounts {
                tracing::info!(email = %account.email, role = %account.role, "seeded demo account");
            }
            InMemoryDirectory::with_users(accounts)
        }
        Env::Production => InMemoryDirectory::new(),
    };
    let directory = Arc::new(directory) as DirectoryState;

    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(config, directory));

    let listener = TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("FATAL: cannot bind {}: {}", bind_addr, e));

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server terminated");
    }
}
