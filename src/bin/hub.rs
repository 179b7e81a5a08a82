use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use student_hub::{
    FileSessionStore, HttpAuthService, HubClient, RouteTable, SessionState,
    auth_client::AuthState,
    cli::{self, Cli},
    role::LandingRoutes,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "student_hub=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Cli::parse();

    let auth = Arc::new(HttpAuthService::new(&args.auth_url)) as AuthState;
    let store = Arc::new(FileSessionStore::new(args.session_file.clone())) as SessionState;
    let hub = HubClient::new(
        auth,
        store,
        RouteTable::student_hub(),
        LandingRoutes::default(),
    );

    let output = cli::execute(&args.command, &hub).await?;
    println!("{}", output);
    Ok(())
}
