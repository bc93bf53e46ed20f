use std::sync::Arc;

use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use user_form_be::{config::Config, errors::ServerError, store::PgUserStore};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("user_form_be=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env()?;

    // Connect to PostgreSQL
    let store = PgUserStore::connect(&config.database).await?;

    let app = user_form_be::app(Arc::new(store));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("🚀 Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
