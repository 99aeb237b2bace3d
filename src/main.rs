use std::sync::Arc;

use anyhow::Context;
use studybud::{app, db, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,studybud=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    tokio::fs::create_dir_all(&config.media_dir)
        .await
        .with_context(|| format!("creating media dir {}", config.media_dir.display()))?;

    let db_pool = db::connect(&config.database_url, config.db_max_connections).await?;
    tracing::info!("database ready at {}", config.database_url);

    let addr = config.server_address();
    let app = app(AppState { db_pool, config });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
