use std::sync::Arc;

use tracing::{Level, info};

use common::storage::FilesystemBlobStore;
use server::config::AppConfig;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = server::database::init_db(&config.database.url).await?;

    let blob_store =
        FilesystemBlobStore::new(config.storage.root.clone(), config.storage.max_blob_size)
            .await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        db,
        blob_store: Arc::new(blob_store),
        config,
    };
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
