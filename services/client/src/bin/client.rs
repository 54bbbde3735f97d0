//! services/client/src/bin/client.rs

use client_lib::{
    adapters::{auth::ChannelAuthAdapter, db::RemoteDbAdapter, local::FileStorageAdapter},
    bridge::SyncBridge,
    config::Config,
    error::ClientError,
    state::AppState,
    store::ReadingStore,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting sync client...");

    // --- 2. Connect to the Remote Store ---
    info!("Connecting to remote database...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let remote = Arc::new(RemoteDbAdapter::new(pool));

    // --- 3. Build Local Storage, Store, and Auth ---
    let storage = Arc::new(FileStorageAdapter::new(&config.storage_dir)?);
    let store = Arc::new(ReadingStore::new(storage.clone()));
    let auth = Arc::new(ChannelAuthAdapter::new());

    let app_state = Arc::new(AppState {
        store,
        remote,
        storage,
        auth: auth.clone(),
        config: config.clone(),
    });

    // --- 4. Run the Sync Bridge ---
    let bridge = Arc::new(SyncBridge::from_state(&app_state));
    let shutdown = CancellationToken::new();
    let events = app_state.auth.events();
    let bridge_task = tokio::spawn(bridge.clone().run(events, shutdown.clone()));

    let user_id = config
        .user_id
        .clone()
        .ok_or_else(|| ClientError::Internal("USER_ID is required".to_string()))?;
    info!("Signing in as {user_id}.");
    auth.sign_in(user_id);

    // --- 5. Wait for Shutdown ---
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received; shutting down.");
    shutdown.cancel();
    let _ = bridge_task.await;

    Ok(())
}
