use pmodropbox::{DropboxConfigExt, DropboxStore};
use pmoframeconfig::get_config;
use pmopicsource::{Flipper, RotatingPicker, ShufflePolicy};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod server;
use server::Server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // ========== PHASE 1 : Connexion à Dropbox ==========

    let config = get_config();
    let credentials = config.get_dropbox_credentials()?;
    let folder = config.get_dropbox_folder()?;

    info!("📦 Connecting to Dropbox...");
    let store = DropboxStore::connect(credentials, folder).await?;

    // ========== PHASE 2 : Rotation et cache ==========

    let policy = ShufflePolicy::from_seed(config.get_dropbox_shuffle_seed()?);
    let picker = RotatingPicker::new(store, policy).await?;
    info!("🖼️ {} picture(s) in rotation", picker.picture_count());

    // Both buffers are fetched up front: the process must not come up with a
    // half-primed cache
    let picture_life = Duration::from_secs(config.get_picture_life_secs());
    let flipper = Flipper::new(Arc::new(picker), picture_life).await?;
    info!("✅ Flip cache primed (picture life {}s)", picture_life.as_secs());

    // ========== PHASE 3 : Démarrage du serveur ==========

    info!("🌐 Starting HTTP server...");
    let mut server = Server::new("PMOFrame", config.get_http_port(), flipper);
    server.start().await?;

    info!("✅ PMOFrame is ready!");
    info!("Press Ctrl+C to stop...");
    server.wait().await;

    Ok(())
}
