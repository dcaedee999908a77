mod auth;
mod config;
mod db;
mod errors;
mod explore;
mod feed;
mod models;
mod post;
mod profile;
mod report;
mod routes;
mod state;
mod store;
mod viewer;
mod voice;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::HostedAuthClient;
use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgQuoteStore;
use crate::viewer::ViewerRegistry;
use crate::voice::VoiceClient;

/// Viewers untouched for this long are dropped, worker tasks included.
const VIEWER_IDLE_LIMIT: Duration = Duration::from_secs(60 * 60);
const EVICTION_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pekikkan API v{}", env!("CARGO_PKG_VERSION"));

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    let store = Arc::new(PgQuoteStore::new(pool));

    let auth = Arc::new(HostedAuthClient::new(
        config.auth_url.clone(),
        config.auth_anon_key.clone(),
    )?);
    info!("Auth client initialized ({})", config.auth_url);

    let voice = VoiceClient::from_key(config.voice_api_key.clone(), config.voice_id.clone())?;
    if voice.is_none() {
        warn!("VOICE_API_KEY not set; text-to-speech disabled");
    }

    let viewers = Arc::new(ViewerRegistry::new());
    spawn_eviction(Arc::clone(&viewers));

    let state = AppState {
        store,
        auth,
        voice,
        viewers,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn spawn_eviction(viewers: Arc<ViewerRegistry>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(EVICTION_INTERVAL);
        loop {
            ticker.tick().await;
            viewers.evict_idle(VIEWER_IDLE_LIMIT);
        }
    });
}
