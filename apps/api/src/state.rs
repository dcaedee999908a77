use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::config::Config;
use crate::store::QuoteStore;
use crate::viewer::ViewerRegistry;
use crate::voice::VoiceClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn QuoteStore>,
    pub auth: Arc<dyn AuthProvider>,
    /// `None` when no voice API key is configured.
    pub voice: Option<VoiceClient>,
    pub viewers: Arc<ViewerRegistry>,
    pub config: Config,
}
