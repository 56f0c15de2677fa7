use std::sync::Arc;

use crate::backend::PortalBackend;
use crate::config::Config;
use crate::store::PortalStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable backend client. Default: `HttpBackend` pointed at `BACKEND_URL`.
    pub backend: Arc<dyn PortalBackend>,
    /// Sessions and open wizards. The only place per-browser state lives.
    pub store: Arc<PortalStore>,
    pub config: Config,
}
