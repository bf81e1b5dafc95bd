#![forbid(unsafe_code)]

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use regslip_model::Roster;
use regslip_pdf::OrgProfile;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;
use tokio::sync::Mutex;

mod http;
mod telemetry;

pub mod config;
pub mod relay;

pub use config::{validate_startup_config, ApiConfig};
pub use relay::{RelayBackend, RelayDocument, RelayError};

pub const CRATE_NAME: &str = "regslip-server";

use telemetry::RequestMetrics;

#[derive(Clone)]
pub struct AppState {
    pub roster: Arc<Mutex<Roster>>,
    pub api: ApiConfig,
    pub org: Arc<OrgProfile>,
    pub ready: Arc<AtomicBool>,
    pub accepting_requests: Arc<AtomicBool>,
    pub(crate) relay: Option<Arc<dyn RelayBackend>>,
    pub(crate) metrics: Arc<RequestMetrics>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    /// Builds the shared state, wiring the provider backend only when
    /// both credentials are configured.
    pub fn with_config(api: ApiConfig, org: OrgProfile) -> Result<Self, String> {
        validate_startup_config(&api)?;
        let roster = Roster::new(&api.roster_prefix).map_err(|e| e.to_string())?;
        let relay: Option<Arc<dyn RelayBackend>> =
            match (api.bot_token.as_ref(), api.chat_id.as_ref()) {
                (Some(token), Some(chat)) => Some(Arc::new(relay::TelegramBackend::new(
                    api.provider_base_url.clone(),
                    token.clone(),
                    chat.clone(),
                ))),
                _ => None,
            };
        Ok(Self {
            roster: Arc::new(Mutex::new(roster)),
            org: Arc::new(org),
            ready: Arc::new(AtomicBool::new(true)),
            accepting_requests: Arc::new(AtomicBool::new(true)),
            relay,
            metrics: Arc::new(RequestMetrics::default()),
            request_id_seed: Arc::new(AtomicU64::new(1)),
            api,
        })
    }

    /// Swaps in a test double for the provider seam.
    #[must_use]
    pub fn with_relay_backend(mut self, backend: Arc<dyn RelayBackend>) -> Self {
        self.relay = Some(backend);
        self
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/readyz", get(http::handlers::readyz_handler))
        .route("/metrics", get(http::handlers::metrics_handler))
        .route("/v1/version", get(http::handlers::version_handler))
        .route(
            "/v1/registrants",
            get(http::handlers::list_registrants_handler)
                .post(http::handlers::submit_registrant_handler),
        )
        .route(
            "/v1/registrants/:sequence/slip",
            get(http::handlers::slip_handler),
        )
        .route("/v1/relay", post(http::handlers::relay_handler))
        .layer(DefaultBodyLimit::max(state.api.max_body_bytes))
        .with_state(state)
}
