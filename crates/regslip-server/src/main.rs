#![forbid(unsafe_code)]

use regslip_server::{build_router, ApiConfig, AppState};
use std::env;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_nonempty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("REGSLIP_LOG_JSON", true) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn org_profile_from_env() -> regslip_pdf::OrgProfile {
    let mut org = regslip_pdf::OrgProfile::default();
    if let Some(v) = env_nonempty("REGSLIP_ORG_NAME") {
        org.name = v;
    }
    if let Some(v) = env_nonempty("REGSLIP_ORG_DISPLAY_NAME") {
        org.display_name = v;
    }
    if let Some(v) = env_nonempty("REGSLIP_ORG_ACRONYM") {
        org.acronym = v;
    }
    if let Some(v) = env_nonempty("REGSLIP_ORG_SLOGAN") {
        org.slogan = v;
    }
    if let Some(path) = env_nonempty("REGSLIP_LOGO_PATH") {
        match std::fs::read(&path) {
            Ok(bytes) => org.logo_png = Some(bytes),
            Err(e) => warn!("logo not loaded from {path}: {e}"),
        }
    }
    org
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let bind_addr = env::var("REGSLIP_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let api_cfg = ApiConfig {
        max_body_bytes: env_usize("REGSLIP_MAX_BODY_BYTES", 12 * 1024 * 1024),
        roster_prefix: env::var("REGSLIP_ROSTER_PREFIX")
            .unwrap_or_else(|_| regslip_model::DEFAULT_ROSTER_PREFIX.to_string()),
        provider_base_url: env::var("REGSLIP_PROVIDER_BASE_URL")
            .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
        bot_token: env_nonempty("REGSLIP_BOT_TOKEN"),
        chat_id: env_nonempty("REGSLIP_CHAT_ID"),
        shutdown_drain: Duration::from_millis(env_u64("REGSLIP_SHUTDOWN_DRAIN_MS", 5000)),
    };

    let state = AppState::with_config(api_cfg, org_profile_from_env())?;
    if state.api.bot_token.is_none() {
        warn!("relay credentials absent; POST /v1/relay will fail until configured");
    }
    let app = build_router(state.clone());

    let addr: std::net::SocketAddr = bind_addr
        .parse()
        .map_err(|e| format!("invalid bind addr {bind_addr}: {e}"))?;
    let socket = if addr.is_ipv4() {
        tokio::net::TcpSocket::new_v4().map_err(|e| format!("socket v4 failed: {e}"))?
    } else {
        tokio::net::TcpSocket::new_v6().map_err(|e| format!("socket v6 failed: {e}"))?
    };
    socket
        .set_reuseaddr(true)
        .map_err(|e| format!("set_reuseaddr failed: {e}"))?;
    socket
        .set_keepalive(env_bool("REGSLIP_TCP_KEEPALIVE_ENABLED", true))
        .map_err(|e| format!("set_keepalive failed: {e}"))?;
    socket.bind(addr).map_err(|e| format!("bind failed: {e}"))?;
    let listener: TcpListener = socket
        .listen(1024)
        .map_err(|e| format!("listen failed: {e}"))?;
    info!("regslip-server listening on {bind_addr}");

    let accepting = state.accepting_requests.clone();
    let drain = state.api.shutdown_drain;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            accepting.store(false, Ordering::Relaxed);
            tokio::time::sleep(drain).await;
        })
        .await
        .map_err(|e| format!("server failed: {e}"))
}
