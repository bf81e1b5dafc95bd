// SPDX-License-Identifier: Apache-2.0

use regslip_model::Roster;
use std::time::Duration;

pub const CONFIG_SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub max_body_bytes: usize,
    pub roster_prefix: String,
    /// Provider endpoint base; tests point this at a local stub.
    pub provider_base_url: String,
    /// Injected secret; never a literal in this repository.
    pub bot_token: Option<String>,
    /// Injected destination identifier, paired with the token.
    pub chat_id: Option<String>,
    pub shutdown_drain: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 12 * 1024 * 1024,
            roster_prefix: regslip_model::DEFAULT_ROSTER_PREFIX.to_string(),
            provider_base_url: "https://api.telegram.org".to_string(),
            bot_token: None,
            chat_id: None,
            shutdown_drain: Duration::from_millis(5000),
        }
    }
}

pub fn validate_startup_config(api: &ApiConfig) -> Result<(), String> {
    if api.max_body_bytes == 0 {
        return Err("max body bytes must be > 0".to_string());
    }
    Roster::new(&api.roster_prefix).map_err(|e| format!("invalid roster prefix: {e}"))?;
    if api.provider_base_url.trim().is_empty() {
        return Err("provider base url must not be empty".to_string());
    }
    if api.bot_token.is_some() != api.chat_id.is_some() {
        return Err(
            "relay credentials must be configured together: bot token and chat id".to_string(),
        );
    }
    Ok(())
}
