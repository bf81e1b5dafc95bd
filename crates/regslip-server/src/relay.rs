// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regslip_api::RelayUserDto;
use regslip_pdf::OrgProfile;
use serde_json::Value;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
#[non_exhaustive]
pub enum RelayError {
    /// The provider answered and refused the document.
    Rejected(String),
    /// The provider could not be reached or answered garbage.
    Transport(String),
}

impl Display for RelayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(msg) => write!(f, "provider rejected relay: {msg}"),
            Self::Transport(msg) => write!(f, "provider transport failure: {msg}"),
        }
    }
}

impl std::error::Error for RelayError {}

#[derive(Debug, Clone)]
pub struct RelayDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub caption: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderReceipt {
    pub message_id: i64,
}

/// Outbound seam to the messaging provider. The service never re-derives
/// the document here; it forwards exactly what the caller supplied.
#[async_trait]
pub trait RelayBackend: Send + Sync + 'static {
    async fn send_document(&self, doc: RelayDocument) -> Result<ProviderReceipt, RelayError>;
}

/// Caption accompanying the relayed document. Markdown, five record
/// fields plus the formatted relay timestamp.
#[must_use]
pub fn format_caption(user: &RelayUserDto, org: &OrgProfile, now: DateTime<Utc>) -> String {
    let stamp = now.format("%B %-d, %Y, %I:%M %p");
    format!(
        "\u{1F4CB} *New Registration Acknowledgment*\n\n\
         \u{1F464} *User Details:*\n\
         \u{2022} Name: {}\n\
         \u{2022} ID: {}\n\
         \u{2022} Email: {}\n\
         \u{2022} Phone: {}\n\
         \u{2022} Gender: {}\n\n\
         \u{1F4C5} *Generated:* {stamp}\n\n\
         \u{2705} *Status:* Registration Complete\n\
         \u{1F3E2} *Organization:* {} ({})\n\n\
         Document attached below \u{2193}",
        user.full_name,
        user.id_number,
        user.email,
        user.phone_number,
        user.gender,
        org.display_name,
        org.acronym,
    )
}

/// Telegram `sendDocument` backend. One multipart POST, no retry and no
/// request timeout: the caller awaits whatever the transport allows.
pub struct TelegramBackend {
    http: reqwest::Client,
    base_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramBackend {
    #[must_use]
    pub fn new(base_url: String, bot_token: String, chat_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token,
            chat_id,
        }
    }
}

#[async_trait]
impl RelayBackend for TelegramBackend {
    async fn send_document(&self, doc: RelayDocument) -> Result<ProviderReceipt, RelayError> {
        let url = format!("{}/bot{}/sendDocument", self.base_url, self.bot_token);
        let part = reqwest::multipart::Part::bytes(doc.bytes)
            .file_name(doc.filename)
            .mime_str("application/pdf")
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", doc.caption)
            .text("parse_mode", "Markdown")
            .part("document", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        let ok = body.get("ok").and_then(Value::as_bool).unwrap_or(false);
        if !status.is_success() || !ok {
            let description = body
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("unspecified provider error");
            return Err(RelayError::Rejected(description.to_string()));
        }
        let message_id = body
            .get("result")
            .and_then(|r| r.get("message_id"))
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                RelayError::Transport("provider response missing message_id".to_string())
            })?;
        Ok(ProviderReceipt { message_id })
    }
}

pub mod fake {
    use super::{ProviderReceipt, RelayBackend, RelayDocument, RelayError};
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// In-process relay double: records what was sent and answers with a
    /// scripted outcome.
    #[derive(Default)]
    pub struct FakeRelay {
        pub sent: Mutex<Vec<RelayDocument>>,
        pub fail_with: Mutex<Option<String>>,
    }

    #[async_trait]
    impl RelayBackend for FakeRelay {
        async fn send_document(&self, doc: RelayDocument) -> Result<ProviderReceipt, RelayError> {
            if let Some(reason) = self.fail_with.lock().await.clone() {
                return Err(RelayError::Rejected(reason));
            }
            let mut sent = self.sent.lock().await;
            sent.push(doc);
            #[allow(clippy::cast_possible_wrap)]
            Ok(ProviderReceipt {
                message_id: sent.len() as i64,
            })
        }
    }
}
