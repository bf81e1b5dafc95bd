// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ApiErrorCode {
    ValidationFailed,
    InvalidFieldValue,
    MissingUploadPart,
    PayloadTooLarge,
    RegistrantNotFound,
    ProviderRejected,
    ProviderUnavailable,
    NotReady,
    Internal,
}

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "ValidationFailed",
            Self::InvalidFieldValue => "InvalidFieldValue",
            Self::MissingUploadPart => "MissingUploadPart",
            Self::PayloadTooLarge => "PayloadTooLarge",
            Self::RegistrantNotFound => "RegistrantNotFound",
            Self::ProviderRejected => "ProviderRejected",
            Self::ProviderUnavailable => "ProviderUnavailable",
            Self::NotReady => "NotReady",
            Self::Internal => "Internal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
    pub request_id: String,
}

impl ApiError {
    #[must_use]
    pub fn new(
        code: ApiErrorCode,
        message: impl Into<String>,
        details: Value,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            request_id: request_id.into(),
        }
    }

    #[must_use]
    pub fn validation_failed(field_errors: Value) -> Self {
        Self::new(
            ApiErrorCode::ValidationFailed,
            "validation failed",
            json!({"field_errors": field_errors}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn missing_upload_part(name: &str) -> Self {
        Self::new(
            ApiErrorCode::MissingUploadPart,
            format!("missing multipart field: {name}"),
            json!({"part": name}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn registrant_not_found(sequence: u32) -> Self {
        Self::new(
            ApiErrorCode::RegistrantNotFound,
            "registrant not found",
            json!({"sequence": sequence}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = request_id.to_string();
        self
    }
}

const _: fn() = || {
    fn assert_traits<T: Serialize + for<'de> Deserialize<'de>>() {}
    assert_traits::<ApiErrorCode>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_serializes_as_its_name() {
        let err = ApiError::missing_upload_part("file");
        let value = serde_json::to_value(&err).expect("serialize error");
        assert_eq!(value["code"], "MissingUploadPart");
        assert_eq!(value["details"]["part"], "file");
    }

    #[test]
    fn validation_failed_carries_field_errors() {
        let err = ApiError::validation_failed(json!([{"field": "email", "reason": "invalid"}]))
            .with_request_id("req-7");
        assert_eq!(err.request_id, "req-7");
        let value = serde_json::to_value(&err).expect("serialize error");
        assert_eq!(value["details"]["field_errors"][0]["field"], "email");
    }
}
