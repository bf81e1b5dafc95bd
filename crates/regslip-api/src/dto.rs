// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Incoming submission body. Free-text fields; validation happens when the
/// body is parsed into a domain `Submission`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubmitRegistrantDto {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub id_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegistrantDto {
    pub id: String,
    pub full_name: String,
    pub id_number: String,
    pub email: String,
    pub phone_number: String,
    pub gender: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RosterSummaryDto {
    pub count: usize,
    pub last_added: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RelayAcceptedDto {
    pub success: bool,
    pub message_id: i64,
    pub message: String,
}

/// The `user` part of a relay request. Clients post their full record;
/// unknown fields are tolerated, only the caption fields are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayUserDto {
    pub full_name: String,
    pub id_number: String,
    pub email: String,
    pub phone_number: String,
    pub gender: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldErrorDto {
    pub field: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_dto_defaults_missing_fields_to_empty() {
        let dto: SubmitRegistrantDto =
            serde_json::from_str(r#"{"fullName":"Jane Doe"}"#).expect("parse submit dto");
        assert_eq!(dto.full_name, "Jane Doe");
        assert_eq!(dto.email, "");
        assert!(dto.image_url.is_none());
    }

    #[test]
    fn relay_user_dto_tolerates_extra_fields() {
        let dto: RelayUserDto = serde_json::from_str(
            r#"{"fullName":"Jane Doe","idNumber":"ytc/25/001","email":"jane@x.com",
                "phoneNumber":"+234800000000","gender":"female",
                "id":"ytc/25/001","createdAt":"2025-06-01T12:00:00Z","imageUrl":null}"#,
        )
        .expect("parse relay user dto");
        assert_eq!(dto.full_name, "Jane Doe");
        assert_eq!(dto.gender, "female");
    }
}
