// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::roster::RosterId;

pub const NAME_MAX_LEN: usize = 256;
pub const EMAIL_MAX_LEN: usize = 320;
pub const PHONE_MAX_LEN: usize = 64;
const ID_NUMBER_MAX_LEN: usize = 128;
const IMAGE_REF_MAX_LEN: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    Empty(&'static str),
    Trimmed(&'static str),
    TooLong(&'static str, usize),
    InvalidFormat(&'static str, &'static str),
}

impl ParseError {
    /// The name of the field the error applies to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Empty(name) | Self::Trimmed(name) | Self::TooLong(name, _) => name,
            Self::InvalidFormat(name, _) => name,
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(name) => write!(f, "{name} is required"),
            Self::Trimmed(name) => {
                write!(f, "{name} must not contain leading/trailing whitespace")
            }
            Self::TooLong(name, max) => write!(f, "{name} exceeds max length {max}"),
            Self::InvalidFormat(_, msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ParseError {}

fn check_text(name: &'static str, input: &str, max: usize) -> Result<(), ParseError> {
    if input.is_empty() {
        return Err(ParseError::Empty(name));
    }
    if input.trim() != input {
        return Err(ParseError::Trimmed(name));
    }
    if input.len() > max {
        return Err(ParseError::TooLong(name, max));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct FullName(String);

impl FullName {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        check_text("full_name", input, NAME_MAX_LEN)?;
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The registrant's own identification number, stored verbatim. Distinct
/// from the roster-assigned [`RosterId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct IdNumber(String);

impl IdNumber {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        check_text("id_number", input, ID_NUMBER_MAX_LEN)?;
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct Email(String);

impl Email {
    /// Accepts `local@domain` where neither side is empty, no whitespace
    /// appears anywhere, and the domain has a non-empty dot-separated
    /// suffix (`a@b.c`).
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        check_text("email", input, EMAIL_MAX_LEN)?;
        if input.chars().any(char::is_whitespace) {
            return Err(ParseError::InvalidFormat("email", "invalid email format"));
        }
        let Some((local, domain)) = input.split_once('@') else {
            return Err(ParseError::InvalidFormat("email", "invalid email format"));
        };
        if local.is_empty() || domain.contains('@') {
            return Err(ParseError::InvalidFormat("email", "invalid email format"));
        }
        match domain.rsplit_once('.') {
            Some((host, tld)) if !host.is_empty() && !tld.is_empty() => {}
            _ => return Err(ParseError::InvalidFormat("email", "invalid email format")),
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        check_text("phone_number", input, PHONE_MAX_LEN)?;
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        match raw {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            _ => Err(ParseError::InvalidFormat(
                "gender",
                "gender must be one of 'male', 'female', 'other'",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }

    /// Display form with the first letter capitalized.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

/// A verbatim image data-reference (`data:<mime>;base64,<payload>`).
/// The payload is kept as submitted and decoded only at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[non_exhaustive]
pub struct ImageRef(String);

impl ImageRef {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::Empty("image"));
        }
        if input.len() > IMAGE_REF_MAX_LEN {
            return Err(ParseError::TooLong("image", IMAGE_REF_MAX_LEN));
        }
        if !input.starts_with("data:") {
            return Err(ParseError::InvalidFormat(
                "image",
                "image must be a data: URL",
            ));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The base64 payload after the `base64,` marker, when present.
    #[must_use]
    pub fn base64_payload(&self) -> Option<&str> {
        self.0.split_once("base64,").map(|(_, payload)| payload)
    }
}

/// A validated submission: every required field parsed, no identity or
/// timestamp assigned yet. Constructing one is the only way data reaches
/// the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct Submission {
    pub full_name: FullName,
    pub id_number: IdNumber,
    pub email: Email,
    pub phone_number: PhoneNumber,
    pub gender: Gender,
    pub image: Option<ImageRef>,
}

impl Submission {
    #[must_use]
    pub fn new(
        full_name: FullName,
        id_number: IdNumber,
        email: Email,
        phone_number: PhoneNumber,
        gender: Gender,
        image: Option<ImageRef>,
    ) -> Self {
        Self {
            full_name,
            id_number,
            email,
            phone_number,
            gender,
            image,
        }
    }
}

/// One accepted registration. Appended to the roster immutably; never
/// updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct Registrant {
    pub roster_id: RosterId,
    pub full_name: FullName,
    pub id_number: IdNumber,
    pub email: Email,
    pub phone_number: PhoneNumber,
    pub gender: Gender,
    pub image: Option<ImageRef>,
    pub created_at: DateTime<Utc>,
}

impl Registrant {
    #[must_use]
    pub fn from_submission(
        submission: Submission,
        roster_id: RosterId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            roster_id,
            full_name: submission.full_name,
            id_number: submission.id_number,
            email: submission.email,
            phone_number: submission.phone_number,
            gender: submission.gender,
            image: submission.image,
            created_at,
        }
    }
}
