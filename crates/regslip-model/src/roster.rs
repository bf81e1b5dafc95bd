// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::registrant::{ParseError, Registrant, Submission};

pub const DEFAULT_ROSTER_PREFIX: &str = "ytc";
const PREFIX_MAX_LEN: usize = 16;

/// Roster-assigned display identifier: `prefix/<yy>/<NNN>` where `yy` is
/// the last two digits of the assignment year and `NNN` the 1-based
/// sequence zero-padded to 3 digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct RosterId(String);

impl RosterId {
    pub fn assign(prefix: &str, year: i32, sequence: u32) -> Result<Self, ParseError> {
        validate_prefix(prefix)?;
        if sequence == 0 {
            return Err(ParseError::InvalidFormat(
                "roster_id",
                "roster sequence starts at 1",
            ));
        }
        let yy = year.rem_euclid(100);
        Ok(Self(format!("{prefix}/{yy:02}/{sequence:03}")))
    }

    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let mut parts = input.splitn(3, '/');
        let (Some(prefix), Some(yy), Some(seq)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ParseError::InvalidFormat(
                "roster_id",
                "roster id must be prefix/yy/nnn",
            ));
        };
        validate_prefix(prefix)?;
        if yy.len() != 2 || !yy.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidFormat(
                "roster_id",
                "roster id year must be two digits",
            ));
        }
        if seq.len() < 3 || !seq.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidFormat(
                "roster_id",
                "roster id sequence must be at least three digits",
            ));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_prefix(prefix: &str) -> Result<(), ParseError> {
    if prefix.is_empty() {
        return Err(ParseError::Empty("roster_prefix"));
    }
    if prefix.len() > PREFIX_MAX_LEN {
        return Err(ParseError::TooLong("roster_prefix", PREFIX_MAX_LEN));
    }
    if !prefix
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
    {
        return Err(ParseError::InvalidFormat(
            "roster_prefix",
            "roster prefix must be lowercase ascii alphanumeric",
        ));
    }
    Ok(())
}

/// Ordered, append-only collection of accepted registrations. Lives for
/// the process lifetime; nothing is persisted.
#[derive(Debug, Clone)]
pub struct Roster {
    prefix: String,
    entries: Vec<Registrant>,
}

impl Roster {
    pub fn new(prefix: &str) -> Result<Self, ParseError> {
        validate_prefix(prefix)?;
        Ok(Self {
            prefix: prefix.to_string(),
            entries: Vec::new(),
        })
    }

    /// Appends a validated submission, assigning the next display
    /// identifier from the current count and `now`'s year. Duplicate
    /// field values are accepted; only the assigned id distinguishes
    /// repeated submissions.
    pub fn add(&mut self, submission: Submission, now: DateTime<Utc>) -> Result<&Registrant, ParseError> {
        let sequence = u32::try_from(self.entries.len())
            .map_err(|_| ParseError::InvalidFormat("roster_id", "roster sequence overflow"))?
            .saturating_add(1);
        let roster_id = RosterId::assign(&self.prefix, now.year(), sequence)?;
        self.entries
            .push(Registrant::from_submission(submission, roster_id, now));
        Ok(self.entries.last().expect("entry just pushed"))
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn last_added(&self) -> Option<&Registrant> {
        self.entries.last()
    }

    /// The Nth accepted registrant, 1-based, in acceptance order.
    #[must_use]
    pub fn get(&self, sequence: u32) -> Option<&Registrant> {
        sequence
            .checked_sub(1)
            .and_then(|idx| self.entries.get(idx as usize))
    }

    #[must_use]
    pub fn entries(&self) -> &[Registrant] {
        &self.entries
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}
