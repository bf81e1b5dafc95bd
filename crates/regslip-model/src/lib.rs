// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Domain model for the regslip registration service: validated registrant
//! fields, the submitted record, and the session-lifetime roster.

pub const CRATE_NAME: &str = "regslip-model";

mod registrant;
mod roster;

pub use registrant::{
    Email, FullName, Gender, IdNumber, ImageRef, ParseError, PhoneNumber, Registrant, Submission,
    EMAIL_MAX_LEN, NAME_MAX_LEN, PHONE_MAX_LEN,
};
pub use roster::{Roster, RosterId, DEFAULT_ROSTER_PREFIX};
