// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Wire contracts for the regslip HTTP API: request/response DTOs, the
//! error envelope, and conversions from the domain model.

pub const CRATE_NAME: &str = "regslip-api";
pub const API_VERSION: &str = "v1";

mod convert;
mod dto;
mod errors;

pub use convert::{parse_submission, registrant_dto};
pub use dto::{
    FieldErrorDto, RegistrantDto, RelayAcceptedDto, RelayUserDto, RosterSummaryDto,
    SubmitRegistrantDto,
};
pub use errors::{ApiError, ApiErrorCode};
