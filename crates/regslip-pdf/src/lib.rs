// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Renders the single-page registration acknowledgment slip. The layout is
//! a fixed template: every element sits at a hard-coded coordinate and the
//! content fits one A4 page by construction. Missing or undecodable images
//! are tolerated; the slip renders without them.

pub const CRATE_NAME: &str = "regslip-pdf";

mod org;
mod slip;

pub use org::OrgProfile;
pub use slip::{format_long_date, render_slip, slip_filename, RenderError};
