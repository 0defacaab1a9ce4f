//! Response validation
//!
//! This module provides:
//! - `Tally`, the per-worker success/score/failure accumulator
//! - `Failure` and `FailureKind`, the failure taxonomy
//! - `Document`, an assertion DSL over parsed HTML
//! - status, header and checksum validators

mod document;
mod failure;
mod tally;
mod validators;

pub use document::Document;
pub use failure::{Failure, FailureKind};
pub use tally::Tally;
pub use validators::{Verification, expect_asset, expect_header, expect_status, md5_hex};
