//! Status, header and checksum validators

use reqwest::StatusCode;

use super::failure::Failure;
use crate::client::Page;

/// How deeply a static asset response is verified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Status only; the body is never hashed
    StatusOnly,
    /// Status plus md5 of the body
    Checksum,
}

pub fn expect_status(page: &Page, expected: StatusCode) -> Result<(), Failure> {
    if page.status == expected {
        Ok(())
    } else {
        Err(Failure::status(page.status, expected, page.url.as_str()))
    }
}

pub fn expect_header(page: &Page, name: &str, expected: &str) -> Result<(), Failure> {
    match page.header(name) {
        Some(value) if value == expected => Ok(()),
        _ => Err(Failure::header(format!("invalid {name} header"))),
    }
}

/// Hex-encoded md5 of a body
pub fn md5_hex(body: &[u8]) -> String {
    format!("{:x}", md5::compute(body))
}

/// Validate a static asset. Expects a 200.
pub fn expect_asset(page: &Page, md5sum: &str, verification: Verification) -> Result<(), Failure> {
    expect_status(page, StatusCode::OK)?;
    match verification {
        Verification::StatusOnly => Ok(()),
        Verification::Checksum if md5_hex(&page.body) == md5sum => Ok(()),
        Verification::Checksum => Err(Failure::checksum(format!(
            "invalid md5 sum {}",
            page.url.path()
        ))),
    }
}
