//! Failure taxonomy for response validation

use reqwest::StatusCode;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::client::RequestError;

/// Category of a recorded failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Request exceeded its deadline
    Timeout,
    /// Connection-level failure (DNS, refused, reset, bad redirect)
    Transport,
    /// Unexpected status code
    Status,
    /// Expected header missing or wrong
    Header,
    /// Static asset content hash differs from the manifest
    Checksum,
    /// Expected element missing, wrong count, or text pattern mismatch
    Structure,
    /// A value that should have changed (or stayed hidden) did not
    Consistency,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Transport => "transport",
            FailureKind::Status => "status",
            FailureKind::Header => "header",
            FailureKind::Checksum => "checksum",
            FailureKind::Structure => "structure",
            FailureKind::Consistency => "consistency",
        };
        f.write_str(name)
    }
}

/// One failed check, with the reason shown in the failure log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn status(observed: StatusCode, expected: StatusCode, url: &str) -> Self {
        Self::new(
            FailureKind::Status,
            format!("status {} != {} {}", observed.as_u16(), expected.as_u16(), url),
        )
    }

    pub fn header(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Header, message)
    }

    pub fn checksum(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Checksum, message)
    }

    pub fn structure(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Structure, message)
    }

    pub fn consistency(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Consistency, message)
    }
}

impl From<&RequestError> for Failure {
    fn from(err: &RequestError) -> Self {
        let kind = match err {
            RequestError::Timeout { .. } => FailureKind::Timeout,
            _ => FailureKind::Transport,
        };
        Self::new(kind, err.to_string())
    }
}
