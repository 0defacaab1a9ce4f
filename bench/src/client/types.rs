//! Request/response types and error definitions for the executor

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode, Url};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while executing a request
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Timeout {url}")]
    Timeout { url: String },

    #[error("transport error {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("stopped after {hops} redirects {url}")]
    TooManyRedirects { url: String, hops: usize },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("worker stopped before sending {url}")]
    Stopped { url: String },

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

/// A request to send through the executor
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    /// Form fields, sent `application/x-www-form-urlencoded`
    pub form: Option<Vec<(String, String)>>,
    /// Pause taken before following the first redirect
    pub settle: Option<Duration>,
}

impl Request {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            form: None,
            settle: None,
        }
    }

    pub fn post_form<K, V>(url: Url, fields: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self {
            method: Method::POST,
            url,
            form: Some(
                fields
                    .iter()
                    .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
                    .collect(),
            ),
            settle: None,
        }
    }

    pub fn with_settle(mut self, delay: Duration) -> Self {
        self.settle = Some(delay);
        self
    }
}

/// A fully-read response, after redirects
#[derive(Debug, Clone)]
pub struct Page {
    pub status: StatusCode,
    /// Final URL once every redirect has been followed
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Time from the first request to the final response
    pub elapsed: Duration,
}

impl Page {
    /// Value of a header, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
