//! HTTP client side of the harness
//!
//! This module provides:
//! - `RequestExecutor` for deadline-bounded requests with manual redirects
//! - `SessionCookies`, a cookie store that can be emptied between iterations
//! - `Request`/`Page` value types and `RequestError`

mod cookies;
mod executor;
mod types;

pub use cookies::SessionCookies;
pub use executor::RequestExecutor;
pub use types::{Page, Request, RequestError};
