//! Per-worker cookie store that can be emptied between scenario iterations
//!
//! reqwest fixes the cookie provider when the client is built, so the store
//! swaps the inner jar instead of rebuilding the client (and its connection pool).

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use reqwest::Url;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Default)]
pub struct SessionCookies {
    jar: RwLock<Arc<Jar>>,
}

impl SessionCookies {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> Arc<Jar> {
        self.jar
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop every cookie held for every host
    pub fn reset(&self) {
        let mut jar = self.jar.write().unwrap_or_else(PoisonError::into_inner);
        *jar = Arc::new(Jar::default());
    }

    /// Names of the cookies that would be sent to `url`
    pub fn names(&self, url: &Url) -> Vec<String> {
        let Some(header) = self.current().cookies(url) else {
            return Vec::new();
        };
        let Ok(header) = header.to_str() else {
            return Vec::new();
        };
        header
            .split(';')
            .filter_map(|pair| pair.split('=').next())
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

impl CookieStore for SessionCookies {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.current().set_cookies(cookie_headers, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.current().cookies(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("http://127.0.0.1:8080/").unwrap()
    }

    #[test]
    fn test_names_lists_stored_cookies() {
        let cookies = SessionCookies::new();
        cookies.current().add_cookie_str("isucon_session=abc; Path=/", &url());
        cookies.current().add_cookie_str("tracker=1; Path=/", &url());

        let mut names = cookies.names(&url());
        names.sort();
        assert_eq!(names, vec!["isucon_session", "tracker"]);
    }

    #[test]
    fn test_reset_empties_store() {
        let cookies = SessionCookies::new();
        cookies.current().add_cookie_str("isucon_session=abc; Path=/", &url());
        assert_eq!(cookies.names(&url()).len(), 1);

        cookies.reset();
        assert!(cookies.names(&url()).is_empty());
        assert!(cookies.cookies(&url()).is_none());
    }
}
