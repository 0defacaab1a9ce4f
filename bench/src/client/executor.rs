//! Single-request executor with a hard deadline
//!
//! The whole redirect chain runs inside one `tokio::time::timeout`. When the
//! deadline wins, the request future is dropped, which cancels the in-flight
//! request and closes its connection.

use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, Method, StatusCode};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::cookies::SessionCookies;
use super::types::{Page, Request, RequestError};
use crate::config::RequestConfig;

/// Issues requests for exactly one worker
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    worker_id: usize,
    client: Client,
    cookies: Arc<SessionCookies>,
    timeout: Duration,
    max_redirects: usize,
    access_log: bool,
}

impl RequestExecutor {
    /// Build an executor with its own client and cookie store
    pub fn new(worker_id: usize, config: &RequestConfig) -> Result<Self, RequestError> {
        let cookies = Arc::new(SessionCookies::new());
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .cookie_provider(cookies.clone())
            .redirect(Policy::none())
            .build()
            .map_err(RequestError::Build)?;

        Ok(Self {
            worker_id,
            client,
            cookies,
            timeout: config.timeout,
            max_redirects: config.max_redirects,
            access_log: config.access_log,
        })
    }

    pub fn cookies(&self) -> &SessionCookies {
        &self.cookies
    }

    /// Send a request, racing it against the deadline
    pub async fn send(&self, request: Request) -> Result<Page, RequestError> {
        let method = request.method.clone();
        let url = request.url.to_string();

        let page = match tokio::time::timeout(self.timeout, self.follow(request)).await {
            Ok(result) => result?,
            Err(_) => {
                debug!(
                    worker = self.worker_id,
                    %method,
                    uri = %url,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "request cancelled at deadline"
                );
                return Err(RequestError::Timeout { url });
            }
        };

        if self.access_log {
            info!(
                worker = self.worker_id,
                %method,
                uri = %page.url,
                status = page.status.as_u16(),
                req_time_ms = page.elapsed.as_millis() as u64,
                "access"
            );
        }
        Ok(page)
    }

    async fn follow(&self, request: Request) -> Result<Page, RequestError> {
        let Request {
            mut method,
            mut url,
            mut form,
            mut settle,
        } = request;
        let start = Instant::now();

        for _ in 0..=self.max_redirects {
            let mut builder = self.client.request(method.clone(), url.clone());
            if let Some(fields) = &form {
                builder = builder.form(fields);
            }
            let response = builder.send().await.map_err(|source| RequestError::Transport {
                url: url.to_string(),
                source,
            })?;

            let status = response.status();
            if status.is_redirection()
                && let Some(location) = response.headers().get(LOCATION)
            {
                let location = location
                    .to_str()
                    .map_err(|_| RequestError::InvalidUrl(format!("{:?}", location)))?;
                let next = url
                    .join(location)
                    .map_err(|e| RequestError::InvalidUrl(format!("{location}: {e}")))?;

                if let Some(delay) = settle.take() {
                    tokio::time::sleep(delay).await;
                }
                if !matches!(
                    status,
                    StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT
                ) {
                    method = Method::GET;
                    form = None;
                }
                url = next;
                continue;
            }

            let headers = response.headers().clone();
            let final_url = response.url().clone();
            let body = response
                .bytes()
                .await
                .map_err(|source| RequestError::Transport {
                    url: final_url.to_string(),
                    source,
                })?;

            return Ok(Page {
                status,
                url: final_url,
                headers,
                body,
                elapsed: start.elapsed(),
            });
        }

        Err(RequestError::TooManyRedirects {
            url: url.to_string(),
            hops: self.max_redirects,
        })
    }
}
