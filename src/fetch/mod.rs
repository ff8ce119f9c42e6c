//! JSON GET requests with retry on transient network failures

use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::retry::RetryPolicy;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Why a single fetch attempt failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP error: {status}")]
    Status { status: u16 },

    #[error("response content is not valid JSON: {0}")]
    Decode(String),

    #[error("unexpected error: {0}")]
    Request(String),
}

impl FetchError {
    /// Timeouts and connection failures are worth another attempt
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connect(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Per-call request settings
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub retries: u32,
    pub backoff_factor: f64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retries: 3,
            backoff_factor: 2.0,
        }
    }
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self { client })
    }

    /// Fetch `url` and parse the body as JSON.
    ///
    /// Timeouts and connection failures are retried per `options`; a bad
    /// status, a non-JSON body or any other error gives up at once. Failures
    /// are logged and reported as `None`.
    pub async fn get_json(
        &self,
        url: &str,
        params: Option<&[(&str, &str)]>,
        headers: Option<&HeaderMap>,
        options: &FetchOptions,
    ) -> Option<Value> {
        let policy = RetryPolicy::new(options.retries, options.backoff_factor);

        let result = policy
            .run(
                &format!("GET {url}"),
                move |attempt| self.attempt(url, params, headers, options, attempt),
                FetchError::is_recoverable,
            )
            .await;

        match result {
            Ok(value) => Some(value),
            Err(e) => {
                error!("Giving up on GET {}: {}", url, e);
                None
            }
        }
    }

    async fn attempt(
        &self,
        url: &str,
        params: Option<&[(&str, &str)]>,
        headers: Option<&HeaderMap>,
        options: &FetchOptions,
        attempt: u32,
    ) -> Result<Value, FetchError> {
        info!("Sending GET request to {} (attempt {}/{})", url, attempt, options.retries.max(1));

        let mut request = self.client.get(url).timeout(options.timeout);
        if let Some(params) = params {
            request = request.query(params);
        }
        if let Some(headers) = headers {
            request = request.headers(headers.clone());
        }

        let response = request.send().await?;
        info!("API response: {}", response.status());

        let response = response.error_for_status()?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            debug!("Body of {} was not JSON: {}", url, body);
            FetchError::Decode(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn quick(retries: u32) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_millis(200),
            retries,
            backoff_factor: 0.0,
        }
    }

    #[tokio::test]
    async fn test_returns_parsed_json() {
        let app = Router::new().route(
            "/deals",
            get(|| async { axum::Json(json!({ "timedDeals": [] })) }),
        );
        let base = serve(app).await;

        let fetcher = HttpFetcher::new().unwrap();
        let value = fetcher
            .get_json(&format!("{base}/deals"), None, None, &quick(3))
            .await;

        assert_eq!(value, Some(json!({ "timedDeals": [] })));
    }

    #[tokio::test]
    async fn test_passes_query_params() {
        let app = Router::new().route(
            "/echo",
            get(|axum::extract::RawQuery(query): axum::extract::RawQuery| async move {
                axum::Json(json!({ "query": query }))
            }),
        );
        let base = serve(app).await;

        let fetcher = HttpFetcher::new().unwrap();
        let value = fetcher
            .get_json(
                &format!("{base}/echo"),
                Some(&[("sections", "items")][..]),
                None,
                &quick(1),
            )
            .await
            .unwrap();

        assert_eq!(value["query"], "sections=items");
    }

    #[tokio::test]
    async fn test_http_error_is_not_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let app = Router::new().route(
            "/broken",
            get(move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }),
        );
        let base = serve(app).await;

        let fetcher = HttpFetcher::new().unwrap();
        let value = fetcher
            .get_json(&format!("{base}/broken"), None, None, &quick(3))
            .await;

        assert!(value.is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_json_is_not_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let app = Router::new().route(
            "/html",
            get(move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    "<html>maintenance</html>"
                }
            }),
        );
        let base = serve(app).await;

        let fetcher = HttpFetcher::new().unwrap();
        let value = fetcher
            .get_json(&format!("{base}/html"), None, None, &quick(3))
            .await;

        assert!(value.is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeouts_are_retried_until_exhausted() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let app = Router::new().route(
            "/slow",
            get(move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "{}"
                }
            }),
        );
        let base = serve(app).await;

        let fetcher = HttpFetcher::new().unwrap();
        let value = fetcher
            .get_json(&format!("{base}/slow"), None, None, &quick(3))
            .await;

        assert!(value.is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_connection_refused_returns_none() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::new().unwrap();
        let value = fetcher
            .get_json(&format!("http://{addr}/gone"), None, None, &quick(2))
            .await;

        assert!(value.is_none());
    }

    #[test]
    fn test_recoverability() {
        assert!(FetchError::Timeout.is_recoverable());
        assert!(FetchError::Connect("refused".into()).is_recoverable());
        assert!(!FetchError::Status { status: 404 }.is_recoverable());
        assert!(!FetchError::Decode("eof".into()).is_recoverable());
        assert!(!FetchError::Request("bad url".into()).is_recoverable());
    }
}
