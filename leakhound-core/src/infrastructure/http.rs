//! Shared HTTP client factory and retrying send

use std::sync::OnceLock;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::RetryConfig;

const USER_AGENT: &str = concat!("leakhound/", env!("CARGO_PKG_VERSION"));

static SHARED: OnceLock<reqwest::Client> = OnceLock::new();

/// Build a client with sane timeouts: 3 s connect, 10 s total, at most 5
/// redirects. Connection pooling is handled by reqwest internally.
pub fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(3))
        .timeout(Duration::from_secs(10))
        .redirect(reqwest::redirect::Policy::limited(5))
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Process-wide client for detector verification. Lazily constructed on
/// first use. Consumers that need a substitute (tests, custom TLS) build
/// their own via [`build_client`] and pass it down; nothing in this crate
/// forces the singleton.
pub fn sane_client() -> &'static reqwest::Client {
    SHARED.get_or_init(build_client)
}

/// Send a request, retrying on connection errors and 5xx responses with
/// exponential backoff. Non-5xx responses (including 4xx) are returned to the
/// caller on the first attempt; they are an answer, not a transport failure.
pub async fn send_with_retry(
    request: reqwest::RequestBuilder,
    retry: &RetryConfig,
) -> Result<reqwest::Response, reqwest::Error> {
    let max_attempts = retry.max_attempts.max(1);
    let mut last_err: Option<reqwest::Error> = None;

    for attempt in 1..=max_attempts {
        let Some(cloned) = request.try_clone() else {
            // Streaming bodies cannot be replayed; send the original once.
            return request.send().await;
        };

        match cloned.send().await {
            Ok(response) if response.status().is_server_error() && attempt < max_attempts => {
                debug!(status = %response.status(), attempt, "retrying after server error");
            }
            Ok(response) => return Ok(response),
            Err(err) => {
                if attempt == max_attempts {
                    return Err(err);
                }
                warn!(error = %err, attempt, "request failed, retrying");
                last_err = Some(err);
            }
        }

        tokio::time::sleep(retry.delay_for_attempt(attempt)).await;
    }

    // Unreachable in practice: the loop always returns on the final attempt.
    match last_err {
        Some(err) => Err(err),
        None => request.send().await,
    }
}
