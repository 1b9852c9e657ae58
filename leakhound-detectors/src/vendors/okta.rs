//! Okta API token detector
//!
//! Okta tokens are only usable against the org that issued them, so a result
//! needs two correlated matches: the token and a co-located org domain. The
//! probe goes to the matched domain, not a fixed endpoint, which keeps this
//! out of the vendor table.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use leakhound_core::config::RetryConfig;
use leakhound_core::infrastructure::http::send_with_retry;

use crate::clean::clean_results;
use crate::detector::{Detector, DetectorError};
use crate::false_positive::{is_known_false_positive, DEFAULT_FALSE_POSITIVES};
use crate::result::{DetectorResult, DetectorType};

static DOMAIN_PAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-z0-9-]{1,40}\.okta(?:preview|-emea)?\.com")
        .expect("okta domain pattern must compile")
});

static TOKEN_PAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b00[a-zA-Z0-9_-]{40}\b").expect("okta token pattern must compile"));

pub struct Okta {
    client: reqwest::Client,
    retry: RetryConfig,
    /// Test hook: probe this base instead of `https://<matched domain>`.
    base_override: Option<String>,
}

impl Okta {
    pub fn new(client: reqwest::Client, retry: RetryConfig) -> Self {
        Self {
            client,
            retry,
            base_override: None,
        }
    }

    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_override = Some(base.into());
        self
    }

    async fn verify_token(&self, domain: &str, token: &str) -> bool {
        let base = match &self.base_override {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{domain}"),
        };
        let url = format!("{base}/api/v1/groups?limit=1");

        let request = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("Authorization", format!("SSWS {token}"));

        match send_with_retry(request, &self.retry).await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!(domain, error = %err, "okta verification failed");
                false
            }
        }
    }
}

#[async_trait]
impl Detector for Okta {
    fn detector_type(&self) -> DetectorType {
        DetectorType::Okta
    }

    fn keywords(&self) -> &[&'static str] {
        &["okta"]
    }

    async fn from_data(
        &self,
        verify: bool,
        data: &[u8],
    ) -> Result<Vec<DetectorResult>, DetectorError> {
        let text = String::from_utf8_lossy(data);

        let mut results = Vec::new();
        for token in TOKEN_PAT.find_iter(&text) {
            for domain in DOMAIN_PAT.find_iter(&text) {
                let mut result = DetectorResult::new(DetectorType::Okta, token.as_str().as_bytes());

                if verify {
                    result.verified = self.verify_token(domain.as_str(), token.as_str()).await;
                }

                if !result.verified
                    && is_known_false_positive(token.as_str(), DEFAULT_FALSE_POSITIVES, true)
                {
                    continue;
                }

                results.push(result);
            }
        }

        Ok(clean_results(results))
    }
}
