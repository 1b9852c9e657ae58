//! PayPal OAuth client-credential detector
//!
//! A usable PayPal credential is a (client id, client secret) pair; the probe
//! is an OAuth token grant with the pair as basic auth, which does not fit
//! the single-request template of the vendor table.

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

const DEFAULT_TOKEN_URL: &str = "https://api-m.sandbox.paypal.com/v1/oauth2/token";

static ID_PAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Za-z0-9_.]{7}-[A-Za-z0-9_.]{72})\b")
        .expect("paypal id pattern must compile")
});

static SECRET_PAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Za-z0-9_.]{69}-[A-Za-z0-9_.]{10})\b")
        .expect("paypal secret pattern must compile")
});

pub struct PaypalOauth {
    client: reqwest::Client,
    retry: RetryConfig,
    token_url: String,
}

impl PaypalOauth {
    pub fn new(client: reqwest::Client, retry: RetryConfig) -> Self {
        Self {
            client,
            retry,
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    async fn verify_pair(&self, id: &str, secret: &str) -> bool {
        let request = self
            .client
            .post(&self.token_url)
            .header("Accept", "application/json")
            .header("Accept-Language", "en_US")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .basic_auth(id, Some(secret))
            .body("grant_type=client_credentials");

        match send_with_retry(request, &self.retry).await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!(error = %err, "paypal verification failed");
                false
            }
        }
    }
}

#[async_trait]
impl Detector for PaypalOauth {
    fn detector_type(&self) -> DetectorType {
        DetectorType::PaypalOauth
    }

    fn keywords(&self) -> &[&'static str] {
        &["paypal"]
    }

    async fn from_data(
        &self,
        verify: bool,
        data: &[u8],
    ) -> Result<Vec<DetectorResult>, DetectorError> {
        let text = String::from_utf8_lossy(data);

        // The token shapes are generic enough that the keyword must gate the
        // regex pass itself, not just the engine pre-filter.
        if !text.to_lowercase().contains("paypal") {
            return Ok(Vec::new());
        }

        let secrets: Vec<&str> = SECRET_PAT
            .captures_iter(&text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect();
        let ids: Vec<&str> = ID_PAT
            .captures_iter(&text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect();

        let mut results = Vec::new();
        for secret in &secrets {
            for id in &ids {
                let mut result =
                    DetectorResult::new(DetectorType::PaypalOauth, secret.as_bytes());

                if verify {
                    result.verified = self.verify_pair(id, secret).await;
                }

                if !result.verified
                    && is_known_false_positive(secret, DEFAULT_FALSE_POSITIVES, true)
                {
                    continue;
                }

                results.push(result);
            }
        }

        Ok(clean_results(results))
    }
}
