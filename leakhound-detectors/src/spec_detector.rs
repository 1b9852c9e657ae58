//! Table-driven detector
//!
//! Most vendors differ only in their regex set and verification endpoint, so
//! they are represented as data — a [`VendorSpec`] row — interpreted by one
//! generic [`SpecDetector`]. Only vendors with genuinely unusual verification
//! get a hand-written implementation under [`crate::vendors`].

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use leakhound_core::config::RetryConfig;
use leakhound_core::infrastructure::http::send_with_retry;

use crate::clean::clean_results;
use crate::detector::{Detector, DetectorError};
use crate::false_positive::{is_known_false_positive, DEFAULT_FALSE_POSITIVES};
use crate::pattern::keyword_prefix_regex;
use crate::result::{DetectorResult, DetectorType};

/// One vendor's detection rules as data.
#[derive(Debug, Clone, Copy)]
pub struct VendorSpec {
    pub detector_type: DetectorType,
    /// Lowercase pre-filter substrings.
    pub keywords: &'static [&'static str],
    /// Credential pattern; capture group 1 is the secret. Bracket the group
    /// with `\b` to reduce noise.
    pub secret_pattern: &'static str,
    /// When true, `secret_pattern` is preceded by the shared keyword prefix
    /// bracket (keyword within 40 chars before the credential).
    pub keyword_prefixed: bool,
    /// Optional correlated identifier pattern (an email near an API key, a
    /// client id near a secret). Candidates are the Cartesian product of the
    /// two match sets.
    pub id_pattern: Option<&'static str>,
    pub verify: Option<VerifySpec>,
}

#[derive(Debug, Clone, Copy)]
pub enum HttpMethod {
    Get,
    Post,
}

/// How to probe the vendor's API for one candidate. `{secret}` and `{id}`
/// placeholders in the URL, header values, basic-auth parts, and body are
/// replaced with the candidate's values.
#[derive(Debug, Clone, Copy)]
pub struct VerifySpec {
    pub method: HttpMethod,
    pub url: &'static str,
    pub headers: &'static [(&'static str, &'static str)],
    pub basic_auth: Option<(&'static str, &'static str)>,
    pub body: Option<&'static str>,
    /// When set, a 2xx alone is not enough: the response body must contain
    /// this substring for the credential to count as live.
    pub body_contains: Option<&'static str>,
}

/// Generic interpreter for a [`VendorSpec`] row.
pub struct SpecDetector {
    spec: VendorSpec,
    secret_re: Regex,
    id_re: Option<Regex>,
    client: reqwest::Client,
    retry: RetryConfig,
    url_override: Option<String>,
}

impl SpecDetector {
    pub fn new(
        spec: VendorSpec,
        client: reqwest::Client,
        retry: RetryConfig,
    ) -> Result<Self, DetectorError> {
        let pattern = if spec.keyword_prefixed {
            format!(
                "{}{}",
                keyword_prefix_regex(spec.keywords),
                spec.secret_pattern
            )
        } else {
            spec.secret_pattern.to_string()
        };

        let secret_re = Regex::new(&pattern).map_err(|e| DetectorError::Pattern {
            detector: spec.detector_type.as_str(),
            message: e.to_string(),
        })?;

        let id_re = match spec.id_pattern {
            Some(p) => Some(Regex::new(p).map_err(|e| DetectorError::Pattern {
                detector: spec.detector_type.as_str(),
                message: e.to_string(),
            })?),
            None => None,
        };

        Ok(Self {
            spec,
            secret_re,
            id_re,
            client,
            retry,
            url_override: None,
        })
    }

    /// Redirect verification at a substitute endpoint. Placeholders still
    /// apply. Used by tests to point at a mock server.
    pub fn with_verify_url(mut self, url: impl Into<String>) -> Self {
        self.url_override = Some(url.into());
        self
    }

    fn group_matches(&self, re: &Regex, text: &str) -> Vec<String> {
        re.captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .collect()
    }

    async fn verify_candidate(&self, secret: &str, id: Option<&str>) -> bool {
        let Some(verify) = &self.spec.verify else {
            return false;
        };

        let url = substitute(
            self.url_override.as_deref().unwrap_or(verify.url),
            secret,
            id,
        );
        let mut request = match verify.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };
        for (name, value) in verify.headers {
            request = request.header(*name, substitute(value, secret, id));
        }
        if let Some((user, pass)) = verify.basic_auth {
            request = request.basic_auth(
                substitute(user, secret, id),
                Some(substitute(pass, secret, id)),
            );
        }
        if let Some(body) = verify.body {
            request = request.body(substitute(body, secret, id));
        }

        match send_with_retry(request, &self.retry).await {
            Ok(response) if response.status().is_success() => match verify.body_contains {
                Some(needle) => response
                    .text()
                    .await
                    .map(|body| body.contains(needle))
                    .unwrap_or(false),
                None => true,
            },
            Ok(response) => {
                debug!(
                    detector = %self.spec.detector_type,
                    status = %response.status(),
                    "verification rejected"
                );
                false
            }
            Err(err) => {
                debug!(
                    detector = %self.spec.detector_type,
                    error = %err,
                    "verification request failed"
                );
                false
            }
        }
    }
}

#[async_trait]
impl Detector for SpecDetector {
    fn detector_type(&self) -> DetectorType {
        self.spec.detector_type
    }

    fn keywords(&self) -> &[&'static str] {
        self.spec.keywords
    }

    async fn from_data(
        &self,
        verify: bool,
        data: &[u8],
    ) -> Result<Vec<DetectorResult>, DetectorError> {
        let text = String::from_utf8_lossy(data);

        let secrets = self.group_matches(&self.secret_re, &text);
        if secrets.is_empty() {
            return Ok(Vec::new());
        }

        // With an id pattern, a secret only becomes a candidate when paired
        // with a co-located identifier.
        let ids: Vec<Option<String>> = match &self.id_re {
            Some(id_re) => self
                .group_matches(id_re, &text)
                .into_iter()
                .map(Some)
                .collect(),
            None => vec![None],
        };

        let mut results = Vec::new();
        for secret in &secrets {
            for id in &ids {
                let mut result = DetectorResult::new(self.spec.detector_type, secret.as_bytes());

                if verify {
                    result.verified = self.verify_candidate(secret, id.as_deref()).await;
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

fn substitute(template: &str, secret: &str, id: Option<&str>) -> String {
    let mut out = template.replace("{secret}", secret);
    if let Some(id) = id {
        out = out.replace("{id}", id);
    }
    out
}
