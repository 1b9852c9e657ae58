//! Detector result model

use std::collections::HashMap;

use serde::Serialize;

/// Vendor identified by a detector. Closed set, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DetectorType {
    AbuseIpDb,
    Airtable,
    Currencycloud,
    Datadog,
    Dropbox,
    GitHub,
    GitLab,
    Heroku,
    Jdbc,
    Mailchimp,
    Mailgun,
    Npm,
    Okta,
    PagerDuty,
    PaypalOauth,
    Postmark,
    SendGrid,
    Slack,
    Stripe,
    Text2Data,
    Twilio,
    Verifier,
    Walkscore,
}

impl DetectorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AbuseIpDb => "abuseipdb",
            Self::Airtable => "airtable",
            Self::Currencycloud => "currencycloud",
            Self::Datadog => "datadog",
            Self::Dropbox => "dropbox",
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
            Self::Heroku => "heroku",
            Self::Jdbc => "jdbc",
            Self::Mailchimp => "mailchimp",
            Self::Mailgun => "mailgun",
            Self::Npm => "npm",
            Self::Okta => "okta",
            Self::PagerDuty => "pagerduty",
            Self::PaypalOauth => "paypal_oauth",
            Self::Postmark => "postmark",
            Self::SendGrid => "sendgrid",
            Self::Slack => "slack",
            Self::Stripe => "stripe",
            Self::Text2Data => "text2data",
            Self::Twilio => "twilio",
            Self::Verifier => "verifier",
            Self::Walkscore => "walkscore",
        }
    }
}

impl std::fmt::Display for DetectorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single candidate credential found in a chunk.
#[derive(Debug, Clone, Serialize)]
pub struct DetectorResult {
    pub detector_type: DetectorType,
    /// The matched substring. Identity of the finding when de-duplicating.
    #[serde(with = "raw_bytes")]
    pub raw: Vec<u8>,
    /// Human-safe rendering, e.g. a JDBC string with the password masked.
    pub redacted: Option<String>,
    /// True only if the issuing service actively confirmed the credential
    /// during this scan. False covers not-attempted, rejected, and
    /// network-failed alike; the distinction lives in logs only.
    pub verified: bool,
    pub extra_data: Option<HashMap<String, String>>,
}

impl DetectorResult {
    pub fn new(detector_type: DetectorType, raw: impl Into<Vec<u8>>) -> Self {
        Self {
            detector_type,
            raw: raw.into(),
            redacted: None,
            verified: false,
            extra_data: None,
        }
    }

    /// The raw match rendered as sanitized text.
    pub fn raw_str(&self) -> String {
        leakhound_core::infrastructure::sanitizer::sanitize_utf8(&self.raw)
    }
}

mod raw_bytes {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(raw: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&leakhound_core::infrastructure::sanitizer::sanitize_utf8(raw))
    }
}
