//! JDBC connection string detector
//!
//! Confirming a JDBC credential means dialing the database with a
//! scheme-specific driver, not an HTTP probe, so this detector never
//! verifies. It emits a redacted rendering of the connection string with
//! the password masked.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::clean::clean_results;
use crate::detector::{Detector, DetectorError};
use crate::result::{DetectorResult, DetectorType};

static CONN_PAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bjdbc:[a-z0-9]+://[^\s"'<>]+"#).expect("jdbc pattern must compile")
});

static PASSWORD_PAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(password)=([^&\s"']*)"#).expect("jdbc password pattern must compile")
});

#[derive(Debug, Default)]
pub struct Jdbc;

impl Jdbc {
    pub fn new() -> Self {
        Self
    }

    /// Mask every `password=` value with an equal-length run of `*`.
    fn redact(conn: &str) -> String {
        PASSWORD_PAT
            .replace_all(conn, |caps: &regex::Captures<'_>| {
                format!("{}={}", &caps[1], "*".repeat(caps[2].len()))
            })
            .into_owned()
    }
}

#[async_trait]
impl Detector for Jdbc {
    fn detector_type(&self) -> DetectorType {
        DetectorType::Jdbc
    }

    fn keywords(&self) -> &[&'static str] {
        &["jdbc"]
    }

    async fn from_data(
        &self,
        _verify: bool,
        data: &[u8],
    ) -> Result<Vec<DetectorResult>, DetectorError> {
        let text = String::from_utf8_lossy(data);

        let mut results = Vec::new();
        for m in CONN_PAT.find_iter(&text) {
            let conn = m.as_str();
            let mut result = DetectorResult::new(DetectorType::Jdbc, conn.as_bytes());
            result.redacted = Some(Self::redact(conn));
            results.push(result);
        }

        Ok(clean_results(results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn found_unverified() {
        let data = b"jdbc connection string: jdbc:mysql://hello.test.us-east-1.rds.amazonaws.com:3306/testdb?password=testpassword <-";
        let results = Jdbc::new().from_data(true, data).await.unwrap();

        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.detector_type, DetectorType::Jdbc);
        assert!(!result.verified);
        assert!(!result.raw.is_empty());
        assert_eq!(
            result.redacted.as_deref(),
            Some("jdbc:mysql://hello.test.us-east-1.rds.amazonaws.com:3306/testdb?password=************")
        );
    }

    #[tokio::test]
    async fn not_found() {
        let data = b"You cannot find the secret within";
        let results = Jdbc::new().from_data(true, data).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn duplicate_strings_collapse() {
        let data = b"jdbc:postgresql://db:5432/app?password=hunter2 jdbc:postgresql://db:5432/app?password=hunter2";
        let results = Jdbc::new().from_data(false, data).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].redacted.as_deref(),
            Some("jdbc:postgresql://db:5432/app?password=*******")
        );
    }
}
