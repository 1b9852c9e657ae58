//! Live-verification behavior against a mock vendor API.

use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leakhound_core::config::RetryConfig;
use leakhound_detectors::spec_detector::SpecDetector;
use leakhound_detectors::vendors::{builtin_specs, Okta, PaypalOauth};
use leakhound_detectors::{Detector, DetectorType};

fn quick_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 1,
        initial_delay_ms: 1,
        backoff_multiplier: 1.0,
    }
}

fn table_detector(detector_type: DetectorType, verify_url: String) -> SpecDetector {
    let spec = builtin_specs()
        .into_iter()
        .find(|s| s.detector_type == detector_type)
        .expect("table row present");
    SpecDetector::new(spec, reqwest::Client::new(), quick_retry())
        .expect("table row compiles")
        .with_verify_url(verify_url)
}

fn abuseipdb_detector(server: &MockServer) -> SpecDetector {
    table_detector(
        DetectorType::AbuseIpDb,
        format!("{}/api/v2/check", server.uri()),
    )
}

fn abuseipdb_chunk() -> String {
    format!("abuseipdb token: {}", "z9x8c7v6b5n4m3q2w1e0".repeat(4))
}

#[tokio::test]
async fn two_xx_with_body_check_verifies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/check"))
        .and(header("Key", "z9x8c7v6b5n4m3q2w1e0".repeat(4).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ipAddress":"118.25.6.39"}"#))
        .mount(&server)
        .await;

    let results = abuseipdb_detector(&server)
        .from_data(true, abuseipdb_chunk().as_bytes())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].verified);
}

#[tokio::test]
async fn two_xx_without_expected_body_stays_unverified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/check"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"error":"rate limited"}"#))
        .mount(&server)
        .await;

    let results = abuseipdb_detector(&server)
        .from_data(true, abuseipdb_chunk().as_bytes())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(!results[0].verified);
}

#[tokio::test]
async fn four_xx_is_a_denial_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/check"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let results = abuseipdb_detector(&server)
        .from_data(true, abuseipdb_chunk().as_bytes())
        .await
        .unwrap();

    // The candidate survives as an unverified result.
    assert_eq!(results.len(), 1);
    assert!(!results[0].verified);
}

#[tokio::test]
async fn unreachable_endpoint_stays_unverified() {
    // Nothing listens here; the request fails at the transport layer.
    let detector = {
        let spec = builtin_specs()
            .into_iter()
            .find(|s| s.detector_type == DetectorType::AbuseIpDb)
            .expect("abuseipdb row present");
        SpecDetector::new(spec, reqwest::Client::new(), quick_retry())
            .expect("table row compiles")
            .with_verify_url("http://127.0.0.1:9/api/v2/check")
    };

    let results = detector
        .from_data(true, abuseipdb_chunk().as_bytes())
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert!(!results[0].verified);
}

#[tokio::test]
async fn walkscore_needs_distance_in_the_body() {
    let key = "q7fp2mk9dr4wn8xt1vb6q7fp2mk9dr4w";
    let data = format!("walkscore_api_key = {key}");

    let live = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stops"))
        .and(query_param("wsapikey", key))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"[{"name":"Pine St & 3rd Ave","distance":0.2}]"#),
        )
        .mount(&live)
        .await;

    let detector = table_detector(
        DetectorType::Walkscore,
        format!("{}/stops?wsapikey={{secret}}", live.uri()),
    );
    let results = detector.from_data(true, data.as_bytes()).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].verified);

    // A 2xx without the expected field is not a live key.
    let empty = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stops"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"error":"no stops"}"#))
        .mount(&empty)
        .await;

    let detector = table_detector(
        DetectorType::Walkscore,
        format!("{}/stops?wsapikey={{secret}}", empty.uri()),
    );
    let results = detector.from_data(true, data.as_bytes()).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(!results[0].verified);
}

#[tokio::test]
async fn text2data_needs_a_positive_sentiment_result() {
    let key = "1D4E8F2A-9B3C-4D5E-8F2A-1B3C5D7E9F2B";
    let data = format!("text2data key: {key}");

    let live = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/Analyze"))
        .and(header("Accept", "application/json"))
        .and(body_string_contains(format!("PrivateKey={key}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"DocSentimentResultString":"positive","DocSentimentValue":0.93}"#),
        )
        .mount(&live)
        .await;

    let detector = table_detector(
        DetectorType::Text2Data,
        format!("{}/v3/Analyze", live.uri()),
    );
    let results = detector.from_data(true, data.as_bytes()).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].verified);

    let negative = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/Analyze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"DocSentimentResultString":"negative","DocSentimentValue":-0.4}"#),
        )
        .mount(&negative)
        .await;

    let detector = table_detector(
        DetectorType::Text2Data,
        format!("{}/v3/Analyze", negative.uri()),
    );
    let results = detector.from_data(true, data.as_bytes()).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(!results[0].verified);
}

#[tokio::test]
async fn okta_probe_targets_the_matched_domain_org() {
    let server = MockServer::start().await;
    let token = "00Xq7fP2mK9dR4wN8xT1vB6q7fP2mK9dR4wN8xT1vB";
    Mock::given(method("GET"))
        .and(path("/api/v1/groups"))
        .and(header("Authorization", format!("SSWS {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&server)
        .await;

    let detector = Okta::new(reqwest::Client::new(), quick_retry()).with_base_url(server.uri());
    let data = format!("host: dev-52.okta.com token: {token}");

    let results = detector.from_data(true, data.as_bytes()).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].verified);
}

#[tokio::test]
async fn paypal_grant_uses_the_pair_as_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/oauth2/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"access_token":"A21AA..."}"#),
        )
        .mount(&server)
        .await;

    let detector = PaypalOauth::new(reqwest::Client::new(), quick_retry())
        .with_token_url(format!("{}/v1/oauth2/token", server.uri()));

    let id = format!("Abr_1x9-{}", "Q".repeat(72));
    let secret = format!("{}-k9Q2mP4wXt", "A8f2K9q4Mx7Tr1Pz5Wb3Nc6".repeat(3));
    let data = format!("paypal client: {id} paypal secret: {secret}");

    let results = detector.from_data(true, data.as_bytes()).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].verified);
}
