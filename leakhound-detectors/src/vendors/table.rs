//! The built-in vendor table
//!
//! One row per vendor: keywords, credential pattern, optional correlated
//! identifier, and the verification probe. Keep each credential group
//! bracketed in `\b` boundaries to reduce noise.

use crate::result::DetectorType;
use crate::spec_detector::{HttpMethod, VendorSpec, VerifySpec};

const EMAIL_PATTERN: &str = r"\b([a-zA-Z0-9._-]+@[a-zA-Z0-9._-]+\.[a-z]+)\b";

/// All table-driven vendors.
pub fn builtin_specs() -> Vec<VendorSpec> {
    vec![
        VendorSpec {
            detector_type: DetectorType::AbuseIpDb,
            keywords: &["abuseipdb"],
            secret_pattern: r"\b([a-z0-9]{80})\b",
            keyword_prefixed: true,
            id_pattern: None,
            verify: Some(VerifySpec {
                method: HttpMethod::Get,
                url: "https://api.abuseipdb.com/api/v2/check?ipAddress=118.25.6.39",
                headers: &[("Key", "{secret}")],
                basic_auth: None,
                body: None,
                body_contains: Some("ipAddress"),
            }),
        },
        VendorSpec {
            detector_type: DetectorType::Airtable,
            keywords: &["airtable"],
            secret_pattern: r"\b(key[a-zA-Z0-9]{14})\b",
            keyword_prefixed: true,
            id_pattern: None,
            verify: Some(VerifySpec {
                method: HttpMethod::Get,
                url: "https://api.airtable.com/v0/meta/whoami",
                headers: &[("Authorization", "Bearer {secret}")],
                basic_auth: None,
                body: None,
                body_contains: None,
            }),
        },
        VendorSpec {
            detector_type: DetectorType::Currencycloud,
            keywords: &["currencycloud"],
            secret_pattern: r"\b([0-9a-z]{64})\b",
            keyword_prefixed: true,
            id_pattern: Some(EMAIL_PATTERN),
            verify: Some(VerifySpec {
                method: HttpMethod::Post,
                url: "https://devapi.currencycloud.com/v2/authenticate/api",
                headers: &[("Content-Type", "application/json")],
                basic_auth: None,
                body: Some(r#"{"login_id":"{id}","api_key":"{secret}"}"#),
                body_contains: Some("auth_token"),
            }),
        },
        VendorSpec {
            detector_type: DetectorType::Datadog,
            keywords: &["datadog", "dd_api"],
            secret_pattern: r"\b([a-f0-9]{32})\b",
            keyword_prefixed: true,
            id_pattern: None,
            verify: Some(VerifySpec {
                method: HttpMethod::Get,
                url: "https://api.datadoghq.com/api/v1/validate",
                headers: &[("DD-API-KEY", "{secret}")],
                basic_auth: None,
                body: None,
                body_contains: None,
            }),
        },
        VendorSpec {
            detector_type: DetectorType::Dropbox,
            keywords: &["sl."],
            secret_pattern: r"\b(sl\.[A-Za-z0-9_-]{130,152})\b",
            keyword_prefixed: false,
            id_pattern: None,
            verify: Some(VerifySpec {
                method: HttpMethod::Post,
                url: "https://api.dropboxapi.com/2/users/get_current_account",
                headers: &[("Authorization", "Bearer {secret}")],
                basic_auth: None,
                body: None,
                body_contains: None,
            }),
        },
        VendorSpec {
            detector_type: DetectorType::GitHub,
            keywords: &["ghp_", "gho_", "ghu_", "ghs_", "ghr_"],
            secret_pattern: r"\b((?:ghp|gho|ghu|ghs|ghr)_[A-Za-z0-9_]{36,255})\b",
            keyword_prefixed: false,
            id_pattern: None,
            verify: Some(VerifySpec {
                method: HttpMethod::Get,
                url: "https://api.github.com/user",
                headers: &[
                    ("Authorization", "token {secret}"),
                    ("Accept", "application/vnd.github.v3+json"),
                ],
                basic_auth: None,
                body: None,
                body_contains: None,
            }),
        },
        VendorSpec {
            detector_type: DetectorType::GitLab,
            keywords: &["glpat-", "gitlab"],
            secret_pattern: r"\b(glpat-[A-Za-z0-9_-]{20,22})\b",
            keyword_prefixed: false,
            id_pattern: None,
            verify: Some(VerifySpec {
                method: HttpMethod::Get,
                url: "https://gitlab.com/api/v4/user",
                headers: &[("PRIVATE-TOKEN", "{secret}")],
                basic_auth: None,
                body: None,
                body_contains: None,
            }),
        },
        VendorSpec {
            detector_type: DetectorType::Heroku,
            keywords: &["heroku"],
            secret_pattern: r"\b([0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12})\b",
            keyword_prefixed: true,
            id_pattern: None,
            verify: Some(VerifySpec {
                method: HttpMethod::Get,
                url: "https://api.heroku.com/account",
                headers: &[
                    ("Authorization", "Bearer {secret}"),
                    ("Accept", "application/vnd.heroku+json; version=3"),
                ],
                basic_auth: None,
                body: None,
                body_contains: None,
            }),
        },
        VendorSpec {
            detector_type: DetectorType::Mailchimp,
            keywords: &["mailchimp"],
            secret_pattern: r"\b([0-9a-f]{32}-us[0-9]{1,2})\b",
            keyword_prefixed: true,
            id_pattern: None,
            verify: Some(VerifySpec {
                method: HttpMethod::Get,
                url: "https://us1.api.mailchimp.com/3.0/",
                headers: &[],
                basic_auth: Some(("anystring", "{secret}")),
                body: None,
                body_contains: None,
            }),
        },
        VendorSpec {
            detector_type: DetectorType::Mailgun,
            keywords: &["mailgun"],
            secret_pattern: r"\b(key-[0-9a-z]{32})\b",
            keyword_prefixed: true,
            id_pattern: None,
            verify: Some(VerifySpec {
                method: HttpMethod::Get,
                url: "https://api.mailgun.net/v3/domains",
                headers: &[],
                basic_auth: Some(("api", "{secret}")),
                body: None,
                body_contains: None,
            }),
        },
        VendorSpec {
            detector_type: DetectorType::Npm,
            keywords: &["npm_"],
            secret_pattern: r"\b(npm_[A-Za-z0-9]{36})\b",
            keyword_prefixed: false,
            id_pattern: None,
            verify: Some(VerifySpec {
                method: HttpMethod::Get,
                url: "https://registry.npmjs.org/-/whoami",
                headers: &[("Authorization", "Bearer {secret}")],
                basic_auth: None,
                body: None,
                body_contains: None,
            }),
        },
        VendorSpec {
            detector_type: DetectorType::PagerDuty,
            keywords: &["pagerduty"],
            secret_pattern: r"\b([a-zA-Z0-9+_-]{20})\b",
            keyword_prefixed: true,
            id_pattern: None,
            verify: Some(VerifySpec {
                method: HttpMethod::Get,
                url: "https://api.pagerduty.com/users?limit=1",
                headers: &[
                    ("Authorization", "Token token={secret}"),
                    ("Accept", "application/vnd.pagerduty+json;version=2"),
                ],
                basic_auth: None,
                body: None,
                body_contains: None,
            }),
        },
        VendorSpec {
            detector_type: DetectorType::Postmark,
            keywords: &["postmark"],
            secret_pattern: r"\b([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})\b",
            keyword_prefixed: true,
            id_pattern: None,
            verify: Some(VerifySpec {
                method: HttpMethod::Get,
                url: "https://api.postmarkapp.com/server",
                headers: &[
                    ("X-Postmark-Server-Token", "{secret}"),
                    ("Accept", "application/json"),
                ],
                basic_auth: None,
                body: None,
                body_contains: None,
            }),
        },
        VendorSpec {
            detector_type: DetectorType::SendGrid,
            keywords: &["sg."],
            secret_pattern: r"\b(SG\.[A-Za-z0-9_-]{22}\.[A-Za-z0-9_-]{43})\b",
            keyword_prefixed: false,
            id_pattern: None,
            verify: Some(VerifySpec {
                method: HttpMethod::Get,
                url: "https://api.sendgrid.com/v3/scopes",
                headers: &[("Authorization", "Bearer {secret}")],
                basic_auth: None,
                body: None,
                body_contains: Some("scopes"),
            }),
        },
        VendorSpec {
            detector_type: DetectorType::Slack,
            keywords: &["xoxb-", "xoxp-", "xoxa-", "xoxs-"],
            secret_pattern: r"\b(xox[bpas]-[0-9]{10,13}-[0-9]{10,13}[0-9a-zA-Z-]*)\b",
            keyword_prefixed: false,
            id_pattern: None,
            verify: Some(VerifySpec {
                method: HttpMethod::Post,
                url: "https://slack.com/api/auth.test",
                headers: &[("Authorization", "Bearer {secret}")],
                basic_auth: None,
                body: None,
                body_contains: Some(r#""ok":true"#),
            }),
        },
        VendorSpec {
            detector_type: DetectorType::Stripe,
            keywords: &["sk_live", "sk_test"],
            secret_pattern: r"\b(sk_(?:live|test)_[A-Za-z0-9]{24,99})\b",
            keyword_prefixed: false,
            id_pattern: None,
            verify: Some(VerifySpec {
                method: HttpMethod::Get,
                url: "https://api.stripe.com/v1/charges?limit=1",
                headers: &[],
                basic_auth: Some(("{secret}", "")),
                body: None,
                body_contains: None,
            }),
        },
        VendorSpec {
            detector_type: DetectorType::Text2Data,
            keywords: &["text2data"],
            secret_pattern: r"\b([0-9A-F]{8}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{12})\b",
            keyword_prefixed: true,
            id_pattern: None,
            verify: Some(VerifySpec {
                method: HttpMethod::Post,
                url: "http://api.text2data.com/v3/Analyze",
                headers: &[
                    ("Accept", "application/json"),
                    ("Content-Type", "application/x-www-form-urlencoded"),
                ],
                basic_auth: None,
                body: Some("DocumentText=Excellent+location%2C+opposite+a+very+large+mall+with+wide+variety+of+shops%2C+restaurants+and+more.&PrivateKey={secret}"),
                body_contains: Some(r#""DocSentimentResultString":"positive""#),
            }),
        },
        VendorSpec {
            detector_type: DetectorType::Twilio,
            keywords: &["sk"],
            secret_pattern: r"\b(SK[0-9a-fA-F]{32})\b",
            keyword_prefixed: false,
            id_pattern: Some(r"\b(AC[0-9a-fA-F]{32})\b"),
            verify: Some(VerifySpec {
                method: HttpMethod::Get,
                url: "https://api.twilio.com/2010-04-01/Accounts/{id}.json",
                headers: &[],
                basic_auth: Some(("{id}", "{secret}")),
                body: None,
                body_contains: None,
            }),
        },
        VendorSpec {
            detector_type: DetectorType::Verifier,
            keywords: &["verifier"],
            secret_pattern: r"\b([a-z0-9]{96})\b",
            keyword_prefixed: true,
            id_pattern: Some(r"\b([a-zA-Z-0-9-]{5,16}@[a-zA-Z-0-9]{4,16}\.[a-zA-Z-0-9]{3,6})\b"),
            verify: Some(VerifySpec {
                method: HttpMethod::Get,
                url: "https://verifier.meetchopra.com/verify/{id}?token={secret}",
                headers: &[],
                basic_auth: None,
                body: None,
                body_contains: None,
            }),
        },
        VendorSpec {
            detector_type: DetectorType::Walkscore,
            keywords: &["walkscore"],
            secret_pattern: r"\b([0-9a-z]{32})\b",
            keyword_prefixed: true,
            id_pattern: None,
            verify: Some(VerifySpec {
                method: HttpMethod::Get,
                url: "https://transit.walkscore.com/transit/search/stops/?lat=47.6101359&lon=-122.3420567&wsapikey={secret}",
                headers: &[("Content-Type", "application/json")],
                basic_auth: None,
                body: None,
                body_contains: Some("distance"),
            }),
        },
    ]
}
