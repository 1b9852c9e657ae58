//! RFC 3164 / RFC 5424 message parsing
//!
//! Only the header fields the pipeline records are extracted; structured
//! data and the free-form message body are left to the detectors, which see
//! the raw bytes regardless of whether the header parses.

use once_cell::sync::Lazy;
use regex::Regex;

use leakhound_core::domain::ChunkMetadata;

/// Wire format for a syslog listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyslogFormat {
    Rfc3164,
    Rfc5424,
}

impl SyslogFormat {
    /// Parse the configured format name. Empty means the default (RFC 3164).
    pub fn from_config(value: &str) -> Option<Self> {
        match value {
            "" | "rfc3164" => Some(Self::Rfc3164),
            "rfc5424" => Some(Self::Rfc5424),
            _ => None,
        }
    }
}

// <PRI>MMM dd hh:mm:ss HOSTNAME ...
static RFC3164_PAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<(\d{1,3})>([A-Z][a-z]{2}\s+\d{1,2}\s\d{2}:\d{2}:\d{2})\s([^\s:\[]+)")
        .expect("rfc3164 pattern must compile")
});

// <PRI>VERSION TIMESTAMP HOSTNAME APP-NAME PROCID ...
static RFC5424_PAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<(\d{1,3})>\d+\s(\S+)\s(\S+)\s(\S+)\s(\S+)")
        .expect("rfc5424 pattern must compile")
});

/// Parse the header of one message into chunk metadata. `None` means the
/// payload did not match the configured format; the caller still emits the
/// chunk, just with empty metadata fields.
pub fn parse_metadata(format: SyslogFormat, input: &[u8], client: &str) -> Option<ChunkMetadata> {
    let text = std::str::from_utf8(input).ok()?;

    match format {
        SyslogFormat::Rfc3164 => {
            let caps = RFC3164_PAT.captures(text)?;
            let pri: u32 = caps[1].parse().ok()?;
            Some(ChunkMetadata::Syslog {
                hostname: caps[3].to_string(),
                appname: String::new(),
                procid: String::new(),
                timestamp: caps[2].to_string(),
                facility: (pri / 8).to_string(),
                client: client.to_string(),
            })
        }
        SyslogFormat::Rfc5424 => {
            let caps = RFC5424_PAT.captures(text)?;
            Some(ChunkMetadata::Syslog {
                hostname: nil_dash(&caps[3]),
                appname: nil_dash(&caps[4]),
                procid: nil_dash(&caps[5]),
                timestamp: nil_dash(&caps[2]),
                facility: String::new(),
                client: client.to_string(),
            })
        }
    }
}

/// RFC 5424 uses `-` for "no value".
fn nil_dash(field: &str) -> String {
    if field == "-" {
        String::new()
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3164_header() {
        let msg = b"<34>Oct 11 22:14:15 mymachine su: 'su root' failed for lonvick on /dev/pts/8";
        let metadata = parse_metadata(SyslogFormat::Rfc3164, msg, "10.0.0.5:33812").unwrap();
        match metadata {
            ChunkMetadata::Syslog {
                hostname,
                timestamp,
                facility,
                client,
                ..
            } => {
                assert_eq!(hostname, "mymachine");
                assert_eq!(timestamp, "Oct 11 22:14:15");
                assert_eq!(facility, "4");
                assert_eq!(client, "10.0.0.5:33812");
            }
            other => panic!("unexpected metadata: {:?}", other),
        }
    }

    #[test]
    fn parses_rfc5424_header() {
        let msg = b"<165>1 2023-10-11T22:14:15.003Z mymachine.example.com evntslog 1234 ID47 - BOM'su root' failed";
        let metadata = parse_metadata(SyslogFormat::Rfc5424, msg, "peer").unwrap();
        match metadata {
            ChunkMetadata::Syslog {
                hostname,
                appname,
                procid,
                timestamp,
                ..
            } => {
                assert_eq!(hostname, "mymachine.example.com");
                assert_eq!(appname, "evntslog");
                assert_eq!(procid, "1234");
                assert_eq!(timestamp, "2023-10-11T22:14:15.003Z");
            }
            other => panic!("unexpected metadata: {:?}", other),
        }
    }

    #[test]
    fn garbage_does_not_parse() {
        assert!(parse_metadata(SyslogFormat::Rfc3164, b"not syslog at all", "peer").is_none());
        assert!(parse_metadata(SyslogFormat::Rfc5424, b"<34>Oct 11", "peer").is_none());
    }

    #[test]
    fn format_names() {
        assert_eq!(SyslogFormat::from_config(""), Some(SyslogFormat::Rfc3164));
        assert_eq!(
            SyslogFormat::from_config("rfc3164"),
            Some(SyslogFormat::Rfc3164)
        );
        assert_eq!(
            SyslogFormat::from_config("rfc5424"),
            Some(SyslogFormat::Rfc5424)
        );
        assert_eq!(SyslogFormat::from_config("cef"), None);
    }
}
