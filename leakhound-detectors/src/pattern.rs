//! Shared pattern-building helpers

/// Bracket a credential pattern with a case-insensitive keyword prefix: the
/// keyword must appear within 40 characters before the credential. Keeps
/// generic-looking token patterns from firing on unrelated text.
pub fn keyword_prefix_regex(keywords: &[&str]) -> String {
    format!(r"(?i)(?:{})(?:.|[\n\r]){{0,40}}", keywords.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn prefix_matches_keyword_near_credential() {
        let pattern = format!("{}{}", keyword_prefix_regex(&["acme"]), r"\b([a-z0-9]{8})\b");
        let re = Regex::new(&pattern).unwrap();

        let caps = re.captures("ACME_API_KEY = a1b2c3d4").unwrap();
        assert_eq!(&caps[1], "a1b2c3d4");

        assert!(re.captures("unrelated = a1b2c3d4").is_none());
    }

    #[test]
    fn prefix_spans_newlines() {
        let pattern = format!("{}{}", keyword_prefix_regex(&["acme"]), r"\b([a-z0-9]{8})\b");
        let re = Regex::new(&pattern).unwrap();
        assert!(re.is_match("acme credentials:\ntoken9z8"));
    }
}
