//! Shared false-positive classifier

/// Substrings that mark a match as a placeholder rather than a credential.
pub const DEFAULT_FALSE_POSITIVES: &[&str] =
    &["example", "xxxxxx", "aaaaaa", "abcde", "00000", "sample", "www"];

/// Entropy floor below which a match is considered too regular to be a real
/// key. Real API keys sit well above 3 bits/char; repeated-character and
/// keyboard-walk strings fall under 2.
const MIN_SECRET_ENTROPY: f64 = 2.0;

/// Classify a match as a known false positive: a placeholder word, or (when
/// `check_entropy` is set) a string too regular to be machine-generated.
/// Callers only apply this to unverified results; verified results bypass
/// the filter.
pub fn is_known_false_positive(candidate: &str, wordlist: &[&str], check_entropy: bool) -> bool {
    let lower = candidate.to_lowercase();
    if wordlist.iter().any(|word| lower.contains(word)) {
        return true;
    }
    if check_entropy && shannon_entropy(&lower) < MIN_SECRET_ENTROPY {
        return true;
    }
    false
}

/// Shannon entropy in bits per byte.
pub fn shannon_entropy(data: &str) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut frequency = [0u32; 256];
    let len = data.len() as f64;

    for byte in data.bytes() {
        frequency[byte as usize] += 1;
    }

    let mut entropy = 0.0;
    for &count in frequency.iter() {
        if count > 0 {
            let probability = count as f64 / len;
            entropy -= probability * probability.log2();
        }
    }

    entropy
}
