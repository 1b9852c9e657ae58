//! Result de-duplication

use std::collections::HashMap;

use crate::result::DetectorResult;

/// De-duplicate results from a single `from_data` call by their raw match.
/// When the same raw value appears verified and unverified, the verified
/// instance wins; otherwise the first instance is kept. Applying the cleaner
/// twice equals applying it once.
pub fn clean_results(results: Vec<DetectorResult>) -> Vec<DetectorResult> {
    let mut out: Vec<DetectorResult> = Vec::with_capacity(results.len());
    let mut index_by_raw: HashMap<Vec<u8>, usize> = HashMap::new();

    for result in results {
        match index_by_raw.get(&result.raw) {
            Some(&i) => {
                if result.verified && !out[i].verified {
                    out[i] = result;
                }
            }
            None => {
                index_by_raw.insert(result.raw.clone(), out.len());
                out.push(result);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{DetectorResult, DetectorType};

    fn result(raw: &str, verified: bool) -> DetectorResult {
        let mut r = DetectorResult::new(DetectorType::Stripe, raw.as_bytes());
        r.verified = verified;
        r
    }

    #[test]
    fn verified_instance_wins() {
        let cleaned = clean_results(vec![
            result("sk_live_abc", false),
            result("sk_live_abc", true),
            result("sk_live_def", false),
        ]);
        assert_eq!(cleaned.len(), 2);
        assert!(cleaned[0].verified);
        assert_eq!(cleaned[0].raw, b"sk_live_abc".to_vec());
        assert!(!cleaned[1].verified);
    }

    #[test]
    fn verified_first_is_not_downgraded() {
        let cleaned = clean_results(vec![
            result("sk_live_abc", true),
            result("sk_live_abc", false),
        ]);
        assert_eq!(cleaned.len(), 1);
        assert!(cleaned[0].verified);
    }

    #[test]
    fn cleaning_is_idempotent() {
        let input = vec![
            result("a", false),
            result("a", true),
            result("b", false),
            result("b", false),
            result("c", true),
        ];
        let once = clean_results(input);
        let twice = clean_results(once.clone());
        assert_eq!(once.len(), twice.len());
        for (x, y) in once.iter().zip(twice.iter()) {
            assert_eq!(x.raw, y.raw);
            assert_eq!(x.verified, y.verified);
        }
    }
}
