//! Stable content fingerprint for exact-duplicate detection.

use crate::testcase::TestCase;

/// Fingerprint a case's identifying fields: title, feature and the first
/// three steps, order-preserving. Same fields, same hex string.
pub fn fingerprint(case: &TestCase) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut key = format!("{}:{}:", case.title, case.feature);
    let head: Vec<&str> = case.steps.iter().take(3).map(String::as_str).collect();
    key.push_str(&head.join(":"));

    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::testing::case;

    #[test]
    fn test_identical_identifying_fields_collide() {
        let a = case("a", "Open page", "Main", &["s1", "s2", "s3", "extra"]);
        let mut b = case("b", "Open page", "Main", &["s1", "s2", "s3", "different tail"]);
        b.expected_result = "something else entirely".into();
        // Only the first three steps participate
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_step_order_matters() {
        let a = case("a", "Open page", "Main", &["s1", "s2"]);
        let b = case("b", "Open page", "Main", &["s2", "s1"]);
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_title_change_changes_fingerprint() {
        let a = case("a", "Open page", "Main", &["s1"]);
        let b = case("b", "Open the page", "Main", &["s1"]);
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = case("a", "Open page", "Main", &["s1"]);
        assert_eq!(fingerprint(&a), fingerprint(&a));
        assert_eq!(fingerprint(&a).len(), 16);
    }
}
