//! Set similarity between step lists.

use std::collections::HashSet;

/// Jaccard similarity of two step sets. Symmetric; 0 when either is empty.
pub fn jaccard(first: &[String], second: &[String]) -> f64 {
    let a: HashSet<&str> = first.iter().map(String::as_str).collect();
    let b: HashSet<&str> = second.iter().map(String::as_str).collect();

    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(&b).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identical_sets_score_one() {
        let a = steps(&["open", "click", "verify"]);
        assert_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn test_disjoint_sets_score_zero() {
        assert_eq!(jaccard(&steps(&["a", "b"]), &steps(&["c", "d"])), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let a = steps(&["open", "click", "verify"]);
        let b = steps(&["open", "click", "check totals"]);
        assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
    }

    #[test]
    fn test_empty_sets_score_zero() {
        assert_eq!(jaccard(&[], &[]), 0.0);
        assert_eq!(jaccard(&steps(&["a"]), &[]), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        // 2 shared of 4 distinct
        let a = steps(&["open", "click", "verify"]);
        let b = steps(&["open", "click", "submit"]);
        assert_eq!(jaccard(&a, &b), 0.5);
    }
}
