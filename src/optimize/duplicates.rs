//! Duplicate detection: exact fingerprint pass plus a sampled semantic pass.
//!
//! The semantic pass is best-effort sampling, not exhaustive detection:
//! cases are grouped by feature and at most a fixed number of pairs per
//! group is submitted to the oracle.

use super::fingerprint::fingerprint;
use super::{DuplicateKind, DuplicatePair};
use crate::config::OptimizerConfig;
use crate::oracle::SemanticOracle;
use crate::testcase::TestCase;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Exact similarity assigned to fingerprint collisions
const EXACT_SIMILARITY: f64 = 0.95;

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Find duplicated test cases. Each unordered pair is reported at most once;
/// the first occurrence of a fingerprint is the canonical copy.
pub async fn find(
    corpus: &[TestCase],
    config: &OptimizerConfig,
    oracle: &dyn SemanticOracle,
) -> Vec<DuplicatePair> {
    let mut pairs = Vec::new();
    let mut reported: HashSet<(String, String)> = HashSet::new();

    // Exact pass
    let mut seen_hashes: HashMap<String, &str> = HashMap::new();
    for case in corpus {
        let fp = fingerprint(case);
        match seen_hashes.get(fp.as_str()) {
            Some(first) => {
                reported.insert(pair_key(first, &case.id));
                pairs.push(DuplicatePair {
                    test1_id: (*first).to_string(),
                    test2_id: case.id.clone(),
                    similarity: EXACT_SIMILARITY,
                    kind: DuplicateKind::Exact,
                    reason: "Identical title, feature and opening steps".to_string(),
                });
            }
            None => {
                seen_hashes.insert(fp, &case.id);
            }
        }
    }

    if corpus.len() < 2 {
        return pairs;
    }

    // Semantic pass, grouped by feature in first-seen order
    let mut feature_order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&TestCase>> = HashMap::new();
    for case in corpus {
        let entry = groups.entry(case.feature.as_str()).or_default();
        if entry.is_empty() {
            feature_order.push(case.feature.as_str());
        }
        entry.push(case);
    }

    for feature in feature_order {
        let group = &groups[feature];
        if group.len() < 2 {
            continue;
        }

        let mut candidates: Vec<(&TestCase, &TestCase)> = Vec::new();
        'outer: for i in 0..group.len() {
            for j in (i + 1)..group.len() {
                if candidates.len() >= config.max_pairs_per_feature {
                    break 'outer;
                }
                if reported.contains(&pair_key(&group[i].id, &group[j].id)) {
                    continue;
                }
                candidates.push((group[i], group[j]));
            }
        }

        debug!(
            feature,
            sampled = candidates.len(),
            "semantic duplicate sampling"
        );

        let verdicts = futures::future::join_all(
            candidates
                .iter()
                .map(|(a, b)| oracle.compare_pair(a, b)),
        )
        .await;

        for ((first, second), verdict) in candidates.iter().zip(verdicts) {
            match verdict {
                Ok(v) if v.are_duplicates && v.similarity_score > config.duplicate_threshold => {
                    let key = pair_key(&first.id, &second.id);
                    if reported.insert(key) {
                        pairs.push(DuplicatePair {
                            test1_id: first.id.clone(),
                            test2_id: second.id.clone(),
                            similarity: v.similarity_score,
                            kind: DuplicateKind::Semantic,
                            reason: v.reason,
                        });
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    // Fail open: this pair simply yields no finding
                    warn!(error = %e, "oracle pair comparison unavailable");
                }
            }
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::testing::{case, StubOracle};

    #[tokio::test]
    async fn test_exact_duplicates_keep_first_occurrence() {
        let corpus = vec![
            case("tc_1", "Open page", "Main", &["s1", "s2", "s3"]),
            case("tc_2", "Other", "Main", &["x1", "x2"]),
            case("tc_3", "Open page", "Main", &["s1", "s2", "s3"]),
        ];
        let oracle = StubOracle::default();
        let pairs = find(&corpus, &OptimizerConfig::default(), &oracle).await;

        let exact: Vec<_> = pairs
            .iter()
            .filter(|p| p.kind == DuplicateKind::Exact)
            .collect();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].test1_id, "tc_1");
        assert_eq!(exact[0].test2_id, "tc_3");
    }

    #[tokio::test]
    async fn test_field_differences_outside_fingerprint_still_collide() {
        let mut second = case("tc_2", "Open page", "Main", &["s1", "s2", "s3"]);
        second.expected_result = "entirely different".into();
        second.description = Some("extra".into());
        let corpus = vec![case("tc_1", "Open page", "Main", &["s1", "s2", "s3"]), second];

        let oracle = StubOracle::default();
        let pairs = find(&corpus, &OptimizerConfig::default(), &oracle).await;
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].kind, DuplicateKind::Exact);
    }

    #[tokio::test]
    async fn test_semantic_pair_accepted_above_threshold() {
        let corpus = vec![
            case("tc_1", "Open the page", "Main", &["go to url", "wait"]),
            case("tc_2", "Check page opens", "Main", &["navigate", "observe"]),
        ];
        let oracle = StubOracle {
            pair: Some((true, 0.9, "same scenario")),
            ..Default::default()
        };
        let pairs = find(&corpus, &OptimizerConfig::default(), &oracle).await;
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].kind, DuplicateKind::Semantic);
        assert_eq!(pairs[0].similarity, 0.9);
    }

    #[tokio::test]
    async fn test_semantic_pair_rejected_at_threshold() {
        let corpus = vec![
            case("tc_1", "Open the page", "Main", &["go to url"]),
            case("tc_2", "Check page opens", "Main", &["navigate"]),
        ];
        // Exactly 0.85 must not pass the strict threshold
        let oracle = StubOracle {
            pair: Some((true, 0.85, "close call")),
            ..Default::default()
        };
        let pairs = find(&corpus, &OptimizerConfig::default(), &oracle).await;
        assert!(pairs.is_empty());
    }

    #[tokio::test]
    async fn test_oracle_failure_yields_no_semantic_findings() {
        let corpus = vec![
            case("tc_1", "Open the page", "Main", &["go to url"]),
            case("tc_2", "Check page opens", "Main", &["navigate"]),
        ];
        let oracle = StubOracle {
            pair: Some((true, 0.99, "dup")),
            fail: true,
            ..Default::default()
        };
        let pairs = find(&corpus, &OptimizerConfig::default(), &oracle).await;
        assert!(pairs.is_empty());
    }

    #[tokio::test]
    async fn test_sampling_cap_limits_oracle_pairs() {
        // 5 cases in one feature = 10 possible pairs, capped at 5
        let corpus: Vec<_> = (0..5)
            .map(|i| {
                case(
                    &format!("tc_{i}"),
                    &format!("Case {i}"),
                    "Main",
                    &[&format!("step {i}")],
                )
            })
            .collect();
        let oracle = StubOracle {
            pair: Some((true, 0.95, "dup")),
            ..Default::default()
        };
        let pairs = find(&corpus, &OptimizerConfig::default(), &oracle).await;
        assert_eq!(pairs.len(), 5);
    }

    #[tokio::test]
    async fn test_pairs_reported_once_despite_symmetry() {
        let corpus = vec![
            case("tc_1", "Open page", "Main", &["s1", "s2", "s3"]),
            case("tc_3", "Open page", "Main", &["s1", "s2", "s3"]),
        ];
        // The oracle would also call this pair a duplicate; the exact pass
        // already reported it so nothing is added
        let oracle = StubOracle {
            pair: Some((true, 0.99, "dup")),
            ..Default::default()
        };
        let pairs = find(&corpus, &OptimizerConfig::default(), &oracle).await;
        assert_eq!(pairs.len(), 1);
    }
}
