//! Conflict detection: duplicated ids and contradictory expectations.

use super::similarity::jaccard;
use super::ConflictRecord;
use crate::config::OptimizerConfig;
use crate::testcase::TestCase;
use std::collections::HashMap;

/// Find contradictions within the corpus.
///
/// Two independent checks: ids used by more than one case, and pairs within
/// a feature whose steps mostly overlap while their expected results differ.
pub fn find(corpus: &[TestCase], config: &OptimizerConfig) -> Vec<ConflictRecord> {
    let mut conflicts = Vec::new();

    // Duplicated ids, in first-seen order
    let mut id_order: Vec<&str> = Vec::new();
    let mut titles_by_id: HashMap<&str, Vec<&str>> = HashMap::new();
    for case in corpus {
        let entry = titles_by_id.entry(case.id.as_str()).or_default();
        if entry.is_empty() {
            id_order.push(case.id.as_str());
        }
        entry.push(case.title.as_str());
    }
    for id in id_order {
        let titles = &titles_by_id[id];
        if titles.len() > 1 {
            conflicts.push(ConflictRecord::DuplicateId {
                test_id: id.to_string(),
                affected_tests: titles.iter().map(|t| t.to_string()).collect(),
                reason: format!("Id {} is used by {} tests", id, titles.len()),
            });
        }
    }

    // Contradictory expectations within a feature
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
        for i in 0..group.len() {
            for j in (i + 1)..group.len() {
                let (first, second) = (group[i], group[j]);
                let similarity = jaccard(&first.steps, &second.steps);
                if similarity <= config.conflict_similarity_threshold {
                    continue;
                }

                let (r1, r2) = (&first.expected_result, &second.expected_result);
                if !r1.is_empty() && !r2.is_empty() && r1 != r2 {
                    conflicts.push(ConflictRecord::ConflictingExpectations {
                        test1_id: first.id.clone(),
                        test2_id: second.id.clone(),
                        similarity,
                        reason: format!(
                            "Similar steps ({:.0}% overlap) but different expected results",
                            similarity * 100.0
                        ),
                    });
                }
            }
        }
    }

    conflicts
}
