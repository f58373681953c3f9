//! Deterministic mapping from findings to remediation actions, plus
//! construction of the optimized corpus subset.

use super::{CheckFindings, OptimizationLevel};
use crate::config::OptimizerConfig;
use crate::conformance::Severity;
use crate::testcase::TestCase;
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

/// What a recommendation addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Duplicates,
    Outdated,
    Conflicts,
    Coverage,
    CoverageGaps,
    General,
}

/// One prioritized remediation action
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: Severity,
    pub action: String,
    pub impact: String,
    pub estimated_effort: String,
}

impl Recommendation {
    fn new(
        kind: RecommendationKind,
        priority: Severity,
        action: String,
        impact: String,
        estimated_effort: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            priority,
            action,
            impact,
            estimated_effort: estimated_effort.to_string(),
        }
    }
}

/// Map finding counts and severity mix onto remediation actions
pub fn build(
    findings: &CheckFindings,
    level: OptimizationLevel,
    config: &OptimizerConfig,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if let Some(duplicates) = &findings.duplicates {
        let count = duplicates.len();
        if count > 0 {
            let priority = if count > 5 {
                Severity::High
            } else {
                Severity::Medium
            };
            recommendations.push(Recommendation::new(
                RecommendationKind::Duplicates,
                priority,
                format!("Remove or merge {} duplicated test cases", count),
                format!("Shrinks the suite by {} cases", count),
                "1-2 hours",
            ));
        }
    }

    if let Some(outdated) = &findings.outdated {
        let count = outdated.len();
        if count > 0 {
            recommendations.push(Recommendation::new(
                RecommendationKind::Outdated,
                Severity::Medium,
                format!("Update or retire {} outdated test cases", count),
                "Improves the relevance of the suite".to_string(),
                "2-3 hours",
            ));
        }
    }

    if let Some(conflicts) = &findings.conflicts {
        let count = conflicts.len();
        if count > 0 {
            recommendations.push(Recommendation::new(
                RecommendationKind::Conflicts,
                Severity::Critical,
                format!("Resolve {} conflicting test cases", count),
                "Removes contradictory expectations".to_string(),
                "1-2 hours",
            ));
        }
    }

    if let Some(coverage) = &findings.coverage {
        if !coverage.not_covered.is_empty() {
            let security_related = coverage.not_covered.iter().any(|area| {
                let lower = area.to_lowercase();
                config
                    .security_keywords
                    .iter()
                    .any(|keyword| lower.contains(keyword.as_str()))
            });
            let priority = if security_related {
                Severity::Critical
            } else {
                Severity::High
            };
            recommendations.push(Recommendation::new(
                RecommendationKind::Coverage,
                priority,
                format!(
                    "Add tests for {} uncovered requirements",
                    coverage.not_covered.len()
                ),
                format!("Raises coverage from {}%", coverage.coverage_percentage),
                "3-5 hours",
            ));
        }
    }

    if let Some(gaps) = &findings.coverage_gaps {
        let critical = gaps
            .iter()
            .filter(|g| g.priority == Severity::Critical)
            .count();
        if critical > 0 {
            recommendations.push(Recommendation::new(
                RecommendationKind::CoverageGaps,
                Severity::Critical,
                format!("Close {} critical coverage gaps", critical),
                "Strengthens testing of critical functionality".to_string(),
                "4-6 hours",
            ));
        }
    }

    if level == OptimizationLevel::Aggressive {
        recommendations.push(Recommendation::new(
            RecommendationKind::General,
            Severity::Low,
            "Refactor the test code: extract shared fixtures and helpers".to_string(),
            "Improves maintainability and readability".to_string(),
            "4-6 hours",
        ));
    }

    recommendations
}

/// Build the pruned corpus.
///
/// The second member of every duplicate pair is dropped, keeping the first
/// occurrence. At the aggressive level outdated cases are dropped too and
/// long step lists are truncated with an annotation.
pub fn optimize(
    corpus: &[TestCase],
    findings: &CheckFindings,
    level: OptimizationLevel,
    config: &OptimizerConfig,
) -> Vec<TestCase> {
    let duplicate_ids: HashSet<&str> = findings
        .duplicates
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|pair| pair.test2_id.as_str())
        .collect();

    let outdated_ids: HashSet<&str> = if level == OptimizationLevel::Aggressive {
        findings
            .outdated
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|record| record.test_id.as_str())
            .collect()
    } else {
        HashSet::new()
    };

    let mut optimized = Vec::new();
    for case in corpus {
        if duplicate_ids.contains(case.id.as_str()) {
            continue;
        }
        if outdated_ids.contains(case.id.as_str()) {
            continue;
        }

        let mut case = case.clone();
        if level == OptimizationLevel::Aggressive && case.steps.len() > config.max_optimized_steps
        {
            case.steps.truncate(config.max_optimized_steps);
            case.optimization_note = Some("Simplified: kept the leading steps".to_string());
        }
        optimized.push(case);
    }

    optimized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::testing::case;
    use crate::optimize::{ConflictRecord, DuplicateKind, DuplicatePair, OutdatedRecord};
    use crate::oracle::{CoverageAssessment, CoverageGap};

    fn pair(first: &str, second: &str) -> DuplicatePair {
        DuplicatePair {
            test1_id: first.into(),
            test2_id: second.into(),
            similarity: 0.95,
            kind: DuplicateKind::Exact,
            reason: "dup".into(),
        }
    }

    fn outdated_record(id: &str) -> OutdatedRecord {
        OutdatedRecord {
            test_id: id.into(),
            title: None,
            days_old: Some(200),
            reason: "stale".into(),
        }
    }

    #[test]
    fn test_duplicate_priority_scales_with_count() {
        let config = OptimizerConfig::default();

        let few = CheckFindings {
            duplicates: Some(vec![pair("a", "b")]),
            ..Default::default()
        };
        let recs = build(&few, OptimizationLevel::Moderate, &config);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Severity::Medium);

        let many = CheckFindings {
            duplicates: Some((0..6).map(|i| pair("a", &format!("b{i}"))).collect()),
            ..Default::default()
        };
        let recs = build(&many, OptimizationLevel::Moderate, &config);
        assert_eq!(recs[0].priority, Severity::High);
    }

    #[test]
    fn test_conflicts_always_critical() {
        let findings = CheckFindings {
            conflicts: Some(vec![ConflictRecord::DuplicateId {
                test_id: "tc_1".into(),
                affected_tests: vec!["A".into(), "B".into()],
                reason: "dup id".into(),
            }]),
            ..Default::default()
        };
        let recs = build(&findings, OptimizationLevel::Moderate, &OptimizerConfig::default());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::Conflicts);
        assert_eq!(recs[0].priority, Severity::Critical);
    }

    #[test]
    fn test_uncovered_security_requirement_is_critical() {
        let config = OptimizerConfig::default();
        let mut findings = CheckFindings {
            coverage: Some(CoverageAssessment {
                coverage_percentage: 60.0,
                not_covered: vec!["Security audit logging".into()],
                ..Default::default()
            }),
            ..Default::default()
        };
        let recs = build(&findings, OptimizationLevel::Moderate, &config);
        assert_eq!(recs[0].priority, Severity::Critical);

        findings.coverage.as_mut().unwrap().not_covered = vec!["PDF export".into()];
        let recs = build(&findings, OptimizationLevel::Moderate, &config);
        assert_eq!(recs[0].priority, Severity::High);
    }

    #[test]
    fn test_critical_gap_triggers_critical_recommendation() {
        let findings = CheckFindings {
            coverage_gaps: Some(vec![
                CoverageGap {
                    area: "Negative scenarios".into(),
                    priority: Severity::Critical,
                    description: String::new(),
                    suggested_tests: None,
                },
                CoverageGap {
                    area: "Cosmetics".into(),
                    priority: Severity::Low,
                    description: String::new(),
                    suggested_tests: None,
                },
            ]),
            ..Default::default()
        };
        let recs = build(&findings, OptimizationLevel::Moderate, &OptimizerConfig::default());
        assert_eq!(recs.len(), 1);
        assert!(recs[0].action.contains("1 critical coverage gaps"));
    }

    #[test]
    fn test_aggressive_adds_generic_refactor_entry() {
        let findings = CheckFindings::default();
        let recs = build(&findings, OptimizationLevel::Aggressive, &OptimizerConfig::default());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::General);
        assert_eq!(recs[0].priority, Severity::Low);

        let recs = build(&findings, OptimizationLevel::Moderate, &OptimizerConfig::default());
        assert!(recs.is_empty());
    }

    #[test]
    fn test_optimize_drops_second_pair_member() {
        let corpus = vec![
            case("a", "One", "F", &["s"]),
            case("b", "Two", "F", &["s"]),
        ];
        let findings = CheckFindings {
            duplicates: Some(vec![pair("a", "b")]),
            ..Default::default()
        };
        let optimized = optimize(
            &corpus,
            &findings,
            OptimizationLevel::Moderate,
            &OptimizerConfig::default(),
        );
        assert_eq!(optimized.len(), 1);
        assert_eq!(optimized[0].id, "a");
    }

    #[test]
    fn test_moderate_keeps_outdated_cases() {
        let corpus = vec![case("a", "One", "F", &["s"])];
        let findings = CheckFindings {
            outdated: Some(vec![outdated_record("a")]),
            ..Default::default()
        };
        let optimized = optimize(
            &corpus,
            &findings,
            OptimizationLevel::Moderate,
            &OptimizerConfig::default(),
        );
        assert_eq!(optimized.len(), 1);
    }

    #[test]
    fn test_aggressive_drops_outdated_and_truncates_steps() {
        let corpus = vec![
            case("a", "One", "F", &["s1", "s2", "s3", "s4", "s5", "s6", "s7"]),
            case("b", "Two", "F", &["s"]),
        ];
        let findings = CheckFindings {
            outdated: Some(vec![outdated_record("b")]),
            ..Default::default()
        };
        let optimized = optimize(
            &corpus,
            &findings,
            OptimizationLevel::Aggressive,
            &OptimizerConfig::default(),
        );
        assert_eq!(optimized.len(), 1);
        assert_eq!(optimized[0].steps.len(), 5);
        assert!(optimized[0].optimization_note.is_some());
    }

    #[test]
    fn test_optimize_does_not_mutate_input() {
        let corpus = vec![case("a", "One", "F", &["s1", "s2", "s3", "s4", "s5", "s6"])];
        let findings = CheckFindings::default();
        let _ = optimize(
            &corpus,
            &findings,
            OptimizationLevel::Aggressive,
            &OptimizerConfig::default(),
        );
        assert_eq!(corpus[0].steps.len(), 6);
        assert!(corpus[0].optimization_note.is_none());
    }
}
