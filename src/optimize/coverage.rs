//! Requirement-coverage assessment via the oracle.

use super::summarize_corpus;
use crate::config::OptimizerConfig;
use crate::oracle::{CoverageAssessment, SemanticOracle};
use crate::testcase::TestCase;
use tracing::warn;

/// Assess how well the requirements are covered.
///
/// Degrades to an explanatory zero-coverage assessment when requirements
/// are absent or the oracle is unavailable, never to an error.
pub async fn assess(
    corpus: &[TestCase],
    requirements: Option<&str>,
    config: &OptimizerConfig,
    oracle: &dyn SemanticOracle,
) -> CoverageAssessment {
    let Some(req) = requirements.filter(|r| !r.trim().is_empty()) else {
        return CoverageAssessment {
            message: Some("Requirements were not provided for coverage analysis".to_string()),
            coverage_percentage: 0.0,
            ..Default::default()
        };
    };

    let summary = summarize_corpus(corpus, config);
    match oracle.assess_coverage(&summary, req).await {
        Ok(assessment) => assessment,
        Err(e) => {
            warn!(error = %e, "coverage assessment unavailable");
            CoverageAssessment {
                message: Some("Coverage analysis was unavailable".to_string()),
                coverage_percentage: 0.0,
                ..Default::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::testing::{case, StubOracle};

    #[tokio::test]
    async fn test_no_requirements_yields_zero_coverage_message() {
        let corpus = vec![case("tc_1", "Flow", "F", &["s"])];
        let oracle = StubOracle::default();
        let assessment = assess(&corpus, None, &OptimizerConfig::default(), &oracle).await;
        assert_eq!(assessment.coverage_percentage, 0.0);
        assert!(assessment.message.is_some());
        assert!(assessment.not_covered.is_empty());
    }

    #[tokio::test]
    async fn test_oracle_assessment_passed_through() {
        let corpus = vec![case("tc_1", "Flow", "F", &["s"])];
        let oracle = StubOracle {
            coverage: Some(CoverageAssessment {
                message: None,
                coverage_percentage: 72.5,
                covered_requirements: vec!["login".into()],
                partially_covered: vec!["checkout".into()],
                not_covered: vec!["security audit log".into()],
                critical_gaps: vec![],
                details: None,
            }),
            ..Default::default()
        };
        let assessment = assess(
            &corpus,
            Some("Users must log in."),
            &OptimizerConfig::default(),
            &oracle,
        )
        .await;
        assert_eq!(assessment.coverage_percentage, 72.5);
        assert_eq!(assessment.not_covered.len(), 1);
    }

    #[tokio::test]
    async fn test_oracle_failure_degrades_to_message() {
        let corpus = vec![case("tc_1", "Flow", "F", &["s"])];
        let oracle = StubOracle {
            fail: true,
            ..Default::default()
        };
        let assessment = assess(
            &corpus,
            Some("Users must log in."),
            &OptimizerConfig::default(),
            &oracle,
        )
        .await;
        assert_eq!(assessment.coverage_percentage, 0.0);
        assert!(assessment
            .message
            .as_deref()
            .unwrap_or_default()
            .contains("unavailable"));
    }
}
