//! Coverage-gap analysis via the oracle.

use super::summarize_corpus;
use crate::config::OptimizerConfig;
use crate::conformance::Severity;
use crate::oracle::{CoverageGap, SemanticOracle};
use crate::testcase::TestCase;
use tracing::warn;

/// Find uncovered areas. Without requirements the only possible finding is
/// that coverage cannot be determined; oracle findings are adopted verbatim.
pub async fn find(
    corpus: &[TestCase],
    requirements: Option<&str>,
    config: &OptimizerConfig,
    oracle: &dyn SemanticOracle,
) -> Vec<CoverageGap> {
    let Some(req) = requirements.filter(|r| !r.trim().is_empty()) else {
        return vec![CoverageGap {
            area: "Requirements not provided".to_string(),
            priority: Severity::Low,
            description: "Coverage gaps cannot be determined without requirements".to_string(),
            suggested_tests: None,
        }];
    };

    let summary = summarize_corpus(corpus, config);
    match oracle.find_gaps(&summary, req).await {
        Ok(gaps) => gaps,
        Err(e) => {
            warn!(error = %e, "coverage-gap analysis unavailable");
            vec![CoverageGap {
                area: "Overall coverage".to_string(),
                priority: Severity::Medium,
                description: "Detailed gap analysis was unavailable".to_string(),
                suggested_tests: None,
            }]
        }
    }
}
