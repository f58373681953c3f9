//! Semantic Oracle boundary
//!
//! The optimizer consults a language model for the judgments no
//! deterministic rule can make: semantic similarity, requirement drift and
//! coverage gaps. The seam is a typed async trait so corpus analysis is
//! testable with a scripted fake, and so a transport failure degrades to
//! empty findings instead of aborting an analysis.

pub mod client;
pub mod parse;
pub mod prompts;

use crate::conformance::Severity;
use crate::testcase::TestCase;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures at the oracle boundary
#[derive(Debug, Error)]
pub enum OracleError {
    /// Network or connection error
    #[error("oracle transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response from the completion endpoint
    #[error("oracle returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response was not the documented JSON shape
    #[error("malformed oracle response: {0}")]
    MalformedResponse(String),

    /// Request exceeded the configured timeout
    #[error("oracle request timed out")]
    Timeout,
}

impl OracleError {
    /// Whether retrying the same request could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            OracleError::Transport(_) | OracleError::Timeout => true,
            OracleError::Status { status, .. } => *status == 429 || *status >= 500,
            OracleError::MalformedResponse(_) => false,
        }
    }
}

/// Verdict on whether two test cases are semantic duplicates
#[derive(Debug, Clone, Deserialize)]
pub struct PairVerdict {
    pub are_duplicates: bool,
    #[serde(default)]
    pub similarity_score: f64,
    #[serde(default)]
    pub reason: String,
}

/// One test the oracle considers no longer mapped to any requirement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutdatedVerdict {
    pub test_id: String,
    #[serde(default)]
    pub reason: String,
}

/// An uncovered area reported by the coverage-gap analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageGap {
    pub area: String,
    pub priority: Severity,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_tests: Option<Vec<String>>,
}

/// Requirement-coverage assessment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageAssessment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub coverage_percentage: f64,
    #[serde(default)]
    pub covered_requirements: Vec<String>,
    #[serde(default)]
    pub partially_covered: Vec<String>,
    #[serde(default)]
    pub not_covered: Vec<String>,
    #[serde(default)]
    pub critical_gaps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// The language-model collaborator consulted by the optimizer.
///
/// Implementations must be safe to call concurrently; callers bound the
/// number of requests per analysis themselves.
#[async_trait]
pub trait SemanticOracle: Send + Sync {
    /// Judge whether two test cases cover the same scenario
    async fn compare_pair(
        &self,
        first: &TestCase,
        second: &TestCase,
    ) -> Result<PairVerdict, OracleError>;

    /// Which of the given tests no longer map to the requirements
    async fn flag_outdated(
        &self,
        cases: &[TestCase],
        requirements: &str,
    ) -> Result<Vec<OutdatedVerdict>, OracleError>;

    /// Scenarios the requirements call for that the corpus does not cover
    async fn find_gaps(
        &self,
        corpus_summary: &str,
        requirements: &str,
    ) -> Result<Vec<CoverageGap>, OracleError>;

    /// Overall requirement-coverage assessment
    async fn assess_coverage(
        &self,
        corpus_summary: &str,
        requirements: &str,
    ) -> Result<CoverageAssessment, OracleError>;
}
