//! Corpus-level analysis and optimization
//!
//! Consumes an immutable list of test cases plus optional requirements text,
//! runs the selected checks, and produces findings, a prioritized
//! remediation plan and (above the conservative level) a pruned corpus.
//! Oracle-backed checks fail open: a transport or schema failure degrades
//! that check's findings to empty instead of aborting the analysis.

pub mod conflicts;
pub mod coverage;
pub mod duplicates;
pub mod fingerprint;
pub mod gaps;
pub mod outdated;
pub mod recommend;
pub mod similarity;

use crate::config::OptimizerConfig;
use crate::oracle::{parse, CoverageAssessment, CoverageGap, SemanticOracle};
use crate::testcase::TestCase;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

pub use recommend::{Recommendation, RecommendationKind};

/// Which analyses to run over the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Duplicates,
    Coverage,
    Outdated,
    Conflicts,
    Gaps,
}

impl CheckKind {
    pub fn all() -> [CheckKind; 5] {
        [
            CheckKind::Duplicates,
            CheckKind::Coverage,
            CheckKind::Outdated,
            CheckKind::Conflicts,
            CheckKind::Gaps,
        ]
    }
}

/// Caller-selected aggressiveness of corpus pruning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    Conservative,
    Moderate,
    Aggressive,
}

/// How a duplicate pair was established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateKind {
    Exact,
    Semantic,
}

/// An unordered pair of duplicated test cases, stored once
#[derive(Debug, Clone, Serialize)]
pub struct DuplicatePair {
    pub test1_id: String,
    pub test2_id: String,
    pub similarity: f64,
    #[serde(rename = "type")]
    pub kind: DuplicateKind,
    pub reason: String,
}

/// A contradiction within the corpus
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConflictRecord {
    DuplicateId {
        test_id: String,
        affected_tests: Vec<String>,
        reason: String,
    },
    ConflictingExpectations {
        test1_id: String,
        test2_id: String,
        similarity: f64,
        reason: String,
    },
}

/// One staleness flag; a case may accumulate several
#[derive(Debug, Clone, Serialize)]
pub struct OutdatedRecord {
    pub test_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_old: Option<i64>,
    pub reason: String,
}

/// Findings of the checks that were requested
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckFindings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicates: Option<Vec<DuplicatePair>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outdated: Option<Vec<OutdatedRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Vec<ConflictRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_gaps: Option<Vec<CoverageGap>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub total_testcases: usize,
    pub issues_found: usize,
    /// Share of cases with at least one finding, in percent
    pub optimization_potential: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    pub analyzed_at: DateTime<Utc>,
    pub optimization_level: OptimizationLevel,
    pub checks_performed: Vec<CheckKind>,
    pub has_requirements: bool,
}

/// The full result of one corpus analysis
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub summary: AnalysisSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub checks: CheckFindings,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimized_testcases: Option<Vec<TestCase>>,
    pub metadata: AnalysisMetadata,
}

impl AnalysisReport {
    /// Structured zero-result for an empty corpus
    fn empty_corpus(checks: &[CheckKind], level: OptimizationLevel) -> Self {
        Self {
            summary: AnalysisSummary {
                total_testcases: 0,
                issues_found: 0,
                optimization_potential: 0.0,
            },
            error: Some("No test cases to analyze".to_string()),
            checks: CheckFindings::default(),
            recommendations: Vec::new(),
            optimized_testcases: None,
            metadata: AnalysisMetadata {
                analyzed_at: Utc::now(),
                optimization_level: level,
                checks_performed: checks.to_vec(),
                has_requirements: false,
            },
        }
    }
}

/// Bounded plain-text corpus summary submitted to the oracle
pub(crate) fn summarize_corpus(corpus: &[TestCase], config: &OptimizerConfig) -> String {
    let mut parts = Vec::new();

    for (i, tc) in corpus.iter().take(config.max_summary_cases).enumerate() {
        let mut entry = format!("{}. [{}] {}", i + 1, tc.id, tc.title);

        if !tc.feature.is_empty() {
            entry.push_str(&format!(" (Feature: {})", tc.feature));
        }

        if !tc.steps.is_empty() {
            let head: Vec<&str> = tc
                .steps
                .iter()
                .take(config.summary_steps)
                .map(String::as_str)
                .collect();
            entry.push_str(&format!("\n   Steps: {}", head.join(", ")));
            if tc.steps.len() > config.summary_steps {
                entry.push_str(&format!(
                    " ... (+{} steps)",
                    tc.steps.len() - config.summary_steps
                ));
            }
        }

        if !tc.expected_result.is_empty() {
            entry.push_str(&format!(
                "\n   Expected: {}",
                parse::truncate(&tc.expected_result, config.summary_expected_chars)
            ));
        }

        parts.push(entry);
    }

    if corpus.len() > config.max_summary_cases {
        parts.push(format!(
            "... and {} more test cases",
            corpus.len() - config.max_summary_cases
        ));
    }

    parts.join("\n\n")
}

/// Analyzer and optimizer for test-case corpora
pub struct TestOptimizer {
    oracle: Arc<dyn SemanticOracle>,
    config: OptimizerConfig,
}

impl TestOptimizer {
    pub fn new(oracle: Arc<dyn SemanticOracle>) -> Self {
        Self::with_config(oracle, OptimizerConfig::default())
    }

    pub fn with_config(oracle: Arc<dyn SemanticOracle>, config: OptimizerConfig) -> Self {
        Self { oracle, config }
    }

    /// Run the selected checks over the corpus and assemble the report.
    ///
    /// The corpus is never mutated; the optimized subset consists of clones.
    pub async fn analyze(
        &self,
        corpus: &[TestCase],
        requirements: Option<&str>,
        checks: &[CheckKind],
        level: OptimizationLevel,
    ) -> AnalysisReport {
        info!(total = corpus.len(), ?level, "starting corpus analysis");

        if corpus.is_empty() {
            return AnalysisReport::empty_corpus(checks, level);
        }

        let now = Utc::now();
        let oracle = self.oracle.as_ref();
        let mut findings = CheckFindings::default();
        let mut issues_found = 0;

        for check in checks {
            match check {
                CheckKind::Duplicates => {
                    let found = duplicates::find(corpus, &self.config, oracle).await;
                    issues_found += found.len();
                    findings.duplicates = Some(found);
                }
                CheckKind::Coverage => {
                    findings.coverage =
                        Some(coverage::assess(corpus, requirements, &self.config, oracle).await);
                }
                CheckKind::Outdated => {
                    let found =
                        outdated::find(corpus, requirements, now, &self.config, oracle).await;
                    issues_found += found.len();
                    findings.outdated = Some(found);
                }
                CheckKind::Conflicts => {
                    let found = conflicts::find(corpus, &self.config);
                    issues_found += found.len();
                    findings.conflicts = Some(found);
                }
                CheckKind::Gaps => {
                    findings.coverage_gaps =
                        Some(gaps::find(corpus, requirements, &self.config, oracle).await);
                }
            }
        }

        let optimization_potential =
            ((issues_found as f64 / corpus.len() as f64) * 10000.0).round() / 100.0;

        let recommendations = recommend::build(&findings, level, &self.config);

        let optimized_testcases = if level == OptimizationLevel::Conservative {
            None
        } else {
            Some(recommend::optimize(corpus, &findings, level, &self.config))
        };

        info!(
            issues_found,
            recommendations = recommendations.len(),
            "corpus analysis finished"
        );

        AnalysisReport {
            summary: AnalysisSummary {
                total_testcases: corpus.len(),
                issues_found,
                optimization_potential,
            },
            error: None,
            checks: findings,
            recommendations,
            optimized_testcases,
            metadata: AnalysisMetadata {
                analyzed_at: Utc::now(),
                optimization_level: level,
                checks_performed: checks.to_vec(),
                has_requirements: requirements.map(|r| !r.trim().is_empty()).unwrap_or(false),
            },
        }
    }
}
