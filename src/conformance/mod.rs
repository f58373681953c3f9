//! Conformance checking engine for single test artifacts
//!
//! Parses an artifact, runs the structural rule set, the metadata checks
//! and the phase heuristic, then folds everything into a scored report.
//! Checking is synchronous, stateless and side-effect-free, so batches run
//! fully in parallel.

pub mod parser;
pub mod pattern;
pub mod rules;
pub mod score;

use crate::config::CheckerConfig;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use rules::{CategoryResult, RuleSet};
use score::Grade;
use serde::{Deserialize, Serialize};
use tracing::debug;

const STANDARDS_VERSION: &str = "1.0";

/// Severity of a reported issue or finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

/// Identifies which rule produced an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    SyntaxError,
    MissingImport,
    NoTestClass,
    NoTestMethods,
    NoSteps,
    MissingDecorator,
    MissingFeature,
    MissingStory,
    MissingTitle,
    InvalidTagValue,
    InvalidPriorityValue,
    NoPriority,
    InsufficientSteps,
    AaaNotDetected,
}

/// One rule violation
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// Category of a non-fatal recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceKind {
    ClassNaming,
    MethodNaming,
    MissingDocstring,
    Decorators,
    General,
}

/// A non-fatal improvement recommendation
#[derive(Debug, Clone, Serialize)]
pub struct Advice {
    #[serde(rename = "type")]
    pub kind: AdviceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Severity>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Whether a category passed, failed, or could not run
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub passed: bool,
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CheckOutcome {
    fn from_result(result: &CategoryResult) -> Self {
        Self {
            passed: !result.failed,
            skipped: false,
            reason: None,
        }
    }

    fn skipped(reason: &str) -> Self {
        Self {
            passed: true,
            skipped: true,
            reason: Some(reason.to_string()),
        }
    }
}

/// Per-category outcomes in evaluation order
#[derive(Debug, Clone, Serialize)]
pub struct CategoryOutcomes {
    pub structure: CheckOutcome,
    pub aaa_pattern: CheckOutcome,
    pub metadata: CheckOutcome,
    pub naming: CheckOutcome,
    pub documentation: CheckOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub checked_at: DateTime<Utc>,
    pub standards_version: &'static str,
}

/// The scored, issue-annotated evaluation of one artifact
#[derive(Debug, Clone, Serialize)]
pub struct ConformanceReport {
    pub valid: bool,
    pub score: f64,
    pub grade: String,
    pub checks: CategoryOutcomes,
    pub issues: Vec<Issue>,
    pub recommendations: Vec<Advice>,
    /// Per-method phase-detection details (best-effort heuristic)
    pub phase_detection: Vec<pattern::MethodPattern>,
    pub metadata: ReportMetadata,
}

impl ConformanceReport {
    pub fn critical_issues(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Critical)
            .count()
    }
}

/// Compact verdict for quick validation endpoints
#[derive(Debug, Clone, Serialize)]
pub struct QuickVerdict {
    pub valid: bool,
    pub score: f64,
    pub critical_issues: usize,
    pub total_issues: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub valid: bool,
    pub score: f64,
    pub grade: String,
    pub total_issues: usize,
    pub critical_issues: usize,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IssuesBySeverity {
    pub critical: Vec<Issue>,
    pub high: Vec<Issue>,
    pub medium: Vec<Issue>,
    pub low: Vec<Issue>,
}

/// Full report with issues grouped by severity
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub summary: ReportSummary,
    pub checks: CategoryOutcomes,
    pub issues: Vec<Issue>,
    pub issues_by_severity: IssuesBySeverity,
    pub recommendations: Vec<Advice>,
}

/// The conformance checker for test artifacts
pub struct ConformanceChecker {
    rules: RuleSet,
}

impl Default for ConformanceChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl ConformanceChecker {
    pub fn new() -> Self {
        Self::with_config(CheckerConfig::default())
    }

    pub fn with_config(config: CheckerConfig) -> Self {
        Self {
            rules: RuleSet::new(config),
        }
    }

    /// Evaluate one artifact and produce its conformance report.
    ///
    /// Never fails: a parse failure is absorbed as a critical issue and the
    /// tree-dependent categories are reported as skipped.
    pub fn check(&self, source: &str) -> ConformanceReport {
        debug!(bytes = source.len(), "checking artifact conformance");
        let config = self.rules.config();
        let parsed = parser::parse(source);

        let structure = match &parsed {
            Ok(artifact) => self.rules.check_structure(Ok(artifact)),
            Err(failure) => self.rules.check_structure(Err(failure)),
        };
        let structure_outcome = CheckOutcome::from_result(&structure);

        let metadata = self.rules.check_metadata(source);
        let metadata_outcome = CheckOutcome::from_result(&metadata);

        let skip_reason = "Skipped because of syntax errors";
        let (phase_detection, pattern_result, pattern_outcome) = match &parsed {
            Ok(artifact) => {
                let (details, result) = pattern::check(config, artifact);
                let outcome = CheckOutcome::from_result(&result);
                (details, result, outcome)
            }
            Err(_) => (
                Vec::new(),
                CategoryResult::default(),
                CheckOutcome::skipped(skip_reason),
            ),
        };

        let (naming_result, naming_outcome) = match &parsed {
            Ok(artifact) => {
                let result = self.rules.check_naming(source, artifact);
                let outcome = CheckOutcome::from_result(&result);
                (result, outcome)
            }
            Err(_) => (
                CategoryResult::default(),
                CheckOutcome::skipped(skip_reason),
            ),
        };

        let (docs_result, docs_outcome) = match &parsed {
            Ok(artifact) => {
                let result = self.rules.check_documentation(artifact);
                let outcome = CheckOutcome::from_result(&result);
                (result, outcome)
            }
            Err(_) => (
                CategoryResult::default(),
                CheckOutcome::skipped(skip_reason),
            ),
        };

        // Fixed deduction per failed category, independent of issue count
        let deductions = &config.deductions;
        let mut score = 100.0;
        if structure.failed {
            score -= deductions.structure;
        }
        if pattern_result.failed {
            score -= deductions.pattern;
        }
        if metadata.failed {
            score -= deductions.metadata;
        }
        if naming_result.failed {
            score -= deductions.naming;
        }
        if docs_result.failed {
            score -= deductions.documentation;
        }
        score = score.max(0.0);

        let mut issues = Vec::new();
        issues.extend(structure.issues);
        issues.extend(pattern_result.issues);
        issues.extend(metadata.issues);

        let mut recommendations = Vec::new();
        recommendations.extend(pattern_result.advice);
        recommendations.extend(metadata.advice);
        recommendations.extend(naming_result.advice);
        recommendations.extend(docs_result.advice);
        recommendations.extend(self.general_recommendations(score, source));

        let valid = !issues.iter().any(|i| i.severity == Severity::Critical);
        debug!(score, valid, issues = issues.len(), "conformance check finished");

        ConformanceReport {
            valid,
            score,
            grade: Grade::from_score(score).label().to_string(),
            checks: CategoryOutcomes {
                structure: structure_outcome,
                aaa_pattern: pattern_outcome,
                metadata: metadata_outcome,
                naming: naming_outcome,
                documentation: docs_outcome,
            },
            issues,
            recommendations,
            phase_detection,
            metadata: ReportMetadata {
                checked_at: Utc::now(),
                standards_version: STANDARDS_VERSION,
            },
        }
    }

    /// Check a batch of artifacts in parallel
    pub fn check_all(&self, sources: &[&str]) -> Vec<ConformanceReport> {
        sources.par_iter().map(|s| self.check(s)).collect()
    }

    /// Fast validation verdict without the full report payload
    pub fn quick_validate(&self, source: &str) -> QuickVerdict {
        let report = self.check(source);
        QuickVerdict {
            valid: report.valid,
            score: report.score,
            critical_issues: report.critical_issues(),
            total_issues: report.issues.len(),
        }
    }

    /// Full report with issues grouped by severity
    pub fn summary_report(&self, source: &str, include_suggestions: bool) -> SummaryReport {
        let report = self.check(source);

        let mut by_severity = IssuesBySeverity::default();
        for issue in &report.issues {
            match issue.severity {
                Severity::Critical => by_severity.critical.push(issue.clone()),
                Severity::High => by_severity.high.push(issue.clone()),
                Severity::Medium => by_severity.medium.push(issue.clone()),
                Severity::Low => by_severity.low.push(issue.clone()),
            }
        }

        SummaryReport {
            summary: ReportSummary {
                valid: report.valid,
                score: report.score,
                grade: report.grade.clone(),
                total_issues: report.issues.len(),
                critical_issues: report.critical_issues(),
                checked_at: report.metadata.checked_at,
            },
            checks: report.checks,
            issues: report.issues,
            issues_by_severity: by_severity,
            recommendations: if include_suggestions {
                report.recommendations
            } else {
                Vec::new()
            },
        }
    }

    fn general_recommendations(&self, score: f64, source: &str) -> Vec<Advice> {
        let mut advice = Vec::new();

        if score < 70.0 {
            advice.push(Advice {
                kind: AdviceKind::General,
                priority: Some(Severity::High),
                message: "The test case needs substantial rework".to_string(),
                suggestion: Some(
                    "Address the critical problems listed in the issues section".to_string(),
                ),
            });
        } else if score < 85.0 {
            advice.push(Advice {
                kind: AdviceKind::General,
                priority: Some(Severity::Medium),
                message: "The test case mostly meets the standards with room for improvement"
                    .to_string(),
                suggestion: Some(
                    "Resolve the remaining findings to raise the quality".to_string(),
                ),
            });
        }

        let missing = self.rules.missing_required_tags(source);
        if !missing.is_empty() {
            advice.push(Advice {
                kind: AdviceKind::Decorators,
                priority: Some(Severity::Critical),
                message: format!("Add the required decorators: {}", missing.join(", ")),
                suggestion: Some(
                    "Use the full decorator set so the management system can ingest the test"
                        .to_string(),
                ),
            });
        }

        advice
    }
}
