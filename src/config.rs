//! Immutable configuration for the checkers and detectors.
//!
//! Every keyword list and threshold the engine consults lives here, injected
//! at construction time. Tests override individual fields instead of fighting
//! scattered magic literals.

/// Fixed per-category score deductions
#[derive(Debug, Clone, Copy)]
pub struct Deductions {
    pub structure: f64,
    pub pattern: f64,
    pub metadata: f64,
    pub naming: f64,
    pub documentation: f64,
}

impl Default for Deductions {
    fn default() -> Self {
        Self {
            structure: 30.0,
            pattern: 25.0,
            metadata: 25.0,
            naming: 10.0,
            documentation: 10.0,
        }
    }
}

/// Configuration for single-artifact conformance checking
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Modules every artifact must import
    pub required_imports: Vec<String>,
    /// Metadata tags every artifact must carry (textual presence)
    pub required_tags: Vec<String>,
    /// Optional tags that improve reporting; their absence is advice only
    pub recommended_tags: Vec<String>,
    /// Accepted priority values for tag/label forms
    pub valid_priorities: Vec<String>,
    /// Keyword stems marking the Arrange phase of a step label
    pub arrange_keywords: Vec<String>,
    /// Keyword stems marking the Act phase
    pub act_keywords: Vec<String>,
    /// Keyword stems marking the Assert phase
    pub assert_keywords: Vec<String>,
    /// Minimum scoped step blocks per test method
    pub min_steps_per_method: usize,
    /// Minimum underscore-delimited words in a test method name
    pub min_method_name_words: usize,
    /// Accepted test-container name suffixes
    pub class_name_suffixes: Vec<String>,
    pub deductions: Deductions,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            required_imports: vec!["allure".into(), "pytest".into()],
            required_tags: vec![
                "@allure.manual".into(),
                "@allure.feature".into(),
                "@allure.story".into(),
                "@allure.title".into(),
            ],
            recommended_tags: vec![
                "@allure.tag".into(),
                "@allure.label".into(),
                "@allure.link".into(),
                "@allure.suite".into(),
                "@allure.owner".into(),
            ],
            valid_priorities: vec![
                "CRITICAL".into(),
                "HIGH".into(),
                "NORMAL".into(),
                "LOW".into(),
            ],
            arrange_keywords: vec![
                "подгот".into(),
                "откр".into(),
                "arrange".into(),
                "prepare".into(),
                "open".into(),
                "setup".into(),
            ],
            act_keywords: vec![
                "выполн".into(),
                "нажа".into(),
                "ввод".into(),
                "act".into(),
                "execute".into(),
                "click".into(),
                "enter".into(),
            ],
            assert_keywords: vec![
                "провер".into(),
                "убед".into(),
                "assert".into(),
                "verify".into(),
                "confirm".into(),
            ],
            min_steps_per_method: 2,
            min_method_name_words: 3,
            class_name_suffixes: vec!["Tests".into(), "Test".into()],
            deductions: Deductions::default(),
        }
    }
}

/// Configuration for corpus-level analysis
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Oracle similarity above which a pair counts as a semantic duplicate
    pub duplicate_threshold: f64,
    /// Step-set Jaccard similarity above which expectations may conflict
    pub conflict_similarity_threshold: f64,
    /// A case older than this many days is flagged stale
    pub stale_after_days: i64,
    /// Oracle pair comparisons sampled per feature group
    pub max_pairs_per_feature: usize,
    /// Cases submitted to the oracle for the requirements-drift check
    pub max_oracle_outdated_cases: usize,
    /// Cases included in the corpus summary sent to the oracle
    pub max_summary_cases: usize,
    /// Steps quoted per case in the corpus summary
    pub summary_steps: usize,
    /// Expected-result characters quoted per case in the corpus summary
    pub summary_expected_chars: usize,
    /// Step-list length above which aggressive optimization truncates
    pub max_optimized_steps: usize,
    /// Terminology marking a case as referencing retired functionality
    pub deprecated_keywords: Vec<String>,
    /// Substrings marking an uncovered requirement as security-relevant
    pub security_keywords: Vec<String>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            duplicate_threshold: 0.85,
            conflict_similarity_threshold: 0.7,
            stale_after_days: 180,
            max_pairs_per_feature: 5,
            max_oracle_outdated_cases: 10,
            max_summary_cases: 20,
            summary_steps: 3,
            summary_expected_chars: 100,
            max_optimized_steps: 5,
            deprecated_keywords: vec![
                "старый".into(),
                "устаревший".into(),
                "deprecated".into(),
                "legacy".into(),
                "v1".into(),
                "v2".into(),
                "old".into(),
                "retired".into(),
                "obsolete".into(),
            ],
            security_keywords: vec!["security".into(), "безопасн".into()],
        }
    }
}
