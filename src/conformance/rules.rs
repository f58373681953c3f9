//! Structural, metadata, naming and documentation rule checks.
//!
//! Each check is total and isolated: a check that cannot evaluate
//! contributes no issue instead of aborting the report. Metadata checks are
//! regex-based on the raw text so they keep working after a parse failure.

use crate::config::CheckerConfig;
use crate::conformance::parser::{ParseFailure, ParsedArtifact};
use crate::conformance::{Advice, AdviceKind, Issue, IssueKind, Severity};
use regex::Regex;

/// Outcome of one rule category
#[derive(Debug, Clone, Default)]
pub struct CategoryResult {
    /// Whether the category deducts its score weight
    pub failed: bool,
    pub issues: Vec<Issue>,
    pub advice: Vec<Advice>,
}

/// The five structural rule checks plus their compiled patterns
pub struct RuleSet {
    config: CheckerConfig,
    class_name_re: Regex,
    camel_case_re: Regex,
    method_name_re: Regex,
    tag_value_re: Regex,
    priority_label_re: Regex,
}

// A pattern that fails to compile degrades to never-matching rather than
// taking the whole rule set down.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|_| Regex::new("$^").unwrap())
}

impl RuleSet {
    pub fn new(config: CheckerConfig) -> Self {
        Self {
            config,
            class_name_re: compile(r"class\s+(\w+)"),
            camel_case_re: compile(r"^[A-Z][a-zA-Z0-9]*$"),
            method_name_re: compile(r"^test_[a-z0-9_]+$"),
            tag_value_re: compile(r#"@allure\.tag\(["'](\w+)["']\)"#),
            priority_label_re: compile(r#"@allure\.label\(["']priority["']\s*,\s*["'](\w+)["']\)"#),
        }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Required imports, container/method presence, step-block presence.
    ///
    /// On parse failure only the critical syntax issue is reported; the
    /// remaining structural checks need the tree.
    pub fn check_structure(
        &self,
        parsed: Result<&ParsedArtifact, &ParseFailure>,
    ) -> CategoryResult {
        let mut result = CategoryResult::default();

        let artifact = match parsed {
            Ok(a) => a,
            Err(failure) => {
                result.failed = true;
                result.issues.push(Issue {
                    kind: IssueKind::SyntaxError,
                    severity: Severity::Critical,
                    message: format!("Syntax error: {}", failure.message),
                    line: Some(failure.line),
                    method: None,
                });
                return result;
            }
        };

        let missing: Vec<&str> = self
            .config
            .required_imports
            .iter()
            .map(String::as_str)
            .filter(|required| !artifact.imports.iter().any(|i| i == required))
            .collect();
        if !missing.is_empty() {
            result.issues.push(Issue {
                kind: IssueKind::MissingImport,
                severity: Severity::High,
                message: format!("Missing required imports: {}", missing.join(", ")),
                line: None,
                method: None,
            });
        }

        if !artifact.has_test_class() {
            result.failed = true;
            result.issues.push(Issue {
                kind: IssueKind::NoTestClass,
                severity: Severity::Critical,
                message: "No test container class found".to_string(),
                line: None,
                method: None,
            });
        }

        if !artifact.has_test_methods() {
            result.failed = true;
            result.issues.push(Issue {
                kind: IssueKind::NoTestMethods,
                severity: Severity::Critical,
                message: "No test methods found (names must start with 'test_')".to_string(),
                line: None,
                method: None,
            });
        }

        for method in artifact.test_methods() {
            if method.steps.is_empty() {
                result.issues.push(Issue {
                    kind: IssueKind::NoSteps,
                    severity: Severity::Medium,
                    message: format!(
                        "Method {} contains no scoped step blocks",
                        method.name
                    ),
                    line: Some(method.line),
                    method: Some(method.name.clone()),
                });
            }
        }

        result
    }

    /// Tags that are required but textually absent from the source
    pub fn missing_required_tags(&self, source: &str) -> Vec<String> {
        self.config
            .required_tags
            .iter()
            .filter(|tag| !source.contains(tag.as_str()))
            .cloned()
            .collect()
    }

    /// Declarative metadata tags: required set, priority value validity.
    ///
    /// Text-based, so it still runs when the artifact does not parse.
    pub fn check_metadata(&self, source: &str) -> CategoryResult {
        let mut result = CategoryResult::default();

        for tag in self.missing_required_tags(source) {
            result.failed = true;
            result.issues.push(Issue {
                kind: IssueKind::MissingDecorator,
                severity: Severity::Critical,
                message: format!("Missing required decorator: {}", tag),
                line: None,
                method: None,
            });
        }

        if !source.contains("@allure.feature") {
            result.issues.push(Issue {
                kind: IssueKind::MissingFeature,
                severity: Severity::High,
                message: "Missing @allure.feature - name the feature under test".to_string(),
                line: None,
                method: None,
            });
        }
        if !source.contains("@allure.story") {
            result.issues.push(Issue {
                kind: IssueKind::MissingStory,
                severity: Severity::High,
                message: "Missing @allure.story - name the user story".to_string(),
                line: None,
                method: None,
            });
        }
        if !source.contains("@allure.title") {
            result.issues.push(Issue {
                kind: IssueKind::MissingTitle,
                severity: Severity::Critical,
                message: "Missing @allure.title - every test needs a display title".to_string(),
                line: None,
                method: None,
            });
        }

        for capture in self.tag_value_re.captures_iter(source) {
            let value = &capture[1];
            if !self.is_valid_priority(value) {
                result.issues.push(Issue {
                    kind: IssueKind::InvalidTagValue,
                    severity: Severity::Medium,
                    message: format!(
                        "Invalid priority value in @allure.tag: '{}'. Accepted: {}",
                        value,
                        self.config.valid_priorities.join(", ")
                    ),
                    line: None,
                    method: None,
                });
            }
        }

        for capture in self.priority_label_re.captures_iter(source) {
            let value = &capture[1];
            if !self.is_valid_priority(value) {
                result.issues.push(Issue {
                    kind: IssueKind::InvalidPriorityValue,
                    severity: Severity::Medium,
                    message: format!(
                        "Invalid priority value: '{}'. Accepted: {}",
                        value,
                        self.config.valid_priorities.join(", ")
                    ),
                    line: None,
                    method: None,
                });
            }
        }

        let has_priority =
            source.contains("@allure.tag") || self.priority_label_re.is_match(source);
        if !has_priority {
            result.issues.push(Issue {
                kind: IssueKind::NoPriority,
                severity: Severity::Medium,
                message:
                    "Test priority is not specified (@allure.tag or @allure.label('priority'))"
                        .to_string(),
                line: None,
                method: None,
            });
        }

        let has_recommended = self
            .config
            .recommended_tags
            .iter()
            .any(|tag| source.contains(tag.as_str()));
        if !has_recommended && !self.config.recommended_tags.is_empty() {
            result.advice.push(Advice {
                kind: AdviceKind::Decorators,
                priority: None,
                message: format!(
                    "None of the recommended decorators are present: {}",
                    self.config.recommended_tags.join(", ")
                ),
                suggestion: Some(
                    "Decorators such as @allure.suite or @allure.owner improve reporting"
                        .to_string(),
                ),
            });
        }

        result
    }

    fn is_valid_priority(&self, value: &str) -> bool {
        let upper = value.to_uppercase();
        self.config.valid_priorities.iter().any(|p| *p == upper)
    }

    /// Container and method naming conventions. Produces recommendations,
    /// not issues; suffix and case violations fail the category.
    pub fn check_naming(&self, source: &str, artifact: &ParsedArtifact) -> CategoryResult {
        let mut result = CategoryResult::default();

        for capture in self.class_name_re.captures_iter(source) {
            let class_name = &capture[1];

            let has_suffix = self
                .config
                .class_name_suffixes
                .iter()
                .any(|suffix| class_name.ends_with(suffix.as_str()));
            if !has_suffix {
                result.failed = true;
                result.advice.push(Advice {
                    kind: AdviceKind::ClassNaming,
                    priority: None,
                    message: format!(
                        "Class '{}' should end with 'Tests' or 'Test'",
                        class_name
                    ),
                    suggestion: Some(format!("Rename it to '{}Tests'", class_name)),
                });
            }

            if !self.camel_case_re.is_match(class_name) {
                result.failed = true;
                result.advice.push(Advice {
                    kind: AdviceKind::ClassNaming,
                    priority: None,
                    message: format!("Class '{}' should be CamelCase", class_name),
                    suggestion: None,
                });
            }
        }

        for method in artifact.test_methods() {
            if !self.method_name_re.is_match(&method.name) {
                result.failed = true;
                result.advice.push(Advice {
                    kind: AdviceKind::MethodNaming,
                    priority: None,
                    message: format!("Method '{}' should be snake_case", method.name),
                    suggestion: None,
                });
            }

            if method.name.split('_').count() < self.config.min_method_name_words {
                result.advice.push(Advice {
                    kind: AdviceKind::MethodNaming,
                    priority: None,
                    message: format!(
                        "Method name '{}' is too short. Use descriptive names",
                        method.name
                    ),
                    suggestion: Some(
                        "For example: test_user_can_login_with_valid_credentials".to_string(),
                    ),
                });
            }
        }

        result
    }

    /// Docstring presence on containers and test methods. A container
    /// without a docstring fails the category; methods only get advice.
    pub fn check_documentation(&self, artifact: &ParsedArtifact) -> CategoryResult {
        let mut result = CategoryResult::default();

        for class in &artifact.classes {
            if class.docstring.is_none() {
                result.failed = true;
                result.advice.push(Advice {
                    kind: AdviceKind::MissingDocstring,
                    priority: None,
                    message: format!("Class '{}' has no docstring", class.name),
                    suggestion: Some(
                        "Describe the purpose of the test container".to_string(),
                    ),
                });
            }
        }

        for method in artifact.test_methods() {
            if method.docstring.is_none() {
                result.advice.push(Advice {
                    kind: AdviceKind::MissingDocstring,
                    priority: None,
                    message: format!("Method '{}' has no docstring", method.name),
                    suggestion: Some("Add a short description of the test".to_string()),
                });
            }
        }

        result
    }
}
