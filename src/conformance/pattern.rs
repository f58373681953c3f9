//! Best-effort Arrange/Act/Assert phase detection.
//!
//! Step labels are matched against three keyword families. This is a
//! heuristic classifier, not a proof of AAA structure; the per-method
//! booleans are exposed so callers can combine them with other signals.

use crate::config::CheckerConfig;
use crate::conformance::parser::ParsedArtifact;
use crate::conformance::rules::CategoryResult;
use crate::conformance::{Advice, AdviceKind, Issue, IssueKind, Severity};
use serde::Serialize;

/// Which phases were recognized among a method's step labels
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PhaseDetection {
    pub arrange: bool,
    pub act: bool,
    #[serde(rename = "assert")]
    pub assert_: bool,
}

impl PhaseDetection {
    pub fn any(&self) -> bool {
        self.arrange || self.act || self.assert_
    }
}

/// Per-method detection outcome included in the report
#[derive(Debug, Clone, Serialize)]
pub struct MethodPattern {
    pub method: String,
    pub steps_count: usize,
    pub phases: PhaseDetection,
}

fn matches_any(step: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| step.contains(k.as_str()))
}

/// Evaluate every test method's step labels against the keyword families
pub fn check(config: &CheckerConfig, artifact: &ParsedArtifact) -> (Vec<MethodPattern>, CategoryResult) {
    let mut details = Vec::new();
    let mut result = CategoryResult::default();

    for method in artifact.test_methods() {
        let steps: Vec<String> = method.steps.iter().map(|s| s.to_lowercase()).collect();

        let phases = PhaseDetection {
            arrange: steps.iter().any(|s| matches_any(s, &config.arrange_keywords)),
            act: steps.iter().any(|s| matches_any(s, &config.act_keywords)),
            assert_: steps.iter().any(|s| matches_any(s, &config.assert_keywords)),
        };

        if steps.len() < config.min_steps_per_method {
            result.issues.push(Issue {
                kind: IssueKind::InsufficientSteps,
                severity: Severity::Medium,
                message: format!(
                    "Method {} contains fewer than {} steps",
                    method.name, config.min_steps_per_method
                ),
                line: Some(method.line),
                method: Some(method.name.clone()),
            });
        }

        if !phases.any() {
            result.issues.push(Issue {
                kind: IssueKind::AaaNotDetected,
                severity: Severity::Low,
                message: format!(
                    "Could not clearly identify the Arrange/Act/Assert phases in {}",
                    method.name
                ),
                line: Some(method.line),
                method: Some(method.name.clone()),
            });
            result.advice.push(Advice {
                kind: AdviceKind::General,
                priority: None,
                message: format!("Review the step labels of {}", method.name),
                suggestion: Some(
                    "Use explicit step names that reflect the Arrange-Act-Assert phases"
                        .to_string(),
                ),
            });
        }

        details.push(MethodPattern {
            method: method.name.clone(),
            steps_count: steps.len(),
            phases,
        });
    }

    result.failed = !result.issues.is_empty();
    (details, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance::parser;

    fn parse(source: &str) -> ParsedArtifact {
        parser::parse(source).unwrap()
    }

    #[test]
    fn test_all_phases_detected() {
        let source = r#"
class FlowTests:
    def test_user_can_login(self):
        with allure.step("Open the login page"):
            pass
        with allure.step("Enter the credentials"):
            pass
        with allure.step("Verify the result"):
            pass
"#;
        let config = CheckerConfig::default();
        let (details, result) = check(&config, &parse(source));
        assert!(!result.failed);
        assert_eq!(details.len(), 1);
        assert!(details[0].phases.arrange);
        assert!(details[0].phases.act);
        assert!(details[0].phases.assert_);
    }

    #[test]
    fn test_single_step_is_medium_issue() {
        let source = r#"
class FlowTests:
    def test_user_can_login(self):
        with allure.step("Open the login page"):
            pass
"#;
        let config = CheckerConfig::default();
        let (_, result) = check(&config, &parse(source));
        assert!(result.failed);
        assert!(result
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::InsufficientSteps && i.severity == Severity::Medium));
    }

    #[test]
    fn test_unrecognized_labels_are_low_issue() {
        let source = r#"
class FlowTests:
    def test_user_can_login(self):
        with allure.step("Step one"):
            pass
        with allure.step("Step two"):
            pass
"#;
        let config = CheckerConfig::default();
        let (details, result) = check(&config, &parse(source));
        assert!(!details[0].phases.any());
        assert!(result
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::AaaNotDetected && i.severity == Severity::Low));
    }

    #[test]
    fn test_russian_step_labels_are_recognized() {
        let source = r#"
class FlowTests:
    def test_user_can_login(self):
        with allure.step("Открыть страницу входа"):
            pass
        with allure.step("Ввод логина и пароля"):
            pass
        with allure.step("Проверить переход в кабинет"):
            pass
"#;
        let config = CheckerConfig::default();
        let (details, result) = check(&config, &parse(source));
        assert!(!result.failed);
        assert!(details[0].phases.arrange);
        assert!(details[0].phases.act);
        assert!(details[0].phases.assert_);
    }
}
