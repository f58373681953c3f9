//! Prompt construction for the oracle judgments.

use crate::testcase::TestCase;

pub const PAIR_SYSTEM: &str =
    "You judge the semantic similarity of software test cases. Respond with JSON only.";

pub const OUTDATED_SYSTEM: &str =
    "You assess whether test cases are still relevant to the current requirements. Respond with JSON only.";

pub const GAPS_SYSTEM: &str =
    "You analyze test coverage against requirements. Respond with JSON only.";

pub const COVERAGE_SYSTEM: &str =
    "You analyze how well requirements are covered by test cases. Respond with JSON only.";

fn describe_case(case: &TestCase) -> String {
    format!(
        "ID: {}\nTitle: {}\nSteps: {}\nExpected result: {}",
        case.id,
        case.title,
        serde_json::to_string(&case.steps).unwrap_or_else(|_| "[]".to_string()),
        case.expected_result
    )
}

/// Compare two test cases for semantic duplication
pub fn pair_prompt(first: &TestCase, second: &TestCase) -> String {
    format!(
        r#"Compare the two test cases and decide whether they are semantic duplicates.

Test case 1:
{}

Test case 2:
{}

Answer in JSON:
{{
    "are_duplicates": true/false,
    "similarity_score": 0.0-1.0,
    "reason": "short explanation"
}}"#,
        describe_case(first),
        describe_case(second)
    )
}

/// Ask which of the given tests drifted away from the requirements
pub fn outdated_prompt(cases: &[TestCase], requirements: &str) -> String {
    let listing: Vec<serde_json::Value> = cases
        .iter()
        .map(|tc| {
            serde_json::json!({
                "id": tc.id,
                "title": tc.title,
                "steps": tc.steps,
            })
        })
        .collect();

    format!(
        r#"Analyze which of the test cases are outdated with respect to the current requirements.

CURRENT REQUIREMENTS:
{}

TEST CASES:
{}

Identify tests that:
1. Cover functionality no longer mentioned in the requirements
2. Use retired APIs or interfaces
3. No longer match the current architecture

Answer in JSON:
{{
    "outdated_tests": [
        {{"test_id": "id", "reason": "why it is outdated"}}
    ]
}}"#,
        requirements,
        serde_json::to_string_pretty(&listing).unwrap_or_else(|_| "[]".to_string())
    )
}

/// Ask for uncovered scenarios given a bounded corpus summary
pub fn gaps_prompt(corpus_summary: &str, requirements: &str) -> String {
    format!(
        r#"Analyze the gaps in test coverage.

REQUIREMENTS:
{}

EXISTING TEST CASES:
{}

Identify:
1. Important scenarios without any test
2. Missing edge cases
3. Critical coverage gaps
4. Missing negative scenarios

Answer in JSON:
{{
    "coverage_gaps": [
        {{
            "area": "name of the area",
            "priority": "critical/high/medium/low",
            "description": "what is not covered",
            "suggested_tests": ["test 1", "test 2"]
        }}
    ]
}}"#,
        requirements, corpus_summary
    )
}

/// Ask for an overall requirement-coverage assessment
pub fn coverage_prompt(corpus_summary: &str, requirements: &str) -> String {
    format!(
        r#"Analyze how well the requirements are covered by the test cases.

REQUIREMENTS:
{}

TEST CASES:
{}

Determine:
1. Which requirements are fully covered
2. Which requirements are partially covered
3. Which requirements are not covered at all
4. Critical coverage gaps
5. The overall coverage percentage

Answer in JSON:
{{
    "covered_requirements": ["requirement 1"],
    "partially_covered": ["requirement 2"],
    "not_covered": ["requirement 3"],
    "critical_gaps": ["gap 1"],
    "coverage_percentage": 75.5,
    "details": "additional details"
}}"#,
        requirements, corpus_summary
    )
}
