//! Defensive JSON extraction from oracle responses.
//!
//! Completion models wrap JSON in markdown fences, add commentary, or emit
//! smart quotes and trailing commas. Everything here repairs the common
//! cases; anything still unparseable becomes `OracleError::MalformedResponse`.

use super::OracleError;
use serde::de::DeserializeOwned;

/// Strip markdown code fences from a response
pub(crate) fn strip_markdown_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let clean = if trimmed.starts_with("```json") {
        trimmed.strip_prefix("```json").unwrap_or(trimmed)
    } else if trimmed.starts_with("```") {
        trimmed.strip_prefix("```").unwrap_or(trimmed)
    } else {
        trimmed
    };
    let clean = if clean.ends_with("```") {
        clean.strip_suffix("```").unwrap_or(clean)
    } else {
        clean
    };
    clean.trim()
}

/// Extract a JSON fragment between matching delimiters
pub(crate) fn extract_json_fragment(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if start <= end {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Try to fix common JSON issues in model output
pub(crate) fn fix_json_issues(json: &str) -> String {
    let mut fixed = json.to_string();

    // Remove trailing commas before ] or }
    fixed = fixed.replace(",]", "]");
    fixed = fixed.replace(",}", "}");

    // Smart quotes to regular quotes
    fixed = fixed.replace('\u{201C}', "\"");
    fixed = fixed.replace('\u{201D}', "\"");
    fixed = fixed.replace('\u{2018}', "'");
    fixed = fixed.replace('\u{2019}', "'");

    // Drop stray control characters
    fixed = fixed
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    fixed
}

/// Parse the first JSON object in a response into `T`
pub(crate) fn parse_json_object<T: DeserializeOwned>(response: &str) -> Result<T, OracleError> {
    let clean = strip_markdown_fences(response);
    let fragment = extract_json_fragment(clean, '{', '}').ok_or_else(|| {
        OracleError::MalformedResponse(format!(
            "no JSON object found in: {}",
            truncate(response, 120)
        ))
    })?;

    match serde_json::from_str::<T>(fragment) {
        Ok(parsed) => Ok(parsed),
        Err(first_err) => {
            let fixed = fix_json_issues(fragment);
            serde_json::from_str::<T>(&fixed).map_err(|_| {
                OracleError::MalformedResponse(format!(
                    "{} in: {}",
                    first_err,
                    truncate(fragment, 120)
                ))
            })
        }
    }
}

/// Truncate a string for error messages (Unicode-safe)
pub(crate) fn truncate(s: &str, max_chars: usize) -> &str {
    if s.chars().count() <= max_chars {
        s
    } else {
        let byte_idx = s
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        &s[..byte_idx]
    }
}
