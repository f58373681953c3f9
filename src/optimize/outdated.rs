//! Obsolescence detection: age, deprecated terminology, requirement drift.
//!
//! A case may accumulate several independent flags; none are deduplicated.

use super::OutdatedRecord;
use crate::config::OptimizerConfig;
use crate::oracle::SemanticOracle;
use crate::testcase::TestCase;
use chrono::{DateTime, Utc};
use tracing::warn;

/// Flag stale test cases.
///
/// The oracle drift check only runs when requirements text is present and
/// covers at most the first `max_oracle_outdated_cases` cases; its verdicts
/// are adopted verbatim.
pub async fn find(
    corpus: &[TestCase],
    requirements: Option<&str>,
    now: DateTime<Utc>,
    config: &OptimizerConfig,
    oracle: &dyn SemanticOracle,
) -> Vec<OutdatedRecord> {
    let mut records = Vec::new();

    for case in corpus {
        let days_old = (now - case.updated_at).num_days();
        if days_old > config.stale_after_days {
            records.push(OutdatedRecord {
                test_id: case.id.clone(),
                title: Some(case.title.clone()),
                days_old: Some(days_old),
                reason: format!(
                    "Not updated for {} days (older than {} days)",
                    days_old, config.stale_after_days
                ),
            });
        }

        let text = case.searchable_text();
        if config
            .deprecated_keywords
            .iter()
            .any(|keyword| text.contains(keyword.as_str()))
        {
            records.push(OutdatedRecord {
                test_id: case.id.clone(),
                title: Some(case.title.clone()),
                days_old: None,
                reason: "References deprecated functionality".to_string(),
            });
        }
    }

    let requirements = requirements.filter(|r| !r.trim().is_empty());
    if let Some(req) = requirements {
        let sample = &corpus[..corpus.len().min(config.max_oracle_outdated_cases)];
        match oracle.flag_outdated(sample, req).await {
            Ok(verdicts) => {
                for verdict in verdicts {
                    let title = corpus
                        .iter()
                        .find(|c| c.id == verdict.test_id)
                        .map(|c| c.title.clone());
                    records.push(OutdatedRecord {
                        test_id: verdict.test_id,
                        title,
                        days_old: None,
                        reason: verdict.reason,
                    });
                }
            }
            Err(e) => {
                // Fail open: drift findings degrade to empty
                warn!(error = %e, "requirements-drift check unavailable");
            }
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::testing::{case, StubOracle};
    use crate::oracle::OutdatedVerdict;
    use chrono::Duration;

    #[tokio::test]
    async fn test_age_boundary_is_strict() {
        let now = Utc::now();
        let mut at_limit = case("tc_180", "A", "F", &["s"]);
        at_limit.updated_at = now - Duration::days(180);
        let mut over_limit = case("tc_181", "B", "F", &["s"]);
        over_limit.updated_at = now - Duration::days(181);

        let oracle = StubOracle::default();
        let records = find(
            &[at_limit, over_limit],
            None,
            now,
            &OptimizerConfig::default(),
            &oracle,
        )
        .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].test_id, "tc_181");
        assert_eq!(records[0].days_old, Some(181));
    }

    #[tokio::test]
    async fn test_deprecated_terminology_flagged() {
        let mut stale_wording = case("tc_1", "Legacy export flow", "Export", &["s"]);
        stale_wording.description = Some("Uses the deprecated v1 endpoint".into());

        let oracle = StubOracle::default();
        let records = find(
            &[stale_wording],
            None,
            Utc::now(),
            &OptimizerConfig::default(),
            &oracle,
        )
        .await;

        assert_eq!(records.len(), 1);
        assert!(records[0].reason.contains("deprecated"));
    }

    #[tokio::test]
    async fn test_flags_accumulate_per_case() {
        let now = Utc::now();
        let mut both = case("tc_1", "Old checkout flow", "Cart", &["s"]);
        both.updated_at = now - Duration::days(400);

        let oracle = StubOracle::default();
        let records = find(&[both], None, now, &OptimizerConfig::default(), &oracle).await;
        // One age flag and one terminology flag, both retained
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.test_id == "tc_1"));
    }

    #[tokio::test]
    async fn test_oracle_verdicts_adopted_verbatim() {
        let corpus = vec![case("tc_1", "Flow", "F", &["s"])];
        let oracle = StubOracle {
            outdated: vec![OutdatedVerdict {
                test_id: "tc_1".into(),
                reason: "No requirement mentions this flow".into(),
            }],
            ..Default::default()
        };
        let records = find(
            &corpus,
            Some("Users must log in."),
            Utc::now(),
            &OptimizerConfig::default(),
            &oracle,
        )
        .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reason, "No requirement mentions this flow");
        assert_eq!(records[0].title.as_deref(), Some("Flow"));
    }

    #[tokio::test]
    async fn test_without_requirements_no_oracle_call() {
        let corpus = vec![case("tc_1", "Flow", "F", &["s"])];
        // A failing oracle must not matter when no requirements are given
        let oracle = StubOracle {
            fail: true,
            ..Default::default()
        };
        let records = find(&corpus, None, Utc::now(), &OptimizerConfig::default(), &oracle).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_oracle_failure_fails_open() {
        let corpus = vec![case("tc_1", "Flow", "F", &["s"])];
        let oracle = StubOracle {
            fail: true,
            ..Default::default()
        };
        let records = find(
            &corpus,
            Some("Users must log in."),
            Utc::now(),
            &OptimizerConfig::default(),
            &oracle,
        )
        .await;
        assert!(records.is_empty());
    }
}
