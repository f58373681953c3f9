//! HTTP-backed oracle over an OpenAI-compatible chat-completions endpoint.
//!
//! Rate-limit responses are retried with exponential backoff; every other
//! failure maps onto the `OracleError` taxonomy so callers can fail open.

use super::parse;
use super::prompts;
use super::{
    CoverageAssessment, CoverageGap, OracleError, OutdatedVerdict, PairVerdict, SemanticOracle,
};
use crate::testcase::TestCase;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Rate limit retry configuration
const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 2000;
const BACKOFF_MULTIPLIER: u64 = 2;

/// Connection settings for the completion endpoint
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl OracleConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2000,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    stream: bool,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

#[derive(Deserialize)]
struct OutdatedEnvelope {
    outdated_tests: Vec<OutdatedVerdict>,
}

#[derive(Deserialize)]
struct GapsEnvelope {
    coverage_gaps: Vec<CoverageGap>,
}

/// Semantic oracle backed by a chat-completions API
pub struct HttpOracle {
    client: reqwest::Client,
    config: OracleConfig,
}

impl HttpOracle {
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Extract a retry-after hint from a rate-limit response body, if present
    fn parse_retry_after(text: &str) -> Option<u64> {
        let text_lower = text.to_lowercase();
        if let Some(pos) = text_lower.find("retry") {
            let after_retry = &text_lower[pos..];
            for word in after_retry.split_whitespace().skip(1).take(5) {
                if let Ok(secs) = word
                    .trim_matches(|c: char| !c.is_numeric())
                    .parse::<u64>()
                {
                    if secs > 0 && secs < 300 {
                        return Some(secs);
                    }
                }
            }
        }
        None
    }

    /// One chat exchange; retries rate limits with exponential backoff
    async fn chat(&self, system: &str, user: &str) -> Result<String, OracleError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens: self.config.max_tokens,
            stream: false,
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        };

        let mut retry_count = 0;

        loop {
            let response = self
                .client
                .post(&self.config.endpoint)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", self.config.api_key))
                .json(&request)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        OracleError::Timeout
                    } else {
                        OracleError::Transport(e)
                    }
                })?;

            let status = response.status();
            let text = response.text().await.map_err(OracleError::Transport)?;

            if status.is_success() {
                let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| {
                    OracleError::MalformedResponse(format!(
                        "unexpected completion payload: {} in {}",
                        e,
                        parse::truncate(&text, 200)
                    ))
                })?;

                let content = parsed
                    .choices
                    .first()
                    .map(|c| c.message.content.clone())
                    .unwrap_or_default();
                return Ok(content);
            }

            if status.as_u16() == 429 && retry_count < MAX_RETRIES {
                retry_count += 1;
                let retry_after = Self::parse_retry_after(&text).unwrap_or_else(|| {
                    (INITIAL_BACKOFF_MS * BACKOFF_MULTIPLIER.pow(retry_count - 1)) / 1000
                });
                warn!(
                    retry_after,
                    retry_count, "oracle rate limited, backing off"
                );
                tokio::time::sleep(Duration::from_secs(retry_after)).await;
                continue;
            }

            return Err(OracleError::Status {
                status: status.as_u16(),
                body: parse::truncate(&text, 200).to_string(),
            });
        }
    }
}

#[async_trait]
impl SemanticOracle for HttpOracle {
    async fn compare_pair(
        &self,
        first: &TestCase,
        second: &TestCase,
    ) -> Result<PairVerdict, OracleError> {
        debug!(first = %first.id, second = %second.id, "oracle pair comparison");
        let content = self
            .chat(prompts::PAIR_SYSTEM, &prompts::pair_prompt(first, second))
            .await?;
        parse::parse_json_object(&content)
    }

    async fn flag_outdated(
        &self,
        cases: &[TestCase],
        requirements: &str,
    ) -> Result<Vec<OutdatedVerdict>, OracleError> {
        debug!(cases = cases.len(), "oracle requirements-drift check");
        let content = self
            .chat(
                prompts::OUTDATED_SYSTEM,
                &prompts::outdated_prompt(cases, requirements),
            )
            .await?;
        let envelope: OutdatedEnvelope = parse::parse_json_object(&content)?;
        Ok(envelope.outdated_tests)
    }

    async fn find_gaps(
        &self,
        corpus_summary: &str,
        requirements: &str,
    ) -> Result<Vec<CoverageGap>, OracleError> {
        debug!("oracle coverage-gap analysis");
        let content = self
            .chat(
                prompts::GAPS_SYSTEM,
                &prompts::gaps_prompt(corpus_summary, requirements),
            )
            .await?;
        let envelope: GapsEnvelope = parse::parse_json_object(&content)?;
        Ok(envelope.coverage_gaps)
    }

    async fn assess_coverage(
        &self,
        corpus_summary: &str,
        requirements: &str,
    ) -> Result<CoverageAssessment, OracleError> {
        debug!("oracle coverage assessment");
        let content = self
            .chat(
                prompts::COVERAGE_SYSTEM,
                &prompts::coverage_prompt(corpus_summary, requirements),
            )
            .await?;
        parse::parse_json_object(&content)
    }
}
