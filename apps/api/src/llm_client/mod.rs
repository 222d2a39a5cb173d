/// LLM Client — the single point of entry for all generation-service calls.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// All LLM interactions MUST go through this module.
///
/// Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// 429 from the API. A policy signal, never retried.
    #[error("Rate limited by the generation service")]
    RateLimited,

    /// 402 from the API. A billing signal, never retried.
    #[error("Generation service quota exhausted")]
    QuotaExceeded,

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// The single LLM client used by the analysis pipeline.
/// Wraps the Anthropic Messages API with bounded retry for transient faults.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Makes a raw call to the generation service, returning the full response.
    ///
    /// Transport failures and 5xx responses are retried with exponential
    /// backoff. 429 and 402 are surfaced immediately as `RateLimited` and
    /// `QuotaExceeded`: they are policy signals, not transient faults.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            match classify_status(status.as_u16()) {
                StatusClass::RateLimited => {
                    warn!("LLM API returned 429, surfacing to caller");
                    return Err(LlmError::RateLimited);
                }
                StatusClass::QuotaExceeded => {
                    warn!("LLM API returned 402, surfacing to caller");
                    return Err(LlmError::QuotaExceeded);
                }
                StatusClass::Transient => {
                    let body = response.text().await.unwrap_or_default();
                    warn!("LLM API returned {}: {}", status, body);
                    last_error = Some(LlmError::Api {
                        status: status.as_u16(),
                        message: body,
                    });
                    continue;
                }
                StatusClass::Failure => {
                    let body = response.text().await.unwrap_or_default();
                    // Try to parse error message
                    let message = serde_json::from_str::<AnthropicError>(&body)
                        .map(|e| e.error.message)
                        .unwrap_or(body);
                    return Err(LlmError::Api {
                        status: status.as_u16(),
                        message,
                    });
                }
                StatusClass::Success => {}
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::Api {
            status: 0,
            message: format!("no response after {MAX_RETRIES} attempts"),
        }))
    }
}

#[derive(Debug, PartialEq)]
enum StatusClass {
    Success,
    RateLimited,
    QuotaExceeded,
    Transient,
    Failure,
}

fn classify_status(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        429 => StatusClass::RateLimited,
        402 => StatusClass::QuotaExceeded,
        500..=599 => StatusClass::Transient,
        _ => StatusClass::Failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_success_range() {
        assert_eq!(classify_status(200), StatusClass::Success);
        assert_eq!(classify_status(201), StatusClass::Success);
    }

    #[test]
    fn test_classify_rate_limit_is_not_transient() {
        assert_eq!(classify_status(429), StatusClass::RateLimited);
    }

    #[test]
    fn test_classify_payment_required_is_not_transient() {
        assert_eq!(classify_status(402), StatusClass::QuotaExceeded);
    }

    #[test]
    fn test_classify_server_errors_are_transient() {
        assert_eq!(classify_status(500), StatusClass::Transient);
        assert_eq!(classify_status(503), StatusClass::Transient);
    }

    #[test]
    fn test_classify_client_errors_are_terminal() {
        assert_eq!(classify_status(400), StatusClass::Failure);
        assert_eq!(classify_status(401), StatusClass::Failure);
    }

    #[test]
    fn test_response_text_picks_first_text_block() {
        let response = LlmResponse {
            content: vec![
                ContentBlock {
                    block_type: "thinking".to_string(),
                    text: None,
                },
                ContentBlock {
                    block_type: "text".to_string(),
                    text: Some("hello".to_string()),
                },
            ],
            usage: Usage {
                input_tokens: 1,
                output_tokens: 1,
            },
        };
        assert_eq!(response.text(), Some("hello"));
    }
}
