//! LLM Client: the single point of entry for all OpenAI calls in Vector.
//!
//! ARCHITECTURAL RULE: No other module may call the OpenAI API directly.
//! All LLM interactions MUST go through this module.
//!
//! Model: gpt-5-nano (hardcoded, not configurable, so every caller sees the same model)

use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// The model used for all LLM calls in Vector.
pub const MODEL: &str = "gpt-5-nano-2025-08-07";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Structured-output format passed as `text.format` on the request.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSchemaFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
    pub name: &'static str,
    pub strict: bool,
    pub schema: Value,
}

impl JsonSchemaFormat {
    pub fn strict(name: &'static str, schema: Value) -> Self {
        Self {
            format_type: "json_schema",
            name,
            strict: true,
            schema,
        }
    }
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
    text: TextOptions<'a>,
}

#[derive(Debug, Serialize)]
struct TextOptions<'a> {
    format: &'a JsonSchemaFormat,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    #[serde(default)]
    pub output: Vec<OutputItem>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub part_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Concatenates every `output_text` part of every `message` item, trimmed.
    pub fn output_text(&self) -> String {
        self.output
            .iter()
            .filter(|item| item.item_type == "message")
            .flat_map(|item| item.content.iter())
            .filter(|part| part.part_type == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect::<String>()
            .trim()
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// The single LLM client used by all services in Vector.
/// Wraps the Responses API with retry logic and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    backoff_base: Duration,
}

impl LlmClient {
    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            backoff_base: Duration::from_millis(1000),
        }
    }

    /// Makes a raw call to the Responses API, returning the full response object.
    /// Retries on 429 (rate limit), 5xx and transport errors with exponential backoff.
    pub async fn call(
        &self,
        instructions: &str,
        input: &str,
        format: &JsonSchemaFormat,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = ResponsesRequest {
            model: MODEL,
            instructions,
            input,
            text: TextOptions { format },
        };
        let url = format!("{}/responses", self.base_url);

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = self.backoff_base * (1 << (attempt - 1));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
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

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<OpenAiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            if let Some(usage) = &llm_response.usage {
                debug!(
                    "LLM call succeeded: input_tokens={}, output_tokens={}",
                    usage.input_tokens, usage.output_tokens
                );
            }

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Calls the LLM and deserializes the output text as JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        instructions: &str,
        input: &str,
        format: &JsonSchemaFormat,
    ) -> Result<T, LlmError> {
        let response = self.call(instructions, input, format).await?;

        let text = response.output_text();
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }

        serde_json::from_str(strip_json_fences(&text)).map_err(LlmError::Parse)
    }

    #[cfg(test)]
    fn without_backoff(mut self) -> Self {
        self.backoff_base = Duration::ZERO;
        self
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn format() -> JsonSchemaFormat {
        JsonSchemaFormat::strict("ack", json!({ "type": "object" }))
    }

    fn reply(text: &str) -> Value {
        json!({
            "output": [
                { "type": "reasoning", "content": [] },
                { "type": "message", "content": [{ "type": "output_text", "text": text }] }
            ],
            "usage": { "input_tokens": 12, "output_tokens": 5 }
        })
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Ack {
        ok: bool,
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_request_carries_schema_format() {
        let f = format();
        let body = serde_json::to_value(ResponsesRequest {
            model: MODEL,
            instructions: "sys",
            input: "hi",
            text: TextOptions { format: &f },
        })
        .unwrap();
        assert_eq!(body["text"]["format"]["type"], "json_schema");
        assert_eq!(body["text"]["format"]["name"], "ack");
        assert_eq!(body["text"]["format"]["strict"], true);
        assert_eq!(body["model"], MODEL);
    }

    #[test]
    fn test_output_text_skips_non_message_items() {
        let response: LlmResponse = serde_json::from_value(reply("  {\"ok\":true} ")).unwrap();
        assert_eq!(response.output_text(), "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_call_json_parses_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/responses"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("{\"ok\": true}")))
            .expect(1)
            .mount(&server)
            .await;

        let client = LlmClient::with_base_url("sk-test".into(), &server.uri());
        let ack: Ack = client.call_json("sys", "hi", &format()).await.unwrap();
        assert_eq!(ack, Ack { ok: true });
    }

    #[tokio::test]
    async fn test_call_json_empty_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("   ")))
            .mount(&server)
            .await;

        let client = LlmClient::with_base_url("sk-test".into(), &server.uri());
        let result = client.call_json::<Ack>("sys", "hi", &format()).await;
        assert!(matches!(result, Err(LlmError::EmptyContent)));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "error": { "message": "bad schema" } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = LlmClient::with_base_url("sk-test".into(), &server.uri());
        match client.call("sys", "hi", &format()).await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad schema");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_errors_retry_until_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(u64::from(MAX_RETRIES))
            .mount(&server)
            .await;

        let client = LlmClient::with_base_url("sk-test".into(), &server.uri()).without_backoff();
        match client.call("sys", "hi", &format()).await {
            Err(LlmError::Api { status, .. }) => assert_eq!(status, 503),
            other => panic!("expected API error, got {other:?}"),
        }
    }
}
