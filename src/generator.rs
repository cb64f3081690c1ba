//! Answer generation via the Anthropic Messages API.
//!
//! [`AnswerGenerator`] is the seam between the query service and the
//! language model. [`AnthropicGenerator`] is the production implementation:
//! one `POST` per question, no retries, bounded by `[llm].timeout_secs`.
//!
//! # Wire contract
//!
//! Request body:
//!
//! ```json
//! {
//!   "model": "claude-3-7-sonnet-20250219",
//!   "system": "You are a helpful website assistant. ...",
//!   "messages": [{ "role": "user", "content": "Based on this content:\n\n...\n\nQuestion: ..." }],
//!   "temperature": 0.7,
//!   "max_tokens": 4096
//! }
//! ```
//!
//! Headers: `content-type: application/json`, `x-api-key`,
//! `anthropic-version`. A response holding `error.message` is an API
//! error; otherwise `content[0].text` must be a non-empty string.
//!
//! Every exchange (request body, status, response body) is logged on the
//! `sitebot::upstream` target. The API key is only ever sent as a header
//! and never logged.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::ServiceError;
use crate::logging::UPSTREAM_TARGET;

/// Produces an answer to `query` grounded in `context`.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(
        &self,
        api_key: &str,
        query: &str,
        context: &str,
    ) -> Result<String, ServiceError>;
}

#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub messages: Vec<Message>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub role: &'static str,
    pub content: String,
}

/// The user turn sent to the model.
pub fn build_user_prompt(context: &str, query: &str) -> String {
    format!("Based on this content:\n\n{}\n\nQuestion: {}", context, query)
}

pub struct AnthropicGenerator {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_version: String,
    system_prompt: String,
    temperature: f64,
    max_tokens: u32,
    timeout: Duration,
}

impl AnthropicGenerator {
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_version: config.api_version.clone(),
            system_prompt: config.system_prompt.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout,
        })
    }

    pub fn request_body<'a>(&'a self, query: &str, context: &str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            system: &self.system_prompt,
            messages: vec![Message {
                role: "user",
                content: build_user_prompt(context, query),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl AnswerGenerator for AnthropicGenerator {
    async fn generate(
        &self,
        api_key: &str,
        query: &str,
        context: &str,
    ) -> Result<String, ServiceError> {
        let body = self.request_body(query, context);
        let body_json = serde_json::to_string(&body)
            .map_err(|e| ServiceError::UpstreamTransport(format!("failed to encode request: {}", e)))?;

        tracing::info!(target: UPSTREAM_TARGET, endpoint = %self.endpoint, request = %body_json, "sending request");

        let response = self
            .http
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.api_version)
            .body(body_json)
            .send()
            .await
            .map_err(|e| {
                let msg = if e.is_timeout() {
                    format!("request timed out after {}s", self.timeout.as_secs())
                } else {
                    format!("request failed: {}", e)
                };
                tracing::error!(target: UPSTREAM_TARGET, error = %msg, "transport error");
                ServiceError::UpstreamTransport(msg)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            tracing::error!(target: UPSTREAM_TARGET, status = status.as_u16(), error = %e, "failed to read response body");
            ServiceError::UpstreamTransport(format!("failed to read response body: {}", e))
        })?;

        tracing::info!(target: UPSTREAM_TARGET, status = status.as_u16(), response = %text, "received response");

        parse_response(status, &text)
    }
}

/// Classify a raw upstream response.
///
/// The body decides, not the status: a non-null `error` is an API error
/// whatever the status code, and a body without usable content is a
/// contract error.
pub fn parse_response(status: StatusCode, body: &str) -> Result<String, ServiceError> {
    let json: Value = serde_json::from_str(body).map_err(|e| {
        ServiceError::UpstreamTransport(format!(
            "failed to decode response (HTTP {}): {}",
            status.as_u16(),
            e
        ))
    })?;

    if let Some(error) = json.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(ServiceError::upstream_api(message));
    }

    json.get("content")
        .and_then(Value::as_array)
        .and_then(|blocks| blocks.first())
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ServiceError::UpstreamContract(format!(
                "HTTP {} response has no content[0].text",
                status.as_u16()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_parse_success() {
        let body = r#"{"id":"msg_1","content":[{"type":"text","text":"We open at 9."}]}"#;
        assert_eq!(parse_response(StatusCode::OK, body).unwrap(), "We open at 9.");
    }

    #[test]
    fn test_parse_credit_exhausted() {
        let body = r#"{"error":{"message":"your credit balance is too low"}}"#;
        let err = parse_response(StatusCode::BAD_REQUEST, body).unwrap_err();
        match err {
            ServiceError::UpstreamApi {
                ref message,
                credit_exhausted,
            } => {
                assert!(credit_exhausted);
                assert_eq!(message, "your credit balance is too low");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.user_message(), crate::error::CREDIT_EXHAUSTED_MESSAGE);
    }

    #[test]
    fn test_parse_generic_api_error() {
        let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let err = parse_response(StatusCode::from_u16(529).unwrap(), body).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::UpstreamApi {
                credit_exhausted: false,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_error_wins_over_success_status() {
        let body = r#"{"error":{"message":"bad"},"content":[{"text":"ignored"}]}"#;
        assert!(matches!(
            parse_response(StatusCode::OK, body),
            Err(ServiceError::UpstreamApi { .. })
        ));
    }

    #[test]
    fn test_parse_null_error_is_ignored() {
        let ok = r#"{"error":null,"content":[{"type":"text","text":"Hi"}]}"#;
        assert_eq!(parse_response(StatusCode::OK, ok).unwrap(), "Hi");

        let empty = r#"{"error":null}"#;
        assert!(matches!(
            parse_response(StatusCode::OK, empty),
            Err(ServiceError::UpstreamContract(_))
        ));
    }

    #[test]
    fn test_parse_missing_content() {
        let body = r#"{"id":"msg_1"}"#;
        assert!(matches!(
            parse_response(StatusCode::OK, body),
            Err(ServiceError::UpstreamContract(_))
        ));
    }

    #[test]
    fn test_parse_empty_text() {
        let body = r#"{"content":[{"type":"text","text":""}]}"#;
        assert!(matches!(
            parse_response(StatusCode::OK, body),
            Err(ServiceError::UpstreamContract(_))
        ));
    }

    #[test]
    fn test_parse_empty_content_array() {
        assert!(matches!(
            parse_response(StatusCode::OK, r#"{"content":[]}"#),
            Err(ServiceError::UpstreamContract(_))
        ));
    }

    #[test]
    fn test_parse_undecodable_body() {
        assert!(matches!(
            parse_response(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>"),
            Err(ServiceError::UpstreamTransport(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let generator = AnthropicGenerator::new(&LlmConfig::default()).unwrap();
        let body = generator.request_body("When do you open?", "Hours: 9-5");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "claude-3-7-sonnet-20250219");
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["temperature"], 0.7);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(
            json["messages"][0]["content"],
            "Based on this content:\n\nHours: 9-5\n\nQuestion: When do you open?"
        );
        assert!(json["system"]
            .as_str()
            .unwrap()
            .starts_with("You are a helpful website assistant."));
        assert_eq!(json.as_object().unwrap().len(), 5);
    }

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    async fn spawn_messages_stub(reply: &'static str) -> String {
        let app = axum::Router::new().route(
            "/v1/messages",
            axum::routing::post(move || async move { reply }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1/messages", addr)
    }

    #[tokio::test]
    async fn test_exchange_logged_on_upstream_target_without_key() {
        let reply = r#"{"id":"msg_7","content":[{"type":"text","text":"Open 9-5."}]}"#;
        let endpoint = spawn_messages_stub(reply).await;
        let generator = AnthropicGenerator::new(&LlmConfig {
            endpoint,
            ..LlmConfig::default()
        })
        .unwrap();

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_target(true)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let secret = "sk-ant-REDACTED";
        let answer = generator
            .generate(secret, "When do you open?", "Hours: 9-5")
            .await
            .unwrap();
        assert_eq!(answer, "Open 9-5.");

        let out = logs.contents();
        let upstream_lines: Vec<&str> = out.lines().filter(|l| l.contains(UPSTREAM_TARGET)).collect();
        assert!(upstream_lines.len() >= 2, "logs: {}", out);

        let request_line = upstream_lines
            .iter()
            .find(|l| l.contains("sending request"))
            .unwrap();
        assert!(request_line.contains(r#""model":"claude-3-7-sonnet-20250219""#));
        assert!(request_line.contains("Question: When do you open?"));

        let response_line = upstream_lines
            .iter()
            .find(|l| l.contains("received response"))
            .unwrap();
        assert!(response_line.contains("status=200"));
        assert!(response_line.contains(r#""id":"msg_7""#));

        assert!(!out.contains(secret));
        assert!(!out.contains("secretvalue"));
    }
}
