use crate::config::OracleConfig;
use crate::domain::ports::OracleTransport;
use crate::error::OracleError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Oracle transport speaking the OpenAI-compatible chat-completions protocol.
///
/// The prompt is sent as a single user message and the first choice's
/// content is returned verbatim. Non-2xx statuses, network errors and
/// envelopes without content are all [`OracleError`]s.
#[derive(Clone)]
pub struct HttpOracle {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
}

impl HttpOracle {
    pub fn new(config: &OracleConfig, api_key: Option<String>) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OracleError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl OracleTransport for HttpOracle {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| OracleError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OracleError::Network(e.to_string()))?;
        debug!(status = status.as_u16(), bytes = body.len(), "oracle responded");

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| OracleError::InvalidEnvelope(e.to_string()))?;
        envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| OracleError::InvalidEnvelope("no content in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn oracle_for(server: &MockServer, api_key: Option<&str>) -> HttpOracle {
        let config = OracleConfig {
            endpoint: server.url("/v1/chat/completions"),
            model: "gpt-test".to_string(),
            ..Default::default()
        };
        HttpOracle::new(&config, api_key.map(str::to_string)).unwrap()
    }

    #[tokio::test]
    async fn test_returns_first_choice_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("authorization", "Bearer test-key");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(serde_json::json!({
                        "choices": [{ "message": { "role": "assistant", "content": "[]" } }]
                    }));
            })
            .await;

        let reply = oracle_for(&server, Some("test-key"))
            .complete("prompt")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "[]");
    }

    #[tokio::test]
    async fn test_non_success_status_maps_to_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(401).json_body(serde_json::json!({
                    "error": { "message": "Incorrect API key" }
                }));
            })
            .await;

        let err = oracle_for(&server, None).complete("prompt").await.unwrap_err();
        assert!(matches!(
            err,
            OracleError::Api { status: 401, ref message } if message == "Incorrect API key"
        ));
    }

    #[tokio::test]
    async fn test_plain_error_body_is_kept() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(503).body("upstream down");
            })
            .await;

        let err = oracle_for(&server, None).complete("prompt").await.unwrap_err();
        assert!(matches!(
            err,
            OracleError::Api { status: 503, ref message } if message == "upstream down"
        ));
    }

    #[tokio::test]
    async fn test_missing_content_is_invalid_envelope() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200)
                    .json_body(serde_json::json!({ "choices": [] }));
            })
            .await;

        let err = oracle_for(&server, None).complete("prompt").await.unwrap_err();
        assert!(matches!(err, OracleError::InvalidEnvelope(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let config = OracleConfig {
            endpoint: "http://127.0.0.1:1/v1/chat/completions".to_string(),
            ..Default::default()
        };
        let oracle = HttpOracle::new(&config, None).unwrap();
        let err = oracle.complete("prompt").await.unwrap_err();
        assert!(matches!(err, OracleError::Network(_)));
    }
}
