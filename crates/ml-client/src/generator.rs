//! OpenAI-compatible chat completions client (Groq by default).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{MLClientError, TextGenerator};

pub const DEFAULT_GENERATION_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GENERATION_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Clone)]
pub struct ChatCompletionClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, MLClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MLClientError::Config(e.to_string()))?;

        let api_key = api_key.filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!("No API key configured for the generation service");
        }

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            temperature: None,
        })
    }

    /// Sampling temperature; left to the service default when unset
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

}

#[async_trait]
impl TextGenerator for ChatCompletionClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, MLClientError> {
        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling chat completions API: {} (model {})", url, self.model);

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MLClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| MLClientError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| MLClientError::InvalidResponse("No choices in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    async fn serve(router: Router) -> (String, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{}", addr), handle)
    }

    #[tokio::test]
    async fn test_generate_returns_trimmed_first_choice() {
        let router = Router::new().route(
            "/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("");
                if auth != "Bearer secret" {
                    return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad key" })));
                }
                assert_eq!(body["messages"][0]["role"], "system");
                assert_eq!(body["messages"][1]["content"], "user prompt");
                assert_eq!(body["temperature"], 0.0);
                (
                    StatusCode::OK,
                    Json(json!({
                        "choices": [
                            { "message": { "role": "assistant", "content": "\n1. Heat - tense.\n" } },
                            { "message": { "role": "assistant", "content": "ignored" } }
                        ]
                    })),
                )
            }),
        );
        let (url, handle) = serve(router).await;

        let client = ChatCompletionClient::new(
            url,
            DEFAULT_GENERATION_MODEL,
            Some("secret".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_temperature(0.0);

        let text = client.generate("system prompt", "user prompt").await.unwrap();
        assert_eq!(text, "1. Heat - tense.");

        handle.abort();
    }

    #[tokio::test]
    async fn test_generate_surfaces_auth_failure() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let (url, handle) = serve(router).await;

        let client =
            ChatCompletionClient::new(url, DEFAULT_GENERATION_MODEL, None, Duration::from_secs(5)).unwrap();
        let err = client.generate("s", "u").await.unwrap_err();
        assert!(matches!(err, MLClientError::Api { status: 401, .. }));

        handle.abort();
    }

    #[tokio::test]
    async fn test_generate_without_choices_is_invalid() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let (url, handle) = serve(router).await;

        let client =
            ChatCompletionClient::new(url, DEFAULT_GENERATION_MODEL, None, Duration::from_secs(5)).unwrap();
        assert!(matches!(
            client.generate("s", "u").await,
            Err(MLClientError::InvalidResponse(_))
        ));

        handle.abort();
    }

    #[tokio::test]
    async fn test_unreachable_service_is_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let client =
            ChatCompletionClient::new(url, DEFAULT_GENERATION_MODEL, None, Duration::from_secs(2)).unwrap();
        assert!(matches!(
            client.generate("s", "u").await,
            Err(MLClientError::Http(_))
        ));
    }
}
