//! OpenAI Chat Completions client

use async_trait::async_trait;
use healthbuddy_core::AdapterError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::adapter::LlmAdapter;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const TEMPERATURE: f32 = 0.1;
const PROVIDER: &str = "OpenAI";

/// Client for an OpenAI-compatible `/chat/completions` endpoint
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

/// Request body for the Chat Completions API
#[derive(Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
}

/// Response from the Chat Completions API
#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Error detail from the API
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiClient {
    /// Create a client. A `None` key makes every call fail with
    /// [`AdapterError::MissingCredential`] before touching the network.
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AdapterError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LlmAdapter for OpenAiClient {
    async fn complete(
        &self,
        system: Option<&str>,
        user_message: &str,
    ) -> Result<String, AdapterError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AdapterError::MissingCredential(PROVIDER))?;

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(Message {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(Message {
            role: "user".to_string(),
            content: user_message.to_string(),
        });

        let request = ApiRequest {
            model: self.model.clone(),
            messages,
            temperature: TEMPERATURE,
        };

        tracing::debug!(
            model = %self.model,
            content_len = user_message.len(),
            "Sending completion request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AdapterError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiError>(&body) {
                Ok(api_err) => api_err.error.message,
                Err(_) => body,
            };
            return Err(AdapterError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                message,
            });
        }

        let parsed = response
            .json::<ApiResponse>()
            .await
            .map_err(|e| AdapterError::Decode(e.to_string()))?;

        extract_text(parsed)
    }
}

/// Pull the first non-blank message content out of the response
fn extract_text(response: ApiResponse) -> Result<String, AdapterError> {
    response
        .choices
        .into_iter()
        .filter_map(|choice| choice.message.content)
        .find(|text| !text.trim().is_empty())
        .ok_or(AdapterError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_key: Option<&str>) -> OpenAiClient {
        OpenAiClient::new(
            api_key.map(str::to_string),
            "http://127.0.0.1:9/v1/",
            DEFAULT_MODEL,
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        assert_eq!(
            client(Some("k")).endpoint(),
            "http://127.0.0.1:9/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let err = client(None).complete(None, "hi").await.unwrap_err();
        assert!(matches!(err, AdapterError::MissingCredential("OpenAI")));
    }

    #[test]
    fn extract_text_skips_blank_choices() {
        let response: ApiResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"  "}},{"message":{"content":"Stay hydrated."}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "Stay hydrated.");
    }

    #[test]
    fn extract_text_rejects_empty_response() {
        let response: ApiResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(
            extract_text(response),
            Err(AdapterError::EmptyResponse)
        ));
    }
}
