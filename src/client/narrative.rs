//! Narrative-generation service client
//!
//! Chat-completions style interface; a vision-capable mode accepts inline
//! image payloads. The bearer credential is only format-validated here;
//! a missing or malformed key makes the client unavailable rather than
//! failing hard.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

/// Required prefix for a well-formed bearer credential
const CREDENTIAL_PREFIX: &str = "sk-";

#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("Missing or malformed credential")]
    Credential,

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Empty choice list in response")]
    EmptyResponse,
}

/// One message in a conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Client for the narrative-generation service
#[derive(Clone)]
pub struct NarrativeClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl NarrativeClient {
    pub fn new(base_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    /// Whether a format-valid credential is configured.
    ///
    /// Gates the narrative-vision fallback tier and the assistant's live path.
    pub fn is_configured(&self) -> bool {
        self.valid_key().is_some()
    }

    fn valid_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .filter(|k| k.starts_with(CREDENTIAL_PREFIX))
    }

    /// Generate a completion from a system prompt and message history
    pub async fn chat(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
    ) -> Result<String, NarrativeError> {
        let mut payload: Vec<serde_json::Value> = vec![json!({
            "role": "system",
            "content": system_prompt,
        })];
        for m in messages {
            payload.push(json!({"role": m.role, "content": m.content}));
        }

        self.complete(payload).await
    }

    /// Vision mode: send an analysis prompt with two inline images
    pub async fn analyze_images(
        &self,
        prompt: &str,
        before_b64: &str,
        after_b64: &str,
    ) -> Result<String, NarrativeError> {
        let payload = vec![json!({
            "role": "user",
            "content": [
                {"type": "text", "text": prompt},
                {"type": "image_url", "image_url": {"url": format!("data:image/png;base64,{}", before_b64)}},
                {"type": "image_url", "image_url": {"url": format!("data:image/png;base64,{}", after_b64)}},
            ],
        })];

        self.complete(payload).await
    }

    async fn complete(&self, messages: Vec<serde_json::Value>) -> Result<String, NarrativeError> {
        let api_key = self.valid_key().ok_or(NarrativeError::Credential)?;

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "messages": messages,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(NarrativeError::Service(format!(
                "Unexpected status {}: {}",
                status, text
            )));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| NarrativeError::Service(format!("Failed to parse response: {}", e)))?;

        parsed["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or(NarrativeError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_key(key: Option<&str>) -> NarrativeClient {
        NarrativeClient::new(
            "https://example.invalid/v1".to_string(),
            key.map(str::to_string),
            "test-model".to_string(),
        )
    }

    #[test]
    fn test_credential_format_check() {
        assert!(client_with_key(Some("sk-abc123")).is_configured());
        assert!(!client_with_key(Some("abc123")).is_configured());
        assert!(!client_with_key(Some("")).is_configured());
        assert!(!client_with_key(None).is_configured());
    }

    #[tokio::test]
    async fn test_missing_credential_is_soft_failure() {
        let client = client_with_key(None);
        let result = client.chat("system", &[ChatMessage::user("hello")]).await;
        assert!(matches!(result, Err(NarrativeError::Credential)));
    }
}
