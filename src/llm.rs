//! Chat-completions client for the Groq API (OpenAI-compatible wire format).
//!
//! The narrative field in every response is mandatory, so callers treat any
//! failure here as recoverable and substitute the deterministic renderer.

use crate::error::{AnalystError, Result};

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Read `GROQ_API_KEY` from the environment. A missing key yields a
    /// client whose calls always fail, which callers recover from.
    pub fn from_env() -> Self {
        Self::new(std::env::var("GROQ_API_KEY").unwrap_or_default())
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub async fn call_llm(&self, prompt: &str) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(AnalystError::Llm("GROQ_API_KEY not set".to_string()));
        }

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": "You are a professional real estate market analyst. Base every statement on the data provided."},
                {"role": "user", "content": prompt}
            ],
            // Low temperature for factual responses
            "temperature": 0.3,
            "max_tokens": 512
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalystError::Llm(format!("LLM API call failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AnalystError::Llm(format!(
                "LLM API returned status {}",
                response.status()
            )));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AnalystError::Llm(format!("Failed to parse LLM response: {}", e)))?;

        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AnalystError::Llm("No content in LLM response".to_string()))?;

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_api_key_errors_without_network() {
        let client = LlmClient::new(String::new());
        let err = client.call_llm("anything").await.unwrap_err();
        assert!(matches!(err, AnalystError::Llm(_)));
    }
}
