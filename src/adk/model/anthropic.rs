// SPDX-License-Identifier: MIT

//! Anthropic Model - Claude messages API implementation

use super::{Content, GenerationConfig, Model, Part};
use crate::adk::error::{ModelError, Result, ScribeError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::env;

/// Anthropic Claude model implementation
pub struct AnthropicModel {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
}

impl AnthropicModel {
    /// Create a new AnthropicModel
    ///
    /// Requires `ANTHROPIC_API_KEY` environment variable to be set.
    /// Optionally uses `ANTHROPIC_BASE_URL` for custom endpoints.
    pub fn new(model_name: String) -> Result<Self> {
        let api_key = env::var("ANTHROPIC_API_KEY")
            .map_err(|_| ModelError::ApiKeyMissing("Anthropic".to_string()))?;
        let base_url = env::var("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com/v1".to_string());

        Ok(Self {
            client: Client::new(),
            api_key,
            model_name,
            base_url,
        })
    }

    /// Convert internal Content to Anthropic message format
    fn content_to_anthropic_message(content: &Content) -> Option<serde_json::Value> {
        let role = match content.role.as_str() {
            "user" => "user",
            "model" => "assistant",
            other => other,
        };

        let message_content: Vec<serde_json::Value> = content
            .parts
            .iter()
            .map(|part| match part {
                Part::Text(t) => json!({ "type": "text", "text": t }),
                Part::Thinking(t) => json!({ "type": "thinking", "thinking": t }),
            })
            .collect();

        if message_content.is_empty() {
            return None;
        }

        Some(json!({
            "role": role,
            "content": message_content
        }))
    }

    /// Parse Anthropic response into Content
    fn parse_anthropic_response(response: &serde_json::Value) -> Result<Content> {
        let content_blocks = response["content"]
            .as_array()
            .ok_or_else(|| ModelError::InvalidResponse("No content in Anthropic response".into()))?;

        let mut parts = Vec::new();
        for block in content_blocks {
            match block["type"].as_str() {
                Some("text") => {
                    if let Some(text) = block["text"].as_str().filter(|t| !t.is_empty()) {
                        parts.push(Part::Text(text.to_string()));
                    }
                }
                Some("thinking") => {
                    if let Some(thinking) = block["thinking"].as_str().filter(|t| !t.is_empty()) {
                        parts.push(Part::Thinking(thinking.to_string()));
                    }
                }
                _ => {}
            }
        }

        if let Some(stop_reason) = response["stop_reason"].as_str() {
            log::debug!("Anthropic stop reason: {}", stop_reason);
        }

        Ok(Content {
            role: "model".to_string(),
            parts,
        })
    }
}

#[async_trait]
impl Model for AnthropicModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> Result<Content> {
        let url = format!("{}/messages", self.base_url);

        let messages: Vec<serde_json::Value> = history
            .iter()
            .filter_map(Self::content_to_anthropic_message)
            .collect();

        let mut body = json!({
            "model": self.model_name,
            "messages": messages,
            "max_tokens": config.and_then(|c| c.max_output_tokens).unwrap_or(4096)
        });

        if let Some(cfg) = config {
            if let Some(temp) = cfg.temperature {
                body["temperature"] = json!(temp);
            }
            if let Some(top_p) = cfg.top_p {
                body["top_p"] = json!(top_p);
            }
            if let Some(top_k) = cfg.top_k {
                body["top_k"] = json!(top_k);
            }
        }

        log::debug!(
            "Anthropic request body: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(ScribeError::api("Anthropic", text));
        }

        let resp_json: serde_json::Value = resp.json().await?;
        log::debug!("Anthropic response: {}", resp_json);

        Self::parse_anthropic_response(&resp_json)
    }
}
