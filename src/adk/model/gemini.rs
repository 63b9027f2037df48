// SPDX-License-Identifier: MIT

//! Gemini Model - Google's Gemini API implementation

use super::{Content, GenerationConfig, Model, Part};
use crate::adk::error::{ModelError, Result, ScribeError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::env;

/// Google Gemini model implementation
pub struct GeminiModel {
    client: Client,
    api_key: String,
    model_name: String,
}

impl GeminiModel {
    /// Create a new GeminiModel
    ///
    /// Requires `GOOGLE_API_KEY` environment variable to be set.
    pub fn new(model_name: String) -> Result<Self> {
        let api_key = env::var("GOOGLE_API_KEY")
            .map_err(|_| ModelError::ApiKeyMissing("Gemini".to_string()))?;
        Ok(Self {
            client: Client::new(),
            api_key,
            model_name,
        })
    }

    fn build_request_body(
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> serde_json::Value {
        let contents: Vec<serde_json::Value> = history
            .iter()
            .map(|c| {
                let parts: Vec<serde_json::Value> =
                    c.parts.iter().filter_map(part_to_gemini_json).collect();
                json!({ "role": c.role, "parts": parts })
            })
            .collect();

        let mut body = json!({ "contents": contents });

        if let Some(cfg) = config {
            let mut generation = serde_json::Map::new();
            if let Some(temp) = cfg.temperature {
                generation.insert("temperature".to_string(), json!(temp));
            }
            if let Some(max_tokens) = cfg.max_output_tokens {
                generation.insert("maxOutputTokens".to_string(), json!(max_tokens));
            }
            if let Some(top_p) = cfg.top_p {
                generation.insert("topP".to_string(), json!(top_p));
            }
            if let Some(top_k) = cfg.top_k {
                generation.insert("topK".to_string(), json!(top_k));
            }
            if !generation.is_empty() {
                body["generationConfig"] = serde_json::Value::Object(generation);
            }
        }

        body
    }

    fn parse_gemini_response(resp_json: &serde_json::Value) -> Result<Content> {
        let candidate = resp_json["candidates"]
            .as_array()
            .and_then(|c| c.first())
            .ok_or_else(|| ModelError::InvalidResponse("No candidates in response".into()))?;

        if let Some(finish_reason) = candidate.get("finishReason").and_then(|v| v.as_str()) {
            log::debug!("Gemini finish reason: {}", finish_reason);
            if finish_reason == "SAFETY" {
                return Err(ScribeError::api(
                    "Gemini",
                    "blocked response due to safety filters",
                ));
            }
        }

        let parts_json = candidate["content"]["parts"].as_array().ok_or_else(|| {
            log::error!("No parts in candidate. Full response: {}", resp_json);
            ModelError::InvalidResponse(format!("No content in Gemini candidate: {}", candidate))
        })?;

        Ok(Content {
            role: "model".to_string(),
            parts: parts_json.iter().flat_map(parse_gemini_part).collect(),
        })
    }
}

#[async_trait]
impl Model for GeminiModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> Result<Content> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model_name, self.api_key
        );

        let body = Self::build_request_body(history, config);
        log::debug!(
            "Gemini request body: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let resp = self.client.post(&url).json(&body).send().await?;

        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(ScribeError::api("Gemini", text));
        }

        let resp_json: serde_json::Value = resp.json().await?;
        log::debug!("Gemini response: {}", resp_json);

        Self::parse_gemini_response(&resp_json)
    }
}

/// Serialize a Part to Gemini API JSON format
/// Returns None for parts that shouldn't be sent (e.g., Thinking)
pub fn part_to_gemini_json(part: &Part) -> Option<serde_json::Value> {
    match part {
        Part::Text(t) => Some(json!({ "text": t })),
        Part::Thinking(_) => None,
    }
}

/// Parse a Gemini API JSON part into Parts
pub fn parse_gemini_part(p: &serde_json::Value) -> Vec<Part> {
    let mut parts = Vec::new();

    if let Some(thought) = p.get("thought").and_then(|t| t.as_str()) {
        if !thought.is_empty() {
            parts.push(Part::Thinking(thought.to_string()));
        }
    }

    if let Some(text) = p["text"].as_str() {
        parts.push(Part::Text(text.to_string()));
    }

    parts
}
