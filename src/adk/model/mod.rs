// SPDX-License-Identifier: MIT

//! Model module - defines the LLM model trait and implementations
//!
//! This module provides the core Model trait and shared types.
//! Model implementations are in their own submodules:
//! - [anthropic] - Anthropic's Claude API
//! - [gemini] - Google's Gemini API
//! - [openai] - OpenAI's chat completions API

pub mod anthropic;
pub mod gemini;
pub mod openai;

use crate::adk::error::{ModelError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;

/// Configuration for model generation
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    /// A single-text user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Concatenated text parts, ignoring thinking output
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                Part::Thinking(_) => None,
            })
            .collect()
    }
}

/// Parts of a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Part {
    /// Regular text output from the model
    Text(String),
    /// Thinking/reasoning content from thinking models
    Thinking(String),
}

/// Core trait for LLM model implementations
#[async_trait]
pub trait Model: Send + Sync {
    /// Label used in logs and output file names
    fn name(&self) -> &str;

    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> Result<Content>;

    /// Send a single rendered prompt and return the text of the reply
    async fn complete(&self, prompt: &str, config: Option<&GenerationConfig>) -> Result<String> {
        let response = self
            .generate_content(&[Content::user(prompt)], config)
            .await?;
        let text = response.text();
        if text.is_empty() {
            return Err(ModelError::EmptyResponse.into());
        }
        Ok(text)
    }
}

/// Supported hosted providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Anthropic,
    Gemini,
}

impl Provider {
    /// Parse a provider name as written in config files or `MODEL_PROVIDER`
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "OpenAI" | "openai" => Ok(Provider::OpenAI),
            "Anthropic" | "anthropic" => Ok(Provider::Anthropic),
            "Gemini" | "Google" | "gemini" | "google" => Ok(Provider::Gemini),
            other => Err(ModelError::UnsupportedProvider(other.to_string()).into()),
        }
    }

    /// Infer the provider from a model name prefix
    pub fn infer(model_name: &str) -> Self {
        if model_name.starts_with("gpt")
            || model_name.starts_with("o1")
            || model_name.starts_with("o3")
        {
            Provider::OpenAI
        } else if model_name.starts_with("claude") {
            Provider::Anthropic
        } else {
            Provider::Gemini
        }
    }
}

/// Build a model client.
///
/// Provider resolution: explicit argument > `MODEL_PROVIDER` env > model name prefix.
pub fn create_model(provider: Option<&str>, model_name: &str) -> Result<Arc<dyn Model>> {
    let provider = provider
        .map(str::to_string)
        .or_else(|| env::var("MODEL_PROVIDER").ok());
    let provider = match provider {
        Some(name) => Provider::parse(&name)?,
        None => Provider::infer(model_name),
    };

    log::info!("Using provider: {:?} with model: {}", provider, model_name);

    let model: Arc<dyn Model> = match provider {
        Provider::OpenAI => Arc::new(openai::OpenAIModel::new(model_name.to_string())?),
        Provider::Anthropic => Arc::new(anthropic::AnthropicModel::new(model_name.to_string())?),
        Provider::Gemini => Arc::new(gemini::GeminiModel::new(model_name.to_string())?),
    };
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_provider() {
        assert_eq!(Provider::infer("gpt-4o"), Provider::OpenAI);
        assert_eq!(Provider::infer("o3-mini"), Provider::OpenAI);
        assert_eq!(Provider::infer("claude-3-5-sonnet"), Provider::Anthropic);
        assert_eq!(Provider::infer("gemini-2.0-flash"), Provider::Gemini);
    }

    #[test]
    fn test_parse_provider() {
        assert_eq!(Provider::parse("openai").unwrap(), Provider::OpenAI);
        assert_eq!(Provider::parse("Google").unwrap(), Provider::Gemini);
        assert!(Provider::parse("mistral").is_err());
    }

    #[test]
    fn test_content_text_skips_thinking() {
        let content = Content {
            role: "model".to_string(),
            parts: vec![
                Part::Thinking("hmm".to_string()),
                Part::Text("Hello".to_string()),
                Part::Text(" world".to_string()),
            ],
        };
        assert_eq!(content.text(), "Hello world");
    }

    struct EchoModel;

    #[async_trait]
    impl Model for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate_content(
            &self,
            history: &[Content],
            _config: Option<&GenerationConfig>,
        ) -> Result<Content> {
            Ok(Content {
                role: "model".to_string(),
                parts: vec![Part::Text(history[0].text())],
            })
        }
    }

    #[tokio::test]
    async fn test_complete_returns_text() {
        let text = EchoModel.complete("ping", None).await.unwrap();
        assert_eq!(text, "ping");
    }

    #[tokio::test]
    async fn test_complete_rejects_empty_reply() {
        let err = EchoModel.complete("", None).await.unwrap_err();
        assert!(err.to_string().contains("no text"));
    }
}
