// SPDX-License-Identifier: MIT

//! Pipeline configuration
//!
//! Loaded from an optional YAML file; every field has a default so an empty
//! file (or no file) yields a working configuration.

use crate::adk::error::{Result, ScribeError};
use crate::adk::model::GenerationConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_STEPS: usize = 50;
pub const DEFAULT_CONTEXT_CHARS: usize = 4000;
pub const DEFAULT_BASE_NAME: &str = "document";

/// Planning template file name inside `prompts_dir`
pub const PLAN_TEMPLATE_FILE: &str = "plan.txt";
/// Writing template file name inside `prompts_dir`
pub const WRITE_TEMPLATE_FILE: &str = "write.txt";

/// Settings for one pipeline run
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Model name passed to the provider
    pub model: String,
    /// Provider name; inferred from `model` when absent
    pub provider: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    /// Nucleus sampling cutoff, left to the provider when absent
    pub top_p: Option<f32>,
    /// Top-k sampling; OpenAI ignores it
    pub top_k: Option<u32>,
    /// Directory holding `plan.txt` and `write.txt`
    pub prompts_dir: PathBuf,
    /// Directory the saved documents are written to
    pub output_dir: PathBuf,
    /// Leading label of output file names
    pub base_name: String,
    /// Upper bound on plan steps the writer accepts
    pub max_steps: usize,
    /// Trailing characters of generated text fed back as context
    pub context_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            provider: None,
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: None,
            top_p: None,
            top_k: None,
            prompts_dir: PathBuf::from("prompts"),
            output_dir: PathBuf::from("output"),
            base_name: DEFAULT_BASE_NAME.to_string(),
            max_steps: DEFAULT_MAX_STEPS,
            context_chars: DEFAULT_CONTEXT_CHARS,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ScribeError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::parse_yaml(&content)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse a configuration from a YAML string
    pub fn parse_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: PipelineConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ScribeError::config("model must not be empty"));
        }
        if self.max_steps == 0 {
            return Err(ScribeError::config("max_steps must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ScribeError::config(format!(
                "temperature {} is outside 0.0..=2.0",
                self.temperature
            )));
        }
        if let Some(top_p) = self.top_p {
            if !(top_p > 0.0 && top_p <= 1.0) {
                return Err(ScribeError::config(format!(
                    "top_p {} is outside (0.0, 1.0]",
                    top_p
                )));
            }
        }
        Ok(())
    }

    /// Generation settings passed to every model call
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: Some(self.temperature),
            max_output_tokens: self.max_output_tokens,
            top_p: self.top_p,
            top_k: self.top_k,
        }
    }

    pub fn plan_template_path(&self) -> PathBuf {
        self.prompts_dir.join(PLAN_TEMPLATE_FILE)
    }

    pub fn write_template_path(&self) -> PathBuf {
        self.prompts_dir.join(WRITE_TEMPLATE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_steps, 50);
        assert_eq!(config.context_chars, 4000);
        assert_eq!(config.plan_template_path(), PathBuf::from("prompts/plan.txt"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
model: claude-3-5-sonnet-latest
provider: anthropic
output_dir: /tmp/docs
max_steps: 8
"#;
        let config = PipelineConfig::parse_yaml(yaml).unwrap();
        assert_eq!(config.model, "claude-3-5-sonnet-latest");
        assert_eq!(config.provider.as_deref(), Some("anthropic"));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/docs"));
        assert_eq!(config.max_steps, 8);
        // Unset fields keep their defaults
        assert_eq!(config.context_chars, 4000);
        assert_eq!(config.base_name, "document");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = PipelineConfig::parse_yaml("  \n").unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_rejects_zero_max_steps() {
        let err = PipelineConfig::parse_yaml("max_steps: 0").unwrap_err();
        assert!(err.to_string().contains("max_steps"));
    }

    #[test]
    fn test_rejects_out_of_range_temperature() {
        assert!(PipelineConfig::parse_yaml("temperature: 3.5").is_err());
    }

    #[test]
    fn test_generation_config() {
        let config = PipelineConfig {
            max_output_tokens: Some(2048),
            ..Default::default()
        };
        let generation = config.generation_config();
        assert_eq!(generation.temperature, Some(0.7));
        assert_eq!(generation.max_output_tokens, Some(2048));
        assert_eq!(generation.top_p, None);
        assert_eq!(generation.top_k, None);
    }

    #[test]
    fn test_sampling_settings_reach_generation_config() {
        let config = PipelineConfig::parse_yaml("top_p: 0.9\ntop_k: 40").unwrap();
        let generation = config.generation_config();
        assert_eq!(generation.top_p, Some(0.9));
        assert_eq!(generation.top_k, Some(40));
    }

    #[test]
    fn test_rejects_out_of_range_top_p() {
        let err = PipelineConfig::parse_yaml("top_p: 1.5").unwrap_err();
        assert!(err.to_string().contains("top_p"));
        assert!(PipelineConfig::parse_yaml("top_p: 0.0").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = PipelineConfig::load("/nonexistent/scribe.yaml").unwrap_err();
        assert!(matches!(err, ScribeError::Config(_)));
    }
}
