// SPDX-License-Identifier: MIT

//! Saving stage - writes the finished document to disk

use super::Node;
use crate::adk::error::{Result, ScribeError};
use crate::scribe::config::DEFAULT_BASE_NAME;
use crate::scribe::state::{StateUpdate, WorkflowState};
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use std::path::{Path, PathBuf};

/// Persists the rendered document as `{base}_{model}_{timestamp}.md`.
///
/// Two saves within the same second with the same labels overwrite each other.
pub struct SavingNode {
    output_dir: PathBuf,
    base_name: String,
    model_label: String,
}

impl SavingNode {
    pub fn new(output_dir: impl Into<PathBuf>, model_name: &str) -> Self {
        Self {
            output_dir: output_dir.into(),
            base_name: DEFAULT_BASE_NAME.to_string(),
            model_label: sanitize_label(model_name),
        }
    }

    pub fn with_base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = base_name.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// File name for a document saved at `at`
    pub fn file_name<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        format!(
            "{}_{}_{}.md",
            self.base_name,
            self.model_label,
            at.format("%Y%m%d_%H%M%S")
        )
    }

    /// Render and write the document, returning the path written
    pub async fn save(&self, prompt: &str, final_doc: &str, word_count: usize) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let path = self.output_dir.join(self.file_name(&Local::now()));
        let rendered = render_document(prompt, final_doc, word_count);
        tokio::fs::write(&path, rendered).await?;

        Ok(path)
    }
}

#[async_trait]
impl Node for SavingNode {
    fn name(&self) -> &str {
        "saving"
    }

    async fn execute(&self, state: &WorkflowState) -> Result<StateUpdate> {
        let final_doc = state
            .final_doc
            .as_deref()
            .ok_or(ScribeError::MissingField("final_doc"))?;
        let word_count = state
            .word_count
            .ok_or(ScribeError::MissingField("word_count"))?;

        let path = self
            .save(state.initial_prompt(), final_doc, word_count)
            .await?;
        log::info!("Saved document to {}", path.display());

        Ok(StateUpdate {
            num_steps: Some(state.num_steps + 1),
            ..Default::default()
        })
    }
}

/// Wrap the document body with a heading, the prompt and a word-count footer
pub fn render_document(prompt: &str, final_doc: &str, word_count: usize) -> String {
    format!(
        "# Generated Document\n\n## Prompt\n\n{}\n\n## Content\n\n{}\n\n---\n\n**Word count**: {}\n",
        prompt, final_doc, word_count
    )
}

fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect()
}
