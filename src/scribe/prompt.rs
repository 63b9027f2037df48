// SPDX-License-Identifier: MIT

//! Prompt templates rendered with minijinja.
//!
//! Templates are read once when a stage is constructed and checked for
//! syntax errors immediately, so a broken file fails setup rather than the
//! first model call.

use crate::adk::error::{Result, ScribeError};
use minijinja::Environment;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// A named prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: String,
    source: String,
}

impl PromptTemplate {
    /// Build a template from source text, validating its syntax
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let source = source.into();
        Environment::new()
            .template_from_str(&source)
            .map_err(|e| ScribeError::template(&name, e))?;
        Ok(Self { name, source })
    }

    /// Read and validate a template file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            ScribeError::template(
                path.display().to_string(),
                format!("failed to load prompt template: {}", e),
            )
        })?;
        log::debug!("Loaded prompt template {}", path.display());
        Self::new(path.display().to_string(), source)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the template with the given context values
    pub fn render<S: Serialize>(&self, ctx: S) -> Result<String> {
        Environment::new()
            .render_str(&self.source, ctx)
            .map_err(|e| ScribeError::template(&self.name, e))
    }
}
