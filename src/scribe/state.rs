// SPDX-License-Identifier: MIT

//! Runtime state threaded through the pipeline
//!
//! Stages never mutate the state directly. Each returns a [`StateUpdate`]
//! and the runner merges it with a shallow per-field overwrite.

use serde::{Deserialize, Serialize};

/// Accumulated record of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    initial_prompt: String,
    pub plan: Option<String>,
    pub final_doc: Option<String>,
    pub word_count: Option<usize>,
    pub steps_processed: Option<usize>,
    /// Stages completed so far
    pub num_steps: usize,
    /// Per-step failures reported by the writer
    pub errors: Option<Vec<String>>,
    /// Set when a stage hit a fatal condition
    pub failed: bool,
}

/// Partial update returned by a stage; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub plan: Option<String>,
    pub final_doc: Option<String>,
    pub word_count: Option<usize>,
    pub steps_processed: Option<usize>,
    pub num_steps: Option<usize>,
    pub errors: Option<Vec<String>>,
    pub failed: Option<bool>,
}

impl WorkflowState {
    /// Create the state for a new run with only the prompt set
    pub fn new(initial_prompt: impl Into<String>) -> Self {
        Self {
            initial_prompt: initial_prompt.into(),
            ..Default::default()
        }
    }

    pub fn initial_prompt(&self) -> &str {
        &self.initial_prompt
    }

    /// Merge a stage update into the state
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(plan) = update.plan {
            self.plan = Some(plan);
        }
        if let Some(doc) = update.final_doc {
            self.final_doc = Some(doc);
        }
        if let Some(count) = update.word_count {
            self.word_count = Some(count);
        }
        if let Some(processed) = update.steps_processed {
            self.steps_processed = Some(processed);
        }
        if let Some(n) = update.num_steps {
            if n < self.num_steps {
                log::warn!(
                    "Ignoring num_steps update {} lower than current {}",
                    n,
                    self.num_steps
                );
            } else {
                self.num_steps = n;
            }
        }
        if let Some(errors) = update.errors {
            self.errors = Some(errors);
        }
        if let Some(failed) = update.failed {
            self.failed = failed;
        }
    }

    /// Convert state to a JSON object for logging
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
