// SPDX-License-Identifier: MIT

//! Sequential pipeline runner
//!
//! Runs stages in order, merging each stage's update into the state before
//! the next one starts. A stage that sets `failed` ends the run early; a
//! stage that returns `Err` aborts it.

use crate::adk::error::Result;
use crate::adk::model::Model;
use crate::scribe::config::PipelineConfig;
use crate::scribe::nodes::{Node, PlanningNode, SavingNode, WritingNode};
use crate::scribe::state::WorkflowState;
use std::sync::Arc;

/// Ordered list of stages sharing one state record
pub struct Pipeline {
    stages: Vec<Arc<dyn Node>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Arc<dyn Node>>) -> Self {
        Self { stages }
    }

    /// Build the planning → writing → saving pipeline.
    ///
    /// Both prompt templates are read here; a missing file fails construction.
    pub fn from_config(config: &PipelineConfig, model: Arc<dyn Model>) -> Result<Self> {
        config.validate()?;
        let generation = config.generation_config();

        let planner = PlanningNode::from_file(
            model.clone(),
            config.plan_template_path(),
            generation.clone(),
        )?;
        let writer = WritingNode::from_file(model, config.write_template_path(), generation)?
            .with_max_steps(config.max_steps)
            .with_context_chars(config.context_chars);
        let saver = SavingNode::new(&config.output_dir, &config.model)
            .with_base_name(config.base_name.clone());

        Ok(Self::new(vec![
            Arc::new(planner),
            Arc::new(writer),
            Arc::new(saver),
        ]))
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage for `initial_prompt` and return the final state
    pub async fn run(&self, initial_prompt: impl Into<String>) -> Result<WorkflowState> {
        let mut state = WorkflowState::new(initial_prompt);

        for (i, stage) in self.stages.iter().enumerate() {
            log::info!(
                "Running stage {}/{}: {}",
                i + 1,
                self.stages.len(),
                stage.name()
            );

            let update = stage.execute(&state).await.map_err(|e| {
                log::error!("Stage {} aborted the run: {}", stage.name(), e);
                e
            })?;
            state.apply(update);

            if state.failed {
                log::warn!(
                    "Stage {} reported a fatal condition; skipping remaining stages",
                    stage.name()
                );
                break;
            }
            log::info!("Stage {} completed", stage.name());
        }

        log::debug!("Final state: {}", state.to_json());
        Ok(state)
    }
}
