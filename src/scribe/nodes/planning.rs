// SPDX-License-Identifier: MIT

//! Planning stage - turns the user's instruction into an outline

use super::Node;
use crate::adk::error::Result;
use crate::adk::model::{GenerationConfig, Model};
use crate::scribe::prompt::PromptTemplate;
use crate::scribe::state::{StateUpdate, WorkflowState};
use async_trait::async_trait;
use minijinja::context;
use std::path::Path;
use std::sync::Arc;

/// Produces a newline-delimited plan of section headings.
///
/// Never fails: if the model call errors, the error text becomes the plan.
pub struct PlanningNode {
    model: Arc<dyn Model>,
    template: PromptTemplate,
    generation: GenerationConfig,
}

impl PlanningNode {
    pub fn new(
        model: Arc<dyn Model>,
        template: PromptTemplate,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            model,
            template,
            generation,
        }
    }

    /// Build the stage from a template file, failing if it cannot be read
    pub fn from_file<P: AsRef<Path>>(
        model: Arc<dyn Model>,
        template_path: P,
        generation: GenerationConfig,
    ) -> Result<Self> {
        Ok(Self::new(model, PromptTemplate::load(template_path)?, generation))
    }

    async fn generate_plan(&self, instructions: &str) -> Result<String> {
        let prompt = self.template.render(context! { instructions => instructions })?;
        self.model.complete(&prompt, Some(&self.generation)).await
    }
}

#[async_trait]
impl Node for PlanningNode {
    fn name(&self) -> &str {
        "planning"
    }

    async fn execute(&self, state: &WorkflowState) -> Result<StateUpdate> {
        log::info!("Generating plan with model {}", self.model.name());

        let plan = match self.generate_plan(state.initial_prompt()).await {
            Ok(plan) => {
                log::info!("Plan received ({} lines)", plan.lines().count());
                log::debug!("Plan:\n{}", plan);
                plan
            }
            Err(e) => {
                log::error!("Planning failed: {}", e);
                e.to_string()
            }
        };

        Ok(StateUpdate {
            plan: Some(plan),
            num_steps: Some(state.num_steps + 1),
            ..Default::default()
        })
    }
}
