// SPDX-License-Identifier: MIT

//! Pipeline stages
//!
//! - `PlanningNode` - asks the model for an outline
//! - `WritingNode` - expands each outline step into prose
//! - `SavingNode` - renders and persists the final document

mod planning;
mod saving;
mod writing;

pub use planning::PlanningNode;
pub use saving::{render_document, SavingNode};
pub use writing::{count_words, plan_steps, trailing_context, WritingNode, FAILURE_MARKER};

use crate::adk::error::Result;
use crate::scribe::state::{StateUpdate, WorkflowState};
use async_trait::async_trait;

/// Core trait for pipeline stages
#[async_trait]
pub trait Node: Send + Sync {
    /// Returns the stage name
    fn name(&self) -> &str;

    /// Read the accumulated state and return the fields this stage changes.
    ///
    /// An `Err` aborts the whole run; recoverable failures belong in the update.
    async fn execute(&self, state: &WorkflowState) -> Result<StateUpdate>;
}
