// SPDX-License-Identifier: MIT

//! Writing stage - expands each plan step into prose
//!
//! Steps are generated one at a time. Each call sees the instruction, the
//! current step and the tail of everything written so far. A failing step
//! leaves a placeholder in the document and an entry in `errors`; only
//! missing inputs, an oversized plan or a broken template stop the stage.

use super::Node;
use crate::adk::error::{Result, ScribeError};
use crate::adk::model::{GenerationConfig, Model};
use crate::scribe::config::{DEFAULT_CONTEXT_CHARS, DEFAULT_MAX_STEPS};
use crate::scribe::prompt::PromptTemplate;
use crate::scribe::state::{StateUpdate, WorkflowState};
use async_trait::async_trait;
use minijinja::context;
use std::path::Path;
use std::sync::Arc;

/// Prefix of `final_doc` when the stage could not run
pub const FAILURE_MARKER: &str = "[WRITING FAILED]";

const SECTION_SEPARATOR: &str = "\n\n";

/// Expands a plan into a document
pub struct WritingNode {
    model: Arc<dyn Model>,
    template: PromptTemplate,
    generation: GenerationConfig,
    max_steps: usize,
    context_chars: usize,
}

/// Result of a completed writing pass
#[derive(Debug)]
struct Draft {
    document: String,
    steps_processed: usize,
    errors: Vec<String>,
}

impl WritingNode {
    pub fn new(
        model: Arc<dyn Model>,
        template: PromptTemplate,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            model,
            template,
            generation,
            max_steps: DEFAULT_MAX_STEPS,
            context_chars: DEFAULT_CONTEXT_CHARS,
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

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_context_chars(mut self, context_chars: usize) -> Self {
        self.context_chars = context_chars;
        self
    }

    async fn write(&self, state: &WorkflowState) -> Result<Draft> {
        let instructions = state.initial_prompt();
        if instructions.is_empty() {
            return Err(ScribeError::MissingField("initial_prompt"));
        }
        let plan = state
            .plan
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(ScribeError::MissingField("plan"))?;

        let steps = plan_steps(plan);
        if steps.len() > self.max_steps {
            return Err(ScribeError::other(format!(
                "plan has {} steps, exceeding the limit of {}",
                steps.len(),
                self.max_steps
            )));
        }

        let total = steps.len();
        let mut document = String::new();
        let mut errors = Vec::new();

        for (i, step) in steps.iter().enumerate() {
            log::info!("Writing step {}/{}: {}", i + 1, total, step);

            let prompt = self.template.render(context! {
                instructions => instructions,
                step => step,
                context => trailing_context(&document, self.context_chars),
                index => i + 1,
                total => total,
            })?;

            let section = match self.model.complete(&prompt, Some(&self.generation)).await {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Step {} ('{}') failed: {}", i + 1, step, e);
                    errors.push(format!("Step {} ('{}'): {}", i + 1, step, e));
                    format!("[Section generation failed: {}]", step)
                }
            };

            // Every step after the first is separated, even if a reply was blank
            if i > 0 {
                document.push_str(SECTION_SEPARATOR);
            }
            document.push_str(&section);
        }

        Ok(Draft {
            document,
            steps_processed: total,
            errors,
        })
    }
}

#[async_trait]
impl Node for WritingNode {
    fn name(&self) -> &str {
        "writing"
    }

    async fn execute(&self, state: &WorkflowState) -> Result<StateUpdate> {
        match self.write(state).await {
            Ok(draft) => {
                let word_count = count_words(&draft.document);
                log::info!(
                    "Wrote {} steps ({} words, {} failed)",
                    draft.steps_processed,
                    word_count,
                    draft.errors.len()
                );
                Ok(StateUpdate {
                    final_doc: Some(draft.document),
                    word_count: Some(word_count),
                    steps_processed: Some(draft.steps_processed),
                    num_steps: Some(state.num_steps + 1),
                    errors: (!draft.errors.is_empty()).then_some(draft.errors),
                    failed: Some(false),
                    ..Default::default()
                })
            }
            Err(e) => {
                log::error!("Writing stage failed: {}", e);
                Ok(StateUpdate {
                    final_doc: Some(format!("{} {}", FAILURE_MARKER, e)),
                    word_count: Some(0),
                    steps_processed: Some(0),
                    failed: Some(true),
                    ..Default::default()
                })
            }
        }
    }
}

/// Split a plan into its non-empty, trimmed lines
pub fn plan_steps(plan: &str) -> Vec<String> {
    plan.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// The last `max_chars` characters of `text`
pub fn trailing_context(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return "";
    }
    match text.char_indices().rev().nth(max_chars - 1) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

/// Whitespace-separated token count
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scribe::nodes::test_support::ScriptedModel;

    const TEMPLATE: &str = "{{ instructions }}|{{ step }}|{{ context }}";

    fn writer(model: Arc<ScriptedModel>) -> WritingNode {
        let template = PromptTemplate::new("write", TEMPLATE).unwrap();
        WritingNode::new(model, template, GenerationConfig::default())
    }

    fn planned_state(plan: &str) -> WorkflowState {
        let mut state = WorkflowState::new("Write a haiku about autumn");
        state.plan = Some(plan.to_string());
        state.num_steps = 1;
        state
    }

    fn step_of(prompt: &str) -> String {
        prompt.split('|').nth(1).unwrap_or_default().to_string()
    }

    #[test]
    fn test_plan_steps_normalizes() {
        let steps = plan_steps("  Intro  \n\n\n\tBody\r\n   \nConclusion\n");
        assert_eq!(steps, vec!["Intro", "Body", "Conclusion"]);
        assert!(plan_steps("\n  \n").is_empty());
    }

    #[test]
    fn test_trailing_context() {
        assert_eq!(trailing_context("abcdef", 3), "def");
        assert_eq!(trailing_context("abc", 10), "abc");
        assert_eq!(trailing_context("abc", 0), "");
        // Counted in characters, not bytes
        assert_eq!(trailing_context("héllo wörld", 5), "wörld");
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("A.\n\nB.\n\nC."), 3);
        assert_eq!(count_words("  one two\tthree\n"), 3);
        assert_eq!(count_words(""), 0);
    }

    #[tokio::test]
    async fn test_all_steps_succeed() {
        let model = Arc::new(ScriptedModel::new(|prompt| {
            Ok(match step_of(prompt).as_str() {
                "Intro" => "A.",
                "Body" => "B.",
                _ => "C.",
            }
            .to_string())
        }));
        let node = writer(model.clone());

        let update = node
            .execute(&planned_state("Intro\nBody\nConclusion"))
            .await
            .unwrap();

        assert_eq!(update.final_doc.as_deref(), Some("A.\n\nB.\n\nC."));
        assert_eq!(update.word_count, Some(3));
        assert_eq!(update.steps_processed, Some(3));
        assert_eq!(update.num_steps, Some(2));
        assert_eq!(update.errors, None);
        assert_eq!(update.failed, Some(false));
        assert_eq!(model.prompts().len(), 3);
    }

    #[tokio::test]
    async fn test_context_is_previous_output() {
        let model = Arc::new(ScriptedModel::new(|prompt| Ok(format!("<{}>", step_of(prompt)))));
        let node = writer(model.clone());

        node.execute(&planned_state("One\nTwo\nThree")).await.unwrap();

        let prompts = model.prompts();
        assert_eq!(prompts[0], "Write a haiku about autumn|One|");
        assert_eq!(prompts[1], "Write a haiku about autumn|Two|<One>");
        assert_eq!(prompts[2], "Write a haiku about autumn|Three|<One>\n\n<Two>");
    }

    #[tokio::test]
    async fn test_context_is_truncated() {
        let model = Arc::new(ScriptedModel::new(|_| Ok("0123456789".to_string())));
        let node = writer(model.clone()).with_context_chars(4);

        node.execute(&planned_state("One\nTwo")).await.unwrap();

        assert_eq!(model.prompts()[1], "Write a haiku about autumn|Two|6789");
    }

    #[tokio::test]
    async fn test_single_step_failure_is_contained() {
        let model = Arc::new(ScriptedModel::new(|prompt| match step_of(prompt).as_str() {
            "Body" => Err("upstream timeout".to_string()),
            step => Ok(format!("{} text.", step)),
        }));
        let node = writer(model);

        let update = node
            .execute(&planned_state("Intro\nBody\nConclusion"))
            .await
            .unwrap();

        let doc = update.final_doc.unwrap();
        let segments: Vec<&str> = doc.split("\n\n").collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], "Intro text.");
        assert_eq!(segments[1], "[Section generation failed: Body]");
        assert_eq!(segments[2], "Conclusion text.");

        let errors = update.errors.unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Body"));
        assert!(errors[0].contains("upstream timeout"));
        assert_eq!(update.failed, Some(false));
        assert_eq!(update.steps_processed, Some(3));
    }

    #[tokio::test]
    async fn test_blank_first_reply_keeps_every_segment() {
        let model = Arc::new(ScriptedModel::new(|prompt| {
            Ok(match step_of(prompt).as_str() {
                "Intro" => "  \n",
                "Body" => "B.",
                _ => "C.",
            }
            .to_string())
        }));
        let node = writer(model);

        let update = node
            .execute(&planned_state("Intro\nBody\nConclusion"))
            .await
            .unwrap();

        // Three segments: the blank reply still gets its separator
        assert_eq!(
            update.final_doc.as_deref(),
            Some(["  \n", "B.", "C."].join(SECTION_SEPARATOR).as_str())
        );
        assert_eq!(update.word_count, Some(2));
        assert_eq!(update.steps_processed, Some(3));
    }

    #[tokio::test]
    async fn test_replies_are_appended_verbatim() {
        let model = Arc::new(ScriptedModel::new(|prompt| {
            Ok(match step_of(prompt).as_str() {
                "Intro" => " Leading space.",
                "Body" => "\t",
                _ => "Trailing space. ",
            }
            .to_string())
        }));
        let node = writer(model);

        let update = node
            .execute(&planned_state("Intro\nBody\nConclusion"))
            .await
            .unwrap();

        assert_eq!(
            update.final_doc.as_deref(),
            Some(" Leading space.\n\n\t\n\nTrailing space. ")
        );
        assert_eq!(update.word_count, Some(4));
        assert_eq!(update.errors, None);
    }

    #[tokio::test]
    async fn test_plan_over_limit_is_fatal() {
        let model = Arc::new(ScriptedModel::new(|_| Ok("x".to_string())));
        let node = writer(model.clone()).with_max_steps(2);

        let update = node
            .execute(&planned_state("One\nTwo\nThree"))
            .await
            .unwrap();

        assert!(update.final_doc.unwrap().starts_with(FAILURE_MARKER));
        assert_eq!(update.word_count, Some(0));
        assert_eq!(update.steps_processed, Some(0));
        assert_eq!(update.failed, Some(true));
        assert_eq!(update.num_steps, None);
        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_missing_plan_is_fatal() {
        let model = Arc::new(ScriptedModel::new(|_| Ok("x".to_string())));
        let node = writer(model);

        let update = node
            .execute(&WorkflowState::new("Write something"))
            .await
            .unwrap();

        let doc = update.final_doc.unwrap();
        assert!(doc.starts_with(FAILURE_MARKER));
        assert!(doc.contains("plan"));
        assert_eq!(update.failed, Some(true));
    }

    #[tokio::test]
    async fn test_blank_plan_yields_empty_document() {
        let model = Arc::new(ScriptedModel::new(|_| Ok("x".to_string())));
        let node = writer(model.clone());

        let update = node.execute(&planned_state("\n \n")).await.unwrap();

        assert_eq!(update.final_doc.as_deref(), Some(""));
        assert_eq!(update.word_count, Some(0));
        assert_eq!(update.steps_processed, Some(0));
        assert_eq!(update.failed, Some(false));
        assert!(model.prompts().is_empty());
    }
}
