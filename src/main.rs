use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use dotenv::dotenv;
use scribe_rs::adk::model::create_model;
use scribe_rs::scribe::config::PipelineConfig;
use scribe_rs::scribe::nodes::{Node, PlanningNode};
use scribe_rs::scribe::pipeline::Pipeline;
use scribe_rs::scribe::state::WorkflowState;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Plan, write and save a document
    Write {
        /// The instruction describing the document
        #[arg(short, long)]
        prompt: String,

        #[command(flatten)]
        overrides: ConfigOverrides,
    },
    /// Only generate and print the plan
    Plan {
        /// The instruction describing the document
        #[arg(short, long)]
        prompt: String,

        #[command(flatten)]
        overrides: ConfigOverrides,
    },
}

#[derive(ClapArgs, Debug)]
struct ConfigOverrides {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// The model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Model provider (openai, anthropic, gemini); inferred from the model when omitted
    #[arg(long)]
    provider: Option<String>,

    /// Directory containing plan.txt and write.txt
    #[arg(long)]
    prompts_dir: Option<PathBuf>,

    /// Directory the document is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Maximum number of plan steps to expand
    #[arg(long)]
    max_steps: Option<usize>,

    /// Characters of previous output passed as context to each step
    #[arg(long)]
    context_chars: Option<usize>,
}

impl ConfigOverrides {
    fn resolve(self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(model) = self.model {
            config.model = model;
        }
        if self.provider.is_some() {
            config.provider = self.provider;
        }
        if let Some(dir) = self.prompts_dir {
            config.prompts_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        if let Some(context_chars) = self.context_chars {
            config.context_chars = context_chars;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Write { prompt, overrides } => {
            let config = overrides.resolve()?;
            let model = create_model(config.provider.as_deref(), &config.model)?;
            let pipeline = Pipeline::from_config(&config, model)?;

            let state = pipeline.run(prompt).await?;

            if state.failed {
                anyhow::bail!(
                    "Writing failed: {}",
                    state.final_doc.as_deref().unwrap_or_default()
                );
            }

            println!(
                "Wrote {} words across {} sections to {}",
                state.word_count.unwrap_or_default(),
                state.steps_processed.unwrap_or_default(),
                config.output_dir.display()
            );
            for error in state.errors.iter().flatten() {
                eprintln!("warning: {}", error);
            }
        }
        Commands::Plan { prompt, overrides } => {
            let config = overrides.resolve()?;
            let model = create_model(config.provider.as_deref(), &config.model)?;
            let planner = PlanningNode::from_file(
                model,
                config.plan_template_path(),
                config.generation_config(),
            )?;

            let update = planner.execute(&WorkflowState::new(prompt)).await?;
            println!("{}", update.plan.unwrap_or_default());
        }
    }

    Ok(())
}
