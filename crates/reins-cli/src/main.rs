mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use reins_agent::{ChatConfig, ChatProposer, Controller, ToolSet};
use reins_core::RunSpec;

#[derive(Parser)]
#[command(
    name = "reins",
    about = "Requirement-governed agent runner: declarative control over tool order and frequency",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a run spec against the built-in tool catalog
    Check {
        /// Path to the run spec (YAML)
        spec: PathBuf,
    },

    /// Execute a task under the spec's requirements
    Run {
        /// Path to the run spec (YAML)
        spec: PathBuf,

        /// The task to solve
        #[arg(long)]
        task: String,

        /// OpenAI-compatible endpoint base URL
        #[arg(long, env = "REINS_BASE_URL", default_value = "https://api.openai.com/v1")]
        base_url: String,

        /// Model name
        #[arg(long, env = "REINS_MODEL", default_value = "gpt-4o-mini")]
        model: String,

        /// API key (omit for keyless local endpoints)
        #[arg(long, env = "REINS_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Check { spec } => check(&spec, cli.json),
        Commands::Run {
            spec,
            task,
            base_url,
            model,
            api_key,
        } => run(&spec, &task, base_url, model, api_key, cli.json).await,
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn load_spec(path: &PathBuf) -> anyhow::Result<RunSpec> {
    RunSpec::load(path).with_context(|| format!("load {}", path.display()))
}

fn check(path: &PathBuf, json: bool) -> anyhow::Result<()> {
    let spec = load_spec(path)?;
    let tools = ToolSet::builtin()?;
    let set = spec.compile(&tools.catalog())?;

    if json {
        output::print_json(&set)?;
    } else {
        println!(
            "OK: {} requirement(s) over {} action(s), step budget {}",
            set.requirements().len(),
            set.catalog().len(),
            spec.step_budget
        );
    }
    Ok(())
}

async fn run(
    path: &PathBuf,
    task: &str,
    base_url: String,
    model: String,
    api_key: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let spec = load_spec(path)?;
    let tools = ToolSet::builtin()?;
    let proposer = ChatProposer::new(
        ChatConfig {
            base_url,
            model,
            api_key,
            temperature: 0.0,
        },
        &tools,
    );
    let controller = Controller::new(&spec, tools, Box::new(proposer))?;

    let report = controller.run(task).await?;
    if json {
        output::print_json(&report)?;
    } else {
        output::print_report(&report);
    }
    Ok(())
}
