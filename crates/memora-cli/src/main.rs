//! memora: chat with a memory-aware agent from the terminal.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use memora::agent::{AgentBuilder, AgentConfig, MemoryAgent};
use memora::memory::{MemoryConfig, create_store};
use memora::reasoning::Prediction;
use memora::tracking::setup_tracking;

#[derive(Parser)]
#[command(name = "memora", version, about = "Memory-aware AI agent")]
struct Cli {
    /// Agent configuration file (YAML).
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Model as provider/model, e.g. openai/gpt-4o-mini.
    #[arg(long, short)]
    model: Option<String>,

    /// Reasoning system: react, cot or basic.
    #[arg(long, short)]
    reasoning: Option<String>,

    /// Maximum ReAct steps per input.
    #[arg(long)]
    max_iters: Option<usize>,

    /// Memory backend: in-memory, vector or none.
    #[arg(long, default_value = "in-memory")]
    memory: String,

    /// User the memories are scoped to.
    #[arg(long)]
    user: Option<String>,

    /// Enable experiment tracking.
    #[arg(long)]
    observability: bool,

    /// Log the agent as a model run before starting.
    #[arg(long, requires = "observability")]
    log_model: bool,

    /// Run name for --log-model.
    #[arg(long)]
    run_name: Option<String>,

    /// Experiment for --log-model, defaults to the configured one.
    #[arg(long)]
    experiment: Option<String>,

    /// Show the tool trajectory after each answer.
    #[arg(long, short)]
    verbose: bool,

    /// Answer this input and exit instead of starting the REPL.
    input: Option<String>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "memora=info".to_string()))
        .init();
}

fn load_config(cli: &Cli) -> Result<AgentConfig> {
    let mut config = match &cli.config {
        Some(path) => AgentConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => AgentConfig::default(),
    };

    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(max_iters) = cli.max_iters {
        config.max_iters = max_iters;
    }
    if let Some(user) = &cli.user {
        config.default_user_id = user.clone();
    }
    if cli.observability {
        config.observability = true;
    }
    if cli.config.is_none() {
        config.tracking = memora::tracking::TrackingConfig::from_env();
    }
    Ok(config)
}

async fn build_agent(cli: &Cli) -> Result<MemoryAgent> {
    let config = load_config(cli)?;
    let observability = config.observability;
    let tracking = config.tracking.clone();

    let mut builder = AgentBuilder::from_config(config);
    if let Some(reasoning) = &cli.reasoning {
        builder = builder.reasoning_system(reasoning.clone());
    }

    if !cli.memory.eq_ignore_ascii_case("none") {
        let memory_config = MemoryConfig::from_env()?;
        builder = builder.memory(create_store(&cli.memory, &memory_config)?);
    }

    if observability {
        if let Some(tracker) = setup_tracking(&tracking).await {
            builder = builder.tracker(tracker);
        }
    }

    Ok(builder.build()?)
}

fn print_prediction(prediction: &Prediction, verbose: bool) {
    if verbose {
        for (i, step) in prediction.trajectory.iter().enumerate() {
            println!("  [{}] {} {}", i + 1, step.tool_name, step.tool_args);
            println!("      -> {}", step.observation);
        }
        if let Some(reasoning) = &prediction.reasoning {
            println!("  (reasoning: {})", reasoning);
        }
    }

    let response = prediction
        .get("response")
        .map(str::to_string)
        .unwrap_or_else(|| format!("{:?}", prediction.outputs));
    println!("\n[Agent] {}", response);
}

async fn repl(agent: &MemoryAgent, verbose: bool) -> Result<()> {
    println!(":::::Memora ({}, {}):::::", agent.config().model, agent.reasoning_system());
    println!("Commands: /tools, /memories, /log, quit");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("\n[You] > ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "quit" | "exit" => {
                println!("Goodbye!");
                break;
            }
            "/tools" => {
                for info in agent.tools().list_infos() {
                    println!("  {}: {}", info.id, info.description);
                }
            }
            "/memories" => match agent.memory_tools() {
                Some(memory) => match memory.get_all_memories(None).await {
                    Ok(text) => println!("{}", text),
                    Err(e) => eprintln!("Error: {}", e),
                },
                None => println!("Memory is disabled."),
            },
            "/log" => match agent.log_to_mlflow(None, None).await {
                Ok(Some(reference)) => println!("Logged {}", reference.model_uri),
                Ok(None) => println!("Logging failed, see the log output."),
                Err(e) => eprintln!("Error: {}", e),
            },
            _ => match agent.forward(input).await {
                Ok(prediction) => print_prediction(&prediction, verbose),
                Err(e) => eprintln!("Error: {}", e),
            },
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let agent = build_agent(&cli).await?;
    info!(tools = agent.tools().len(), "Agent ready");

    if cli.log_model {
        match agent
            .log_to_mlflow(cli.run_name.as_deref(), cli.experiment.as_deref())
            .await?
        {
            Some(reference) => info!(model_uri = %reference.model_uri, "Model logged"),
            None => warn!("Model was not logged"),
        }
    }

    match &cli.input {
        Some(input) => {
            let prediction = agent.forward(input).await?;
            print_prediction(&prediction, cli.verbose);
            Ok(())
        }
        None => repl(&agent, cli.verbose).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_defaults() {
        let cli = Cli::parse_from([
            "memora",
            "--model",
            "ollama/llama3",
            "--max-iters",
            "3",
            "--user",
            "alice",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.model, "ollama/llama3");
        assert_eq!(config.max_iters, 3);
        assert_eq!(config.default_user_id, "alice");
        assert!(!config.observability);
    }

    #[test]
    fn test_log_model_requires_observability() {
        assert!(Cli::try_parse_from(["memora", "--log-model"]).is_err());
        assert!(Cli::try_parse_from(["memora", "--observability", "--log-model"]).is_ok());
    }

    #[test]
    fn test_one_shot_input() {
        let cli = Cli::parse_from(["memora", "--memory", "none", "What time is it?"]);
        assert_eq!(cli.input.as_deref(), Some("What time is it?"));
        assert_eq!(cli.memory, "none");
    }
}
