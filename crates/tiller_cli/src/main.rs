use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use std::sync::Arc;
use tiller_core::TillerConfig;
use tiller_graph::{AgentGraph, CompletionParams, LlmClient, RunOutcome};
use tiller_graph::providers::{MockClient, OpenAiCompatClient};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long, default_value = "tiller.toml")]
    config: String,

    /// Provider id: "deepseek", "openai", or "mock"
    #[arg(long)]
    provider: Option<String>,

    /// Model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum decision steps per run
    #[arg(long)]
    max_steps: Option<u32>,

    /// Run a single request and exit instead of starting the prompt loop
    #[arg(short, long)]
    request: Option<String>,

    /// Print the full run transcript as JSON after each answer
    #[arg(long)]
    show_transcript: bool,
}

fn build_client(config: &TillerConfig) -> Result<Arc<dyn LlmClient>> {
    match config.llm.provider.as_str() {
        "mock" => Ok(Arc::new(MockClient::canned())),
        _ => Ok(Arc::new(OpenAiCompatClient::new(&config.llm)?)),
    }
}

async fn run_once(graph: &AgentGraph, request: &str, max_steps: u32, show_transcript: bool) {
    let report = graph.run(request, max_steps).await;
    match &report.outcome {
        RunOutcome::Done(answer) => println!("\n{}\n", answer),
        RunOutcome::Failed(reason) => println!("\n[run failed]: {}\n", reason),
    }
    if show_transcript {
        match serde_json::to_string_pretty(&report.transcript) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!("failed to serialize transcript: {}", e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = TillerConfig::load_or_default(&args.config);
    if let Some(provider) = args.provider {
        config.llm.provider = provider;
    }
    if let Some(model) = args.model {
        config.llm.model = model;
    }
    if let Some(max_steps) = args.max_steps {
        config.run.max_steps = max_steps;
    }

    info!(
        provider = %config.llm.provider,
        model = %config.llm.model,
        max_steps = config.run.max_steps,
        "starting agent"
    );

    let client = build_client(&config)?;
    let params = CompletionParams {
        max_tokens: config.llm.max_tokens,
        temperature: config.llm.temperature,
    };
    let graph = AgentGraph::with_params(Arc::new(tiller_tools::builtin_registry()), client, params)
        .with_parse_retry_limit(config.run.parse_retry_limit);

    if let Some(request) = args.request {
        run_once(&graph, &request, config.run.max_steps, args.show_transcript).await;
        return Ok(());
    }

    println!("Agent ready. Type 'quit' to exit.");
    print!("> ");
    io::stdout().flush()?;

    let stdin = io::stdin();
    let mut input = String::new();

    loop {
        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let trimmed = input.trim();

        if trimmed == "quit" || trimmed == "exit" {
            break;
        }

        if !trimmed.is_empty() {
            run_once(&graph, trimmed, config.run.max_steps, args.show_transcript).await;
        }

        print!("> ");
        io::stdout().flush()?;
    }

    Ok(())
}
