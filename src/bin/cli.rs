//! CLI binary for fedbrief.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use fedbrief::aggregate::WebSearcher;
use fedbrief::config::{resolve_today, RunConfig};
use fedbrief::llm::{ChatClient, HttpChatClient, StubChatClient};
use fedbrief::pipeline::Pipeline;
use fedbrief::run::RunContext;

/// fedbrief: scripted three-agent research pipeline for Fed policy briefs.
#[derive(Parser)]
#[command(name = "fedbrief", version, about)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override today's date (YYYY-MM-DD).
    #[arg(long)]
    today: Option<String>,

    /// LLM temperature.
    #[arg(long)]
    temperature: Option<f32>,

    /// LLM nucleus sampling parameter.
    #[arg(long)]
    top_p: Option<f32>,

    /// LLM seed, where the backend supports it.
    #[arg(long)]
    seed: Option<u64>,

    /// Use stub responses instead of calling real models.
    #[arg(long)]
    stub: bool,

    /// Directory receiving run artifacts.
    #[arg(long)]
    artifacts_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to our own info logs; RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fedbrief=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };
    config.apply_env_overrides()?;

    // CLI flags take precedence over file and environment.
    if let Some(temperature) = cli.temperature {
        config.sampling.temperature = temperature;
    }
    if let Some(top_p) = cli.top_p {
        config.sampling.top_p = top_p;
    }
    if let Some(seed) = cli.seed {
        config.sampling.seed = Some(seed);
    }
    if let Some(dir) = cli.artifacts_dir {
        config.artifacts_dir = dir;
    }
    if cli.stub {
        config.stub = true;
    }

    let today = resolve_today(cli.today.as_deref());
    let ctx = RunContext::new(&config.artifacts_dir);
    let run_id = ctx.run_id.clone();

    let searcher = WebSearcher::new(config.search_config());
    let client: Box<dyn ChatClient> = if config.stub {
        Box::new(StubChatClient)
    } else {
        let api_key = std::env::var("OPENROUTER_API_KEY").unwrap_or_default();
        Box::new(HttpChatClient::new(config.llm.api_url.clone(), api_key)?)
    };

    let outcome = Pipeline::new(&config, today, ctx, client.as_ref(), &searcher)
        .run()
        .await
        .map_err(|e| {
            tracing::error!(run_id = %run_id, error = %e, "pipeline failed");
            anyhow::anyhow!("run {run_id} failed: {e}")
        })?;

    println!(
        "Run {} finished: {} sources, {} flags",
        outcome.run_id,
        outcome.source_count,
        outcome.flags.len()
    );
    println!("Brief: {}", outcome.brief_path.display());
    println!("Debug: {}", outcome.debug_path.display());
    Ok(())
}
