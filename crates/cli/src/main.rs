//! ScormBridge CLI - host harness for the run-time API emulation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scormbridge_core::location::classify;
use scormbridge_core::{parse_slide_number, ErrorCode, ParentMessage, RuntimeConfig};
use scormbridge_progress::EmbeddingChannel;
use scormbridge_runtime::{
    expose, find_api, ApiStandard, ContextScope, ExecutionContext, Scorm12Api,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scormbridge")]
#[command(about = "SCORM run-time API emulation harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Slides in the course
    #[arg(long)]
    total_slides: Option<u32>,

    /// Endpoint receiving progress updates
    #[arg(long)]
    progress_url: Option<String>,

    /// Anti-forgery token sent with progress updates
    #[arg(long)]
    csrf_token: Option<String>,

    /// Mirror runtime log lines to stderr
    #[arg(long)]
    debug: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a script of course API calls
    Replay {
        /// JSON array of calls: {"api": "1.2"|"2004", "method": "...", "args": [...]}
        script: PathBuf,

        /// Milliseconds to wait for outstanding progress sends before exiting
        #[arg(long, default_value = "2000")]
        settle_ms: u64,
    },
    /// Resolve bookmark strings to slide numbers
    Parse {
        /// Bookmark strings
        locations: Vec<String>,
    },
    /// List run-time error codes
    Errors,
}

/// One scripted call.
#[derive(Debug, Deserialize)]
struct ScriptCall {
    /// `1.2`, `2004`, `API` or `API_1484_11`
    api: String,

    /// Standardized method name
    method: String,

    /// Arguments
    #[serde(default)]
    args: Vec<String>,
}

fn parse_script(text: &str) -> Result<Vec<ScriptCall>> {
    let calls: Vec<ScriptCall> = serde_json::from_str(text)?;
    for call in &calls {
        call.api
            .parse::<ApiStandard>()
            .map_err(anyhow::Error::msg)?;
    }
    Ok(calls)
}

/// Default filter directives when `RUST_LOG` is unset.
fn log_filter(verbose: bool, debug: bool) -> String {
    let mut filter = String::from(if verbose { "debug" } else { "warn" });
    if debug && !verbose {
        // Runtime log lines are written at info under this target
        filter.push_str(",scorm_api=info");
    }
    filter
}

fn init_logging(verbose: bool, debug: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_filter(verbose, debug))),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<RuntimeConfig> {
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RuntimeConfig::default(),
    };

    if let Some(total) = cli.total_slides {
        config.total_slides = total;
    }
    if let Some(url) = &cli.progress_url {
        config.progress_url = Some(url.clone());
    }
    if let Some(token) = &cli.csrf_token {
        config.csrf_token = Some(token.clone());
    }
    config.debug |= cli.debug;

    Ok(config)
}

fn print_message(message: &ParentMessage) {
    match serde_json::to_string(message) {
        Ok(json) => println!("<- {}", json),
        Err(e) => warn!("Could not encode {} message: {}", message.kind(), e),
    }
}

async fn replay(config: RuntimeConfig, script: PathBuf, settle: Duration) -> Result<()> {
    let text = std::fs::read_to_string(&script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let calls = parse_script(&text)
        .with_context(|| format!("Failed to parse script {}", script.display()))?;

    let channel: Arc<dyn EmbeddingChannel> = Arc::new(print_message);
    let api = Scorm12Api::from_config(&config, Some(channel));
    let remote = api.notifier().has_sink();

    let mut window = ContextScope::new();
    expose(&api, &mut window, None);
    info!("Replaying {} calls in session {}", calls.len(), api.session_id());

    for call in calls {
        let standard: ApiStandard = call.api.parse().map_err(anyhow::Error::msg)?;
        let chain: [&dyn ExecutionContext; 1] = [&window];
        let target = find_api(&chain, standard)
            .with_context(|| format!("{} is not published", standard.global_name()))?;

        let args: Vec<&str> = call.args.iter().map(String::as_str).collect();
        match target.invoke(&call.method, &args) {
            Some(result) => println!(
                "-> {}.{}({}) = {:?}",
                standard.global_name(),
                call.method,
                call.args
                    .iter()
                    .map(|a| format!("{:?}", a))
                    .collect::<Vec<_>>()
                    .join(", "),
                result
            ),
            None => warn!("{} has no method {}", standard.global_name(), call.method),
        }
    }

    if remote {
        // Progress sends are detached; give them a chance to land.
        tokio::time::sleep(settle).await;
    }

    let state = api.state();
    println!(
        "Session {}: slide {} (highest {}), initialized: {}",
        api.session_id(),
        state.current_slide,
        state.highest_slide_reached,
        state.initialized
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(cli.verbose, config.debug);

    match &cli.command {
        Commands::Replay { script, settle_ms } => {
            replay(config, script.clone(), Duration::from_millis(*settle_ms)).await?;
        }
        Commands::Parse { locations } => {
            for location in locations {
                let format = classify(location)
                    .map(|(format, _)| format!("{:?}", format))
                    .unwrap_or_else(|| "unrecognized".to_string());
                println!("{:?} -> {} ({})", location, parse_slide_number(location), format);
            }
        }
        Commands::Errors => {
            for code in ErrorCode::ALL {
                println!("{:>3}  {}", code.code(), code.message());
            }
        }
    }

    Ok(())
}
