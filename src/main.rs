use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use gemini_chat::connector::adapter::{
    API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL, MODEL_ENV,
};
use gemini_chat::{Commands, Container, ContainerConfig, Router};

#[derive(Parser)]
#[command(name = "gemini-chat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API key for the completion endpoint (falls back to GEMINI_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Model name (falls back to GEMINI_MODEL, then gemini-pro)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Endpoint base URL (falls back to GEMINI_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Answer with an offline echo client instead of calling Gemini
    #[arg(long, global = true)]
    mock: bool,

    /// Give up on a completion after this many seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[arg(long, global = true, default_value = "500")]
    landing_delay_ms: u64,

    /// Append logs to this file; the chat screen discards them otherwise
    #[arg(long, global = true)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();
    let command = cli.command.take().unwrap_or(Commands::Chat);

    init_tracing(&cli, matches!(command, Commands::Chat))?;

    let config = ContainerConfig {
        api_key: cli
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok()),
        model: cli
            .model
            .clone()
            .or_else(|| std::env::var(MODEL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        base_url: cli
            .base_url
            .clone()
            .or_else(|| std::env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        mock: cli.mock,
        timeout: cli.timeout_secs.map(Duration::from_secs),
        landing_delay: Duration::from_millis(cli.landing_delay_ms),
    };
    debug!(
        "Starting with model {} (mock={}, timeout={:?})",
        config.model, config.mock, config.timeout
    );

    let container = Container::new(config)?;
    let router = Router::new(&container);

    let output = router.route(command).await?;
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}

/// The chat screen owns stdout and stderr, so interactive runs only log
/// when a log file is given.
fn init_tracing(cli: &Cli, interactive: bool) -> Result<()> {
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (writer, ansi) = match cli.log_file.as_deref() {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(expand_tilde(path))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None if interactive => (BoxMakeWriter::new(std::io::sink), false),
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(writer)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn expand_tilde(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            if path == "~" {
                return home.to_string_lossy().to_string();
            }
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
