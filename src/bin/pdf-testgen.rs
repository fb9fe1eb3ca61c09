//! Server binary for pdf-testgen.
//!
//! Maps CLI flags to `ServiceConfig`, builds the pipeline once and serves it.

use anyhow::{Context, Result};
use clap::Parser;
use pdf_testgen::{serve, AppState, Orchestrator, PinataCredentials, ServiceConfig};
use std::io;
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"ENDPOINTS:
  GET  /            Upload form
  POST /generate    multipart field "file" (PDF) → {"message", "original_cid", "generated_cid"}
  GET  /pins        Recently pinned files (?limit=N)
  GET  /health      Liveness probe

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key (or the key of the chosen provider)
  PINATA_API_KEY          Pinata API key
  PINATA_SECRET_API_KEY   Pinata secret API key
  PINATA_JWT              Pinata JWT (used instead of the key pair when set)
  RUST_LOG                Log filter, overrides --verbose / --quiet

SETUP:
  1. export OPENAI_API_KEY=sk-...
  2. export PINATA_JWT=...
  3. pdf-testgen --bind 0.0.0.0:5001
"#;

/// Generate similar tests from an uploaded PDF and pin both to IPFS.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-testgen",
    version,
    about = "Generate similar tests from an uploaded PDF and pin both to IPFS",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "TESTGEN_BIND", default_value = "127.0.0.1:5001")]
    bind: SocketAddr,

    /// LLM provider (openai, anthropic, gemini, ollama, ...).
    #[arg(long, env = "TESTGEN_PROVIDER", default_value = pdf_testgen::config::DEFAULT_PROVIDER)]
    provider: String,

    /// LLM model ID.
    #[arg(short, long, env = "TESTGEN_MODEL", default_value = pdf_testgen::config::DEFAULT_MODEL)]
    model: String,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "TESTGEN_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Maximum output tokens for the generation call.
    #[arg(long, env = "TESTGEN_MAX_TOKENS", default_value_t = 1500)]
    max_tokens: usize,

    /// Seconds before the LLM call is abandoned.
    #[arg(long, env = "TESTGEN_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Pinata API base URL.
    #[arg(long, env = "PINATA_API_URL", default_value = pdf_testgen::config::DEFAULT_PINATA_API_URL)]
    pinata_url: String,

    /// Pinata API key.
    #[arg(long, env = "PINATA_API_KEY", hide_env_values = true)]
    pinata_api_key: Option<String>,

    /// Pinata secret API key.
    #[arg(long, env = "PINATA_SECRET_API_KEY", hide_env_values = true)]
    pinata_secret_api_key: Option<String>,

    /// Pinata JWT; takes precedence over the key pair.
    #[arg(long, env = "PINATA_JWT", hide_env_values = true)]
    pinata_jwt: Option<String>,

    /// Seconds before a Pinata request is abandoned.
    #[arg(long, env = "TESTGEN_PIN_TIMEOUT", default_value_t = 120)]
    pin_timeout: u64,

    /// Largest accepted upload, in MiB.
    #[arg(long, env = "TESTGEN_MAX_UPLOAD_MB", default_value_t = 20)]
    max_upload_mb: usize,

    /// Debug logging.
    #[arg(short, long, env = "TESTGEN_VERBOSE")]
    verbose: bool,

    /// Errors only.
    #[arg(short, long, env = "TESTGEN_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.provider == "openai" && std::env::var_os("OPENAI_API_KEY").is_none() {
        warn!("OPENAI_API_KEY is not set; generation requests will fail");
    }

    // ── Configuration ────────────────────────────────────────────────────
    let mut builder = ServiceConfig::builder()
        .provider_name(&cli.provider)
        .model(&cli.model)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .api_timeout_secs(cli.api_timeout)
        .pinata_api_url(&cli.pinata_url)
        .pin_timeout_secs(cli.pin_timeout)
        .max_upload_bytes(cli.max_upload_mb.saturating_mul(1024 * 1024));

    if let Some(credentials) = PinataCredentials::from_parts(
        cli.pinata_api_key.clone(),
        cli.pinata_secret_api_key.clone(),
        cli.pinata_jwt.clone(),
    ) {
        builder = builder.pinata_credentials(credentials);
    }

    let config = builder.build().context("Invalid configuration")?;
    info!(
        "Provider '{}', model '{}', uploads up to {} MiB",
        config.provider_name_or_default(),
        config.model_or_default(),
        cli.max_upload_mb
    );

    let orchestrator =
        Orchestrator::from_config(&config).context("Failed to initialise the pipeline")?;

    serve(cli.bind, AppState::new(orchestrator, config))
        .await
        .with_context(|| format!("Server on {} failed", cli.bind))?;
    Ok(())
}
