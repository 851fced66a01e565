// Payment MCP - Command Line Interface
//
// stdout carries nothing but command output (JSON documents). Logs and
// errors go to stderr so the output stays machine readable.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use payment_mcp::signing::decode_token_parts;
use payment_mcp::{ApiConfig, SignedApiClient, ToolExecutor};

/// Signed payment API tools for MCP agents
#[derive(Parser)]
#[command(name = "payment-mcp")]
#[command(version)]
#[command(about = "Call the payment API with partner-signed requests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a request body and print the token and canonical body
    Sign {
        /// JSON body file, or "-" for stdin; omit to sign a request without body
        #[arg(short, long)]
        body: Option<PathBuf>,
    },

    /// Print the MCP descriptors of every tool
    Tools,

    /// Execute a tool against the configured environment
    Call {
        /// Tool name, e.g. create_transaction
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(short, long)]
        args: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sign { body } => sign(body),
        Commands::Tools => emit(&Value::Array(payment_mcp::tools::descriptors())).map(|_| true),
        Commands::Call { tool, args } => call(&tool, args.as_deref()).await,
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Write one JSON document to stdout.
fn emit(value: &Value) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn read_body(source: &Path) -> Result<Value> {
    let raw = if source.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read body from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("failed to read body file {}", source.display()))?
    };
    serde_json::from_str(&raw).context("body is not valid JSON")
}

fn sign(body: Option<PathBuf>) -> Result<bool> {
    let config = ApiConfig::from_env()?;
    let identity = config.identity()?;

    let body = body.as_deref().map(read_body).transpose()?;
    let signed = config.signer().sign(&identity, body.as_ref())?;
    let (header, claims) = decode_token_parts(&signed.token)?;

    info!("Signed request as partner {} ({})", claims.iss, config.environment);

    emit(&json!({
        "token": signed.token,
        "canonicalBody": signed.canonical_body,
        "header": header,
    }))?;
    Ok(true)
}

async fn call(tool: &str, args: Option<&str>) -> Result<bool> {
    let arguments: Value = match args {
        Some(raw) => serde_json::from_str(raw).context("--args is not valid JSON")?,
        None => Value::Null,
    };

    let config = ApiConfig::from_env()?;
    info!("Using {} environment at {}", config.environment, config.base_url());

    let executor = ToolExecutor::new(SignedApiClient::from_config(&config)?);
    let result = executor.call(tool, &arguments).await;
    emit(&result)?;

    Ok(!result["isError"].as_bool().unwrap_or(false))
}
