mod telemetry;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use nexus_secrets_core::{BackendKind, PermissionMatrix, ResolverConfig, SecretResolver, keys};
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "nexus-secrets", version, about = "Intent Nexus secrets CLI")]
struct Cli {
    /// Log filter directive, overriding RUST_LOG (e.g. `debug`).
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a secret and print its value.
    Get(GetCmd),
    /// Check whether a role may perform an action.
    Can(CanCmd),
    /// Print the role permission matrix as JSON.
    Roles,
    /// List the secret keys used by platform integrations.
    Keys,
}

#[derive(Args)]
struct GetCmd {
    key: String,
    /// Backend to query (`vault` or `proxy`); defaults to NEXUS_SECRETS_BACKEND.
    #[arg(long)]
    backend: Option<BackendKind>,
    #[arg(long)]
    vault_addr: Option<String>,
    #[arg(long)]
    proxy_url: Option<String>,
    /// Request timeout in seconds for the selected backend.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Total attempts on transport failures.
    #[arg(long)]
    attempts: Option<usize>,
}

#[derive(Args)]
struct CanCmd {
    role: String,
    action: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    telemetry::init(cli.log_level.as_deref())?;

    match cli.command {
        Command::Get(cmd) => handle_get(cmd).await,
        Command::Can(cmd) => Ok(handle_can(&cmd)),
        Command::Roles => handle_roles(),
        Command::Keys => {
            for key in keys::WELL_KNOWN {
                println!("{key}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn handle_get(cmd: GetCmd) -> Result<ExitCode> {
    let mut config = ResolverConfig::from_env();
    if let Some(backend) = cmd.backend {
        config = config.backend(backend);
    }
    if let Some(addr) = cmd.vault_addr {
        config = config.vault_addr(addr);
    }
    if let Some(url) = cmd.proxy_url {
        config = config.proxy_url(url);
    }
    if let Some(secs) = cmd.timeout_secs.filter(|secs| *secs > 0) {
        config = config.timeout(Duration::from_secs(secs));
    }
    if let Some(attempts) = cmd.attempts {
        config = config.max_attempts(attempts);
    }

    let resolver =
        SecretResolver::from_config(&config).context("failed to configure secret resolver")?;
    tracing::debug!(backend = resolver.backend_name(), key = %cmd.key, "resolving secret");
    match resolver.resolve(&cmd.key).await {
        Some(value) => {
            println!("{value}");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("secret {} unavailable", cmd.key);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn handle_can(cmd: &CanCmd) -> ExitCode {
    if PermissionMatrix::reference().is_allowed(&cmd.role, &cmd.action) {
        println!("allowed");
        ExitCode::SUCCESS
    } else {
        println!("denied");
        ExitCode::FAILURE
    }
}

fn handle_roles() -> Result<ExitCode> {
    let rendered = serde_json::to_string_pretty(PermissionMatrix::reference())
        .context("failed to render permission matrix")?;
    println!("{rendered}");
    Ok(ExitCode::SUCCESS)
}
