// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # MedAssist Triage CLI
//!
//! The `medassist` binary runs a triage node.
//!
//! ## Commands
//!
//! - `medassist serve` - Run the HTTP API plus the case-monitoring scheduler
//! - `medassist analyze --text|--file` - One-shot triage from the terminal
//! - `medassist config show|generate` - Configuration management

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{AnalyzeArgs, ConfigCommand};
use triage_core::domain::config::TriageConfig;

/// MedAssist Triage - intake analysis and case monitoring
#[derive(Parser)]
#[command(name = "medassist")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "MEDASSIST_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// HTTP API host (default: from config)
    #[arg(long, global = true, env = "MEDASSIST_HOST")]
    host: Option<String>,

    /// HTTP API port (default: from config)
    #[arg(long, global = true, env = "MEDASSIST_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "MEDASSIST_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API and monitoring scheduler
    Serve,

    /// Triage a single patient description and print the result
    Analyze(AnalyzeArgs),

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &cli.config {
        Some(path) => TriageConfig::load(path)?,
        None => TriageConfig::default(),
    };
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command {
        Commands::Serve => commands::serve::run(config).await,
        Commands::Analyze(args) => commands::analyze::run(config, args).await,
        Commands::Config { command } => commands::config::run(config, command),
    }
}
