// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;

use triage_core::domain::config::TriageConfig;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Generate {
        /// Destination path
        #[arg(default_value = "medassist.yaml")]
        path: PathBuf,
    },
}

pub fn run(config: TriageConfig, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
        ConfigCommand::Generate { path } => {
            let rendered = serde_yaml::to_string(&TriageConfig::default())?;
            std::fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("wrote {}", path.display());
            Ok(())
        }
    }
}
