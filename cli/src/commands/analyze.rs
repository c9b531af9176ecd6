// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! The `analyze` command: one-shot triage from the terminal. Alerts go to
//! the configured channel exactly as they would for an API request.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use triage_core::application::intake::TriagePipeline;
use triage_core::domain::clinical::RiskTier;
use triage_core::domain::config::{resolve_secret, TriageConfig};
use triage_core::infrastructure::model::model_from_config;
use triage_core::infrastructure::notify::channel_from_config;
use triage_core::infrastructure::PdfReportRenderer;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Patient description to triage
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the patient description from a UTF-8 text file
    #[arg(long)]
    pub file: Option<PathBuf>,
}

pub async fn run(config: TriageConfig, args: AnalyzeArgs) -> Result<()> {
    let text = match (args.text, args.file) {
        (Some(text), None) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        _ => bail!("provide exactly one of --text or --file"),
    };

    let escalation_target = match resolve_secret(
        &Some(config.notification.escalation_target.clone()),
        "escalation target",
    ) {
        Ok(target) => target,
        Err(e) if config.notification.channel == "log" => {
            tracing::warn!(error = %e, "no escalation target configured; alerts go to the log only");
            "on-call".to_string()
        }
        Err(e) => return Err(e),
    };
    let model = model_from_config(&config.model)?;
    let notifier = channel_from_config(&config.notification)?;
    let renderer = Arc::new(PdfReportRenderer::new(config.reports_dir.clone())?);
    let pipeline = TriagePipeline::new(model, notifier, renderer, escalation_target);

    let report = pipeline.analyze_text(&text).await?;

    let tier = match report.risk_assessment.risk_level {
        RiskTier::High => "HIGH".red().bold(),
        RiskTier::Moderate => "MODERATE".yellow().bold(),
        RiskTier::Low => "LOW".green().bold(),
    };
    println!("{} {}", "Risk Level:".bold(), tier);
    println!("{} {}", "Explanation:".bold(), report.risk_assessment.explanation);
    println!();

    println!("{}", "Symptoms".bold());
    if report.structured_data.symptoms.is_empty() {
        println!("  (none identified)");
    }
    for symptom in &report.structured_data.symptoms {
        println!("  - {} ({:?})", symptom.description, symptom.severity);
    }
    println!("{} {}", "Vital Signs:".bold(), report.structured_data.vital_signs);
    println!(
        "{} {}",
        "Medical History:".bold(),
        report.structured_data.history_summary()
    );
    println!();
    println!(
        "{} {}",
        "Report:".bold(),
        config.reports_dir.join(&report.report_file).display()
    );

    Ok(())
}
