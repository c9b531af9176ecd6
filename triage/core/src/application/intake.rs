// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Intake Pipeline
//!
//! One-shot triage of a patient description: extract structured data,
//! assess risk, alert the escalation channel on HIGH, render a durable
//! report. Monitoring is a separate, explicit registration step.

use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::clinical::{ClinicalSnapshot, RiskAssessment, RiskTier, ValidationError};
use crate::domain::model::{ModelError, TriageModel};
use crate::domain::notify::NotificationChannel;
use crate::domain::report::{ReportError, ReportRenderer};

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("triage model failed: {0}")]
    Model(#[from] ModelError),

    #[error("report generation failed: {0}")]
    Report(#[from] ReportError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageReport {
    pub structured_data: ClinicalSnapshot,
    pub risk_assessment: RiskAssessment,
    /// File name of the rendered report under the reports directory.
    pub report_file: String,
}

pub struct TriagePipeline {
    model: Arc<dyn TriageModel>,
    notifier: Arc<dyn NotificationChannel>,
    renderer: Arc<dyn ReportRenderer>,
    escalation_target: String,
}

impl TriagePipeline {
    pub fn new(
        model: Arc<dyn TriageModel>,
        notifier: Arc<dyn NotificationChannel>,
        renderer: Arc<dyn ReportRenderer>,
        escalation_target: String,
    ) -> Self {
        Self {
            model,
            notifier,
            renderer,
            escalation_target,
        }
    }

    pub async fn analyze_text(&self, text: &str) -> Result<TriageReport, IntakeError> {
        let snapshot = self.model.extract(text).await?;
        self.analyze_snapshot(snapshot).await
    }

    pub async fn analyze_snapshot(
        &self,
        snapshot: ClinicalSnapshot,
    ) -> Result<TriageReport, IntakeError> {
        snapshot.validate()?;
        counter!("medassist_intake_total").increment(1);

        let assessment = self.model.assess_risk(&snapshot).await?;
        info!(risk_level = %assessment.risk_level, "triage assessment complete");

        if assessment.risk_level == RiskTier::High {
            let message = high_risk_message(&snapshot, &assessment);
            if let Err(e) = self.notifier.notify(&self.escalation_target, &message).await {
                // Best-effort: a notification failure never fails the intake.
                warn!(error = %e, "high-risk notification failed");
            } else {
                counter!("medassist_high_risk_alerts_total").increment(1);
            }
        }

        let path = self.renderer.render(&snapshot, &assessment)?;
        let report_file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(TriageReport {
            structured_data: snapshot,
            risk_assessment: assessment,
            report_file,
        })
    }

    /// Risk assessment without the alerting/reporting side effects. Used to
    /// derive an initial tier when a case is registered without one.
    pub async fn assess(&self, snapshot: &ClinicalSnapshot) -> Result<RiskAssessment, IntakeError> {
        snapshot.validate()?;
        Ok(self.model.assess_risk(snapshot).await?)
    }
}

fn high_risk_message(snapshot: &ClinicalSnapshot, assessment: &RiskAssessment) -> String {
    format!(
        "\u{1f6a8} HIGH RISK MEDICAL CASE \u{1f6a8}\n\n\
         Risk Level: {}\n\
         Explanation: {}\n\n\
         Patient Data:\n\
         Symptoms: {}\n\
         Vital Signs: {}\n\
         Medical History: {}",
        assessment.risk_level,
        assessment.explanation,
        snapshot.symptom_summary(),
        snapshot.vital_signs,
        snapshot.history_summary(),
    )
}
