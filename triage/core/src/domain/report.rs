// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Report Renderer Domain Interface
//
// Produces a durable document for one triage result. Irrelevant to the
// monitoring logic; implementations live in infrastructure/.

use std::path::PathBuf;

use crate::domain::clinical::{ClinicalSnapshot, RiskAssessment};

pub trait ReportRenderer: Send + Sync {
    /// Render a durable report and return its location.
    fn render(
        &self,
        snapshot: &ClinicalSnapshot,
        assessment: &RiskAssessment,
    ) -> Result<PathBuf, ReportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("render error: {0}")]
    Render(String),
}
