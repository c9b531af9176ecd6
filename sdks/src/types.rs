// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use triage_core::application::monitor::CaseReport;
pub use triage_core::domain::case::CaseStatus;
pub use triage_core::domain::clinical::{ClinicalSnapshot, RiskAssessment, RiskTier};

/// Result of one triage analysis, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageOutcome {
    pub structured_data: ClinicalSnapshot,
    pub risk_assessment: RiskAssessment,
    pub report_file: String,
    pub pdf_url: String,
}

/// Request body for registering a case for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartCase {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<Uuid>,
    pub structured_data: ClinicalSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_tier: Option<RiskTier>,
}
