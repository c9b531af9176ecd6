// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Follow-Up Policy Engine
//!
//! Decides, per case, whether follow-up is warranted and what it should
//! contain. The engine assembles context — the current snapshot, similar
//! historical cases, prior interaction count — and delegates the decision
//! to the pluggable [`TriageModel`]. A model failure surfaces as an error;
//! it is never defaulted to "no follow-up needed".

use std::sync::Arc;

use crate::application::learning::LearningStore;
use crate::domain::case::MonitoredCase;
use crate::domain::clinical::{ClinicalSnapshot, RiskAssessment};
use crate::domain::model::{FollowUpDecision, FollowUpRequest, ModelError, TriageModel};
use crate::domain::similarity::find_similar;

pub struct FollowUpPolicyEngine {
    model: Arc<dyn TriageModel>,
    learning: Arc<LearningStore>,
}

impl FollowUpPolicyEngine {
    pub fn new(model: Arc<dyn TriageModel>, learning: Arc<LearningStore>) -> Self {
        Self { model, learning }
    }

    pub async fn decide(&self, case: &MonitoredCase) -> Result<FollowUpDecision, ModelError> {
        let history = self.learning.latest_snapshots(case.case_id);
        let similar_cases = find_similar(
            &case.snapshot,
            history.iter().map(|(id, snapshot)| (*id, snapshot)),
        );
        if !similar_cases.is_empty() {
            tracing::debug!(
                case_id = %case.case_id,
                precedents = similar_cases.len(),
                "similar historical cases found"
            );
        }

        let request = FollowUpRequest {
            snapshot: case.snapshot.clone(),
            risk_tier: case.risk_tier,
            similar_cases,
            prior_interactions: self.learning.entry_count(case.case_id),
        };
        self.model.follow_up(&request).await
    }

    /// Risk re-assessment, delegated to the same decision source.
    pub async fn reassess(
        &self,
        snapshot: &ClinicalSnapshot,
    ) -> Result<RiskAssessment, ModelError> {
        self.model.assess_risk(snapshot).await
    }
}
