// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Case Monitor — per-case state machine
//!
//! Owns the active-case set and drives the periodic check cycle:
//! follow-up evaluation, risk re-assessment, escalation, rescheduling.
//!
//! ## Check Decision Table
//! | Condition | Action |
//! |-----------|--------|
//! | follow-up cap has headroom, ≥1h since last | consult policy engine, record, count |
//! | re-assessed tier strictly higher | increment counter, append risk_increase alert, adopt tier |
//! | counter ≥ tier's escalation threshold | notify (best-effort), append escalation alert, reset counter |
//! | always | `next_check_at = now + interval` of the post-re-assessment tier |
//!
//! Checks on distinct cases run concurrently; checks on the same case
//! serialize on a per-case mutex. Each step's mutation commits only on that
//! step's success — a failed step leaves no partial update of its own, and
//! earlier completed steps stay committed (the check is retried at the next
//! scheduled interval).

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::application::clock::Clock;
use crate::application::learning::{CaseSummary, LearningStore};
use crate::application::policy::FollowUpPolicyEngine;
use crate::domain::case::{CaseId, CaseStatus, MonitoredCase};
use crate::domain::clinical::{ClinicalSnapshot, RiskTier, ValidationError};
use crate::domain::config::MonitoringRules;
use crate::domain::model::ModelError;
use crate::domain::notify::NotificationChannel;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("case {0} is not monitored")]
    NotFound(CaseId),

    #[error("case {0} is already monitored")]
    AlreadyActive(CaseId),

    #[error("decision source unavailable: {0}")]
    DecisionUnavailable(#[source] ModelError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Full per-case view: live status plus the recorded interaction log
/// (absent until the first follow-up is recorded).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseReport {
    pub status: CaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactions: Option<CaseSummary>,
}

pub struct CaseMonitor {
    cases: DashMap<CaseId, Arc<Mutex<MonitoredCase>>>,
    rules: MonitoringRules,
    policy: Arc<FollowUpPolicyEngine>,
    learning: Arc<LearningStore>,
    notifier: Arc<dyn NotificationChannel>,
    escalation_target: String,
    clock: Arc<dyn Clock>,
}

impl CaseMonitor {
    pub fn new(
        rules: MonitoringRules,
        policy: Arc<FollowUpPolicyEngine>,
        learning: Arc<LearningStore>,
        notifier: Arc<dyn NotificationChannel>,
        escalation_target: String,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cases: DashMap::new(),
            rules,
            policy,
            learning,
            notifier,
            escalation_target,
            clock,
        }
    }

    /// Registers a case with an initial tier and schedules its first check.
    pub fn start_monitoring(
        &self,
        case_id: CaseId,
        snapshot: ClinicalSnapshot,
        initial_tier: RiskTier,
    ) -> Result<CaseStatus, MonitorError> {
        snapshot.validate()?;
        match self.cases.entry(case_id) {
            Entry::Occupied(_) => Err(MonitorError::AlreadyActive(case_id)),
            Entry::Vacant(vacant) => {
                let now = self.clock.now();
                let case = MonitoredCase::new(
                    case_id,
                    snapshot,
                    initial_tier,
                    self.rules.rule(initial_tier),
                    now,
                );
                let status = case.status();
                vacant.insert(Arc::new(Mutex::new(case)));
                counter!("medassist_cases_started_total").increment(1);
                info!(case_id = %case_id, tier = %initial_tier, "monitoring started");
                Ok(status)
            }
        }
    }

    /// Runs one monitoring check. Safe to invoke concurrently for different
    /// cases; checks on the same case serialize on the per-case lock.
    pub async fn check_case(&self, case_id: CaseId) -> Result<CaseStatus, MonitorError> {
        // Clone the entry Arc out of the shard so slow external calls
        // never block access to unrelated cases.
        let entry = self
            .cases
            .get(&case_id)
            .map(|slot| Arc::clone(slot.value()))
            .ok_or(MonitorError::NotFound(case_id))?;
        let mut case = entry.lock().await;
        let now = self.clock.now();
        counter!("medassist_checks_total").increment(1);

        // Step 1: follow-up evaluation.
        case.roll_follow_up_window(now);
        if case.follow_up_due(self.rules.rule(case.risk_tier), now) {
            let decision = self
                .policy
                .decide(&case)
                .await
                .map_err(MonitorError::DecisionUnavailable)?;
            self.learning
                .record(case_id, case.snapshot.clone(), decision, now);
            case.note_follow_up(now);
            counter!("medassist_follow_ups_total").increment(1);
        }

        // Step 2: risk re-assessment.
        let assessment = self
            .policy
            .reassess(&case.snapshot)
            .await
            .map_err(MonitorError::DecisionUnavailable)?;
        if case.apply_reassessment(assessment.risk_level, &assessment.explanation, now) {
            counter!("medassist_risk_increases_total").increment(1);
            info!(
                case_id = %case_id,
                tier = %case.risk_tier,
                increases = case.risk_increase_count,
                "risk increase recorded"
            );
        }

        // Step 3: escalation check.
        let rule = self.rules.rule(case.risk_tier);
        if case.escalation_due(rule) {
            let message = escalation_message(&case);
            if let Err(e) = self.notifier.notify(&self.escalation_target, &message).await {
                // Delivery failure must never abort a check.
                warn!(case_id = %case_id, error = %e, "escalation delivery failed");
            }
            let detail = format!(
                "{} risk increases reached threshold {}",
                case.risk_increase_count, rule.escalation_threshold
            );
            case.record_escalation(detail, now);
            counter!("medassist_escalations_total").increment(1);
            info!(case_id = %case_id, tier = %case.risk_tier, "case escalated");
        }

        // Step 4: commit the check and schedule the next one with the
        // (possibly updated) tier's interval.
        let rule = self.rules.rule(case.risk_tier);
        case.reschedule(rule, now);

        Ok(case.status())
    }

    /// Removes the case from the active set. A second call fails.
    pub fn stop_monitoring(&self, case_id: CaseId) -> Result<(), MonitorError> {
        self.cases
            .remove(&case_id)
            .map(|_| {
                counter!("medassist_cases_stopped_total").increment(1);
                info!(case_id = %case_id, "monitoring stopped");
            })
            .ok_or(MonitorError::NotFound(case_id))
    }

    pub async fn case_status(&self, case_id: CaseId) -> Result<CaseStatus, MonitorError> {
        let entry = self
            .cases
            .get(&case_id)
            .map(|slot| Arc::clone(slot.value()))
            .ok_or(MonitorError::NotFound(case_id))?;
        let case = entry.lock().await;
        Ok(case.status())
    }

    pub async fn get_case_summary(&self, case_id: CaseId) -> Result<CaseReport, MonitorError> {
        let status = self.case_status(case_id).await?;
        let interactions = self.learning.summarize(case_id).ok();
        Ok(CaseReport {
            status,
            interactions,
        })
    }

    /// Cases whose `next_check_at` has passed. A case currently being
    /// checked is skipped — its check is already in flight.
    pub fn due_cases(&self, now: chrono::DateTime<chrono::Utc>) -> Vec<CaseId> {
        self.cases
            .iter()
            .filter_map(|slot| match slot.value().try_lock() {
                Ok(case) if case.next_check_at <= now => Some(*slot.key()),
                _ => None,
            })
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.cases.len()
    }
}

/// Alert text for the notification channel. The channel truncates to its
/// transport limit; content is assembled here by the caller.
fn escalation_message(case: &MonitoredCase) -> String {
    format!(
        "\u{1f6a8} MEDICAL CASE ESCALATION \u{1f6a8}\n\n\
         Case: {}\n\
         Risk Level: {}\n\
         Risk increases since last escalation: {}\n\n\
         Symptoms: {}\n\
         Vital Signs: {}\n\
         Medical History: {}",
        case.case_id,
        case.risk_tier,
        case.risk_increase_count,
        case.snapshot.symptom_summary(),
        case.snapshot.vital_signs,
        case.snapshot.history_summary(),
    )
}
