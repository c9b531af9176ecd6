// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for the case-monitoring state machine.
//!
//! The monitor is driven with a scripted decision source, a manual clock,
//! and a recording notification channel so every timing and counting
//! property can be asserted deterministically:
//! - risk increases count only strict tier upgrades
//! - escalation fires once per threshold crossing and resets the counter
//! - follow-ups respect the per-day cap, hourly spacing, and day boundary
//! - a failed step leaves no partial state and the check is retriable
//! - delivery failures never abort a check

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use triage_core::application::clock::Clock;
use triage_core::application::learning::LearningStore;
use triage_core::application::monitor::{CaseMonitor, MonitorError};
use triage_core::application::policy::FollowUpPolicyEngine;
use triage_core::application::scheduler::MonitorScheduler;
use triage_core::domain::case::{AlertKind, CaseId};
use triage_core::domain::clinical::{
    ClinicalSnapshot, RiskAssessment, RiskTier, Severity, Symptom,
};
use triage_core::domain::config::{MonitoringRule, MonitoringRules};
use triage_core::domain::model::{FollowUpDecision, FollowUpRequest, ModelError, TriageModel};
use triage_core::domain::notify::{DeliveryError, NotificationChannel};

struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    fn starting_at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Decision source with a scripted sequence of re-assessed tiers.
#[derive(Default)]
struct ScriptedModel {
    assessments: Mutex<VecDeque<Result<RiskTier, String>>>,
    fail_follow_up: Mutex<bool>,
}

impl ScriptedModel {
    fn with_assessments(tiers: &[RiskTier]) -> Arc<Self> {
        let model = Self::default();
        model
            .assessments
            .lock()
            .unwrap()
            .extend(tiers.iter().map(|t| Ok(*t)));
        Arc::new(model)
    }

    fn push_failure(&self, message: &str) {
        self.assessments
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    fn push_assessment(&self, tier: RiskTier) {
        self.assessments.lock().unwrap().push_back(Ok(tier));
    }

    fn remaining(&self) -> usize {
        self.assessments.lock().unwrap().len()
    }

    fn set_fail_follow_up(&self, fail: bool) {
        *self.fail_follow_up.lock().unwrap() = fail;
    }
}

#[async_trait]
impl TriageModel for ScriptedModel {
    async fn extract(&self, _text: &str) -> Result<ClinicalSnapshot, ModelError> {
        Ok(ClinicalSnapshot::default())
    }

    async fn assess_risk(&self, _snapshot: &ClinicalSnapshot) -> Result<RiskAssessment, ModelError> {
        let next = self
            .assessments
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted assessment left");
        match next {
            Ok(tier) => Ok(RiskAssessment {
                risk_level: tier,
                explanation: "scripted".to_string(),
            }),
            Err(message) => Err(ModelError::Network(message)),
        }
    }

    async fn follow_up(&self, request: &FollowUpRequest) -> Result<FollowUpDecision, ModelError> {
        if *self.fail_follow_up.lock().unwrap() {
            return Err(ModelError::RateLimit);
        }
        Ok(FollowUpDecision {
            needed: true,
            questions: vec!["How does the patient feel now?".to_string()],
            next_steps: vec!["Re-take vital signs".to_string()],
            escalation_needed: request.risk_tier == RiskTier::High,
            ..FollowUpDecision::default()
        })
    }

    async fn health_check(&self) -> Result<(), ModelError> {
        Ok(())
    }
}

#[derive(Default)]
struct RecordingChannel {
    sent: Mutex<Vec<(String, String)>>,
    fail: Mutex<bool>,
}

impl RecordingChannel {
    fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn notify(&self, target: &str, message: &str) -> Result<(), DeliveryError> {
        if *self.fail.lock().unwrap() {
            return Err(DeliveryError::Network("simulated outage".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((target.to_string(), message.to_string()));
        Ok(())
    }
}

fn rule(interval_secs: u64, threshold: u32, follow_ups: u32) -> MonitoringRule {
    MonitoringRule {
        check_interval: StdDuration::from_secs(interval_secs),
        escalation_threshold: threshold,
        required_follow_ups_per_day: follow_ups,
    }
}

/// LOW 4h / MODERATE 1h / HIGH 30m with a shared escalation threshold.
fn rules_with_threshold(threshold: u32) -> MonitoringRules {
    MonitoringRules {
        low: rule(4 * 3600, threshold, 1),
        moderate: rule(3600, threshold, 2),
        high: rule(30 * 60, threshold, 3),
    }
}

fn snapshot() -> ClinicalSnapshot {
    ClinicalSnapshot {
        symptoms: vec![Symptom {
            description: "headache".to_string(),
            severity: Severity::Moderate,
        }],
        ..ClinicalSnapshot::default()
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0).unwrap()
}

struct Harness {
    monitor: Arc<CaseMonitor>,
    learning: Arc<LearningStore>,
    model: Arc<ScriptedModel>,
    channel: Arc<RecordingChannel>,
    clock: Arc<ManualClock>,
}

fn harness(rules: MonitoringRules, model: Arc<ScriptedModel>, start: DateTime<Utc>) -> Harness {
    let clock = ManualClock::starting_at(start);
    let channel = Arc::new(RecordingChannel::default());
    let learning = Arc::new(LearningStore::new());
    let policy = Arc::new(FollowUpPolicyEngine::new(
        model.clone(),
        Arc::clone(&learning),
    ));
    let monitor = Arc::new(CaseMonitor::new(
        rules,
        policy,
        Arc::clone(&learning),
        channel.clone(),
        "+15550100".to_string(),
        clock.clone(),
    ));
    Harness {
        monitor,
        learning,
        model,
        channel,
        clock,
    }
}

#[tokio::test]
async fn duplicate_start_fails_and_leaves_state_untouched() {
    let model = ScriptedModel::with_assessments(&[]);
    let h = harness(rules_with_threshold(2), model, t0());
    let case_id = CaseId::new();

    let first = h
        .monitor
        .start_monitoring(case_id, snapshot(), RiskTier::Moderate)
        .unwrap();

    let second = h
        .monitor
        .start_monitoring(case_id, snapshot(), RiskTier::High);
    assert!(matches!(second, Err(MonitorError::AlreadyActive(id)) if id == case_id));

    let status = h.monitor.case_status(case_id).await.unwrap();
    assert_eq!(status.risk_tier, first.risk_tier);
    assert_eq!(status.next_check_at, first.next_check_at);
    assert_eq!(status.risk_increase_count, 0);
    assert_eq!(h.monitor.active_count(), 1);
}

#[tokio::test]
async fn next_check_uses_the_interval_of_the_reassessed_tier() {
    let model = ScriptedModel::with_assessments(&[RiskTier::High]);
    let h = harness(rules_with_threshold(10), model, t0());
    let case_id = CaseId::new();

    h.monitor
        .start_monitoring(case_id, snapshot(), RiskTier::Low)
        .unwrap();

    h.clock.advance(Duration::hours(4));
    let status = h.monitor.check_case(case_id).await.unwrap();

    assert_eq!(status.risk_tier, RiskTier::High);
    // The post-re-assessment tier is HIGH, so the 30m interval applies.
    assert_eq!(
        status.next_check_at - status.last_check_at,
        Duration::minutes(30)
    );
}

#[tokio::test]
async fn risk_increases_count_only_strict_upgrades() {
    let model = ScriptedModel::with_assessments(&[
        RiskTier::Low,
        RiskTier::Moderate,
        RiskTier::Moderate,
        RiskTier::High,
    ]);
    let h = harness(rules_with_threshold(10), model, t0());
    let case_id = CaseId::new();

    h.monitor
        .start_monitoring(case_id, snapshot(), RiskTier::Low)
        .unwrap();

    let mut last_status = None;
    for _ in 0..4 {
        h.clock.advance(Duration::hours(4));
        last_status = Some(h.monitor.check_case(case_id).await.unwrap());
    }

    let status = last_status.unwrap();
    assert_eq!(status.risk_increase_count, 2);
    let increases = status
        .alerts
        .iter()
        .filter(|a| a.kind == AlertKind::RiskIncrease)
        .count();
    assert_eq!(increases, 2);
    assert_eq!(status.risk_tier, RiskTier::High);
}

#[tokio::test]
async fn escalation_fires_once_per_threshold_crossing() {
    let model = ScriptedModel::with_assessments(&[
        RiskTier::Moderate,
        RiskTier::High,
        RiskTier::High,
        RiskTier::High,
    ]);
    let h = harness(rules_with_threshold(2), model, t0());
    let case_id = CaseId::new();

    h.monitor
        .start_monitoring(case_id, snapshot(), RiskTier::Low)
        .unwrap();

    h.clock.advance(Duration::hours(4));
    let status = h.monitor.check_case(case_id).await.unwrap();
    assert_eq!(status.risk_increase_count, 1);
    assert_eq!(h.channel.sent_count(), 0);

    // Second increase crosses the threshold: escalate exactly once, reset.
    h.clock.advance(Duration::hours(1));
    let status = h.monitor.check_case(case_id).await.unwrap();
    assert_eq!(status.risk_increase_count, 0);
    assert_eq!(h.channel.sent_count(), 1);
    let escalations = status
        .alerts
        .iter()
        .filter(|a| a.kind == AlertKind::Escalation)
        .count();
    assert_eq!(escalations, 1);

    // Repeated checks at the elevated tier must not re-fire.
    for _ in 0..2 {
        h.clock.advance(Duration::minutes(31));
        let status = h.monitor.check_case(case_id).await.unwrap();
        assert_eq!(status.risk_increase_count, 0);
    }
    assert_eq!(h.channel.sent_count(), 1);
}

#[tokio::test]
async fn stable_high_case_never_counts_or_escalates() {
    let model = ScriptedModel::with_assessments(&[RiskTier::High, RiskTier::High]);
    let h = harness(rules_with_threshold(2), model, t0());
    let case_id = CaseId::new();

    h.monitor
        .start_monitoring(case_id, snapshot(), RiskTier::High)
        .unwrap();

    h.clock.advance(Duration::minutes(31));
    let status = h.monitor.check_case(case_id).await.unwrap();
    assert_eq!(status.risk_increase_count, 0);

    h.clock.advance(Duration::minutes(31));
    let status = h.monitor.check_case(case_id).await.unwrap();
    assert_eq!(status.risk_increase_count, 0);
    assert!(status.alerts.is_empty());
    assert_eq!(h.channel.sent_count(), 0);
}

#[tokio::test]
async fn follow_ups_respect_the_daily_cap() {
    let model = ScriptedModel::with_assessments(&[RiskTier::High; 10]);
    let h = harness(rules_with_threshold(99), model, Utc.with_ymd_and_hms(2026, 3, 14, 0, 30, 0).unwrap());
    let case_id = CaseId::new();

    h.monitor
        .start_monitoring(case_id, snapshot(), RiskTier::High)
        .unwrap();

    for _ in 0..10 {
        h.clock.advance(Duration::hours(1));
        let status = h.monitor.check_case(case_id).await.unwrap();
        assert!(status.follow_ups_completed_today <= 3);
    }

    // Ten hourly checks within one UTC day: only the cap's worth recorded.
    let summary = h.learning.summarize(case_id).unwrap();
    assert_eq!(summary.entry_count, 3);
}

#[tokio::test]
async fn follow_up_counter_resets_after_utc_midnight() {
    let model = ScriptedModel::with_assessments(&[RiskTier::Low, RiskTier::Low]);
    let mut rules = rules_with_threshold(99);
    rules.low = rule(3600, 99, 1);
    let h = harness(
        rules,
        model,
        Utc.with_ymd_and_hms(2026, 3, 14, 23, 0, 0).unwrap(),
    );
    let case_id = CaseId::new();

    h.monitor
        .start_monitoring(case_id, snapshot(), RiskTier::Low)
        .unwrap();

    // First follow-up late in the day maxes the daily cap of one.
    h.clock.advance(Duration::minutes(30));
    let status = h.monitor.check_case(case_id).await.unwrap();
    assert_eq!(status.follow_ups_completed_today, 1);

    // Past midnight (and past the hourly spacing) the window rolls over.
    h.clock.advance(Duration::minutes(75));
    let status = h.monitor.check_case(case_id).await.unwrap();
    assert_eq!(status.follow_ups_completed_today, 1);
    assert_eq!(h.learning.summarize(case_id).unwrap().entry_count, 2);
}

#[tokio::test]
async fn stop_monitoring_unknown_case_fails_without_mutation() {
    let model = ScriptedModel::with_assessments(&[]);
    let h = harness(rules_with_threshold(2), model, t0());

    let unknown = CaseId::new();
    assert!(matches!(
        h.monitor.stop_monitoring(unknown),
        Err(MonitorError::NotFound(id)) if id == unknown
    ));
    assert_eq!(h.monitor.active_count(), 0);
}

#[tokio::test]
async fn stopped_case_is_gone_and_second_stop_fails() {
    let model = ScriptedModel::with_assessments(&[]);
    let h = harness(rules_with_threshold(2), model, t0());
    let case_id = CaseId::new();

    h.monitor
        .start_monitoring(case_id, snapshot(), RiskTier::Low)
        .unwrap();
    h.monitor.stop_monitoring(case_id).unwrap();

    assert!(matches!(
        h.monitor.stop_monitoring(case_id),
        Err(MonitorError::NotFound(_))
    ));
    assert!(matches!(
        h.monitor.check_case(case_id).await,
        Err(MonitorError::NotFound(_))
    ));
}

#[tokio::test]
async fn failed_reassessment_surfaces_and_is_retriable() {
    let model = ScriptedModel::with_assessments(&[]);
    model.push_failure("model unreachable");
    let h = harness(rules_with_threshold(2), model, t0());
    let case_id = CaseId::new();

    let initial = h
        .monitor
        .start_monitoring(case_id, snapshot(), RiskTier::Moderate)
        .unwrap();

    h.clock.advance(Duration::hours(1));
    let result = h.monitor.check_case(case_id).await;
    assert!(matches!(result, Err(MonitorError::DecisionUnavailable(_))));

    // The follow-up step committed, the failed step and everything after
    // it did not: no counter movement, no reschedule.
    let status = h.monitor.case_status(case_id).await.unwrap();
    assert_eq!(status.risk_increase_count, 0);
    assert_eq!(status.next_check_at, initial.next_check_at);
    assert_eq!(status.follow_ups_completed_today, 1);

    // The next scheduled attempt succeeds once the source recovers.
    h.model.push_assessment(RiskTier::Moderate);
    let status = h.monitor.check_case(case_id).await.unwrap();
    assert_eq!(status.risk_increase_count, 0);
    assert!(status.next_check_at > initial.next_check_at);
}

#[tokio::test]
async fn failed_follow_up_leaves_no_partial_state() {
    let model = ScriptedModel::with_assessments(&[RiskTier::Moderate]);
    model.set_fail_follow_up(true);
    let h = harness(rules_with_threshold(2), model, t0());
    let case_id = CaseId::new();

    h.monitor
        .start_monitoring(case_id, snapshot(), RiskTier::Moderate)
        .unwrap();

    h.clock.advance(Duration::hours(1));
    let result = h.monitor.check_case(case_id).await;
    assert!(matches!(result, Err(MonitorError::DecisionUnavailable(_))));

    let status = h.monitor.case_status(case_id).await.unwrap();
    assert_eq!(status.follow_ups_completed_today, 0);
    assert!(h.learning.summarize(case_id).is_err());
    // The re-assessment step never ran.
    assert_eq!(h.model.remaining(), 1);
}

#[tokio::test]
async fn delivery_failure_never_aborts_a_check() {
    let model = ScriptedModel::with_assessments(&[RiskTier::Moderate]);
    let h = harness(rules_with_threshold(1), model, t0());
    h.channel.set_failing(true);
    let case_id = CaseId::new();

    h.monitor
        .start_monitoring(case_id, snapshot(), RiskTier::Low)
        .unwrap();

    h.clock.advance(Duration::hours(4));
    let status = h.monitor.check_case(case_id).await.unwrap();

    // Escalation happened despite the outage; counter reset as usual.
    assert_eq!(status.risk_increase_count, 0);
    assert_eq!(
        status
            .alerts
            .iter()
            .filter(|a| a.kind == AlertKind::Escalation)
            .count(),
        1
    );
    assert_eq!(h.channel.sent_count(), 0);
}

#[tokio::test]
async fn concurrent_checks_on_distinct_cases_proceed() {
    let model = ScriptedModel::with_assessments(&[RiskTier::Low, RiskTier::Low]);
    let h = harness(rules_with_threshold(99), model, t0());

    let a = CaseId::new();
    let b = CaseId::new();
    h.monitor.start_monitoring(a, snapshot(), RiskTier::Low).unwrap();
    h.monitor.start_monitoring(b, snapshot(), RiskTier::Low).unwrap();

    h.clock.advance(Duration::hours(5));
    let (ra, rb) = tokio::join!(h.monitor.check_case(a), h.monitor.check_case(b));
    assert!(ra.is_ok());
    assert!(rb.is_ok());
}

#[tokio::test]
async fn scheduler_sweep_checks_only_due_cases() {
    let model = ScriptedModel::with_assessments(&[RiskTier::Low]);
    let h = harness(rules_with_threshold(99), model, t0());

    let due = CaseId::new();
    let not_due = CaseId::new();
    h.monitor
        .start_monitoring(due, snapshot(), RiskTier::Moderate)
        .unwrap();
    h.clock.advance(Duration::hours(2));
    h.monitor
        .start_monitoring(not_due, snapshot(), RiskTier::Low)
        .unwrap();

    let scheduler = MonitorScheduler::new(
        Arc::clone(&h.monitor),
        h.clock.clone(),
        StdDuration::from_secs(60),
    );
    scheduler.sweep().await;

    // Only the overdue MODERATE case was checked (one assessment consumed,
    // one follow-up recorded); the fresh LOW case was left alone.
    assert_eq!(h.model.remaining(), 0);
    assert_eq!(h.learning.summarize(due).unwrap().entry_count, 1);
    assert!(h.learning.summarize(not_due).is_err());
}

#[tokio::test]
async fn case_summary_combines_status_and_interactions() {
    let model = ScriptedModel::with_assessments(&[RiskTier::High]);
    let h = harness(rules_with_threshold(99), model, t0());
    let case_id = CaseId::new();

    h.monitor
        .start_monitoring(case_id, snapshot(), RiskTier::High)
        .unwrap();

    let before = h.monitor.get_case_summary(case_id).await.unwrap();
    assert!(before.interactions.is_none());

    h.clock.advance(Duration::minutes(31));
    h.monitor.check_case(case_id).await.unwrap();

    let after = h.monitor.get_case_summary(case_id).await.unwrap();
    let interactions = after.interactions.unwrap();
    assert_eq!(interactions.entry_count, 1);
    assert!(interactions.entries[0].decision.needed);
}
