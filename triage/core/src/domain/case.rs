// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Monitored Case — the unit of follow-up tracking
//!
//! A case is either present in the active set (monitored) or absent
//! (stopped); there are no intermediate lifecycle states. All mutation goes
//! through `CaseMonitor::check_case` and its sub-steps, which call the
//! transition methods below.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::clinical::{ClinicalSnapshot, RiskTier};
use crate::domain::config::MonitoringRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseId(pub Uuid);

impl CaseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    RiskIncrease,
    Escalation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseAlert {
    pub at: DateTime<Utc>,
    pub kind: AlertKind,
    pub detail: String,
}

/// Point-in-time view of a case, returned by `check_case` and the status
/// endpoints. Plain data, no framework types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseStatus {
    pub case_id: CaseId,
    pub risk_tier: RiskTier,
    pub risk_increase_count: u32,
    pub follow_ups_completed_today: u32,
    pub last_check_at: DateTime<Utc>,
    pub next_check_at: DateTime<Utc>,
    pub last_follow_up_at: Option<DateTime<Utc>>,
    pub alerts: Vec<CaseAlert>,
}

/// Minimum spacing between two follow-ups on the same case.
pub fn follow_up_spacing() -> Duration {
    Duration::hours(1)
}

#[derive(Debug, Clone)]
pub struct MonitoredCase {
    pub case_id: CaseId,
    pub risk_tier: RiskTier,
    pub snapshot: ClinicalSnapshot,
    pub last_check_at: DateTime<Utc>,
    pub next_check_at: DateTime<Utc>,
    pub risk_increase_count: u32,
    pub follow_ups_completed_today: u32,
    pub last_follow_up_at: Option<DateTime<Utc>>,
    alerts: Vec<CaseAlert>,
}

impl MonitoredCase {
    pub fn new(
        case_id: CaseId,
        snapshot: ClinicalSnapshot,
        risk_tier: RiskTier,
        rule: &MonitoringRule,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            case_id,
            risk_tier,
            snapshot,
            last_check_at: now,
            next_check_at: now + rule.check_interval(),
            risk_increase_count: 0,
            follow_ups_completed_today: 0,
            last_follow_up_at: None,
            alerts: Vec::new(),
        }
    }

    /// Append-only within a session; never pruned.
    pub fn alerts(&self) -> &[CaseAlert] {
        &self.alerts
    }

    /// Resets the daily follow-up counter once the UTC calendar date has
    /// advanced past the date of the last follow-up.
    pub fn roll_follow_up_window(&mut self, now: DateTime<Utc>) {
        if let Some(last) = self.last_follow_up_at {
            if now.date_naive() > last.date_naive() {
                self.follow_ups_completed_today = 0;
            }
        }
    }

    /// A follow-up is due when the daily cap has headroom and at least
    /// [`follow_up_spacing`] has passed since the previous one.
    pub fn follow_up_due(&self, rule: &MonitoringRule, now: DateTime<Utc>) -> bool {
        if self.follow_ups_completed_today >= rule.required_follow_ups_per_day {
            return false;
        }
        match self.last_follow_up_at {
            None => true,
            Some(last) => now - last >= follow_up_spacing(),
        }
    }

    pub fn note_follow_up(&mut self, now: DateTime<Utc>) {
        self.last_follow_up_at = Some(now);
        self.follow_ups_completed_today += 1;
    }

    /// Applies a re-assessed tier. Only a strictly higher tier counts as a
    /// risk increase and moves the stored tier; equal or lower observations
    /// leave the case unchanged (the stored tier is never downgraded here).
    /// Returns true when an increase was recorded.
    pub fn apply_reassessment(
        &mut self,
        observed: RiskTier,
        explanation: &str,
        now: DateTime<Utc>,
    ) -> bool {
        if observed <= self.risk_tier {
            return false;
        }
        self.risk_increase_count += 1;
        self.alerts.push(CaseAlert {
            at: now,
            kind: AlertKind::RiskIncrease,
            detail: format!("{} -> {}: {}", self.risk_tier, observed, explanation),
        });
        self.risk_tier = observed;
        true
    }

    pub fn escalation_due(&self, rule: &MonitoringRule) -> bool {
        self.risk_increase_count >= rule.escalation_threshold
    }

    /// Records an escalation and resets the increase counter so the same
    /// threshold crossing cannot re-fire on the next check.
    pub fn record_escalation(&mut self, detail: String, now: DateTime<Utc>) {
        self.alerts.push(CaseAlert {
            at: now,
            kind: AlertKind::Escalation,
            detail,
        });
        self.risk_increase_count = 0;
    }

    /// Commits the check timestamp and schedules the next check with the
    /// interval of the tier held after re-assessment.
    pub fn reschedule(&mut self, rule: &MonitoringRule, now: DateTime<Utc>) {
        self.last_check_at = now;
        self.next_check_at = now + rule.check_interval();
    }

    pub fn status(&self) -> CaseStatus {
        CaseStatus {
            case_id: self.case_id,
            risk_tier: self.risk_tier,
            risk_increase_count: self.risk_increase_count,
            follow_ups_completed_today: self.follow_ups_completed_today,
            last_check_at: self.last_check_at,
            next_check_at: self.next_check_at,
            last_follow_up_at: self.last_follow_up_at,
            alerts: self.alerts.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::MonitoringRules;
    use chrono::TimeZone;

    fn case_at(now: DateTime<Utc>, tier: RiskTier) -> MonitoredCase {
        let rules = MonitoringRules::default();
        MonitoredCase::new(
            CaseId::new(),
            ClinicalSnapshot::default(),
            tier,
            rules.rule(tier),
            now,
        )
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
    }

    #[test]
    fn reassessment_counts_only_strict_increases() {
        let mut case = case_at(t0(), RiskTier::Low);
        assert!(case.apply_reassessment(RiskTier::Moderate, "worsening", t0()));
        assert!(!case.apply_reassessment(RiskTier::Moderate, "stable", t0()));
        assert!(case.apply_reassessment(RiskTier::High, "worsening", t0()));
        assert_eq!(case.risk_increase_count, 2);
        assert_eq!(case.risk_tier, RiskTier::High);
    }

    #[test]
    fn reassessment_never_downgrades() {
        let mut case = case_at(t0(), RiskTier::High);
        assert!(!case.apply_reassessment(RiskTier::Low, "improved", t0()));
        assert_eq!(case.risk_tier, RiskTier::High);
        assert_eq!(case.risk_increase_count, 0);
        assert!(case.alerts().is_empty());
    }

    #[test]
    fn escalation_resets_increase_counter() {
        let mut case = case_at(t0(), RiskTier::Low);
        case.apply_reassessment(RiskTier::Moderate, "x", t0());
        case.apply_reassessment(RiskTier::High, "x", t0());
        assert_eq!(case.risk_increase_count, 2);
        case.record_escalation("threshold reached".to_string(), t0());
        assert_eq!(case.risk_increase_count, 0);
        assert_eq!(case.alerts().last().unwrap().kind, AlertKind::Escalation);
    }

    #[test]
    fn follow_up_requires_hour_spacing() {
        let rules = MonitoringRules::default();
        let rule = rules.rule(RiskTier::High);
        let mut case = case_at(t0(), RiskTier::High);
        assert!(case.follow_up_due(rule, t0()));
        case.note_follow_up(t0());
        assert!(!case.follow_up_due(rule, t0() + Duration::minutes(30)));
        assert!(case.follow_up_due(rule, t0() + Duration::hours(1)));
    }

    #[test]
    fn follow_up_counter_resets_at_utc_day_boundary() {
        let late = Utc.with_ymd_and_hms(2026, 3, 14, 23, 30, 0).unwrap();
        let mut case = case_at(late, RiskTier::Low);
        case.note_follow_up(late);
        assert_eq!(case.follow_ups_completed_today, 1);

        let same_day = Utc.with_ymd_and_hms(2026, 3, 14, 23, 50, 0).unwrap();
        case.roll_follow_up_window(same_day);
        assert_eq!(case.follow_ups_completed_today, 1);

        let next_day = Utc.with_ymd_and_hms(2026, 3, 15, 0, 45, 0).unwrap();
        case.roll_follow_up_window(next_day);
        assert_eq!(case.follow_ups_completed_today, 0);
    }

    #[test]
    fn reschedule_uses_current_tier_interval() {
        let rules = MonitoringRules::default();
        let mut case = case_at(t0(), RiskTier::High);
        let now = t0() + Duration::minutes(31);
        case.reschedule(rules.rule(case.risk_tier), now);
        assert_eq!(case.last_check_at, now);
        assert_eq!(
            case.next_check_at - case.last_check_at,
            rules.rule(RiskTier::High).check_interval()
        );
    }
}
