// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Learning Store
//!
//! Append-only per-case log of assessments and policy responses, plus
//! per-symptom pattern statistics maintained incrementally as entries are
//! recorded (no recomputation from scratch). Backed by sharded maps so
//! concurrent `record` calls across cases and symptom keys do not contend.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::domain::case::CaseId;
use crate::domain::clinical::ClinicalSnapshot;
use crate::domain::model::FollowUpDecision;

/// One historical record per case per monitoring interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningEntry {
    pub recorded_at: DateTime<Utc>,
    pub snapshot: ClinicalSnapshot,
    pub decision: FollowUpDecision,
    pub outcome: Outcome,
}

/// `Pending` until externally resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pending,
    Improved,
    Complicated,
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSummary {
    pub case_id: CaseId,
    pub entry_count: usize,
    pub first_recorded_at: DateTime<Utc>,
    pub last_recorded_at: DateTime<Utc>,
    pub entries: Vec<LearningEntry>,
}

/// Aggregates across all cases sharing a symptom description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternStats {
    pub count: u64,
    pub interventions: u64,
    pub complications: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum LearningError {
    #[error("no learning entries for case {0}")]
    NotFound(CaseId),
}

#[derive(Default)]
pub struct LearningStore {
    entries: DashMap<CaseId, Vec<LearningEntry>>,
    patterns: DashMap<String, PatternStats>,
}

impl LearningStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry with outcome `Pending` and folds it into the
    /// per-symptom pattern statistics.
    pub fn record(
        &self,
        case_id: CaseId,
        snapshot: ClinicalSnapshot,
        decision: FollowUpDecision,
        recorded_at: DateTime<Utc>,
    ) {
        for key in Self::symptom_keys(&snapshot) {
            let mut stats = self.patterns.entry(key).or_default();
            stats.count += 1;
            stats.interventions += decision.next_steps.len() as u64;
            stats.complications += decision.complications.len() as u64;
        }

        let entry = LearningEntry {
            recorded_at,
            snapshot,
            decision,
            outcome: Outcome::Pending,
        };
        self.entries.entry(case_id).or_default().push(entry);
    }

    /// Marks the most recent entry of a case as externally resolved.
    pub fn resolve_outcome(&self, case_id: CaseId, outcome: Outcome) -> Result<(), LearningError> {
        let mut entries = self
            .entries
            .get_mut(&case_id)
            .ok_or(LearningError::NotFound(case_id))?;
        match entries.last_mut() {
            Some(entry) => {
                entry.outcome = outcome;
                Ok(())
            }
            None => Err(LearningError::NotFound(case_id)),
        }
    }

    pub fn summarize(&self, case_id: CaseId) -> Result<CaseSummary, LearningError> {
        let entries = self
            .entries
            .get(&case_id)
            .ok_or(LearningError::NotFound(case_id))?;
        let (first, last) = match (entries.first(), entries.last()) {
            (Some(first), Some(last)) => (first.recorded_at, last.recorded_at),
            _ => return Err(LearningError::NotFound(case_id)),
        };
        Ok(CaseSummary {
            case_id,
            entry_count: entries.len(),
            first_recorded_at: first,
            last_recorded_at: last,
            entries: entries.clone(),
        })
    }

    /// Exact-match lookup on the normalized symptom description.
    pub fn pattern_stats(&self, symptom: &str) -> Option<PatternStats> {
        self.patterns
            .get(&Self::normalize(symptom))
            .map(|stats| *stats)
    }

    pub fn entry_count(&self, case_id: CaseId) -> usize {
        self.entries.get(&case_id).map_or(0, |e| e.len())
    }

    /// Latest recorded snapshot per case, excluding `current` — the history
    /// input the similarity matcher compares against.
    pub fn latest_snapshots(&self, current: CaseId) -> Vec<(CaseId, ClinicalSnapshot)> {
        self.entries
            .iter()
            .filter(|entry| *entry.key() != current)
            .filter_map(|entry| {
                entry
                    .value()
                    .last()
                    .map(|last| (*entry.key(), last.snapshot.clone()))
            })
            .collect()
    }

    fn symptom_keys(snapshot: &ClinicalSnapshot) -> Vec<String> {
        let mut keys: Vec<String> = snapshot
            .symptoms
            .iter()
            .map(|s| Self::normalize(&s.description))
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    fn normalize(symptom: &str) -> String {
        symptom.trim().to_lowercase()
    }
}
