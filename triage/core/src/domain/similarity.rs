// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Similarity Matcher
//!
//! Compares a new case's clinical profile against historical cases to find
//! precedents. Pure functions, no side effects.
//!
//! A historical case qualifies when symptom-set Jaccard similarity exceeds
//! 0.5 **and** vital-signs similarity exceeds 0.7 (both strict). All
//! qualifying cases are returned, unranked.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::case::CaseId;
use crate::domain::clinical::ClinicalSnapshot;

pub const SYMPTOM_SIMILARITY_THRESHOLD: f64 = 0.5;
pub const VITAL_SIMILARITY_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarCase {
    pub case_id: CaseId,
    pub symptom_similarity: f64,
    pub vital_similarity: f64,
}

/// Jaccard similarity over case-normalized symptom descriptions.
///
/// Defined as 0 when both sets are empty: the naive |A∩B|/|A∪B| formula
/// divides by zero there and two symptomless records carry no signal.
pub fn symptom_similarity(a: &ClinicalSnapshot, b: &ClinicalSnapshot) -> f64 {
    let set_a: HashSet<String> = a
        .symptoms
        .iter()
        .map(|s| s.description.trim().to_lowercase())
        .collect();
    let set_b: HashSet<String> = b
        .symptoms
        .iter()
        .map(|s| s.description.trim().to_lowercase())
        .collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union as f64
}

/// Mean, over vital fields present in both records, of `1 - |a-b|/max(a,b)`.
/// A field's term is 0 when `max(a,b) == 0`; the whole score is 0 when no
/// field is present in both. Temperatures are compared in Celsius.
pub fn vital_similarity(a: &ClinicalSnapshot, b: &ClinicalSnapshot) -> f64 {
    let va = &a.vital_signs;
    let vb = &b.vital_signs;

    let mut terms = Vec::new();
    if let (Some(x), Some(y)) = (&va.blood_pressure, &vb.blood_pressure) {
        terms.push(field_similarity(f64::from(x.systolic), f64::from(y.systolic)));
        terms.push(field_similarity(f64::from(x.diastolic), f64::from(y.diastolic)));
    }
    if let (Some(x), Some(y)) = (va.heart_rate, vb.heart_rate) {
        terms.push(field_similarity(f64::from(x), f64::from(y)));
    }
    if let (Some(x), Some(y)) = (&va.temperature, &vb.temperature) {
        terms.push(field_similarity(x.celsius(), y.celsius()));
    }
    if let (Some(x), Some(y)) = (va.oxygen_saturation, vb.oxygen_saturation) {
        terms.push(field_similarity(f64::from(x), f64::from(y)));
    }

    if terms.is_empty() {
        return 0.0;
    }
    terms.iter().sum::<f64>() / terms.len() as f64
}

fn field_similarity(a: f64, b: f64) -> f64 {
    let max = a.max(b);
    if max <= 0.0 {
        return 0.0;
    }
    1.0 - (a - b).abs() / max
}

/// Returns every historical case similar to `current`.
pub fn find_similar<'a, I>(current: &ClinicalSnapshot, history: I) -> Vec<SimilarCase>
where
    I: IntoIterator<Item = (CaseId, &'a ClinicalSnapshot)>,
{
    history
        .into_iter()
        .filter_map(|(case_id, past)| {
            let symptom = symptom_similarity(current, past);
            let vital = vital_similarity(current, past);
            (symptom > SYMPTOM_SIMILARITY_THRESHOLD && vital > VITAL_SIMILARITY_THRESHOLD).then(
                || SimilarCase {
                    case_id,
                    symptom_similarity: symptom,
                    vital_similarity: vital,
                },
            )
        })
        .collect()
}
