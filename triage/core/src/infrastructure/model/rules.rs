// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Rule-Based Triage Model
//
// Deterministic decision source for offline development and tests. The
// risk rules mirror the hard constraints the live prompt pins down
// (neurological symptoms with elevated blood pressure, chest pain with
// shortness of breath), so both implementations agree on the cases that
// matter most.

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

use crate::domain::clinical::{
    BloodPressure, ClinicalSnapshot, RiskAssessment, RiskTier, Severity, Symptom, Temperature,
    TemperatureUnit, VitalSigns,
};
use crate::domain::model::{FollowUpDecision, FollowUpRequest, ModelError, TriageModel};

const SYMPTOM_KEYWORDS: &[(&str, Severity)] = &[
    ("chest pain", Severity::Severe),
    ("shortness of breath", Severity::Severe),
    ("difficulty breathing", Severity::Severe),
    ("slurred speech", Severity::Severe),
    ("confusion", Severity::Severe),
    ("numbness", Severity::Moderate),
    ("weakness", Severity::Moderate),
    ("headache", Severity::Moderate),
    ("palpitations", Severity::Moderate),
    ("fever", Severity::Moderate),
    ("dizziness", Severity::Mild),
    ("nausea", Severity::Mild),
    ("cough", Severity::Mild),
    ("fatigue", Severity::Mild),
];

const HISTORY_KEYWORDS: &[&str] = &[
    "diabetes",
    "hypertension",
    "asthma",
    "copd",
    "heart disease",
    "stroke",
    "cancer",
    "kidney disease",
];

const NEUROLOGICAL: &[&str] = &["headache", "weakness", "slurred speech", "confusion", "numbness"];

static BLOOD_PRESSURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2,3})\s*/\s*(\d{2,3})").expect("static pattern")
});
static HEART_RATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:heart rate|pulse|hr)\D{0,10}(\d{2,3})").expect("static pattern")
});
static TEMPERATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{2,3}(?:\.\d)?)\s*(?:°|degrees?\s*)?\s*([cf])\b").expect("static pattern")
});
static OXYGEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:spo2|o2|oxygen|sat(?:uration)?)\D{0,12}(\d{2,3})\s*%?").expect("static pattern")
});

#[derive(Debug, Default)]
pub struct RuleBasedTriageModel;

impl RuleBasedTriageModel {
    pub fn new() -> Self {
        Self
    }

    fn extract_vitals(text: &str) -> VitalSigns {
        let blood_pressure = BLOOD_PRESSURE_RE.captures(text).and_then(|c| {
            let systolic: u16 = c[1].parse().ok()?;
            let diastolic: u16 = c[2].parse().ok()?;
            (systolic >= diastolic).then_some(BloodPressure {
                systolic,
                diastolic,
            })
        });
        let heart_rate = HEART_RATE_RE
            .captures(text)
            .and_then(|c| c[1].parse().ok());
        let temperature = TEMPERATURE_RE.captures(text).and_then(|c| {
            let value: f64 = c[1].parse().ok()?;
            let unit = if c[2].eq_ignore_ascii_case("f") {
                TemperatureUnit::F
            } else {
                TemperatureUnit::C
            };
            Some(Temperature { value, unit })
        });
        let oxygen_saturation = OXYGEN_RE
            .captures(text)
            .and_then(|c| c[1].parse::<u8>().ok())
            .filter(|o2| *o2 <= 100);

        VitalSigns {
            blood_pressure,
            heart_rate,
            temperature,
            oxygen_saturation,
        }
    }

    fn has_symptom(snapshot: &ClinicalSnapshot, needle: &str) -> bool {
        snapshot
            .symptoms
            .iter()
            .any(|s| s.description.to_lowercase().contains(needle))
    }

    fn elevated_blood_pressure(snapshot: &ClinicalSnapshot) -> bool {
        snapshot
            .vital_signs
            .blood_pressure
            .is_some_and(|bp| bp.systolic >= 160 || bp.diastolic >= 100)
    }
}

#[async_trait]
impl TriageModel for RuleBasedTriageModel {
    async fn extract(&self, text: &str) -> Result<ClinicalSnapshot, ModelError> {
        let lowered = text.to_lowercase();

        let symptoms: Vec<Symptom> = SYMPTOM_KEYWORDS
            .iter()
            .filter(|(keyword, _)| lowered.contains(keyword))
            .map(|(keyword, severity)| Symptom {
                description: (*keyword).to_string(),
                severity: *severity,
            })
            .collect();

        let medical_history: Vec<String> = HISTORY_KEYWORDS
            .iter()
            .filter(|keyword| lowered.contains(*keyword))
            .map(|keyword| (*keyword).to_string())
            .collect();

        let snapshot = ClinicalSnapshot {
            symptoms,
            vital_signs: Self::extract_vitals(&lowered),
            medical_history,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    async fn assess_risk(&self, snapshot: &ClinicalSnapshot) -> Result<RiskAssessment, ModelError> {
        let neurological = NEUROLOGICAL
            .iter()
            .any(|needle| Self::has_symptom(snapshot, needle));

        if neurological && Self::elevated_blood_pressure(snapshot) {
            return Ok(RiskAssessment {
                risk_level: RiskTier::High,
                explanation: "Neurological symptoms with elevated blood pressure".to_string(),
            });
        }
        if Self::has_symptom(snapshot, "chest pain")
            && (Self::has_symptom(snapshot, "shortness of breath")
                || Self::has_symptom(snapshot, "difficulty breathing"))
        {
            return Ok(RiskAssessment {
                risk_level: RiskTier::High,
                explanation: "Chest pain with shortness of breath".to_string(),
            });
        }
        if snapshot
            .vital_signs
            .oxygen_saturation
            .is_some_and(|o2| o2 < 92)
        {
            return Ok(RiskAssessment {
                risk_level: RiskTier::High,
                explanation: "Oxygen saturation below 92%".to_string(),
            });
        }

        let severe_symptom = snapshot
            .symptoms
            .iter()
            .any(|s| s.severity == Severity::Severe);
        let tachycardic = snapshot.vital_signs.heart_rate.is_some_and(|hr| hr >= 120);
        let febrile = snapshot
            .vital_signs
            .temperature
            .is_some_and(|t| t.celsius() >= 39.0);

        if severe_symptom || tachycardic || febrile {
            return Ok(RiskAssessment {
                risk_level: RiskTier::Moderate,
                explanation: "Severe symptom or abnormal vital sign present".to_string(),
            });
        }

        Ok(RiskAssessment {
            risk_level: RiskTier::Low,
            explanation: "No high-risk symptom combinations or abnormal vitals".to_string(),
        })
    }

    async fn follow_up(&self, request: &FollowUpRequest) -> Result<FollowUpDecision, ModelError> {
        let needed = request.risk_tier > RiskTier::Low || request.prior_interactions == 0;
        let mut questions = vec![
            "Have any symptoms changed or worsened since the last check?".to_string(),
        ];
        let mut next_steps = Vec::new();
        let mut preventive_measures = Vec::new();

        match request.risk_tier {
            RiskTier::High => {
                questions.push("Is the patient able to speak in full sentences?".to_string());
                next_steps.push("Re-take vital signs and record the readings".to_string());
                next_steps.push("Keep emergency contact information at hand".to_string());
            }
            RiskTier::Moderate => {
                next_steps.push("Re-take vital signs within the next hour".to_string());
                preventive_measures.push("Rest and hydration until the next check".to_string());
            }
            RiskTier::Low => {
                preventive_measures.push("Continue normal activity; report any change".to_string());
            }
        }

        let complications = if request.similar_cases.is_empty() {
            Vec::new()
        } else {
            vec![format!(
                "{} similar historical case(s) on record; review their outcomes",
                request.similar_cases.len()
            )]
        };

        Ok(FollowUpDecision {
            needed,
            questions,
            next_steps,
            escalation_needed: request.risk_tier == RiskTier::High,
            complications,
            preventive_measures,
        })
    }

    async fn health_check(&self) -> Result<(), ModelError> {
        Ok(())
    }
}
