// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Qualitative risk level of a case, ordered LOW < MODERATE < HIGH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::Low => write!(f, "LOW"),
            RiskTier::Moderate => write!(f, "MODERATE"),
            RiskTier::High => write!(f, "HIGH"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    pub description: String,
    pub severity: Severity,
}

impl fmt::Display for Symptom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.description, self.severity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: u16,
    pub diastolic: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    C,
    F,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub value: f64,
    pub unit: TemperatureUnit,
}

impl Temperature {
    /// Normalized reading used for cross-case comparison.
    pub fn celsius(&self) -> f64 {
        match self.unit {
            TemperatureUnit::C => self.value,
            TemperatureUnit::F => (self.value - 32.0) * 5.0 / 9.0,
        }
    }
}

/// Vital-signs bundle. Fields are optional because text-derived intake
/// frequently mentions only a subset of readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<BloodPressure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Temperature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oxygen_saturation: Option<u8>,
}

impl fmt::Display for VitalSigns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(bp) = &self.blood_pressure {
            parts.push(format!("BP {}/{} mmHg", bp.systolic, bp.diastolic));
        }
        if let Some(hr) = self.heart_rate {
            parts.push(format!("HR {} bpm", hr));
        }
        if let Some(t) = &self.temperature {
            parts.push(format!("Temp {:.1}\u{00b0}{:?}", t.value, t.unit));
        }
        if let Some(o2) = self.oxygen_saturation {
            parts.push(format!("SpO2 {}%", o2));
        }
        if parts.is_empty() {
            write!(f, "not recorded")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Structured clinical data for one assessment. Immutable once recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalSnapshot {
    pub symptoms: Vec<Symptom>,
    pub vital_signs: VitalSigns,
    pub medical_history: Vec<String>,
}

impl ClinicalSnapshot {
    /// Semantic checks beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for symptom in &self.symptoms {
            if symptom.description.trim().is_empty() {
                return Err(ValidationError::EmptySymptomDescription);
            }
        }
        let vitals = &self.vital_signs;
        if let Some(bp) = &vitals.blood_pressure {
            if bp.systolic == 0 || bp.diastolic == 0 || bp.systolic < bp.diastolic {
                return Err(ValidationError::OutOfRange {
                    field: "blood_pressure",
                    value: f64::from(bp.systolic),
                });
            }
        }
        if let Some(hr) = vitals.heart_rate {
            if hr == 0 || hr > 350 {
                return Err(ValidationError::OutOfRange {
                    field: "heart_rate",
                    value: f64::from(hr),
                });
            }
        }
        if let Some(temp) = &vitals.temperature {
            let celsius = temp.celsius();
            if !(20.0..=46.0).contains(&celsius) {
                return Err(ValidationError::OutOfRange {
                    field: "temperature",
                    value: celsius,
                });
            }
        }
        if let Some(o2) = vitals.oxygen_saturation {
            if o2 > 100 {
                return Err(ValidationError::OutOfRange {
                    field: "oxygen_saturation",
                    value: f64::from(o2),
                });
            }
        }
        Ok(())
    }

    pub fn symptom_summary(&self) -> String {
        if self.symptoms.is_empty() {
            return "none reported".to_string();
        }
        self.symptoms
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn history_summary(&self) -> String {
        if self.medical_history.is_empty() {
            return "none reported".to_string();
        }
        self.medical_history.join("; ")
    }
}

/// Outcome of one risk assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: RiskTier,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("symptom description is empty")]
    EmptySymptomDescription,

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}
