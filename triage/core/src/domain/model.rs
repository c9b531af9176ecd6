// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Model
//!
//! Provides model functionality for the system.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements model

// Triage Model Domain Interface (Anti-Corruption Layer)
//
// Defines the domain interface for the extraction / risk-scoring /
// follow-up decision source. Prevents vendor lock-in by abstracting the
// external model API, and lets a deterministic rule-based implementation
// stand in for the live service.
//
// Implementations in infrastructure/model/ directory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::clinical::{ClinicalSnapshot, RiskAssessment, RiskTier, ValidationError};
use crate::domain::similarity::SimilarCase;

/// Domain interface for the clinical decision source.
#[async_trait]
pub trait TriageModel: Send + Sync {
    /// Extract structured clinical data from free text.
    async fn extract(&self, text: &str) -> Result<ClinicalSnapshot, ModelError>;

    /// Assess the risk level of a structured snapshot.
    async fn assess_risk(&self, snapshot: &ClinicalSnapshot) -> Result<RiskAssessment, ModelError>;

    /// Produce a follow-up decision for a monitored case.
    async fn follow_up(&self, request: &FollowUpRequest) -> Result<FollowUpDecision, ModelError>;

    /// Check if the decision source is healthy and accessible.
    async fn health_check(&self) -> Result<(), ModelError>;
}

/// Context handed to the decision source for a follow-up decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpRequest {
    pub snapshot: ClinicalSnapshot,
    pub risk_tier: RiskTier,
    /// Historical precedents found by the similarity matcher.
    pub similar_cases: Vec<SimilarCase>,
    /// Number of prior monitoring interactions recorded for this case.
    pub prior_interactions: usize,
}

/// Decision payload returned by the policy engine's decision source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowUpDecision {
    pub needed: bool,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub escalation_needed: bool,
    #[serde(default)]
    pub complications: Vec<String>,
    #[serde(default)]
    pub preventive_measures: Vec<String>,
}

/// Errors that can occur while consulting the decision source.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("rate limit exceeded")]
    RateLimit,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("response failed validation: {0}")]
    Schema(#[from] ValidationError),

    #[error("provider error: {0}")]
    Provider(String),
}
