// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{bail, Result};
use reqwest::Client;
use uuid::Uuid;

use crate::types::{CaseReport, CaseStatus, ClinicalSnapshot, RiskTier, StartCase, TriageOutcome};

/// Client for interacting with a MedAssist triage node.
pub struct MedAssistClient {
    base_url: String,
    client: Client,
}

impl MedAssistClient {
    /// Create a new MedAssist client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    /// Check that the node is up.
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/api/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            bail!("health check failed: HTTP {}", response.status());
        }
        Ok(())
    }

    /// Triage a free-text patient description.
    pub async fn analyze(&self, text: &str) -> Result<TriageOutcome> {
        let url = format!("{}/api/analyze", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    /// Triage already-structured clinical data.
    pub async fn analyze_snapshot(&self, snapshot: &ClinicalSnapshot) -> Result<TriageOutcome> {
        let url = format!("{}/api/analyze-triage", self.base_url);
        let response = self.client.post(&url).json(snapshot).send().await?;
        Self::expect_ok(response).await
    }

    /// Register a case for ongoing monitoring.
    pub async fn start_case(
        &self,
        case_id: Option<Uuid>,
        snapshot: ClinicalSnapshot,
        risk_tier: Option<RiskTier>,
    ) -> Result<CaseStatus> {
        let url = format!("{}/api/cases", self.base_url);
        let body = StartCase {
            case_id,
            structured_data: snapshot,
            risk_tier,
        };
        let response = self.client.post(&url).json(&body).send().await?;
        Self::expect_ok(response).await
    }

    /// Run one monitoring check now.
    pub async fn check_case(&self, case_id: Uuid) -> Result<CaseStatus> {
        let url = format!("{}/api/cases/{}/check", self.base_url, case_id);
        let response = self.client.post(&url).send().await?;
        Self::expect_ok(response).await
    }

    /// Fetch the live status plus the recorded interaction log.
    pub async fn case_summary(&self, case_id: Uuid) -> Result<CaseReport> {
        let url = format!("{}/api/cases/{}", self.base_url, case_id);
        let response = self.client.get(&url).send().await?;
        Self::expect_ok(response).await
    }

    /// Remove a case from monitoring.
    pub async fn stop_case(&self, case_id: Uuid) -> Result<()> {
        let url = format!("{}/api/cases/{}", self.base_url, case_id);
        let response = self.client.delete(&url).send().await?;
        if !response.status().is_success() {
            bail!("stop failed: HTTP {}", response.status());
        }
        Ok(())
    }

    /// Download a rendered PDF report by file name.
    pub async fn download_report(&self, filename: &str) -> Result<Vec<u8>> {
        let url = format!("{}/api/reports/{}", self.base_url, filename);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            bail!("report download failed: HTTP {}", response.status());
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn expect_ok<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("HTTP {}: {}", status, detail);
        }
        Ok(response.json().await?)
    }
}
