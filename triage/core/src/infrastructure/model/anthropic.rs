// Anthropic Triage Model Adapter
//
// Anti-Corruption Layer for the Anthropic Claude API. Prompts pin the
// response to a JSON schema; anything that fails to parse or validate
// surfaces as a typed error rather than a defaulted decision.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::clinical::{ClinicalSnapshot, RiskAssessment};
use crate::domain::model::{FollowUpDecision, FollowUpRequest, ModelError, TriageModel};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

const EXTRACTION_PROMPT: &str = r#"You are a medical triage assistant. Extract structured medical information from the input text.
Focus on identifying symptoms, their severity, vital signs, and relevant medical history.
Respond with only a JSON object of the following structure:
{
    "symptoms": [{"description": "string", "severity": "mild|moderate|severe"}],
    "vital_signs": {
        "blood_pressure": {"systolic": number, "diastolic": number},
        "heart_rate": number,
        "temperature": {"value": number, "unit": "C|F"},
        "oxygen_saturation": number
    },
    "medical_history": ["string"]
}
Omit any vital-sign field that the text does not mention."#;

const RISK_PROMPT: &str = r#"You are a medical risk assessment expert. Analyze the provided medical data and determine the risk level.
Consider symptoms, vital signs, and medical history.
Provide a risk level (LOW, MODERATE, HIGH) and a detailed explanation.
Respond with only a JSON object with 'risk_level' and 'explanation' fields.
For neurological symptoms (headache, weakness, speech problems) with high blood pressure, always return HIGH risk.
For chest pain with shortness of breath, always return HIGH risk."#;

const FOLLOW_UP_PROMPT: &str = r#"You are a medical follow-up planner for an ongoing monitored case.
Given the case's current clinical data, its risk level, and similar historical cases, decide whether a follow-up interaction is warranted and what it should cover.
Respond with only a JSON object of the following structure:
{
    "needed": boolean,
    "questions": ["string"],
    "next_steps": ["string"],
    "escalation_needed": boolean,
    "complications": ["string"],
    "preventive_measures": ["string"]
}"#;

pub struct AnthropicTriageModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    temperature: f32,
    system: String,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    text: String,
}

impl AnthropicTriageModel {
    pub fn new(api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            max_tokens,
        }
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, ModelError> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: user.to_string(),
            }],
            max_tokens: self.max_tokens,
            temperature: 0.0,
            system: system.to_string(),
        };

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            return Err(if status == 401 || status == 403 {
                ModelError::Authentication(error_text)
            } else if status == 429 {
                ModelError::RateLimit
            } else if status == 404 {
                ModelError::ModelNotFound(self.model.clone())
            } else {
                ModelError::Provider(format!("HTTP {}: {}", status, error_text))
            });
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Malformed(format!("failed to parse response: {}", e)))?;

        parsed
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| ModelError::Malformed("empty response content".to_string()))
    }

    fn parse_payload<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, ModelError> {
        serde_json::from_str(strip_code_fence(raw))
            .map_err(|e| ModelError::Malformed(format!("{}: {}", e, raw)))
    }
}

/// Models occasionally wrap JSON in a Markdown code fence despite the
/// prompt; tolerate that one decoration.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[async_trait]
impl TriageModel for AnthropicTriageModel {
    async fn extract(&self, text: &str) -> Result<ClinicalSnapshot, ModelError> {
        let raw = self.complete(EXTRACTION_PROMPT, text).await?;
        let snapshot: ClinicalSnapshot = Self::parse_payload(&raw)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    async fn assess_risk(&self, snapshot: &ClinicalSnapshot) -> Result<RiskAssessment, ModelError> {
        let data = serde_json::to_string_pretty(snapshot)
            .map_err(|e| ModelError::Provider(e.to_string()))?;
        let raw = self
            .complete(RISK_PROMPT, &format!("Analyze this medical data: {}", data))
            .await?;
        Self::parse_payload(&raw)
    }

    async fn follow_up(&self, request: &FollowUpRequest) -> Result<FollowUpDecision, ModelError> {
        let context = serde_json::to_string_pretty(request)
            .map_err(|e| ModelError::Provider(e.to_string()))?;
        let raw = self
            .complete(
                FOLLOW_UP_PROMPT,
                &format!("Plan the follow-up for this case: {}", context),
            )
            .await?;
        Self::parse_payload(&raw)
    }

    async fn health_check(&self) -> Result<(), ModelError> {
        // Anthropic has no models-list endpoint; a GET on the messages
        // endpoint answers 404/405 when the key is valid.
        let response = self
            .client
            .get(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if response.status().is_success() || response.status() == 404 || response.status() == 405 {
            Ok(())
        } else if response.status() == 401 || response.status() == 403 {
            Err(ModelError::Authentication("invalid API key".into()))
        } else {
            Err(ModelError::Network(format!("HTTP {}", response.status())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_fences_are_stripped() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn risk_payload_parses() {
        let parsed: RiskAssessment = AnthropicTriageModel::parse_payload(
            "{\"risk_level\": \"HIGH\", \"explanation\": \"chest pain with dyspnea\"}",
        )
        .unwrap();
        assert_eq!(parsed.risk_level, crate::domain::clinical::RiskTier::High);
    }

    #[test]
    fn garbage_payload_is_malformed() {
        let parsed: Result<RiskAssessment, _> =
            AnthropicTriageModel::parse_payload("the patient seems fine");
        assert!(matches!(parsed, Err(ModelError::Malformed(_))));
    }
}
