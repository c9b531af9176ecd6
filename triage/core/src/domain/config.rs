// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Service configuration, loaded from YAML at startup. Secrets support the
// "env:VAR_NAME" indirection so config files can be committed without
// credentials.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use crate::domain::clinical::RiskTier;

/// Static per-tier monitoring configuration. Read-only after startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringRule {
    #[serde(with = "humantime_serde")]
    pub check_interval: StdDuration,
    pub escalation_threshold: u32,
    pub required_follow_ups_per_day: u32,
}

impl MonitoringRule {
    pub fn check_interval(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.check_interval).unwrap_or(chrono::TimeDelta::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringRules {
    pub low: MonitoringRule,
    pub moderate: MonitoringRule,
    pub high: MonitoringRule,
}

impl MonitoringRules {
    pub fn rule(&self, tier: RiskTier) -> &MonitoringRule {
        match tier {
            RiskTier::Low => &self.low,
            RiskTier::Moderate => &self.moderate,
            RiskTier::High => &self.high,
        }
    }
}

impl Default for MonitoringRules {
    fn default() -> Self {
        Self {
            low: MonitoringRule {
                check_interval: StdDuration::from_secs(4 * 3600),
                escalation_threshold: 2,
                required_follow_ups_per_day: 1,
            },
            moderate: MonitoringRule {
                check_interval: StdDuration::from_secs(3600),
                escalation_threshold: 2,
                required_follow_ups_per_day: 2,
            },
            high: MonitoringRule {
                check_interval: StdDuration::from_secs(30 * 60),
                escalation_threshold: 2,
                required_follow_ups_per_day: 3,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// "anthropic" for the live service, "rules" for the deterministic
    /// offline implementation.
    pub provider: String,
    pub model: String,
    /// Plain value or "env:VAR_NAME".
    pub api_key: Option<String>,
    pub max_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "rules".to_string(),
            model: "claude-sonnet-4-5".to_string(),
            api_key: Some("env:ANTHROPIC_API_KEY".to_string()),
            max_tokens: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// "twilio" or "log".
    pub channel: String,
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub from_number: Option<String>,
    /// Phone number (or generic address) alerts are delivered to.
    pub escalation_target: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            channel: "log".to_string(),
            account_sid: Some("env:TWILIO_ACCOUNT_SID".to_string()),
            auth_token: Some("env:TWILIO_AUTH_TOKEN".to_string()),
            from_number: Some("env:TWILIO_PHONE_NUMBER".to_string()),
            escalation_target: "env:DOCTOR_PHONE_NUMBER".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub notification: NotificationConfig,
    pub monitoring: MonitoringRules,
    pub reports_dir: PathBuf,
    /// How often the scheduler scans for cases whose check is due.
    #[serde(with = "humantime_serde")]
    pub scheduler_poll_interval: StdDuration,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            model: ModelConfig::default(),
            notification: NotificationConfig::default(),
            monitoring: MonitoringRules::default(),
            reports_dir: PathBuf::from("reports"),
            scheduler_poll_interval: StdDuration::from_secs(60),
        }
    }
}

impl TriageConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config {}: {}", path.display(), e))?;
        let config: Self = serde_yaml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("failed to parse config {}: {}", path.display(), e))?;
        Ok(config)
    }
}

/// Resolve a secret from config (supports "env:VAR_NAME" syntax).
pub fn resolve_secret(value: &Option<String>, what: &str) -> anyhow::Result<String> {
    match value {
        Some(v) if v.starts_with("env:") => {
            let var_name = v.trim_start_matches("env:");
            std::env::var(var_name)
                .map_err(|_| anyhow::anyhow!("{}: environment variable not set: {}", what, var_name))
        }
        Some(v) => Ok(v.clone()),
        None => anyhow::bail!("{} is not configured", what),
    }
}
