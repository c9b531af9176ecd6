// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Triage Model Infrastructure - Anti-Corruption Layer Implementations
//
// Each adapter translates between the domain interface and an external
// decision source. The rule-based implementation is a full citizen, not a
// test double: it is the offline/dev configuration.

pub mod anthropic;
pub mod rules;

use std::sync::Arc;

use crate::domain::config::{resolve_secret, ModelConfig};
use crate::domain::model::TriageModel;

pub use anthropic::AnthropicTriageModel;
pub use rules::RuleBasedTriageModel;

/// Construct the configured decision source.
pub fn model_from_config(config: &ModelConfig) -> anyhow::Result<Arc<dyn TriageModel>> {
    match config.provider.as_str() {
        "anthropic" => {
            let api_key = resolve_secret(&config.api_key, "model api_key")?;
            Ok(Arc::new(AnthropicTriageModel::new(
                api_key,
                config.model.clone(),
                config.max_tokens,
            )))
        }
        "rules" => Ok(Arc::new(RuleBasedTriageModel::new())),
        other => anyhow::bail!("unsupported model provider: {}", other),
    }
}
