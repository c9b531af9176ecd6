// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Notification Channel Infrastructure

pub mod log;
pub mod twilio;

use std::sync::Arc;

use crate::domain::config::{resolve_secret, NotificationConfig};
use crate::domain::notify::NotificationChannel;

pub use log::LogChannel;
pub use twilio::TwilioSmsChannel;

/// Construct the configured delivery channel.
pub fn channel_from_config(config: &NotificationConfig) -> anyhow::Result<Arc<dyn NotificationChannel>> {
    match config.channel.as_str() {
        "twilio" => {
            let account_sid = resolve_secret(&config.account_sid, "twilio account_sid")?;
            let auth_token = resolve_secret(&config.auth_token, "twilio auth_token")?;
            let from_number = resolve_secret(&config.from_number, "twilio from_number")?;
            Ok(Arc::new(TwilioSmsChannel::new(
                account_sid,
                auth_token,
                from_number,
            )))
        }
        "log" => Ok(Arc::new(LogChannel)),
        other => anyhow::bail!("unsupported notification channel: {}", other),
    }
}
