// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Notification Channel Domain Interface (Anti-Corruption Layer)
//
// Message content is constructed by callers; a channel only transports it.
// Delivery failure must never abort the caller — the monitor and intake
// pipeline log and swallow `DeliveryError`.

use async_trait::async_trait;
use std::borrow::Cow;

/// Usable characters per message, leaving room for the truncation marker
/// within the transport's 1600-character cap.
pub const MAX_MESSAGE_CHARS: usize = 1500;

pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

/// Domain interface for alert delivery.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn notify(&self, target: &str, message: &str) -> Result<(), DeliveryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("network error: {0}")]
    Network(String),

    #[error("delivery rejected (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: String },
}

/// Clamp a message to the channel limit without splitting a multi-byte
/// character. Channel implementations apply this before transport.
pub fn truncate_message(message: &str) -> Cow<'_, str> {
    if message.chars().count() <= MAX_MESSAGE_CHARS {
        return Cow::Borrowed(message);
    }
    let keep = MAX_MESSAGE_CHARS - TRUNCATION_MARKER.chars().count();
    let mut truncated: String = message.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_MARKER);
    Cow::Owned(truncated)
}
