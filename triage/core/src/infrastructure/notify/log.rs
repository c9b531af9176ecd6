// Log-Only Channel
//
// Development stand-in: alerts land in the service log instead of a
// paging channel.

use async_trait::async_trait;

use crate::domain::notify::{truncate_message, DeliveryError, NotificationChannel};

pub struct LogChannel;

#[async_trait]
impl NotificationChannel for LogChannel {
    async fn notify(&self, target: &str, message: &str) -> Result<(), DeliveryError> {
        tracing::info!(target, message = %truncate_message(message), "alert (log channel)");
        Ok(())
    }
}
