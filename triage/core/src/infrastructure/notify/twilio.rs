// Twilio SMS Channel
//
// Transports alert messages through Twilio's REST API. Messages are
// clamped to the channel limit before transport; content is the caller's
// concern.

use async_trait::async_trait;

use crate::domain::notify::{truncate_message, DeliveryError, NotificationChannel};

pub struct TwilioSmsChannel {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioSmsChannel {
    pub fn new(account_sid: String, auth_token: String, from_number: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            account_sid,
            auth_token,
            from_number,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        )
    }
}

#[async_trait]
impl NotificationChannel for TwilioSmsChannel {
    async fn notify(&self, target: &str, message: &str) -> Result<(), DeliveryError> {
        let body = truncate_message(message);

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", target),
                ("From", self.from_number.as_str()),
                ("Body", body.as_ref()),
            ])
            .send()
            .await
            .map_err(|e| DeliveryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        tracing::debug!(target, "SMS delivered");
        Ok(())
    }
}
