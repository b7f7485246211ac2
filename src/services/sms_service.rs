use async_trait::async_trait;
use reqwest::Client;

use crate::config::SmsConfig;
use crate::errors::{AppError, Result};
use crate::models::user::mask_mobile;

/// Hands an issued code to its recipient.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn deliver(&self, recipient: &str, code: &str) -> Result<()>;
}

/// Delivery stub: nothing leaves the process. The code is not logged.
#[derive(Clone, Default)]
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn deliver(&self, recipient: &str, _code: &str) -> Result<()> {
        tracing::info!(
            recipient = %mask_mobile(recipient),
            "📨 SMS delivery stubbed, OTP not sent"
        );
        Ok(())
    }
}

/// Form-encoded POST to an SMS gateway (Africa's Talking message API shape).
#[derive(Clone)]
pub struct HttpSmsSender {
    api_key: String,
    username: String,
    from: String,
    gateway_url: String,
    ttl_minutes: i64,
    client: Client,
}

impl HttpSmsSender {
    pub fn new(config: SmsConfig, ttl_minutes: i64) -> Self {
        Self {
            api_key: config.api_key,
            username: config.username,
            from: config.from,
            gateway_url: config.gateway_url,
            ttl_minutes,
            client: Client::new(),
        }
    }
}

pub fn otp_message(code: &str, ttl_minutes: i64) -> String {
    format!("Your Sahayak OTP is: {}. Valid for {} minutes.", code, ttl_minutes)
}

#[async_trait]
impl SmsSender for HttpSmsSender {
    async fn deliver(&self, recipient: &str, code: &str) -> Result<()> {
        let message = otp_message(code, self.ttl_minutes);

        let response = self
            .client
            .post(&self.gateway_url)
            .header("apiKey", &self.api_key)
            .header("Accept", "application/json")
            .form(&[
                ("username", self.username.as_str()),
                ("to", recipient),
                ("message", message.as_str()),
                ("from", self.from.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::external_api(format!("SMS API error: {}", e)))?;

        if response.status().is_success() {
            tracing::info!(
                recipient = %mask_mobile(recipient),
                "📨 OTP SMS accepted by gateway"
            );
            Ok(())
        } else {
            Err(AppError::external_api(format!(
                "SMS sending failed with status: {}",
                response.status()
            )))
        }
    }
}
