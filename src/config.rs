// config.rs
use std::env;

use crate::errors::{AppError, Result};

const DEFAULT_SMS_GATEWAY_URL: &str = "https://api.africastalking.com/version1/messaging";

#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub api_key: String,
    pub username: String,
    pub from: String,
    pub gateway_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_name: String,
    pub host: String,
    pub port: u16,
    pub otp_ttl_minutes: i64,
    /// Demo-only: echo the issued code back in the register response.
    pub expose_otp_in_response: bool,
    /// `None` keeps delivery on the logging stub.
    pub sms: Option<SmsConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let port = var_or("PORT", "3000")
            .parse::<u16>()
            .map_err(|e| AppError::configuration(format!("PORT must be a number: {}", e)))?;

        let otp_ttl_minutes = var_or("OTP_TTL_MINUTES", "10")
            .parse::<i64>()
            .map_err(|e| {
                AppError::configuration(format!("OTP_TTL_MINUTES must be a number: {}", e))
            })?;
        if otp_ttl_minutes <= 0 {
            return Err(AppError::configuration(
                "OTP_TTL_MINUTES must be greater than zero",
            ));
        }

        let expose_otp_in_response = parse_bool(&var_or("EXPOSE_OTP_IN_RESPONSE", "true"))
            .ok_or_else(|| {
                AppError::configuration("EXPOSE_OTP_IN_RESPONSE must be true or false")
            })?;

        let sms = lookup("SMS_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .map(|api_key| SmsConfig {
                api_key,
                username: var_or("SMS_USERNAME", "sandbox"),
                from: var_or("SMS_FROM", "Sahayak"),
                gateway_url: var_or("SMS_GATEWAY_URL", DEFAULT_SMS_GATEWAY_URL),
            });

        Ok(AppConfig {
            database_url: var_or("DATABASE_URL", "mongodb://localhost:27017"),
            database_name: var_or("DATABASE_NAME", "sahayak"),
            host: var_or("HOST", "0.0.0.0"),
            port,
            otp_ttl_minutes,
            expose_otp_in_response,
            sms,
        })
    }

    pub fn otp_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.otp_ttl_minutes)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
