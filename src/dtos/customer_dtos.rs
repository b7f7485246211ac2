use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

// Request DTOs
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "mobileNumber is required"))]
    pub mobile_number: String,
}

// Missing or malformed fields fall through to the lookup, so login only
// ever answers "User not found" or "Invalid or expired OTP".
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub mobile_number: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub otp: String,
}

/// Non-string JSON values (numbers, null, objects) become "".
fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

// Response DTOs
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub msg: String,
    /// Demo-only echo of the issued code; omitted when exposure is off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub msg: String,
}
