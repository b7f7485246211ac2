// src/errors.rs
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("MongoDB error: {0}")]
    MongoDB(#[from] mongodb::error::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid or expired OTP")]
    InvalidOtp,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("External API error: {0}")]
    ExternalApi(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::UserNotFound | AppError::InvalidOtp | AppError::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::ExternalApi(_) => StatusCode::BAD_GATEWAY,
            AppError::MongoDB(_) | AppError::Store(_) | AppError::ConfigurationError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the caller. Infrastructure details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            AppError::UserNotFound => "User not found".to_string(),
            AppError::InvalidOtp => "Invalid or expired OTP".to_string(),
            AppError::ValidationError(detail) => detail.clone(),
            AppError::ExternalApi(_) => "External API error".to_string(),
            AppError::MongoDB(_) | AppError::Store(_) | AppError::ConfigurationError(_) => {
                "Server Error".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "msg": self.client_message(),
            "success": false,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(format!("Validation error: {}", errors))
    }
}

// Helper conversion functions
impl AppError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        AppError::Store(msg.into())
    }

    pub fn external_api(msg: impl Into<String>) -> Self {
        AppError::ExternalApi(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::ConfigurationError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
