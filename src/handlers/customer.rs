use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use validator::Validate;

use crate::dtos::customer_dtos::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use crate::errors::Result;
use crate::state::AppState;

// POST /api/customer/register
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let issued = state.otp_service.issue(&req.mobile_number).await?;

    Ok(Json(RegisterResponse {
        msg: "OTP sent successfully".to_string(),
        otp: state.expose_otp_in_response.then_some(issued.code),
    }))
}

// POST /api/customer/login
// No session token is issued yet; success is reported by message only.
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(req) = payload?;

    state
        .otp_service
        .verify(&req.mobile_number, &req.otp)
        .await?;

    Ok(Json(LoginResponse {
        msg: "Login successful".to_string(),
    }))
}
