use axum::{routing::post, Router};

use crate::{handlers::customer, state::AppState};

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        // Issue an OTP, creating the customer on first sight
        .route("/register", post(customer::register))
        // Verify a previously issued OTP
        .route("/login", post(customer::login))
}
