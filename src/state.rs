use std::sync::Arc;

use crate::database::user_repository::UserRepository;
use crate::services::otp_service::OTPService;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub otp_service: Arc<OTPService>,
    pub expose_otp_in_response: bool,
}

impl AppState {
    pub fn new(users: Arc<dyn UserRepository>, otp_service: Arc<OTPService>) -> Self {
        AppState {
            users,
            otp_service,
            expose_otp_in_response: true,
        }
    }

    pub fn with_otp_exposure(mut self, expose: bool) -> Self {
        self.expose_otp_in_response = expose;
        self
    }
}
