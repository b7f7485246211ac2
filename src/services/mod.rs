pub mod otp_service;
pub mod sms_service;
