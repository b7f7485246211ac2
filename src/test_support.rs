// Test doubles for the injected capabilities of OTPService.
//
// Public so integration tests under tests/ can build the real router
// without a MongoDB instance.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::database::user_repository::UserRepository;
use crate::errors::{AppError, Result};
use crate::models::user::User;
use crate::services::otp_service::OtpGenerator;
use crate::services::sms_service::SmsSender;

// =============================================================================
// User store
// =============================================================================

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        self.users
            .lock()
            .unwrap()
            .insert(user.mobile_number.clone(), user);
    }

    pub fn get(&self, mobile_number: &str) -> Option<User> {
        self.users.lock().unwrap().get(mobile_number).cloned()
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_mobile(&self, mobile_number: &str) -> Result<Option<User>> {
        Ok(self.get(mobile_number))
    }

    async fn upsert(&self, user: &User) -> Result<()> {
        self.insert(user.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Every call fails as if the store were unreachable.
pub struct FailingUserRepository;

#[async_trait]
impl UserRepository for FailingUserRepository {
    async fn find_by_mobile(&self, _mobile_number: &str) -> Result<Option<User>> {
        Err(AppError::store("store unreachable"))
    }

    async fn upsert(&self, _user: &User) -> Result<()> {
        Err(AppError::store("store unreachable"))
    }

    async fn ping(&self) -> Result<()> {
        Err(AppError::store("store unreachable"))
    }
}

// =============================================================================
// OTP generator
// =============================================================================

/// Hands out pre-seeded codes in order, then falls back to "0000".
pub struct SequenceOtpGenerator {
    codes: Mutex<VecDeque<String>>,
}

impl SequenceOtpGenerator {
    pub fn new(codes: &[&str]) -> Self {
        Self {
            codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
        }
    }
}

impl OtpGenerator for SequenceOtpGenerator {
    fn generate(&self) -> String {
        self.codes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "0000".to_string())
    }
}

// =============================================================================
// SMS sender
// =============================================================================

pub struct RecordingSmsSender {
    deliveries: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingSmsSender {
    pub fn new() -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// Records the attempt, then reports a gateway failure.
    pub fn failing() -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// (recipient, code) pairs in call order
    pub fn deliveries(&self) -> Vec<(String, String)> {
        self.deliveries.lock().unwrap().clone()
    }
}

impl Default for RecordingSmsSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmsSender for RecordingSmsSender {
    async fn deliver(&self, recipient: &str, code: &str) -> Result<()> {
        self.deliveries
            .lock()
            .unwrap()
            .push((recipient.to_string(), code.to_string()));

        if self.fail {
            return Err(AppError::external_api("SMS gateway rejected the message"));
        }
        Ok(())
    }
}
