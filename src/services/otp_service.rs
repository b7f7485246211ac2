use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use mongodb::bson;
use rand::Rng;

use crate::database::user_repository::UserRepository;
use crate::errors::{AppError, Result};
use crate::models::user::{mask_mobile, User};
use crate::services::sms_service::SmsSender;

pub const OTP_MIN: u32 = 1000;
pub const OTP_MAX: u32 = 9999;

pub trait OtpGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Uniform draw over [1000, 9999].
#[derive(Clone, Default)]
pub struct RandomOtpGenerator;

impl OtpGenerator for RandomOtpGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        rng.gen_range(OTP_MIN..=OTP_MAX).to_string()
    }
}

#[derive(Debug, Clone)]
pub struct IssuedOtp {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    /// Whether this issuance created the account.
    pub created: bool,
}

#[derive(Clone)]
pub struct OTPService {
    users: Arc<dyn UserRepository>,
    generator: Arc<dyn OtpGenerator>,
    sms: Arc<dyn SmsSender>,
    ttl: Duration,
}

impl OTPService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        generator: Arc<dyn OtpGenerator>,
        sms: Arc<dyn SmsSender>,
        ttl: Duration,
    ) -> Self {
        Self {
            users,
            generator,
            sms,
            ttl,
        }
    }

    pub async fn issue(&self, mobile_number: &str) -> Result<IssuedOtp> {
        self.issue_at(mobile_number, Utc::now()).await
    }

    /// Create-or-reuse the account, overwrite its code and expiry, persist,
    /// then hand the code to the SMS sender. Delivery failures are logged
    /// and do not fail the issuance.
    pub async fn issue_at(&self, mobile_number: &str, now: DateTime<Utc>) -> Result<IssuedOtp> {
        let existing = self.users.find_by_mobile(mobile_number).await?;
        let created = existing.is_none();
        let mut user = existing.unwrap_or_else(|| User::new_customer(mobile_number));

        let code = self.generator.generate();
        // The store keeps millisecond precision; report exactly what is stored.
        let expires_millis = (now + self.ttl).timestamp_millis();
        let expires_at = Utc
            .timestamp_millis_opt(expires_millis)
            .single()
            .ok_or_else(|| AppError::configuration("OTP expiry out of range"))?;

        user.otp = Some(code.clone());
        user.otp_expires = Some(bson::DateTime::from_millis(expires_millis));

        self.users.upsert(&user).await?;

        tracing::info!(
            mobile_number = %mask_mobile(mobile_number),
            created,
            expires_at = %expires_at.to_rfc3339(),
            "🔑 OTP issued"
        );

        if let Err(e) = self.sms.deliver(mobile_number, &code).await {
            tracing::warn!(
                mobile_number = %mask_mobile(mobile_number),
                "Failed to send OTP SMS: {}",
                e
            );
        }

        Ok(IssuedOtp {
            code,
            expires_at,
            created,
        })
    }

    pub async fn verify(&self, mobile_number: &str, candidate: &str) -> Result<User> {
        self.verify_at(mobile_number, candidate, Utc::now()).await
    }

    /// The code is not consumed on success; it stays valid until it expires
    /// or a new one is issued.
    pub async fn verify_at(
        &self,
        mobile_number: &str,
        candidate: &str,
        now: DateTime<Utc>,
    ) -> Result<User> {
        let user = self
            .users
            .find_by_mobile(mobile_number)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !user.otp_matches(candidate, now.timestamp_millis()) {
            tracing::info!(mobile_number = %mask_mobile(mobile_number), "OTP rejected");
            return Err(AppError::InvalidOtp);
        }

        tracing::info!(mobile_number = %mask_mobile(mobile_number), "✅ OTP verified");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserType;
    use crate::test_support::{
        FailingUserRepository, InMemoryUserRepository, RecordingSmsSender, SequenceOtpGenerator,
    };

    struct Fixture {
        users: Arc<InMemoryUserRepository>,
        sms: Arc<RecordingSmsSender>,
        service: OTPService,
    }

    fn fixture(codes: &[&str]) -> Fixture {
        let users = Arc::new(InMemoryUserRepository::new());
        let sms = Arc::new(RecordingSmsSender::new());
        let service = OTPService::new(
            users.clone(),
            Arc::new(SequenceOtpGenerator::new(codes)),
            sms.clone(),
            Duration::minutes(10),
        );
        Fixture {
            users,
            sms,
            service,
        }
    }

    #[test]
    fn random_codes_are_four_digits() {
        let generator = RandomOtpGenerator;
        for _ in 0..1_000 {
            let code = generator.generate();
            assert_eq!(code.len(), 4);
            let value: u32 = code.parse().unwrap();
            assert!((OTP_MIN..=OTP_MAX).contains(&value));
        }
    }

    #[tokio::test]
    async fn first_issuance_creates_one_customer() {
        let f = fixture(&["1234"]);

        let issued = f.service.issue("9876543210").await.unwrap();

        assert!(issued.created);
        assert_eq!(issued.code, "1234");
        assert_eq!(f.users.len(), 1);
        let user = f.users.get("9876543210").unwrap();
        assert_eq!(user.user_type, UserType::Customer);
        assert_eq!(user.otp.as_deref(), Some("1234"));
    }

    #[tokio::test]
    async fn reissuance_reuses_the_account() {
        let f = fixture(&["1111", "2222"]);

        f.service.issue("9876543210").await.unwrap();
        let second = f.service.issue("9876543210").await.unwrap();

        assert!(!second.created);
        assert_eq!(f.users.len(), 1);
    }

    #[tokio::test]
    async fn existing_partner_keeps_its_type() {
        let f = fixture(&["1234"]);
        let mut partner = User::new_customer("9000000001");
        partner.user_type = UserType::Partner;
        f.users.insert(partner);

        let issued = f.service.issue("9000000001").await.unwrap();

        assert!(!issued.created);
        assert_eq!(
            f.users.get("9000000001").unwrap().user_type,
            UserType::Partner
        );
    }

    #[tokio::test]
    async fn expiry_is_ten_minutes_after_issuance() {
        let f = fixture(&["1234"]);
        let now = Utc::now();

        let issued = f.service.issue_at("9876543210", now).await.unwrap();

        let stored = f.users.get("9876543210").unwrap().otp_expires.unwrap();
        assert_eq!(
            stored.timestamp_millis(),
            (now + Duration::minutes(10)).timestamp_millis()
        );
        assert!(issued.expires_at <= now + Duration::minutes(10));
    }

    #[tokio::test]
    async fn reported_expiry_equals_stored_expiry() {
        let f = fixture(&["1234"]);
        // Sub-millisecond component that the store cannot keep.
        let now = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();

        let issued = f.service.issue_at("9876543210", now).await.unwrap();

        let stored = f.users.get("9876543210").unwrap().otp_expires.unwrap();
        assert_eq!(issued.expires_at.timestamp_millis(), stored.timestamp_millis());
        assert_eq!(issued.expires_at.timestamp_subsec_nanos(), 123_000_000);
    }

    #[tokio::test]
    async fn issued_code_is_handed_to_sms_sender() {
        let f = fixture(&["4821"]);

        f.service.issue("9876543210").await.unwrap();

        assert_eq!(
            f.sms.deliveries(),
            vec![("9876543210".to_string(), "4821".to_string())]
        );
    }

    #[tokio::test]
    async fn sms_failure_does_not_fail_issuance() {
        let users = Arc::new(InMemoryUserRepository::new());
        let service = OTPService::new(
            users.clone(),
            Arc::new(SequenceOtpGenerator::new(&["1234"])),
            Arc::new(RecordingSmsSender::failing()),
            Duration::minutes(10),
        );

        let issued = service.issue("9876543210").await.unwrap();

        assert_eq!(issued.code, "1234");
        assert!(users.get("9876543210").is_some());
    }

    #[tokio::test]
    async fn verifies_within_window_and_rejects_after() {
        let f = fixture(&["1234"]);
        let issued_at = Utc::now();
        f.service.issue_at("9876543210", issued_at).await.unwrap();

        let ok = f
            .service
            .verify_at("9876543210", "1234", issued_at + Duration::minutes(9))
            .await;
        assert!(ok.is_ok());

        let late = f
            .service
            .verify_at("9876543210", "1234", issued_at + Duration::minutes(11))
            .await;
        assert!(matches!(late, Err(AppError::InvalidOtp)));
    }

    #[tokio::test]
    async fn code_is_invalid_at_the_expiry_instant() {
        let f = fixture(&["1234"]);
        let issued_at = Utc::now();
        f.service.issue_at("9876543210", issued_at).await.unwrap();

        let result = f
            .service
            .verify_at("9876543210", "1234", issued_at + Duration::minutes(10))
            .await;
        assert!(matches!(result, Err(AppError::InvalidOtp)));
    }

    #[tokio::test]
    async fn reissuance_invalidates_previous_code() {
        let f = fixture(&["1111", "2222"]);
        let now = Utc::now();
        f.service.issue_at("9876543210", now).await.unwrap();
        f.service.issue_at("9876543210", now).await.unwrap();

        let first = f.service.verify_at("9876543210", "1111", now).await;
        assert!(matches!(first, Err(AppError::InvalidOtp)));

        let second = f.service.verify_at("9876543210", "2222", now).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn unknown_number_is_not_found_and_not_created() {
        let f = fixture(&[]);

        let result = f.service.verify("5550000000", "1234").await;

        assert!(matches!(result, Err(AppError::UserNotFound)));
        assert_eq!(f.users.len(), 0);
    }

    #[tokio::test]
    async fn wrong_code_is_rejected() {
        let f = fixture(&["1234"]);
        f.service.issue("9876543210").await.unwrap();

        let result = f.service.verify("9876543210", "9999").await;
        assert!(matches!(result, Err(AppError::InvalidOtp)));
    }

    #[tokio::test]
    async fn account_without_code_never_verifies() {
        let f = fixture(&[]);
        f.users.insert(User::new_customer("9000000001"));

        let result = f.service.verify("9000000001", "").await;
        assert!(matches!(result, Err(AppError::InvalidOtp)));
    }

    #[tokio::test]
    async fn verified_code_can_be_replayed_until_expiry() {
        let f = fixture(&["1234"]);
        let now = Utc::now();
        f.service.issue_at("9876543210", now).await.unwrap();

        for minute in [1, 5, 9] {
            let result = f
                .service
                .verify_at("9876543210", "1234", now + Duration::minutes(minute))
                .await;
            assert!(result.is_ok());
        }
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let service = OTPService::new(
            Arc::new(FailingUserRepository),
            Arc::new(SequenceOtpGenerator::new(&["1234"])),
            Arc::new(RecordingSmsSender::new()),
            Duration::minutes(10),
        );

        assert!(matches!(
            service.issue("9876543210").await,
            Err(AppError::Store(_))
        ));
        assert!(matches!(
            service.verify("9876543210", "1234").await,
            Err(AppError::Store(_))
        ));
    }
}
