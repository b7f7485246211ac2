use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Customer,
    Partner,
}

/// Account document in the `users` collection, keyed by mobile number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub mobile_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub user_type: UserType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp_expires: Option<DateTime>,
}

impl User {
    pub fn new_customer(mobile_number: impl Into<String>) -> Self {
        Self {
            _id: None,
            name: None,
            mobile_number: mobile_number.into(),
            email: None,
            user_type: UserType::Customer,
            otp: None,
            otp_expires: None,
        }
    }

    /// True when `candidate` equals the stored code and `now_millis` is
    /// strictly before the stored expiry. An empty candidate never matches.
    pub fn otp_matches(&self, candidate: &str, now_millis: i64) -> bool {
        match (&self.otp, self.otp_expires) {
            (Some(code), Some(expires_at)) => {
                !candidate.is_empty()
                    && code == candidate
                    && expires_at.timestamp_millis() > now_millis
            }
            _ => false,
        }
    }
}

/// Keeps the last four characters for logs, e.g. `******3210`.
pub fn mask_mobile(mobile_number: &str) -> String {
    let len = mobile_number.chars().count();
    let hidden = len.saturating_sub(4);
    mobile_number
        .chars()
        .enumerate()
        .map(|(i, c)| if i < hidden { '*' } else { c })
        .collect()
}
