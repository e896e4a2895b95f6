use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::{SubscriptionStatus, User};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub email: String,
    pub name: String,
    pub subscription_status: SubscriptionStatus,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
            subscription_status: user.subscription_status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub email: String,
    pub name: String,
    pub subscription_status: SubscriptionStatus,
    pub trial_end: Option<DateTime<Utc>>,
}

impl From<User> for MeResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            name: user.name,
            subscription_status: user.subscription_status,
            trial_end: user.trial_end,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumResponse {
    pub message: String,
    pub email: String,
    pub subscription_status: SubscriptionStatus,
}
