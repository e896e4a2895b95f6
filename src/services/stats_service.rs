use std::sync::Arc;

use rust_decimal::Decimal;

use crate::config::Config;
use crate::database::user_store::UserStore;
use crate::dto::billing_dto::StatsResponse;
use crate::error::{Error, Result};
use crate::models::user::{SubscriptionStatus, User};
use crate::utils::crypto::secrets_match;

#[derive(Clone)]
pub struct StatsService {
    users: UserStore,
    config: Arc<Config>,
}

impl StatsService {
    pub fn new(users: UserStore, config: Arc<Config>) -> Self {
        Self { users, config }
    }

    /// Admin access is off entirely unless `ADMIN_API_KEY` is configured.
    pub fn authorize(&self, provided: Option<&str>) -> Result<()> {
        let Some(expected) = self.config.admin_api_key.as_deref() else {
            return Err(Error::Unauthorized("admin_disabled".into()));
        };
        let provided = provided.ok_or_else(|| Error::Unauthorized("missing_admin_key".into()))?;
        if secrets_match(provided, expected) {
            Ok(())
        } else {
            Err(Error::Unauthorized("invalid_admin_key".into()))
        }
    }

    pub async fn stats(&self) -> StatsResponse {
        summarize(&self.users.snapshot().await, self.config.plan_price)
    }
}

fn summarize(users: &[User], plan_price: Decimal) -> StatsResponse {
    let mut stats = StatsResponse {
        total_users: users.len(),
        ..Default::default()
    };
    for user in users {
        match user.subscription_status {
            SubscriptionStatus::None => stats.none += 1,
            SubscriptionStatus::Trialing => stats.trialing += 1,
            SubscriptionStatus::Active => stats.active += 1,
            SubscriptionStatus::PastDue => stats.past_due += 1,
            SubscriptionStatus::Canceled => stats.canceled += 1,
            _ => stats.other += 1,
        }
    }
    stats.mrr = plan_price * Decimal::from(stats.active);
    stats
}
