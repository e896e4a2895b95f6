use std::sync::Arc;

use crate::config::Config;
use crate::database::user_store::UserStore;
use crate::error::{Error, Result};
use crate::services::billing_service::{BillingProvider, CheckoutRequest, HostedSession, PortalRequest};

#[derive(Clone)]
pub struct SubscriptionService {
    users: UserStore,
    billing: Arc<dyn BillingProvider>,
    config: Arc<Config>,
}

impl SubscriptionService {
    pub fn new(users: UserStore, billing: Arc<dyn BillingProvider>, config: Arc<Config>) -> Self {
        Self {
            users,
            billing,
            config,
        }
    }

    pub async fn create_checkout(&self, email: &str) -> Result<HostedSession> {
        let user = self
            .users
            .get(email)
            .await
            .ok_or_else(|| Error::NotFound("User not found".into()))?;

        if user.subscription_status.is_entitled() {
            return Err(Error::BadRequest(
                "You already have an active subscription".into(),
            ));
        }
        let customer_id = user
            .customer_id
            .ok_or_else(|| Error::BadRequest("No billing account found".into()))?;

        let session = self
            .billing
            .create_checkout_session(CheckoutRequest {
                customer_id,
                price_id: self.config.stripe_price_id.clone(),
                trial_days: self.config.trial_days,
                success_url: self.config.public_link("dashboard?checkout=success"),
                cancel_url: self.config.public_link("pricing?checkout=canceled"),
            })
            .await?;

        tracing::info!(email = %user.email, session_id = %session.id, "Checkout session created");
        Ok(session)
    }

    pub async fn create_portal(&self, email: &str) -> Result<HostedSession> {
        let user = self
            .users
            .get(email)
            .await
            .ok_or_else(|| Error::NotFound("User not found".into()))?;
        let customer_id = user
            .customer_id
            .ok_or_else(|| Error::BadRequest("No billing account found".into()))?;

        self.billing
            .create_portal_session(PortalRequest {
                customer_id,
                return_url: self.config.public_link("dashboard"),
            })
            .await
    }
}
