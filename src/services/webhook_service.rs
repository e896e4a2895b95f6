use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::database::user_store::{StatusChange, UserStore};
use crate::dto::webhook_dto::{StripeEvent, StripeInvoiceObject, StripeSubscriptionObject};
use crate::error::{Error, Result};
use crate::models::user::SubscriptionStatus;
use crate::utils::webhook_signature;

/// What the reconciler did with a verified event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied { email: String, status: SubscriptionStatus },
    UnknownCustomer(String),
    Ignored,
}

#[derive(Clone)]
pub struct WebhookService {
    users: UserStore,
    config: Arc<Config>,
}

impl WebhookService {
    pub fn new(users: UserStore, config: Arc<Config>) -> Self {
        Self { users, config }
    }

    /// Authenticates a raw delivery and decodes the event envelope.
    pub fn verify(&self, payload: &[u8], signature: Option<&str>) -> Result<StripeEvent> {
        let signature =
            signature.ok_or_else(|| Error::BadRequest("Webhook Error: missing signature".into()))?;
        webhook_signature::verify(
            &self.config.stripe_webhook_secret,
            payload,
            signature,
            Utc::now().timestamp(),
        )
        .map_err(|e| {
            tracing::warn!(error = %e, "Rejected webhook delivery");
            Error::BadRequest(format!("Webhook Error: {}", e))
        })?;

        serde_json::from_slice(payload)
            .map_err(|e| Error::BadRequest(format!("Webhook Error: invalid payload: {}", e)))
    }

    pub async fn handle(&self, event: StripeEvent) -> Result<Outcome> {
        tracing::info!(event_id = %event.id, event_type = %event.event_type, "Processing webhook event");

        let (customer_id, change) = match event.event_type.as_str() {
            "customer.subscription.created" | "customer.subscription.updated" => {
                let sub: StripeSubscriptionObject = decode_object(&event)?;
                let status = match sub.status.parse::<SubscriptionStatus>() {
                    Ok(status) => status,
                    Err(e) => {
                        tracing::warn!(event_id = %event.id, error = %e, "Ignoring subscription event");
                        return Ok(Outcome::Ignored);
                    }
                };
                let change = StatusChange::Subscription {
                    status,
                    subscription_id: sub.id,
                    trial_end: sub.trial_end.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
                };
                (sub.customer, change)
            }
            "customer.subscription.deleted" => {
                let sub: StripeSubscriptionObject = decode_object(&event)?;
                (sub.customer, StatusChange::Deleted)
            }
            "invoice.payment_succeeded" => {
                let invoice: StripeInvoiceObject = decode_object(&event)?;
                (invoice.customer, StatusChange::PaymentSucceeded)
            }
            "invoice.payment_failed" => {
                let invoice: StripeInvoiceObject = decode_object(&event)?;
                (invoice.customer, StatusChange::PaymentFailed)
            }
            other => {
                tracing::debug!(event_type = %other, "Unhandled webhook event type");
                return Ok(Outcome::Ignored);
            }
        };

        match self.users.apply_change(&customer_id, change).await {
            Some(user) => {
                tracing::info!(
                    email = %user.email,
                    status = %user.subscription_status,
                    "Subscription status updated"
                );
                Ok(Outcome::Applied {
                    email: user.email,
                    status: user.subscription_status,
                })
            }
            None => {
                tracing::info!(%customer_id, "No user for webhook customer");
                Ok(Outcome::UnknownCustomer(customer_id))
            }
        }
    }
}

fn decode_object<T: serde::de::DeserializeOwned>(event: &StripeEvent) -> Result<T> {
    serde_json::from_value(event.data.object.clone()).map_err(|e| {
        Error::BadRequest(format!(
            "Webhook Error: unexpected {} payload: {}",
            event.event_type, e
        ))
    })
}
