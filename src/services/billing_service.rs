//! Billing provider seam and its Stripe implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub customer_id: String,
    pub price_id: String,
    pub trial_days: u32,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalRequest {
    pub customer_id: String,
    pub return_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostedSession {
    pub id: String,
    pub url: String,
}

#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Creates the remote customer record and returns its id.
    async fn create_customer(&self, customer: NewCustomer) -> Result<String>;

    async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<HostedSession>;

    async fn create_portal_session(&self, request: PortalRequest) -> Result<HostedSession>;
}

#[derive(Debug, Deserialize)]
struct StripeCustomer {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Talks to the Stripe REST API with form-encoded requests.
#[derive(Clone)]
pub struct StripeBilling {
    client: Client,
    api_base: String,
    secret_key: String,
}

impl StripeBilling {
    pub fn new(secret_key: String, api_base: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.stripe_secret_key.clone(),
            config.stripe_api_base.clone(),
        )
    }

    async fn post_form<T>(&self, path: &str, params: &[(&str, String)]) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.api_base, path);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.secret_key, Option::<&str>::None)
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<StripeErrorBody>(&body)
                .ok()
                .map(|e| {
                    format!(
                        "{}: {}",
                        e.error.kind.unwrap_or_else(|| "api_error".into()),
                        e.error.message.unwrap_or_default()
                    )
                })
                .unwrap_or(body);
            tracing::error!(%url, %status, %detail, "Stripe request failed");
            return Err(Error::Upstream(format!("{} returned {}: {}", path, status, detail)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::Upstream(format!("failed to parse Stripe response from {}: {}", path, e)))
    }
}

#[async_trait]
impl BillingProvider for StripeBilling {
    async fn create_customer(&self, customer: NewCustomer) -> Result<String> {
        let params = [
            ("email", customer.email.clone()),
            ("name", customer.name),
            ("metadata[app_email]", customer.email),
        ];
        let created: StripeCustomer = self.post_form("/v1/customers", &params).await?;
        tracing::info!(customer_id = %created.id, "Created Stripe customer");
        Ok(created.id)
    }

    async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<HostedSession> {
        let params = [
            ("mode", "subscription".to_string()),
            ("customer", request.customer_id),
            ("line_items[0][price]", request.price_id),
            ("line_items[0][quantity]", "1".to_string()),
            (
                "subscription_data[trial_period_days]",
                request.trial_days.to_string(),
            ),
            ("success_url", request.success_url),
            ("cancel_url", request.cancel_url),
        ];
        self.post_form("/v1/checkout/sessions", &params).await
    }

    async fn create_portal_session(&self, request: PortalRequest) -> Result<HostedSession> {
        let params = [
            ("customer", request.customer_id),
            ("return_url", request.return_url),
        ];
        self.post_form("/v1/billing_portal/sessions", &params).await
    }
}
