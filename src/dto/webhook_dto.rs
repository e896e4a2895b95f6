use serde::{Deserialize, Serialize};

/// Envelope of a provider event as delivered to `/webhook`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub created: i64,
    pub data: StripeEventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeSubscriptionObject {
    pub id: String,
    pub customer: String,
    pub status: String,
    #[serde(default)]
    pub trial_end: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeInvoiceObject {
    pub id: Option<String>,
    pub customer: String,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}
