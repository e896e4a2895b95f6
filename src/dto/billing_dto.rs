use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Redirect target for a hosted checkout or portal session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUrlResponse {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_users: usize,
    pub none: usize,
    pub trialing: usize,
    pub active: usize,
    pub past_due: usize,
    pub canceled: usize,
    pub other: usize,
    pub mrr: Decimal,
}
