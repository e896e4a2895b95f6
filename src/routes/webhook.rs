use axum::{extract::State, http::HeaderMap, Json};
use bytes::Bytes;

use crate::{dto::webhook_dto::WebhookAck, error::Result, AppState};

pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Receives billing events. The body must stay raw: the signature covers the
/// exact bytes sent.
pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    let event = state.webhook_service.verify(&body, signature)?;
    state.webhook_service.handle(event).await?;
    Ok(Json(WebhookAck { received: true }))
}
