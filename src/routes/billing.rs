use axum::{extract::State, Extension, Json};

use crate::{
    dto::billing_dto::SessionUrlResponse, error::Result, utils::token::Claims, AppState,
};

#[axum::debug_handler]
pub async fn create_checkout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SessionUrlResponse>> {
    let session = state
        .subscription_service
        .create_checkout(&claims.sub)
        .await?;
    Ok(Json(SessionUrlResponse { url: session.url }))
}

#[axum::debug_handler]
pub async fn create_portal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SessionUrlResponse>> {
    let session = state.subscription_service.create_portal(&claims.sub).await?;
    Ok(Json(SessionUrlResponse { url: session.url }))
}
