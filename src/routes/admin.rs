use axum::{extract::State, http::HeaderMap, Json};

use crate::{dto::billing_dto::StatsResponse, error::Result, AppState};

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

#[axum::debug_handler]
pub async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>> {
    let provided = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    state.stats_service.authorize(provided)?;
    Ok(Json(state.stats_service.stats().await))
}
