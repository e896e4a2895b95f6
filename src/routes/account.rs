use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    dto::auth_dto::{LoginRequest, MeResponse, PremiumResponse, SignupRequest},
    error::Result,
    utils::token::Claims,
    AppState,
};

#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let response = state.account_service.signup(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let response = state.account_service.login(payload).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MeResponse>> {
    let user = state.account_service.profile(&claims.sub).await?;
    Ok(Json(MeResponse::from(user)))
}

#[axum::debug_handler]
pub async fn premium(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<PremiumResponse>> {
    let user = state.account_service.profile(&claims.sub).await?;
    Ok(Json(PremiumResponse {
        message: format!("Welcome back, {}!", user.name),
        email: user.email,
        subscription_status: user.subscription_status,
    }))
}
