use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::error::Error;
use crate::utils::token::{verify_session_token, Claims};
use crate::AppState;

fn unauthorized(code: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": code }))).into_response()
}

fn bearer_token(req: &Request) -> Result<&str, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(unauthorized("missing_authorization"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(unauthorized("bad_authorization"));
    };
    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| unauthorized("unsupported_scheme"))
}

/// Rejects requests without a valid session token and attaches its [`Claims`].
pub async fn require_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let claims = match bearer_token(&req) {
        Ok(token) => verify_session_token(token, &state.config.jwt_secret),
        Err(rejection) => return rejection,
    };
    let Some(claims) = claims else {
        return unauthorized("invalid_token");
    };
    req.extensions_mut().insert(claims);
    next.run(req).await
}

/// Lets the request through only for users whose subscription is active or
/// trialing. Must run after [`require_session`].
pub async fn require_subscription(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(claims) = req.extensions().get::<Claims>().cloned() else {
        return unauthorized("missing_authorization");
    };
    let user = match state.account_service.profile(&claims.sub).await {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };
    if !user.subscription_status.is_entitled() {
        tracing::debug!(email = %user.email, status = %user.subscription_status, "Subscription gate denied access");
        return Error::Forbidden {
            code: "subscription_required",
            status: user.subscription_status,
        }
        .into_response();
    }
    next.run(req).await
}
