pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::Config;
use crate::database::user_store::UserStore;
use crate::services::{
    account_service::AccountService, billing_service::BillingProvider,
    stats_service::StatsService, subscription_service::SubscriptionService,
    webhook_service::WebhookService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: UserStore,
    pub account_service: AccountService,
    pub subscription_service: SubscriptionService,
    pub webhook_service: WebhookService,
    pub stats_service: StatsService,
}

impl AppState {
    pub fn new(config: Config, billing: Arc<dyn BillingProvider>) -> Self {
        let config = Arc::new(config);
        let users = UserStore::new();

        let account_service = AccountService::new(users.clone(), billing.clone(), config.clone());
        let subscription_service = SubscriptionService::new(users.clone(), billing, config.clone());
        let webhook_service = WebhookService::new(users.clone(), config.clone());
        let stats_service = StatsService::new(users.clone(), config.clone());

        Self {
            config,
            users,
            account_service,
            subscription_service,
            webhook_service,
            stats_service,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let public_api = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/signup", post(routes::account::signup))
        .route("/api/login", post(routes::account::login))
        .route("/webhook", post(routes::webhook::handle_stripe_webhook))
        .route("/admin/stats", get(routes::admin::stats));

    let session_api = Router::new()
        .route("/api/me", get(routes::account::me))
        .route("/api/create-checkout", post(routes::billing::create_checkout))
        .route("/api/portal", post(routes::billing::create_portal))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::auth::require_session,
        ));

    // Layers run outermost-last, so the session check happens first.
    let subscriber_api = Router::new()
        .route("/api/premium", get(routes::account::premium))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::auth::require_subscription,
        ))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::auth::require_session,
        ));

    let mut app = public_api.merge(session_api).merge(subscriber_api);
    if let Some(dir) = state.config.static_dir.as_deref() {
        tracing::info!("Serving static files from: {}", dir);
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
