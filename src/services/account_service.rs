use std::sync::Arc;

use validator::Validate;

use crate::config::Config;
use crate::database::user_store::{normalize_email, UserStore};
use crate::dto::auth_dto::{AuthResponse, LoginRequest, SignupRequest, UserSummary};
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::services::billing_service::{BillingProvider, NewCustomer};
use crate::utils::{crypto, token};

const DUPLICATE_ACCOUNT: &str = "An account with this email already exists";

#[derive(Clone)]
pub struct AccountService {
    users: UserStore,
    billing: Arc<dyn BillingProvider>,
    config: Arc<Config>,
}

impl AccountService {
    pub fn new(users: UserStore, billing: Arc<dyn BillingProvider>, config: Arc<Config>) -> Self {
        Self {
            users,
            billing,
            config,
        }
    }

    pub async fn signup(&self, payload: SignupRequest) -> Result<AuthResponse> {
        let name = payload.name.trim().to_string();
        if payload.email.trim().is_empty() || payload.password.is_empty() || name.is_empty() {
            return Err(Error::BadRequest(
                "Email, password, and name are required".into(),
            ));
        }
        let payload = SignupRequest {
            email: payload.email.trim().to_string(),
            ..payload
        };
        payload.validate()?;

        let email = normalize_email(&payload.email);
        if self.users.contains(&email).await {
            return Err(Error::BadRequest(DUPLICATE_ACCOUNT.into()));
        }

        let password_hash = crypto::hash_password(payload.password).await?;
        let customer_id = self
            .billing
            .create_customer(NewCustomer {
                email: email.clone(),
                name: name.clone(),
            })
            .await?;

        let customer_id_for_log = customer_id.clone();
        let user = User::new(email.clone(), name, password_hash, customer_id);
        let summary = UserSummary::from(&user);
        // The uniqueness check above is not held across the provider call, so a
        // racing signup can leave this customer orphaned at the provider.
        if !self.users.insert(user).await {
            tracing::warn!(
                %email,
                orphaned_customer_id = %customer_id_for_log,
                "Concurrent signup lost the race for this email; remote customer left without a user"
            );
            return Err(Error::BadRequest(DUPLICATE_ACCOUNT.into()));
        }

        tracing::info!(%email, "User signed up");
        let token = self.issue_token(&summary.email, &summary.name)?;
        Ok(AuthResponse {
            token,
            user: summary,
        })
    }

    pub async fn login(&self, payload: LoginRequest) -> Result<AuthResponse> {
        if payload.email.trim().is_empty() || payload.password.is_empty() {
            return Err(Error::BadRequest("Email and password are required".into()));
        }

        let Some(user) = self.users.get(&payload.email).await else {
            return Err(Error::Unauthorized(
                "No account found with this email".into(),
            ));
        };

        let valid = crypto::verify_password(payload.password, user.password_hash.clone()).await?;
        if !valid {
            tracing::info!(email = %user.email, "Login rejected: wrong password");
            return Err(Error::Unauthorized("Incorrect password".into()));
        }

        let token = self.issue_token(&user.email, &user.name)?;
        Ok(AuthResponse {
            token,
            user: UserSummary::from(&user),
        })
    }

    pub async fn profile(&self, email: &str) -> Result<User> {
        self.users
            .get(email)
            .await
            .ok_or_else(|| Error::NotFound("User not found".into()))
    }

    fn issue_token(&self, email: &str, name: &str) -> Result<String> {
        token::issue_session_token(
            email,
            name,
            &self.config.jwt_secret,
            self.config.token_ttl_hours,
        )
    }
}
