use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::models::user::{SubscriptionStatus, User};

/// Lowercased, trimmed form used as the user key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, User>,
    by_customer: HashMap<String, String>,
}

/// Process-wide user registry keyed by normalized email, with a secondary
/// index on the billing customer id. Nothing is persisted.
#[derive(Clone, Debug, Default)]
pub struct UserStore {
    inner: Arc<RwLock<Tables>>,
}

/// A change reported by the billing provider, applied to one user.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusChange {
    Subscription {
        status: SubscriptionStatus,
        subscription_id: String,
        trial_end: Option<DateTime<Utc>>,
    },
    Deleted,
    PaymentSucceeded,
    PaymentFailed,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, email: &str) -> Option<User> {
        let key = normalize_email(email);
        self.inner.read().await.users.get(&key).cloned()
    }

    pub async fn contains(&self, email: &str) -> bool {
        let key = normalize_email(email);
        self.inner.read().await.users.contains_key(&key)
    }

    /// Inserts a new record. Returns `false` and leaves the store untouched
    /// when the normalized email is already taken.
    pub async fn insert(&self, mut user: User) -> bool {
        user.email = normalize_email(&user.email);
        let mut tables = self.inner.write().await;
        if tables.users.contains_key(&user.email) {
            return false;
        }
        if let Some(customer_id) = &user.customer_id {
            tables
                .by_customer
                .insert(customer_id.clone(), user.email.clone());
        }
        tables.users.insert(user.email.clone(), user);
        true
    }

    pub async fn find_by_customer(&self, customer_id: &str) -> Option<User> {
        let tables = self.inner.read().await;
        let email = tables.by_customer.get(customer_id)?;
        tables.users.get(email).cloned()
    }

    /// Applies a provider-reported change to the user owning `customer_id`.
    /// Returns the updated record, or `None` when no user has that customer.
    pub async fn apply_change(&self, customer_id: &str, change: StatusChange) -> Option<User> {
        let mut tables = self.inner.write().await;
        let email = tables.by_customer.get(customer_id)?.clone();
        let user = tables.users.get_mut(&email)?;

        match change {
            StatusChange::Subscription {
                status,
                subscription_id,
                trial_end,
            } => {
                user.subscription_status = status;
                user.subscription_id = Some(subscription_id);
                user.trial_end = trial_end;
            }
            StatusChange::Deleted => {
                user.subscription_status = SubscriptionStatus::Canceled;
                user.subscription_id = None;
            }
            StatusChange::PaymentSucceeded => {
                user.subscription_status = SubscriptionStatus::Active;
            }
            StatusChange::PaymentFailed => {
                user.subscription_status = SubscriptionStatus::PastDue;
            }
        }

        Some(user.clone())
    }

    pub async fn snapshot(&self) -> Vec<User> {
        self.inner.read().await.users.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str, customer: &str) -> User {
        User::new(
            email.to_string(),
            "Test".to_string(),
            "hash".to_string(),
            customer.to_string(),
        )
    }

    #[tokio::test]
    async fn insert_rejects_case_variant_of_existing_email() {
        let store = UserStore::new();
        assert!(store.insert(user("Alice@Example.com", "cus_1")).await);
        assert!(!store.insert(user("  alice@example.COM ", "cus_2")).await);
        assert!(store.find_by_customer("cus_2").await.is_none());

        let stored = store.get("ALICE@example.com").await.unwrap();
        assert_eq!(stored.email, "alice@example.com");
    }

    #[tokio::test]
    async fn deleted_clears_subscription_and_cancels() {
        let store = UserStore::new();
        store.insert(user("bob@example.com", "cus_b")).await;
        store
            .apply_change(
                "cus_b",
                StatusChange::Subscription {
                    status: SubscriptionStatus::Active,
                    subscription_id: "sub_old".into(),
                    trial_end: None,
                },
            )
            .await
            .unwrap();

        let updated = store
            .apply_change("cus_b", StatusChange::Deleted)
            .await
            .unwrap();
        assert_eq!(updated.subscription_status, SubscriptionStatus::Canceled);
        assert_eq!(updated.subscription_id, None);
    }

    #[tokio::test]
    async fn unknown_customer_is_a_no_op() {
        let store = UserStore::new();
        store.insert(user("carol@example.com", "cus_c")).await;
        assert!(store
            .apply_change("cus_missing", StatusChange::PaymentSucceeded)
            .await
            .is_none());
        let carol = store.get("carol@example.com").await.unwrap();
        assert_eq!(carol.subscription_status, SubscriptionStatus::None);
    }

    #[tokio::test]
    async fn last_payment_event_wins() {
        let store = UserStore::new();
        store.insert(user("dan@example.com", "cus_d")).await;
        store
            .apply_change("cus_d", StatusChange::PaymentSucceeded)
            .await;
        let after = store
            .apply_change("cus_d", StatusChange::PaymentFailed)
            .await
            .unwrap();
        assert_eq!(after.subscription_status, SubscriptionStatus::PastDue);

        let after = store
            .apply_change("cus_d", StatusChange::PaymentSucceeded)
            .await
            .unwrap();
        assert_eq!(after.subscription_status, SubscriptionStatus::Active);
    }
}
