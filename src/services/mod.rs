pub mod account_service;
pub mod billing_service;
pub mod stats_service;
pub mod subscription_service;
pub mod webhook_service;
