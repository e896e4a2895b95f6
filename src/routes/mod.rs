pub mod account;
pub mod admin;
pub mod billing;
pub mod health;
pub mod webhook;
