pub mod crypto;
pub mod token;
pub mod webhook_signature;
