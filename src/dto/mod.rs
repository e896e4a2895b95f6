pub mod auth_dto;
pub mod billing_dto;
pub mod webhook_dto;
