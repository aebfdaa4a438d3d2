//! HTTP request handlers.

pub mod auth;
pub mod cloud_providers;
pub mod dashboard;
pub mod deployments;
pub mod pricing;
pub mod user_settings;
pub mod users;
