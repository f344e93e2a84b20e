//! HTTP handlers for boatyard-api.

pub mod health;
pub mod transfer;
