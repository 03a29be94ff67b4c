//! extension-gate - Authentication and rate-limiting gate for extension clients
//!
//! This crate provides an HTTP gate that decides, on every inbound API call,
//! whether a caller is a registered, non-abusive, cryptographically consistent
//! extension client before the request reaches a business handler.

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
