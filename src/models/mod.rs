//! Data model for extension-gate
//!
//! This module defines the records that flow through the gate:
//! - Extension identity and token payloads (wire format)
//! - Server-side sessions

pub mod identity;
pub mod session;

pub use identity::{ExtensionIdentity, RegisterRequest, TokenPayload};
pub use session::Session;
