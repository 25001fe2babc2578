//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: the handler API the gateway connector drives
//! - **Outbound (Driven)**: storage, allowlist and transport collaborators

pub mod inbound;
pub mod outbound;
