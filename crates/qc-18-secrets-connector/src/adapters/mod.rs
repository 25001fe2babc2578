//! # Adapters Module
//!
//! Reference implementations of the outbound ports. Production deployments
//! plug in a persistent storage backend and an on-chain allowlist; these are
//! used by tests and single-process setups.

pub mod allowlist;
pub mod connector;
pub mod storage;

pub use allowlist::StaticAllowlist;
pub use connector::{ChannelConnector, OutboundMessage};
pub use storage::{InMemorySecretStorage, SystemTimeSource};
