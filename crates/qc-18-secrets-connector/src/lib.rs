//! # Secrets Connector Handler (QC-18)
//!
//! Sits between the gateway relay and the versioned, expiring secrets store.
//! Inbound gateway messages are admitted against the allowlist, dispatched by
//! method, executed against the storage backend and answered with a message
//! signed by this node's key.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Envelope codec, signing, request schemas, lifecycle
//! - **Ports Layer** (`ports/`): Handler API plus storage/allowlist/connector SPIs
//! - **Adapters Layer** (`adapters/`): In-memory storage, static allowlist, channel connector
//! - **Service Layer** (`service.rs`): Admission, dispatch, storage adapter, response sender
//!
//! ## Security Notes
//!
//! - **Silent drop**: senders outside the allowlist and unknown methods get no
//!   response at all.
//! - **Signed errors**: a known method with a bad payload, or a storage
//!   rejection, always gets a signed `success: false` answer.
//! - **Write signatures are passed through**: the per-record signature carried
//!   by `secrets_set` is verified by the storage backend, not here.
//! - **Cancellation**: a cancelled request context never produces a response.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::{
    ChannelConnector, InMemorySecretStorage, OutboundMessage, StaticAllowlist, SystemTimeSource,
};
pub use config::{ConnectorConfig, SecretHex, StorageConstraints};
pub use domain::address::Address;
pub use domain::context::{CancelHandle, Cancelled, RequestContext};
pub use domain::envelope::{Message, MessageBody};
pub use domain::errors::{
    AddressError, AllowlistError, ConnectorError, EnvelopeError, LifecycleError,
    RequestDecodeError, SignerError, StorageError, TransportError,
};
pub use domain::lifecycle::{ServiceState, StartStopOnce};
pub use domain::methods::{GatewayRequest, Method};
pub use domain::secrets::{
    ListResponse, ListRow, Record, SecretEnvelope, SecretKey, SetRequest, SetResponse,
    SlotId, SnapshotRow,
};
pub use domain::signer::{address_from_key, keccak256, recover_signer, MessageSigner};
pub use ports::inbound::{GatewayConnectorHandler, Signer};
pub use ports::outbound::{Allowlist, GatewayConnector, SecretStorage, TimeSource};
pub use service::{ConnectorDependencies, FunctionsConnectorHandler, ResponsePayload};
