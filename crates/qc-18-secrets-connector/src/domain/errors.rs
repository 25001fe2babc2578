//! # Connector Errors
//!
//! Error types for every concern the handler touches. Collaborator errors are
//! converted at the call site into either a signed error payload or a log line;
//! none of them escape `handle_gateway_message`.

use super::address::Address;
use super::lifecycle::ServiceState;
use thiserror::Error;

/// Errors parsing a hex account address.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    /// Address must be exactly 20 bytes (40 hex digits)
    #[error("Invalid address length: expected 40 hex digits, got {0}")]
    InvalidLength(usize),

    /// Address contains non-hex characters
    #[error("Invalid hex in address")]
    InvalidHex,
}

/// Errors from signing or recovering a secp256k1 signature.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    /// The private key bytes are not a valid secp256k1 scalar
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Recoverable signatures are exactly 65 bytes (r || s || v)
    #[error("Invalid signature length: expected 65, got {0}")]
    InvalidLength(usize),

    /// Invalid recovery ID (v must be 0, 1, 27, or 28)
    #[error("Invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    /// The r || s bytes do not form a valid signature
    #[error("Invalid signature format")]
    InvalidFormat,

    /// Signature has high S value (EIP-2 malleability protection)
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// Failed to recover public key from signature
    #[error("Failed to recover public key")]
    RecoveryFailed,

    /// The underlying signing primitive failed
    #[error("Signing failed")]
    SigningFailed,
}

/// Errors building, signing or validating a gateway message envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// A body field exceeds its fixed signing width
    #[error("Field {field} too long: {len} bytes (max {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// The method name is empty
    #[error("Empty method name")]
    EmptyMethod,

    /// The sender field is not a valid address
    #[error("Invalid sender: {0}")]
    InvalidSender(#[from] AddressError),

    /// The sender is not written as `0x` followed by 40 hex digits
    #[error("Sender {0:?} is not a 0x-prefixed 42 character address")]
    NonCanonicalSender(String),

    /// The signature field is not valid hex
    #[error("Invalid signature encoding")]
    InvalidSignatureEncoding,

    /// Signing or recovery failed
    #[error("Signature error: {0}")]
    Signature(#[from] SignerError),

    /// The recovered signer does not match the declared sender
    #[error("Signer mismatch: sender {declared}, recovered {recovered}")]
    SenderMismatch {
        declared: Address,
        recovered: Address,
    },

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A method-specific payload did not match its schema.
#[derive(Debug, Error)]
pub enum RequestDecodeError {
    /// The request requires a payload but none was sent
    #[error("missing payload")]
    MissingPayload,

    /// The payload is not valid JSON for this method
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

/// Errors reported by a secrets storage backend.
///
/// The handler only ever renders these into `error_message`; the variants
/// describe the contract a backend is expected to enforce.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The write signature does not recover to the record owner
    #[error("wrong signature")]
    WrongSignature,

    /// Slot id outside the per-user range
    #[error("slot id is too big")]
    SlotIdTooBig,

    /// Version is not strictly greater than the stored one
    #[error("version too low")]
    VersionTooLow,

    /// Expiration already passed
    #[error("expired")]
    Expired,

    /// Payload exceeds the configured size
    #[error("payload too big")]
    PayloadTooBig,

    /// Expiration is further in the future than allowed
    #[error("expiration too long")]
    ExpirationTooLong,

    /// Any other backend failure (I/O, database, ...)
    #[error("backend error: {0}")]
    Backend(String),
}

/// Errors from the allowlist collaborator's lifecycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AllowlistError {
    #[error("allowlist already started")]
    AlreadyStarted,

    #[error("allowlist not running")]
    NotRunning,
}

/// Errors submitting a message to the gateway transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// `set_connector` was never called
    #[error("gateway connector not set")]
    ConnectorNotSet,

    /// The transport is shut down
    #[error("gateway connection closed")]
    Closed,
}

/// Invalid lifecycle transition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("{service} has already been started once (state: {state})")]
    AlreadyStarted {
        service: String,
        state: ServiceState,
    },

    #[error("{service} cannot be stopped in state {state}")]
    NotStarted {
        service: String,
        state: ServiceState,
    },
}

/// Umbrella error for handler construction and lifecycle.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("Allowlist error: {0}")]
    Allowlist(#[from] AllowlistError),

    #[error("Envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("request cancelled")]
    Cancelled,
}
