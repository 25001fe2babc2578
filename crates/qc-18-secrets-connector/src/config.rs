//! Connector configuration with validation.
//!
//! Key material and identity are configuration, supplied once by the
//! embedding process; the handler keeps no other state.

use crate::domain::address::Address;
use crate::domain::errors::ConnectorError;
use crate::domain::secrets::SlotId;
use crate::domain::signer::MessageSigner;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

/// Default service name used in logs and lifecycle errors.
pub const DEFAULT_SERVICE_NAME: &str = "FunctionsConnectorHandler";

/// Handler configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Name attached to logs and lifecycle errors
    pub service_name: String,
    /// Address placed in the `sender` field of responses.
    /// Derived from `private_key` when absent; must match it when present.
    pub node_address: Option<Address>,
    /// Hex secp256k1 secret key. Never serialized, zeroized on drop.
    #[serde(skip_serializing)]
    pub private_key: SecretHex,
}

/// Hex-encoded secret that is wiped from memory on drop.
#[derive(Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SecretHex(String);

impl SecretHex {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Drop for SecretHex {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SecretHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            node_address: None,
            private_key: SecretHex::default(),
        }
    }
}

impl fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("service_name", &self.service_name)
            .field("node_address", &self.node_address)
            .field("private_key", &self.private_key)
            .finish()
    }
}

impl ConnectorConfig {
    pub fn new(private_key: impl Into<String>) -> Self {
        Self {
            private_key: SecretHex::new(private_key),
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConnectorError> {
        if self.service_name.trim().is_empty() {
            return Err(ConnectorError::Config("service_name cannot be empty".into()));
        }
        self.signer().map(|_| ())
    }

    /// Build the node signer, checking it against `node_address`.
    pub fn signer(&self) -> Result<MessageSigner, ConnectorError> {
        if self.private_key.is_empty() {
            return Err(ConnectorError::Config("private_key is required".into()));
        }
        let signer = MessageSigner::from_hex(self.private_key.expose())
            .map_err(|e| ConnectorError::Config(format!("private_key: {}", e)))?;

        if let Some(configured) = self.node_address {
            if configured != signer.address() {
                return Err(ConnectorError::Config(format!(
                    "node_address {} does not match private key address {}",
                    configured,
                    signer.address()
                )));
            }
        }
        Ok(signer)
    }
}

/// Limits enforced by storage backends on writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConstraints {
    /// Maximum record payload size in bytes
    pub max_payload_size_bytes: usize,
    /// Slot ids must be strictly below this
    pub max_slots_per_user: SlotId,
    /// Maximum distance of `expiration` from now, in seconds
    pub max_expiration_length_sec: u64,
}

impl Default for StorageConstraints {
    fn default() -> Self {
        Self {
            max_payload_size_bytes: 5 * 1024,
            max_slots_per_user: 10,
            max_expiration_length_sec: 7 * 24 * 60 * 60,
        }
    }
}

impl StorageConstraints {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConnectorError> {
        if self.max_payload_size_bytes == 0 {
            return Err(ConnectorError::Config(
                "max_payload_size_bytes cannot be 0".into(),
            ));
        }
        if self.max_slots_per_user == 0 {
            return Err(ConnectorError::Config(
                "max_slots_per_user cannot be 0".into(),
            ));
        }
        if self.max_expiration_length_sec == 0 {
            return Err(ConnectorError::Config(
                "max_expiration_length_sec cannot be 0".into(),
            ));
        }
        Ok(())
    }
}
