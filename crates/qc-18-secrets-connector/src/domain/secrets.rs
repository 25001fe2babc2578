//! # Secret Store Entities
//!
//! Storage keys and records, plus the request/response schemas of the
//! `secrets_list` and `secrets_set` methods.

use super::address::Address;
use super::errors::SignerError;
use super::signer::{recover_signer, MessageSigner};
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};

/// Small sub-namespace within an owner's secrets.
pub type SlotId = u64;

/// Uniquely identifies one stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SecretKey {
    pub owner: Address,
    pub slot_id: SlotId,
    pub version: u64,
}

/// A stored secret. Never mutated in place: a new version is a new record.
#[derive(Clone, PartialEq, Eq)]
pub struct Record {
    /// Absolute expiration, unix seconds
    pub expiration: i64,
    pub payload: Vec<u8>,
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("expiration", &self.expiration)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

/// Metadata row returned by a storage enumeration. Never carries the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotRow {
    pub slot_id: SlotId,
    pub version: u64,
    pub expiration: i64,
}

/// The bytes a secret owner signs to authorize one write.
///
/// Storage backends recompute this from the key and record and check that the
/// pass-through signature recovers to `address`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretEnvelope {
    pub address: Address,
    pub slot_id: SlotId,
    #[serde_as(as = "Base64")]
    pub payload: Vec<u8>,
    pub version: u64,
    pub expiration: i64,
}

impl SecretEnvelope {
    pub fn new(key: &SecretKey, record: &Record) -> Self {
        Self {
            address: key.owner,
            slot_id: key.slot_id,
            payload: record.payload.clone(),
            version: key.version,
            expiration: record.expiration,
        }
    }

    /// Canonical JSON encoding (struct field order, no whitespace).
    pub fn to_signing_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Sign as the owner. Client side only; the handler never does this.
    pub fn sign(&self, owner: &MessageSigner) -> Result<Vec<u8>, SignerError> {
        let bytes = self
            .to_signing_bytes()
            .map_err(|_| SignerError::SigningFailed)?;
        owner.sign_parts(&[&bytes]).map(|sig| sig.to_vec())
    }

    /// Recover the address that signed this envelope.
    pub fn recover(&self, signature: &[u8]) -> Result<Address, SignerError> {
        let bytes = self
            .to_signing_bytes()
            .map_err(|_| SignerError::InvalidFormat)?;
        recover_signer(signature, &[&bytes])
    }
}

// =============================================================================
// secrets_set
// =============================================================================

/// Payload of a `secrets_set` request.
#[serde_as]
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRequest {
    pub slot_id: SlotId,
    pub version: u64,
    pub expiration: i64,
    #[serde_as(as = "Base64")]
    pub payload: Vec<u8>,
    #[serde_as(as = "Base64")]
    pub signature: Vec<u8>,
}

impl SetRequest {
    /// Split into the storage key (owned by `owner`) and the record.
    pub fn to_key_and_record(&self, owner: Address) -> (SecretKey, Record) {
        (
            SecretKey {
                owner,
                slot_id: self.slot_id,
                version: self.version,
            },
            Record {
                expiration: self.expiration,
                payload: self.payload.clone(),
            },
        )
    }
}

impl std::fmt::Debug for SetRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetRequest")
            .field("slot_id", &self.slot_id)
            .field("version", &self.version)
            .field("expiration", &self.expiration)
            .field("payload_len", &self.payload.len())
            .finish_non_exhaustive()
    }
}

/// Response to `secrets_set`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SetResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error_message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
        }
    }
}

// =============================================================================
// secrets_list
// =============================================================================

/// One listed secret: metadata only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRow {
    pub slot_id: SlotId,
    pub version: u64,
    pub expiration: i64,
}

impl From<SnapshotRow> for ListRow {
    fn from(row: SnapshotRow) -> Self {
        Self {
            slot_id: row.slot_id,
            version: row.version,
            expiration: row.expiration,
        }
    }
}

/// Response to `secrets_list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<ListRow>,
}

impl ListResponse {
    pub fn ok(rows: Vec<ListRow>) -> Self {
        Self {
            success: true,
            error_message: None,
            rows,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            rows: Vec::new(),
        }
    }
}
