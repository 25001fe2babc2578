//! In-memory secrets storage.
//!
//! Enforces the full write contract of a storage backend: slot range, payload
//! size, expiration window, owner signature and strictly increasing versions
//! per (owner, slot). Only the latest version of each slot is retained.

use crate::config::StorageConstraints;
use crate::domain::address::Address;
use crate::domain::errors::StorageError;
use crate::domain::secrets::{Record, SecretEnvelope, SecretKey, SlotId, SnapshotRow};
use crate::ports::outbound::{SecretStorage, TimeSource};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
struct StoredRecord {
    version: u64,
    record: Record,
    signature: Vec<u8>,
}

/// Secrets storage backed by a `BTreeMap`; listing is ordered by slot id.
pub struct InMemorySecretStorage {
    constraints: StorageConstraints,
    time: Arc<dyn TimeSource>,
    records: RwLock<BTreeMap<(Address, SlotId), StoredRecord>>,
}

impl InMemorySecretStorage {
    pub fn new(constraints: StorageConstraints) -> Self {
        Self::with_time_source(constraints, Arc::new(SystemTimeSource))
    }

    pub fn with_time_source(constraints: StorageConstraints, time: Arc<dyn TimeSource>) -> Self {
        Self {
            constraints,
            time,
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Latest non-expired version of a slot, with its write signature.
    pub fn get(&self, owner: &Address, slot_id: SlotId) -> Option<(u64, Record, Vec<u8>)> {
        let now = self.time.now();
        self.records
            .read()
            .get(&(*owner, slot_id))
            .filter(|stored| stored.record.expiration > now)
            .map(|stored| (stored.version, stored.record.clone(), stored.signature.clone()))
    }

    /// Number of retained slots, expired ones included.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Drop expired records; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.time.now();
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|_, stored| stored.record.expiration > now);
        before - records.len()
    }

    fn check_constraints(&self, key: &SecretKey, record: &Record, now: i64) -> Result<(), StorageError> {
        if key.slot_id >= self.constraints.max_slots_per_user {
            return Err(StorageError::SlotIdTooBig);
        }
        if record.payload.len() > self.constraints.max_payload_size_bytes {
            return Err(StorageError::PayloadTooBig);
        }
        if record.expiration <= now {
            return Err(StorageError::Expired);
        }
        let max_expiration = now.saturating_add(self.constraints.max_expiration_length_sec as i64);
        if record.expiration > max_expiration {
            return Err(StorageError::ExpirationTooLong);
        }
        Ok(())
    }
}

#[async_trait]
impl SecretStorage for InMemorySecretStorage {
    async fn list(&self, owner: &Address) -> Result<Vec<SnapshotRow>, StorageError> {
        let now = self.time.now();
        let records = self.records.read();
        let rows = records
            .range((*owner, SlotId::MIN)..=(*owner, SlotId::MAX))
            .filter(|(_, stored)| stored.record.expiration > now)
            .map(|((_, slot_id), stored)| SnapshotRow {
                slot_id: *slot_id,
                version: stored.version,
                expiration: stored.record.expiration,
            })
            .collect();
        Ok(rows)
    }

    async fn put(
        &self,
        key: &SecretKey,
        record: &Record,
        signature: &[u8],
    ) -> Result<(), StorageError> {
        let now = self.time.now();
        self.check_constraints(key, record, now)?;

        let signer = SecretEnvelope::new(key, record)
            .recover(signature)
            .map_err(|_| StorageError::WrongSignature)?;
        if signer != key.owner {
            return Err(StorageError::WrongSignature);
        }

        let mut records = self.records.write();
        if let Some(existing) = records.get(&(key.owner, key.slot_id)) {
            if key.version <= existing.version {
                return Err(StorageError::VersionTooLow);
            }
        }
        records.insert(
            (key.owner, key.slot_id),
            StoredRecord {
                version: key.version,
                record: record.clone(),
                signature: signature.to_vec(),
            },
        );

        debug!(
            owner = %key.owner,
            slot_id = key.slot_id,
            version = key.version,
            "Stored secret"
        );
        Ok(())
    }
}
