//! # Outbound Ports (Driven Ports / SPI)
//!
//! Collaborators this subsystem depends on. All of them are shared by
//! concurrent handler invocations and must be safe for concurrent use.

use crate::domain::address::Address;
use crate::domain::envelope::Message;
use crate::domain::errors::{AllowlistError, StorageError, TransportError};
use crate::domain::secrets::{Record, SecretKey, SnapshotRow};
use async_trait::async_trait;

/// Key-value secret store keyed by (owner, slot, version).
///
/// The backend, not the handler, enforces version monotonicity, expiration
/// limits and the validity of the per-record write signature.
#[async_trait]
pub trait SecretStorage: Send + Sync {
    /// Metadata of the records currently held for `owner`, in backend order.
    async fn list(&self, owner: &Address) -> Result<Vec<SnapshotRow>, StorageError>;

    /// Store `record` under `key`, authorized by the owner's `signature`.
    async fn put(
        &self,
        key: &SecretKey,
        record: &Record,
        signature: &[u8],
    ) -> Result<(), StorageError>;
}

/// Membership oracle for addresses allowed to use this handler.
#[async_trait]
pub trait Allowlist: Send + Sync {
    /// Whether `address` may use the handler right now.
    async fn allow(&self, address: &Address) -> bool;

    /// Begin sourcing/refreshing membership.
    async fn start(&self) -> Result<(), AllowlistError>;

    /// Stop sourcing membership.
    async fn close(&self) -> Result<(), AllowlistError>;
}

/// Gateway transport. Delivers outbound messages to a relay session and does
/// not interpret payloads.
#[async_trait]
pub trait GatewayConnector: Send + Sync {
    async fn send_to_gateway(&self, gateway_id: &str, msg: Message) -> Result<(), TransportError>;
}

/// Abstract interface for wall-clock time.
pub trait TimeSource: Send + Sync {
    /// Current time in unix seconds.
    fn now(&self) -> i64;
}

// Shared handles: collaborators are commonly owned by the embedding process
// and handed to the handler behind an `Arc`.

#[async_trait]
impl<T: SecretStorage + ?Sized> SecretStorage for std::sync::Arc<T> {
    async fn list(&self, owner: &Address) -> Result<Vec<SnapshotRow>, StorageError> {
        (**self).list(owner).await
    }

    async fn put(
        &self,
        key: &SecretKey,
        record: &Record,
        signature: &[u8],
    ) -> Result<(), StorageError> {
        (**self).put(key, record, signature).await
    }
}

#[async_trait]
impl<T: Allowlist + ?Sized> Allowlist for std::sync::Arc<T> {
    async fn allow(&self, address: &Address) -> bool {
        (**self).allow(address).await
    }

    async fn start(&self) -> Result<(), AllowlistError> {
        (**self).start().await
    }

    async fn close(&self) -> Result<(), AllowlistError> {
        (**self).close().await
    }
}
