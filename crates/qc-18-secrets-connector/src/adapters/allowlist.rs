//! Static allowlist.
//!
//! A fixed (but mutable at runtime) set of addresses. Stands in for the
//! on-chain allowlist, whose refresh loop is what `start`/`close` drive.

use crate::domain::address::Address;
use crate::domain::errors::AllowlistError;
use crate::ports::outbound::Allowlist;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

#[derive(Debug, Default)]
pub struct StaticAllowlist {
    allowed: RwLock<HashSet<Address>>,
    running: AtomicBool,
}

impl StaticAllowlist {
    pub fn new(addresses: impl IntoIterator<Item = Address>) -> Self {
        Self {
            allowed: RwLock::new(addresses.into_iter().collect()),
            running: AtomicBool::new(false),
        }
    }

    pub fn allow_address(&self, address: Address) {
        self.allowed.write().insert(address);
    }

    pub fn remove_address(&self, address: &Address) -> bool {
        self.allowed.write().remove(address)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Allowlist for StaticAllowlist {
    async fn allow(&self, address: &Address) -> bool {
        self.allowed.read().contains(address)
    }

    async fn start(&self) -> Result<(), AllowlistError> {
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(AllowlistError::AlreadyStarted);
        }
        info!(entries = self.allowed.read().len(), "Allowlist started");
        Ok(())
    }

    async fn close(&self) -> Result<(), AllowlistError> {
        if !self.running.swap(false, Ordering::AcqRel) {
            return Err(AllowlistError::NotRunning);
        }
        info!("Allowlist closed");
        Ok(())
    }
}
