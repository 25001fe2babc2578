//! # Start/Stop Once
//!
//! Guards a service so that start and stop each run at most once:
//!
//! ```text
//! Unstarted ──► Starting ──► Started ──► Stopping ──► Stopped
//!                   │
//!                   └──► StartFailed
//! ```
//!
//! Transitions are compare-and-swap on an atomic state, so concurrent callers
//! observe exactly one winner.

use super::errors::LifecycleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a guarded service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ServiceState {
    Unstarted = 0,
    Starting = 1,
    Started = 2,
    StartFailed = 3,
    Stopping = 4,
    Stopped = 5,
}

impl ServiceState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Unstarted,
            1 => Self::Starting,
            2 => Self::Started,
            3 => Self::StartFailed,
            4 => Self::Stopping,
            _ => Self::Stopped,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unstarted => "Unstarted",
            Self::Starting => "Starting",
            Self::Started => "Started",
            Self::StartFailed => "StartFailed",
            Self::Stopping => "Stopping",
            Self::Stopped => "Stopped",
        };
        f.write_str(name)
    }
}

/// Atomic one-shot start/stop guard.
#[derive(Debug)]
pub struct StartStopOnce {
    state: AtomicU8,
}

impl Default for StartStopOnce {
    fn default() -> Self {
        Self::new()
    }
}

impl StartStopOnce {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(ServiceState::Unstarted as u8),
        }
    }

    pub fn state(&self) -> ServiceState {
        ServiceState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Run `start` if and only if this is the first start attempt.
    ///
    /// A failing `start` leaves the service in `StartFailed`; it cannot be retried.
    pub async fn start_once<F, Fut, E>(&self, service: &str, start: F) -> Result<(), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: From<LifecycleError>,
    {
        self.transition(ServiceState::Unstarted, ServiceState::Starting)
            .map_err(|state| LifecycleError::AlreadyStarted {
                service: service.to_string(),
                state,
            })?;

        match start().await {
            Ok(()) => {
                self.state
                    .store(ServiceState::Started as u8, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                self.state
                    .store(ServiceState::StartFailed as u8, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Run `stop` if and only if the service is `Started`.
    ///
    /// The service ends up `Stopped` whether or not `stop` succeeds.
    pub async fn stop_once<F, Fut, E>(&self, service: &str, stop: F) -> Result<(), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: From<LifecycleError>,
    {
        self.transition(ServiceState::Started, ServiceState::Stopping)
            .map_err(|state| LifecycleError::NotStarted {
                service: service.to_string(),
                state,
            })?;

        let result = stop().await;
        self.state
            .store(ServiceState::Stopped as u8, Ordering::Release);
        result
    }

    fn transition(&self, from: ServiceState, to: ServiceState) -> Result<(), ServiceState> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(ServiceState::from_u8)
    }
}
