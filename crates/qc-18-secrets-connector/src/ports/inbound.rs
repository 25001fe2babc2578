//! # Inbound Ports (Driving Ports / API)
//!
//! What the gateway connector calls on this subsystem.

use crate::domain::context::RequestContext;
use crate::domain::envelope::Message;
use crate::domain::errors::{ConnectorError, SignerError};
use async_trait::async_trait;

/// Produces signatures over byte strings with this node's key.
///
/// The connector uses it to sign its own handshake messages; the handler uses
/// it for every response envelope.
pub trait Signer: Send + Sync {
    /// Sign the concatenation of `data`, returning 65 bytes `r || s || v`.
    fn sign(&self, data: &[&[u8]]) -> Result<Vec<u8>, SignerError>;
}

/// Handler registered with a gateway connector.
///
/// Implementations must be thread-safe: the connector invokes
/// `handle_gateway_message` concurrently, one task per inbound message.
#[async_trait]
pub trait GatewayConnectorHandler: Send + Sync {
    /// Activate collaborators. Runs at most once.
    async fn start(&self) -> Result<(), ConnectorError>;

    /// Deactivate collaborators. Only valid after a successful `start`.
    async fn close(&self) -> Result<(), ConnectorError>;

    /// Process one inbound message.
    ///
    /// This is a terminal sink: errors are answered with a signed error
    /// payload or logged, never returned.
    async fn handle_gateway_message(&self, ctx: &RequestContext, gateway_id: &str, msg: Message);
}
