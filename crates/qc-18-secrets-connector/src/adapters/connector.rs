//! Channel-backed gateway connector.
//!
//! Delivers outbound `(gateway_id, Message)` pairs into a bounded tokio
//! channel. The receiving half plays the role of the relay.

use crate::domain::envelope::Message;
use crate::domain::errors::TransportError;
use crate::ports::outbound::GatewayConnector;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// One message handed to the transport.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub gateway_id: String,
    pub message: Message,
}

#[derive(Debug, Clone)]
pub struct ChannelConnector {
    tx: mpsc::Sender<OutboundMessage>,
}

impl ChannelConnector {
    /// Create a connector and the receiver that observes everything it sends.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl GatewayConnector for ChannelConnector {
    async fn send_to_gateway(&self, gateway_id: &str, msg: Message) -> Result<(), TransportError> {
        self.tx
            .send(OutboundMessage {
                gateway_id: gateway_id.to_string(),
                message: msg,
            })
            .await
            .map_err(|_| TransportError::Closed)
    }
}
