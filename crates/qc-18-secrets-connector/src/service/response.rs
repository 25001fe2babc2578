//! Response sender: builds, signs and submits the outbound envelope.

use super::FunctionsConnectorHandler;
use crate::domain::context::RequestContext;
use crate::domain::envelope::{Message, MessageBody};
use crate::domain::errors::{ConnectorError, TransportError};
use crate::ports::outbound::{Allowlist, SecretStorage};
use serde::Serialize;
use tracing::debug;

impl<S, A> FunctionsConnectorHandler<S, A>
where
    S: SecretStorage,
    A: Allowlist,
{
    /// Answer `request` on the relay session it came from.
    ///
    /// Correlation fields are copied from the request; `sender` is this node.
    /// Nothing is sent once the context is cancelled, and a failed submission
    /// is not retried here.
    pub(super) async fn send_response<P: Serialize + Sync>(
        &self,
        ctx: &RequestContext,
        gateway_id: &str,
        request: &MessageBody,
        payload: &P,
    ) -> Result<(), ConnectorError> {
        if ctx.is_cancelled() {
            return Err(ConnectorError::Cancelled);
        }

        let mut body = MessageBody {
            message_id: request.message_id.clone(),
            method: request.method.clone(),
            don_id: request.don_id.clone(),
            sender: self.node_address.to_hex(),
            payload: None,
        };
        body.set_payload(payload)?;

        let mut msg = Message::new(body);
        msg.sign(self)?;

        let connector = self
            .connector
            .read()
            .clone()
            .ok_or(TransportError::ConnectorNotSet)?;

        ctx.run(connector.send_to_gateway(gateway_id, msg))
            .await
            .map_err(|_| ConnectorError::Cancelled)??;

        debug!(
            gateway_id,
            message_id = %request.message_id,
            don_id = %request.don_id,
            method = %request.method,
            "Sent to gateway"
        );
        Ok(())
    }
}
