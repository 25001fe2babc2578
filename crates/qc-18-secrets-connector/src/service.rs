//! # Functions Connector Handler Service
//!
//! Application service that implements `GatewayConnectorHandler`.
//!
//! ## Request Flow
//!
//! ```text
//! gateway ─► admission ─► dispatch ─► secrets adapter ─► response sender ─► gateway
//!              │             │
//!              └─ drop       └─ drop (unknown method)
//! ```
//!
//! ## Failure Policy
//!
//! | Failure                          | Outcome                        |
//! |----------------------------------|--------------------------------|
//! | sender not allowlisted / invalid | logged, no response            |
//! | unknown method                   | logged, no response            |
//! | malformed payload (known method) | signed `success: false`        |
//! | storage error                    | signed `success: false`        |
//! | serialize / sign failure         | logged, no response            |
//! | transport failure                | logged, not retried            |
//! | context cancelled                | logged, no response            |

mod admission;
mod response;
mod secrets;


use crate::config::ConnectorConfig;
use crate::domain::address::Address;
use crate::domain::context::RequestContext;
use crate::domain::envelope::Message;
use crate::domain::errors::{ConnectorError, SignerError};
use crate::domain::lifecycle::{ServiceState, StartStopOnce};
use crate::domain::methods::{GatewayRequest, Method};
use crate::domain::signer::MessageSigner;
use crate::ports::inbound::{GatewayConnectorHandler, Signer};
use crate::ports::outbound::{Allowlist, GatewayConnector, SecretStorage};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub use secrets::ResponsePayload;

/// Collaborators injected into the handler.
pub struct ConnectorDependencies<S, A> {
    pub storage: S,
    pub allowlist: A,
}

/// Secure request handler between the gateway relay and the secrets store.
///
/// Stateless between requests: everything it holds is configuration or a
/// handle to a collaborator that owns its own state.
pub struct FunctionsConnectorHandler<S, A> {
    service_name: String,
    node_address: Address,
    signer: MessageSigner,
    storage: S,
    allowlist: A,
    connector: RwLock<Option<Arc<dyn GatewayConnector>>>,
    lifecycle: StartStopOnce,
}

impl<S, A> FunctionsConnectorHandler<S, A>
where
    S: SecretStorage,
    A: Allowlist,
{
    /// Create a handler from validated configuration.
    pub fn new(
        config: &ConnectorConfig,
        deps: ConnectorDependencies<S, A>,
    ) -> Result<Self, ConnectorError> {
        config.validate()?;
        let signer = config.signer()?;

        Ok(Self {
            service_name: config.service_name.clone(),
            node_address: signer.address(),
            signer,
            storage: deps.storage,
            allowlist: deps.allowlist,
            connector: RwLock::new(None),
            lifecycle: StartStopOnce::new(),
        })
    }

    /// Attach the transport. The connector is built around the handler, so
    /// it can only be supplied after construction.
    pub fn set_connector(&self, connector: Arc<dyn GatewayConnector>) {
        *self.connector.write() = Some(connector);
    }

    pub fn node_address(&self) -> Address {
        self.node_address
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn state(&self) -> ServiceState {
        self.lifecycle.state()
    }

    /// Ready to serve requests.
    pub fn healthy(&self) -> bool {
        self.state() == ServiceState::Started
    }

    /// Route a decoded request to its handler and produce the response payload.
    ///
    /// `None` means the request was cancelled and must not be answered.
    async fn dispatch(
        &self,
        ctx: &RequestContext,
        from: &Address,
        method: Method,
        payload: &[u8],
    ) -> Option<ResponsePayload> {
        let outcome = match method.decode(payload) {
            Ok(GatewayRequest::SecretsList) => self
                .handle_secrets_list(ctx, from)
                .await
                .map(ResponsePayload::List),
            Ok(GatewayRequest::SecretsSet(request)) => self
                .handle_secrets_set(ctx, from, request)
                .await
                .map(ResponsePayload::Set),
            Err(e) => Ok(ResponsePayload::bad_request(method, &e)),
        };
        outcome.ok()
    }
}

impl<S, A> Signer for FunctionsConnectorHandler<S, A>
where
    S: SecretStorage,
    A: Allowlist,
{
    fn sign(&self, data: &[&[u8]]) -> Result<Vec<u8>, SignerError> {
        self.signer.sign(data)
    }
}

#[async_trait]
impl<S, A> GatewayConnectorHandler for FunctionsConnectorHandler<S, A>
where
    S: SecretStorage,
    A: Allowlist,
{
    async fn start(&self) -> Result<(), ConnectorError> {
        self.lifecycle
            .start_once(&self.service_name, || async {
                self.allowlist.start().await?;
                info!(
                    service = %self.service_name,
                    node_address = %self.node_address,
                    "Connector handler started"
                );
                Ok::<(), ConnectorError>(())
            })
            .await
    }

    async fn close(&self) -> Result<(), ConnectorError> {
        self.lifecycle
            .stop_once(&self.service_name, || async {
                self.allowlist.close().await?;
                info!(service = %self.service_name, "Connector handler stopped");
                Ok::<(), ConnectorError>(())
            })
            .await
    }

    async fn handle_gateway_message(&self, ctx: &RequestContext, gateway_id: &str, msg: Message) {
        let body = &msg.body;

        let Some(from) = self.admit(ctx, gateway_id, &body.sender).await else {
            return;
        };

        debug!(gateway_id, method = %body.method, "Handling gateway request");

        let Some(method) = Method::from_name(&body.method) else {
            error!(gateway_id, method = %body.method, "Unsupported method");
            return;
        };

        let Some(payload) = self
            .dispatch(ctx, &from, method, body.payload_bytes())
            .await
        else {
            warn!(
                gateway_id,
                message_id = %body.message_id,
                method = %method,
                "Request cancelled, dropping response"
            );
            return;
        };

        if !payload.is_success() {
            warn!(
                gateway_id,
                message_id = %body.message_id,
                method = %method,
                "Answering with error payload"
            );
        }

        if let Err(e) = self.send_response(ctx, gateway_id, body, &payload).await {
            error!(gateway_id, error = %e, "Failed to send response to gateway");
        }
    }
}
