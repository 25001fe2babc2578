//! # Integration Fixtures
//!
//! A connector node wired to the in-memory storage, the static allowlist and
//! a channel transport, plus a client that signs its own requests and secret
//! records. Messages travel through their JSON wire encoding in both
//! directions.

pub mod secrets_flow;

use k256::ecdsa::SigningKey;
use qc_18_secrets_connector::{
    Address, ChannelConnector, ConnectorConfig, ConnectorDependencies, FunctionsConnectorHandler,
    GatewayConnectorHandler, InMemorySecretStorage, ListResponse, Message, MessageBody,
    MessageSigner, OutboundMessage, RequestContext, SecretEnvelope, SecretKey, SetRequest,
    SetResponse, SlotId, StaticAllowlist, StorageConstraints, Record,
};
use std::sync::Arc;
use tokio::sync::mpsc;

pub const GATEWAY_ID: &str = "gateway-test";
pub const DON_ID: &str = "fun-testnet";

pub type NodeHandler = FunctionsConnectorHandler<Arc<InMemorySecretStorage>, Arc<StaticAllowlist>>;

/// Install a test subscriber honouring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn random_key_hex() -> String {
    hex::encode(SigningKey::random(&mut rand::thread_rng()).to_bytes())
}

/// One connector node and the relay end of its transport.
pub struct Node {
    pub handler: Arc<NodeHandler>,
    pub storage: Arc<InMemorySecretStorage>,
    pub allowlist: Arc<StaticAllowlist>,
    pub address: Address,
    outbound: mpsc::Receiver<OutboundMessage>,
}

impl Node {
    /// Build and start a node that admits `allowed`.
    pub async fn start(allowed: impl IntoIterator<Item = Address>) -> Self {
        init_tracing();

        let storage = Arc::new(InMemorySecretStorage::new(StorageConstraints::default()));
        let allowlist = Arc::new(StaticAllowlist::new(allowed));
        let handler = FunctionsConnectorHandler::new(
            &ConnectorConfig::new(random_key_hex()),
            ConnectorDependencies {
                storage: Arc::clone(&storage),
                allowlist: Arc::clone(&allowlist),
            },
        )
        .expect("valid node config");

        let (connector, outbound) = ChannelConnector::new(32);
        handler.set_connector(Arc::new(connector));
        handler.start().await.expect("node starts");

        Self {
            address: handler.node_address(),
            handler: Arc::new(handler),
            storage,
            allowlist,
            outbound,
        }
    }

    /// Deliver a request over the wire and collect the decoded response, if any.
    ///
    /// The relay verifies the request signature before handing it to the node,
    /// and the response signature before handing it back.
    pub async fn exchange(&mut self, request: &Message) -> Option<Message> {
        let wire = request.encode().expect("request encodes");
        let inbound = Message::decode(&wire).expect("request decodes");
        inbound.validate().expect("relay accepts request signature");

        self.handler
            .handle_gateway_message(&RequestContext::background(), GATEWAY_ID, inbound)
            .await;

        let out = self.outbound.try_recv().ok()?;
        assert_eq!(out.gateway_id, GATEWAY_ID);

        let wire = out.message.encode().expect("response encodes");
        let response = Message::decode(&wire).expect("response decodes");
        assert_eq!(
            response.validate().expect("response signature valid"),
            self.address
        );
        Some(response)
    }

    pub async fn stop(&self) {
        self.handler.close().await.expect("node stops");
    }
}

/// A secrets owner talking to the node through the relay.
pub struct Client {
    pub signer: MessageSigner,
    next_id: u64,
}

impl Client {
    pub fn random() -> Self {
        Self {
            signer: MessageSigner::new(SigningKey::random(&mut rand::thread_rng())),
            next_id: 0,
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    fn envelope(&mut self, method: &str) -> Message {
        self.next_id += 1;
        Message::new(MessageBody {
            message_id: format!("{}-{}", self.address(), self.next_id),
            method: method.to_string(),
            don_id: DON_ID.to_string(),
            sender: self.address().to_hex(),
            payload: None,
        })
    }

    pub fn list_request(&mut self) -> Message {
        let mut msg = self.envelope("secrets_list");
        msg.sign(&self.signer).expect("sign list request");
        msg
    }

    /// A `secrets_set` request whose record is signed by this client.
    pub fn set_request(
        &mut self,
        slot_id: SlotId,
        version: u64,
        expiration: i64,
        secret: &[u8],
    ) -> Message {
        self.signed_set(slot_id, version, expiration, secret, None)
    }

    /// A `secrets_set` request for this client's slot whose record signature
    /// comes from `record_signer` instead.
    pub fn set_request_signed_by(
        &mut self,
        record_signer: &MessageSigner,
        slot_id: SlotId,
        version: u64,
        expiration: i64,
        secret: &[u8],
    ) -> Message {
        self.signed_set(slot_id, version, expiration, secret, Some(record_signer))
    }

    fn signed_set(
        &mut self,
        slot_id: SlotId,
        version: u64,
        expiration: i64,
        secret: &[u8],
        record_signer: Option<&MessageSigner>,
    ) -> Message {
        let key = SecretKey {
            owner: self.address(),
            slot_id,
            version,
        };
        let record = Record {
            expiration,
            payload: secret.to_vec(),
        };
        let signature = SecretEnvelope::new(&key, &record)
            .sign(record_signer.unwrap_or(&self.signer))
            .expect("sign record");

        let payload = SetRequest {
            slot_id,
            version,
            expiration,
            payload: secret.to_vec(),
            signature,
        };

        let mut msg = self.envelope("secrets_set");
        msg.body.set_payload(&payload).expect("encode set payload");
        msg.sign(&self.signer).expect("sign set request");
        msg
    }
}

pub fn list_response(msg: &Message) -> ListResponse {
    serde_json::from_slice(msg.body.payload_bytes()).expect("list response payload")
}

pub fn set_response(msg: &Message) -> SetResponse {
    serde_json::from_slice(msg.body.payload_bytes()).expect("set response payload")
}

/// Seconds since the epoch, matching the storage clock.
pub fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
