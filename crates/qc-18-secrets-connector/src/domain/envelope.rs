//! # Gateway Message Envelope
//!
//! The signed wrapper exchanged with the gateway relay.
//!
//! ```json
//! {
//!   "signature": "0x<65 bytes hex>",
//!   "body": {
//!     "message_id": "...", "method": "...", "don_id": "...",
//!     "sender": "0x<20 bytes hex>", "payload": { ... }
//!   }
//! }
//! ```
//!
//! ## Signed Bytes
//!
//! Every text field is zero-padded to a fixed width so that field boundaries
//! cannot be shifted without changing the digest:
//!
//! | Field        | Width      |
//! |--------------|------------|
//! | `message_id` | 128        |
//! | `method`     | 64         |
//! | `don_id`     | 64         |
//! | `sender`     | 42         |
//! | `payload`    | raw, rest  |
//!
//! `payload` is kept as the exact raw JSON received, so re-encoding never
//! changes what was signed.

use super::address::{Address, ADDRESS_HEX_LEN};
use super::errors::EnvelopeError;
use super::signer::recover_signer;
use crate::ports::inbound::Signer;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

pub const MESSAGE_ID_MAX_LEN: usize = 128;
pub const MESSAGE_METHOD_MAX_LEN: usize = 64;
pub const MESSAGE_DON_ID_MAX_LEN: usize = 64;
pub const MESSAGE_SENDER_LEN: usize = ADDRESS_HEX_LEN;

/// Signed gateway message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    /// `0x`-prefixed hex signature over the body (empty until signed)
    #[serde(default)]
    pub signature: String,
    pub body: MessageBody,
}

/// Body of a gateway message. Every field here is covered by the signature.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageBody {
    /// Correlation id chosen by the requester, echoed in the response
    pub message_id: String,
    pub method: String,
    /// Routing id of the DON / relay session, echoed in the response
    pub don_id: String,
    /// Hex address of the signer
    #[serde(default)]
    pub sender: String,
    /// Method-specific JSON, byte-exact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Box<RawValue>>,
}

impl MessageBody {
    /// Raw payload bytes (empty when absent).
    pub fn payload_bytes(&self) -> &[u8] {
        self.payload
            .as_deref()
            .map(|raw| raw.get().as_bytes())
            .unwrap_or_default()
    }

    /// Replace the payload with the JSON encoding of `value`.
    pub fn set_payload<T: Serialize>(&mut self, value: &T) -> Result<(), EnvelopeError> {
        self.payload = Some(serde_json::value::to_raw_value(value)?);
        Ok(())
    }

    /// The exact byte string covered by the signature.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, EnvelopeError> {
        let payload = self.payload_bytes();
        let mut out = Vec::with_capacity(
            MESSAGE_ID_MAX_LEN
                + MESSAGE_METHOD_MAX_LEN
                + MESSAGE_DON_ID_MAX_LEN
                + MESSAGE_SENDER_LEN
                + payload.len(),
        );
        push_aligned(&mut out, "message_id", &self.message_id, MESSAGE_ID_MAX_LEN)?;
        push_aligned(&mut out, "method", &self.method, MESSAGE_METHOD_MAX_LEN)?;
        push_aligned(&mut out, "don_id", &self.don_id, MESSAGE_DON_ID_MAX_LEN)?;
        push_aligned(&mut out, "sender", &self.sender, MESSAGE_SENDER_LEN)?;
        out.extend_from_slice(payload);
        Ok(out)
    }
}

fn push_aligned(
    out: &mut Vec<u8>,
    field: &'static str,
    value: &str,
    width: usize,
) -> Result<(), EnvelopeError> {
    let bytes = value.as_bytes();
    if bytes.len() > width {
        return Err(EnvelopeError::FieldTooLong {
            field,
            len: bytes.len(),
            max: width,
        });
    }
    out.extend_from_slice(bytes);
    out.resize(out.len() + (width - bytes.len()), 0);
    Ok(())
}

impl Message {
    pub fn new(body: MessageBody) -> Self {
        Self {
            signature: String::new(),
            body,
        }
    }

    /// Sign the body as it stands. The caller sets `body.sender` to the
    /// signer's address beforehand; `validate` will reject anything else.
    pub fn sign<S: Signer + ?Sized>(&mut self, signer: &S) -> Result<(), EnvelopeError> {
        let data = self.body.signing_bytes()?;
        let signature = signer.sign(&[&data])?;
        self.signature = format!("0x{}", hex::encode(signature));
        Ok(())
    }

    /// Decoded signature bytes.
    pub fn signature_bytes(&self) -> Result<Vec<u8>, EnvelopeError> {
        let digits = self.signature.strip_prefix("0x").unwrap_or(&self.signature);
        hex::decode(digits).map_err(|_| EnvelopeError::InvalidSignatureEncoding)
    }

    /// Check field limits and the signature; returns the verified sender.
    pub fn validate(&self) -> Result<Address, EnvelopeError> {
        if self.body.method.is_empty() {
            return Err(EnvelopeError::EmptyMethod);
        }
        let sender = &self.body.sender;
        if sender.len() != MESSAGE_SENDER_LEN || !sender.starts_with("0x") {
            return Err(EnvelopeError::NonCanonicalSender(sender.clone()));
        }
        let declared: Address = sender.parse()?;

        let data = self.body.signing_bytes()?;
        let signature = self.signature_bytes()?;
        let recovered = recover_signer(&signature, &[&data])?;

        if recovered != declared {
            return Err(EnvelopeError::SenderMismatch {
                declared,
                recovered,
            });
        }
        Ok(recovered)
    }

    pub fn encode(&self) -> Result<Vec<u8>, EnvelopeError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
