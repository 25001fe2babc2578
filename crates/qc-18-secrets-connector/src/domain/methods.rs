//! # Gateway Methods
//!
//! The fixed set of methods this handler serves, each bound to its own
//! payload schema. Anything else is not a `Method` at all, which is how the
//! dispatcher tells "unknown method" (silent drop) from "bad payload for a
//! known method" (signed error).

use super::errors::RequestDecodeError;
use super::secrets::SetRequest;
use std::fmt;

pub const METHOD_SECRETS_LIST: &str = "secrets_list";
pub const METHOD_SECRETS_SET: &str = "secrets_set";

/// Recognized method names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    SecretsList,
    SecretsSet,
}

impl Method {
    pub const ALL: [Method; 2] = [Method::SecretsList, Method::SecretsSet];

    pub const fn name(&self) -> &'static str {
        match self {
            Method::SecretsList => METHOD_SECRETS_LIST,
            Method::SecretsSet => METHOD_SECRETS_SET,
        }
    }

    /// `None` for unsupported methods.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Decode `payload` with this method's schema.
    pub fn decode(self, payload: &[u8]) -> Result<GatewayRequest, RequestDecodeError> {
        match self {
            // Listing is scoped by the envelope sender; the payload is ignored
            Method::SecretsList => Ok(GatewayRequest::SecretsList),
            Method::SecretsSet => {
                if payload.is_empty() {
                    return Err(RequestDecodeError::MissingPayload);
                }
                Ok(GatewayRequest::SecretsSet(serde_json::from_slice(payload)?))
            }
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded, strongly-typed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayRequest {
    SecretsList,
    SecretsSet(SetRequest),
}
