//! Secret-store adapter: dispatcher-level requests to storage calls, storage
//! results back to response payloads.

use super::FunctionsConnectorHandler;
use crate::domain::address::Address;
use crate::domain::context::{Cancelled, RequestContext};
use crate::domain::errors::RequestDecodeError;
use crate::domain::methods::Method;
use crate::domain::secrets::{ListResponse, ListRow, SetRequest, SetResponse};
use crate::ports::outbound::{Allowlist, SecretStorage};
use serde::Serialize;

/// Response body for one of the served methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    List(ListResponse),
    Set(SetResponse),
}

impl ResponsePayload {
    /// Signed answer to a payload that does not match the method's schema.
    pub fn bad_request(method: Method, err: &RequestDecodeError) -> Self {
        match method {
            Method::SecretsList => {
                Self::List(ListResponse::error(format!("Bad request to list secrets: {}", err)))
            }
            Method::SecretsSet => {
                Self::Set(SetResponse::error(format!("Bad request to set secret: {}", err)))
            }
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Self::List(r) => r.success,
            Self::Set(r) => r.success,
        }
    }
}

impl<S, A> FunctionsConnectorHandler<S, A>
where
    S: SecretStorage,
    A: Allowlist,
{
    /// Metadata of every record the backend holds for `owner`. Payloads are
    /// never included.
    pub(super) async fn handle_secrets_list(
        &self,
        ctx: &RequestContext,
        owner: &Address,
    ) -> Result<ListResponse, Cancelled> {
        let response = match ctx.run(self.storage.list(owner)).await? {
            Ok(snapshot) => ListResponse::ok(snapshot.into_iter().map(ListRow::from).collect()),
            Err(e) => ListResponse::error(format!("Failed to list secrets: {}", e)),
        };
        Ok(response)
    }

    /// Forward a write to the backend. The owner's write signature is passed
    /// through untouched; the backend verifies it.
    pub(super) async fn handle_secrets_set(
        &self,
        ctx: &RequestContext,
        owner: &Address,
        request: SetRequest,
    ) -> Result<SetResponse, Cancelled> {
        let (key, record) = request.to_key_and_record(*owner);

        let response = match ctx
            .run(self.storage.put(&key, &record, &request.signature))
            .await?
        {
            Ok(()) => SetResponse::ok(),
            Err(e) => SetResponse::error(format!("Failed to set secret: {}", e)),
        };
        Ok(response)
    }
}
