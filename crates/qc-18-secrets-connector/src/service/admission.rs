//! Admission gate: one yes/no decision per inbound message.

use super::FunctionsConnectorHandler;
use crate::domain::address::Address;
use crate::domain::context::RequestContext;
use crate::ports::outbound::{Allowlist, SecretStorage};
use tracing::{error, warn};

impl<S, A> FunctionsConnectorHandler<S, A>
where
    S: SecretStorage,
    A: Allowlist,
{
    /// Resolve and admit the sender.
    ///
    /// `None` means drop the request without answering: the sender is not a
    /// valid address, is not allowlisted, or the context was cancelled while
    /// the allowlist was being consulted.
    pub(super) async fn admit(
        &self,
        ctx: &RequestContext,
        gateway_id: &str,
        sender: &str,
    ) -> Option<Address> {
        let address: Address = match sender.parse() {
            Ok(address) => address,
            Err(e) => {
                error!(gateway_id, sender, error = %e, "Invalid sender address, dropping request");
                return None;
            }
        };

        match ctx.run(self.allowlist.allow(&address)).await {
            Ok(true) => Some(address),
            Ok(false) => {
                error!(
                    gateway_id,
                    address = %address,
                    "Allowlist prevented the request from this address"
                );
                None
            }
            Err(_) => {
                warn!(gateway_id, address = %address, "Request cancelled during admission");
                None
            }
        }
    }
}
