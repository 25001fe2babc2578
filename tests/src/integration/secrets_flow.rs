//! # Secrets Round Trips
//!
//! Client ─► relay ─► connector node ─► in-memory storage ─► relay ─► client,
//! with every hop going through the JSON wire encoding and every response
//! signature checked against the node's address.

#[cfg(test)]
mod tests {
    use super::super::*;
    use qc_18_secrets_connector::{ListRow, ServiceState, StorageConstraints};

    const DAY: i64 = 24 * 60 * 60;

    // =============================================================================
    // HAPPY PATH
    // =============================================================================

    #[tokio::test]
    async fn test_set_then_list_round_trip() {
        let mut alice = Client::random();
        let mut node = Node::start([alice.address()]).await;
        let expires = now() + DAY;

        let request = alice.set_request(3, 1, expires, b"api-key-3");
        let response = node.exchange(&request).await.expect("set answered");
        assert_eq!(response.body.message_id, request.body.message_id);
        assert_eq!(response.body.don_id, DON_ID);
        assert_eq!(response.body.method, "secrets_set");
        assert!(set_response(&response).success);

        let request = alice.set_request(0, 1, expires + 60, b"api-key-0");
        assert!(set_response(&node.exchange(&request).await.unwrap()).success);

        let request = alice.list_request();
        let response = node.exchange(&request).await.expect("list answered");
        assert_eq!(response.body.message_id, request.body.message_id);

        let list = list_response(&response);
        assert!(list.success);
        assert_eq!(
            list.rows,
            vec![
                ListRow {
                    slot_id: 0,
                    version: 1,
                    expiration: expires + 60,
                },
                ListRow {
                    slot_id: 3,
                    version: 1,
                    expiration: expires,
                },
            ]
        );

        // The stored record carries the owner's write signature unchanged
        let (version, record, _) = node.storage.get(&alice.address(), 3).unwrap();
        assert_eq!(version, 1);
        assert_eq!(record.payload, b"api-key-3");
    }

    #[tokio::test]
    async fn test_newer_version_replaces_older() {
        let mut alice = Client::random();
        let mut node = Node::start([alice.address()]).await;
        let expires = now() + DAY;

        for (version, secret) in [(1, b"one"), (2, b"two"), (5, b"fiv")] {
            let request = alice.set_request(1, version, expires, secret);
            assert!(set_response(&node.exchange(&request).await.unwrap()).success);
        }

        let list = list_response(&node.exchange(&alice.list_request()).await.unwrap());
        assert_eq!(list.rows.len(), 1);
        assert_eq!(list.rows[0].version, 5);
        assert_eq!(node.storage.get(&alice.address(), 1).unwrap().1.payload, b"fiv");
    }

    // =============================================================================
    // STORAGE REJECTIONS (SIGNED ERROR ANSWERS)
    // =============================================================================

    #[tokio::test]
    async fn test_stale_version_rejected() {
        let mut alice = Client::random();
        let mut node = Node::start([alice.address()]).await;
        let expires = now() + DAY;

        let request = alice.set_request(2, 2, expires, b"v2");
        assert!(set_response(&node.exchange(&request).await.unwrap()).success);

        for stale in [2, 1] {
            let request = alice.set_request(2, stale, expires, b"old");
            let response = set_response(&node.exchange(&request).await.unwrap());
            assert!(!response.success);
            assert_eq!(
                response.error_message.as_deref(),
                Some("Failed to set secret: version too low")
            );
        }

        let list = list_response(&node.exchange(&alice.list_request()).await.unwrap());
        assert_eq!(list.rows[0].version, 2);
    }

    #[tokio::test]
    async fn test_record_signed_by_someone_else_rejected() {
        let mut alice = Client::random();
        let mallory = Client::random();
        let mut node = Node::start([alice.address()]).await;

        let request = alice.set_request_signed_by(&mallory.signer, 0, 1, now() + DAY, b"x");
        let response = set_response(&node.exchange(&request).await.unwrap());

        assert_eq!(
            response.error_message.as_deref(),
            Some("Failed to set secret: wrong signature")
        );
        assert!(node.storage.is_empty());
    }

    #[tokio::test]
    async fn test_storage_constraints_reported() {
        let mut alice = Client::random();
        let mut node = Node::start([alice.address()]).await;
        let limits = StorageConstraints::default();
        let now = now();

        let cases = [
            (
                alice.set_request(limits.max_slots_per_user, 1, now + DAY, b"x"),
                "Failed to set secret: slot id is too big",
            ),
            (
                alice.set_request(0, 1, now - 1, b"x"),
                "Failed to set secret: expired",
            ),
            (
                alice.set_request(0, 1, now + 30 * DAY, b"x"),
                "Failed to set secret: expiration too long",
            ),
            (
                alice.set_request(0, 1, now + DAY, &vec![7u8; limits.max_payload_size_bytes + 1]),
                "Failed to set secret: payload too big",
            ),
        ];

        for (request, expected) in cases {
            let response = set_response(&node.exchange(&request).await.unwrap());
            assert!(!response.success);
            assert_eq!(response.error_message.as_deref(), Some(expected));
        }
        assert!(node.storage.is_empty());
    }

    // =============================================================================
    // ISOLATION AND ADMISSION
    // =============================================================================

    #[tokio::test]
    async fn test_owners_only_see_their_own_slots() {
        let mut alice = Client::random();
        let mut bob = Client::random();
        let mut node = Node::start([alice.address(), bob.address()]).await;

        let request = alice.set_request(0, 1, now() + DAY, b"alice");
        assert!(set_response(&node.exchange(&request).await.unwrap()).success);

        let bob_list = list_response(&node.exchange(&bob.list_request()).await.unwrap());
        assert!(bob_list.success);
        assert!(bob_list.rows.is_empty());

        let alice_list = list_response(&node.exchange(&alice.list_request()).await.unwrap());
        assert_eq!(alice_list.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_stranger_is_ignored() {
        let alice = Client::random();
        let mut stranger = Client::random();
        let mut node = Node::start([alice.address()]).await;

        let set = stranger.set_request(0, 1, now() + DAY, b"x");
        assert!(node.exchange(&set).await.is_none());
        assert!(node.exchange(&stranger.list_request()).await.is_none());
        assert!(node.storage.is_empty());

        // Admitting the address later opens the door
        node.allowlist.allow_address(stranger.address());
        assert!(node.exchange(&stranger.list_request()).await.is_some());
    }

    // =============================================================================
    // LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_node_lifecycle() {
        let alice = Client::random();
        let node = Node::start([alice.address()]).await;

        assert_eq!(node.handler.state(), ServiceState::Started);
        assert!(node.allowlist.is_running());

        node.stop().await;
        assert_eq!(node.handler.state(), ServiceState::Stopped);
        assert!(!node.allowlist.is_running());
        assert!(node.handler.close().await.is_err());
    }
}
