//! # Secrets Connector Benchmarks
//!
//! | Path | What is measured |
//! |------|------------------|
//! | Envelope sign | Keccak-256 + recoverable ECDSA over the padded body |
//! | Envelope validate | Field checks + public key recovery |
//! | Handler `secrets_list` | Admission, storage read, response sign, channel send |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use k256::ecdsa::SigningKey;
use qc_18_secrets_connector::{
    ChannelConnector, ConnectorConfig, ConnectorDependencies, FunctionsConnectorHandler,
    GatewayConnectorHandler, InMemorySecretStorage, Message, MessageBody, MessageSigner,
    RequestContext, StaticAllowlist, StorageConstraints,
};
use std::sync::Arc;
use std::time::Duration;

fn random_signer() -> MessageSigner {
    MessageSigner::new(SigningKey::random(&mut rand::thread_rng()))
}

fn request(signer: &MessageSigner, payload_len: usize) -> Message {
    let mut msg = Message::new(MessageBody {
        message_id: "bench-message".into(),
        method: "secrets_list".into(),
        don_id: "bench-don".into(),
        sender: signer.address().to_hex(),
        payload: None,
    });
    if payload_len > 0 {
        msg.body
            .set_payload(&"x".repeat(payload_len))
            .expect("payload encodes");
    }
    msg.sign(signer).expect("request signs");
    msg
}

// ============================================================================
// Envelope codec
// ============================================================================

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope");
    group.measurement_time(Duration::from_secs(5));

    let signer = random_signer();
    for payload_len in [0usize, 256, 4096] {
        let msg = request(&signer, payload_len);
        group.throughput(Throughput::Bytes(payload_len as u64));

        group.bench_with_input(BenchmarkId::new("sign", payload_len), &msg, |b, msg| {
            b.iter(|| {
                let mut msg = msg.clone();
                msg.sign(&signer).expect("sign");
                black_box(msg)
            })
        });

        group.bench_with_input(BenchmarkId::new("validate", payload_len), &msg, |b, msg| {
            b.iter(|| black_box(msg.validate().expect("valid")))
        });
    }

    group.finish();
}

// ============================================================================
// Full request path
// ============================================================================

fn bench_handle_list(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");

    let user = random_signer();
    let node_key = hex::encode(SigningKey::random(&mut rand::thread_rng()).to_bytes());
    let handler = FunctionsConnectorHandler::new(
        &ConnectorConfig::new(node_key),
        ConnectorDependencies {
            storage: InMemorySecretStorage::new(StorageConstraints::default()),
            allowlist: StaticAllowlist::new([user.address()]),
        },
    )
    .expect("handler");

    let (connector, mut outbound) = ChannelConnector::new(1);
    handler.set_connector(Arc::new(connector));
    let msg = request(&user, 0);
    let ctx = RequestContext::background();

    c.bench_function("handler/secrets_list", |b| {
        b.iter(|| {
            rt.block_on(async {
                handler
                    .handle_gateway_message(&ctx, "bench-gateway", msg.clone())
                    .await;
                black_box(outbound.recv().await)
            })
        })
    });
}

criterion_group!(benches, bench_envelope, bench_handle_list);
criterion_main!(benches);
