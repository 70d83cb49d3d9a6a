//! # Lightchain Benchmarks
//!
//! Hot paths of the light client:
//!
//! | Crate | Path | Why it matters |
//! |-------|------|----------------|
//! | lc-01 RLP Codec | encode/decode of nested lists | every inbound frame |
//! | lc-02 Wire Messages | `unframe` of a header batch | socket push traffic |
//! | lc-05 Transactions | sign + encode | every send |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lc_01_rlp_codec::{decode, encode, RlpNode};
use lc_02_wire_messages::{frame, unframe, BlockHeader, BlockHeadersMessage, WireMessage};
use lc_05_transactions::{encode_signed, RawTransaction, TransactionSigner};
use shared_types::{Address, Hash, U256};
use std::time::Duration;

const KEY: &str = "4646464646464646464646464646464646464646464646464646464646464646";

// ============================================================================
// LC-01: RLP Codec
// ============================================================================

fn bench_rlp_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("lc-01-rlp-codec");
    group.measurement_time(Duration::from_secs(5));

    for width in [16usize, 256, 4096] {
        let node = RlpNode::list(
            (0..width as u64)
                .map(|i| RlpNode::list(vec![RlpNode::from_u64(i), RlpNode::bytes(vec![0xab; 32])]))
                .collect(),
        );
        let bytes = encode(&node);
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("encode", width), &node, |b, node| {
            b.iter(|| black_box(encode(node)))
        });
        group.bench_with_input(BenchmarkId::new("decode", width), &bytes, |b, bytes| {
            b.iter(|| black_box(decode(bytes).is_ok()))
        });
    }

    group.finish();
}

// ============================================================================
// LC-02: Wire Messages
// ============================================================================

fn bench_unframe_headers(c: &mut Criterion) {
    let mut group = c.benchmark_group("lc-02-wire-messages");

    for count in [1u64, 32, 192] {
        let message = WireMessage::BlockHeaders(BlockHeadersMessage {
            request_id: 1,
            buffer_value: 1_000,
            headers: (0..count)
                .map(|number| BlockHeader {
                    number,
                    parent_hash: Hash::repeat_byte(number as u8),
                    gas_limit: 30_000_000,
                    timestamp: 1_700_000_000 + number,
                    ..Default::default()
                })
                .collect(),
        });
        let bytes = frame(&message);
        group.throughput(Throughput::Elements(count));

        group.bench_with_input(BenchmarkId::new("unframe", count), &bytes, |b, bytes| {
            b.iter(|| black_box(unframe(bytes).is_ok()))
        });
    }

    group.finish();
}

// ============================================================================
// LC-05: Transactions
// ============================================================================

fn bench_sign_transaction(c: &mut Criterion) {
    let mut group = c.benchmark_group("lc-05-transactions");
    group.measurement_time(Duration::from_secs(10));

    let signer = match TransactionSigner::from_hex(KEY) {
        Ok(signer) => signer,
        Err(err) => panic!("benchmark key rejected: {err}"),
    };
    let raw = RawTransaction {
        nonce: 9,
        gas_price: U256::from(20_000_000_000u64),
        gas_limit: 21_000,
        to: Some(Address::repeat_byte(0x35)),
        value: U256::exp10(18),
        data: Vec::new(),
    };

    group.bench_function("sign_and_encode", |b| {
        b.iter(|| {
            let signature = signer.sign(black_box(&raw), 1);
            black_box(signature.and_then(|sig| encode_signed(&raw, &sig, 1)).is_ok())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_rlp_codec,
    bench_unframe_headers,
    bench_sign_transaction
);
criterion_main!(benches);
