use std::hint::black_box;

use bytes::Bytes;
use criterion::{Criterion, criterion_group, criterion_main};
use isis_lsp_decode::pdu::Lsp;

// A representative LSP: header plus area addresses, protocols supported,
// extended IS reachability with one Adjacency-SID, and extended IPv4
// reachability with one Prefix-SID.
fn sample_lsp() -> Vec<u8> {
    let mut raw = vec![
        0x00, 0x00, 0x40, 0x00, 0xce, 0x39, 0x00, 0x00, // LSP-ID
        0x00, 0x00, 0x14, 0x26, // sequence number
        0x27, 0x7f, // checksum
        0x03, // flags
    ];

    // Area Addresses (type 1): one 4-byte area address.
    raw.extend_from_slice(&[1, 5, 4, 0x01, 0x02, 0x03, 0x04]);

    // Protocols Supported (type 129).
    raw.extend_from_slice(&[129, 2, 0xcc, 0x8e]);

    // Extended IS Reachability (type 22): one neighbor, metric 10, with an
    // Adjacency-SID sub-TLV (index form, SID 100).
    raw.extend_from_slice(&[
        22, 19, // type, length
        0x00, 0x00, 0x40, 0x00, 0xce, 0x39, // system-id
        0x01, // pseudonode
        0x00, 0x00, 0x0a, // metric (24 bits)
        0x08, // sub-TLV block length
        31, 6, // Adjacency-SID sub-TLV: type, length
        0x00, 0x00, // flags, weight
        0x00, 0x00, 0x00, 0x64, // index form SID = 100
    ]);

    // Extended IPv4 Reachability (type 135): one /24 prefix with a
    // Prefix-SID sub-TLV (index form, SID 200).
    raw.extend_from_slice(&[
        135, 17, // type, length
        0x00, 0x00, 0x00, 0x0a, // metric
        0x40 | 24, // control byte: sub-TLVs present, /24
        0x0a, 0x00, 0x01, // prefix octets (3 bytes for /24)
        0x08, // sub-TLV block length
        3, 6, // Prefix-SID sub-TLV: type, length
        0x00, 0x00, // flags, algo
        0x00, 0x00, 0x00, 0xc8, // index form SID = 200
    ]);

    raw
}

fn decode_once(raw: &[u8]) {
    let mut buf = Bytes::copy_from_slice(raw);
    let lsp = Lsp::decode(&mut buf).unwrap();
    black_box(lsp);
}

fn criterion_benchmark(c: &mut Criterion) {
    let raw = sample_lsp();
    c.bench_function("LSP decode", |b| b.iter(|| decode_once(black_box(&raw))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
