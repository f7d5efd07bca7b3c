// In chunkscope-core/benches/decode_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::io::Write;

use chunkscope::kernels::{checksum, leb128, zigzag};
use chunkscope::bridge::CHUNK_MAGIC;
use chunkscope::{decode_body, EntryDecoder, InspectConfig};

// --- MOCK CHUNK GENERATION ---

const ENTRIES_PER_BLOCK: usize = 2048;
const BLOCKS: usize = 8;

/// Encodes one block's worth of realistic-looking log lines.
fn generate_block_plaintext(block: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for i in 0..ENTRIES_PER_BLOCK {
        let ts = 1_700_000_000_000_000_000i64 + ((block * ENTRIES_PER_BLOCK + i) as i64) * 1_000_000;
        let line = format!(
            "level=info ts={} caller=http.go:{} msg=\"request served\" status=200 bytes={}",
            ts,
            i % 400,
            (i * 37) % 9000
        );
        zigzag::encode_one(ts, &mut out).unwrap();
        leb128::encode_one(line.len() as u64, &mut out).unwrap();
        out.extend_from_slice(line.as_bytes());
    }
    out
}

fn snappy_frame(bytes: &[u8]) -> Vec<u8> {
    let mut writer = snap::write::FrameEncoder::new(Vec::new());
    writer.write_all(bytes).unwrap();
    match writer.into_inner() {
        Ok(v) => v,
        Err(e) => panic!("snappy encode failed: {}", e.error()),
    }
}

/// Builds a checksummed snappy chunk body by hand.
fn generate_body() -> (Vec<u8>, Vec<u8>) {
    let mut body = CHUNK_MAGIC.to_be_bytes().to_vec();
    body.extend_from_slice(&[2, 4]);

    let mut region = Vec::new();
    leb128::encode_one(BLOCKS as u64, &mut region).unwrap();
    let mut first_plain = Vec::new();

    for block in 0..BLOCKS {
        let plain = generate_block_plaintext(block);
        let payload = snappy_frame(&plain);
        let offset = body.len() as u64;
        body.extend_from_slice(&payload);
        body.extend_from_slice(&checksum::crc32c(&payload).to_be_bytes());

        leb128::encode_one(ENTRIES_PER_BLOCK as u64, &mut region).unwrap();
        zigzag::encode_one(0, &mut region).unwrap();
        zigzag::encode_one(i64::MAX, &mut region).unwrap();
        leb128::encode_one(offset, &mut region).unwrap();
        leb128::encode_one(payload.len() as u64, &mut region).unwrap();

        if block == 0 {
            first_plain = plain;
        }
    }

    let meta_offset = body.len() as u64;
    body.extend_from_slice(&region);
    body.extend_from_slice(&checksum::crc32c(&region).to_be_bytes());
    body.extend_from_slice(&meta_offset.to_be_bytes());
    (body, first_plain)
}

// --- Benchmark Suite ---

fn bench_decode(c: &mut Criterion) {
    let (body, plain) = generate_body();
    let config = InspectConfig::default();

    let mut group = c.benchmark_group("Chunk Decode");

    group.throughput(criterion::Throughput::Bytes(plain.len() as u64));
    group.bench_function("Entry stream (one block)", |b| {
        b.iter(|| black_box(EntryDecoder::new(black_box(&plain)).count()))
    });

    group.throughput(criterion::Throughput::Bytes(body.len() as u64));
    group.bench_function("Full body (snappy, 8 blocks)", |b| {
        b.iter(|| black_box(decode_body(black_box(body.clone()), &config).unwrap()))
    });

    group.bench_function("CRC32C (full body)", |b| {
        b.iter(|| black_box(checksum::crc32c(black_box(&body))))
    });

    group.finish();
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
