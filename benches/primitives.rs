use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fram_provision::crypto::aes::Aes256;
use fram_provision::crypto::cbc::{widen_iv, CbcContext};
use fram_provision::crypto::kdf::derive_record_key;
use fram_provision::crypto::sha256::Sha256;
use fram_provision::record::{decode, encode_with_iv, PlainCredentials, RecordImage};

const IV: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

fn reference_credentials() -> PlainCredentials {
    PlainCredentials::new(
        "DOLEWKA_001",
        "MyNetwork",
        "MyPassword1",
        "admin123",
        "sha256:abc123",
    )
    .unwrap()
}

fn bench_aes_block(c: &mut Criterion) {
    let cipher = Aes256::new(&[0x2B; 32]);
    let mut block = [0u8; 16];
    c.bench_function("aes256_encrypt_block", |b| {
        b.iter(|| {
            cipher.encrypt_block(black_box(&mut block));
        })
    });
}

fn bench_cbc_window(c: &mut Criterion) {
    let ctx = CbcContext::new(&[0x2B; 32], widen_iv(&IV));
    let mut window = [0u8; 160];
    c.bench_function("cbc_encrypt_token_window", |b| {
        b.iter(|| {
            ctx.encrypt_in_place(black_box(&mut window)).unwrap();
        })
    });
}

fn bench_sha256(c: &mut Criterion) {
    let data = [0x61u8; 1024];
    c.bench_function("sha256_1k", |b| {
        b.iter(|| {
            black_box(Sha256::digest(black_box(&data)));
        })
    });
}

fn bench_kdf(c: &mut Criterion) {
    c.bench_function("derive_record_key", |b| {
        b.iter(|| {
            black_box(derive_record_key(black_box(b"DOLEWKA_001")));
        })
    });
}

fn bench_record(c: &mut Criterion) {
    let plain = reference_credentials();
    let mut image = RecordImage::zeroed();
    c.bench_function("record_encode", |b| {
        b.iter(|| {
            encode_with_iv(black_box(&plain), &IV, &mut image).unwrap();
        })
    });

    encode_with_iv(&plain, &IV, &mut image).unwrap();
    c.bench_function("record_decode", |b| {
        b.iter(|| {
            black_box(decode(black_box(&image)).unwrap());
        })
    });
}

criterion_group!(
    benches,
    bench_aes_block,
    bench_cbc_window,
    bench_sha256,
    bench_kdf,
    bench_record
);
criterion_main!(benches);
