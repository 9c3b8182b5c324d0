use core::cell::Cell;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fram_provision::crypto::entropy::MockEntropy;
use fram_provision::record::{decode, encode, encode_with_iv, PlainCredentials, RecordImage};
use fram_provision::store::{CredentialStore, MemoryFram};
use stacker::{maybe_grow, remaining_stack};

static ENTROPY_IV: [u8; 8] = [0xA5; 8];

fn credentials() -> PlainCredentials {
    PlainCredentials::new(
        "DOLEWKA_001",
        "MyNetwork",
        "MyPassword1",
        "admin123",
        "sha256:abc123",
    )
    .unwrap()
}

fn bench_encode(c: &mut Criterion) {
    let plain = credentials();
    let max_stack = Cell::new(0usize);
    c.bench_function("record_encode_stack", |b| {
        b.iter(|| {
            let used = measure_stack_usage(|| {
                let mut entropy = MockEntropy::from_slice(&ENTROPY_IV);
                let mut image = RecordImage::zeroed();
                encode(&plain, &mut entropy, &mut image).unwrap();
                black_box(&image);
            });
            max_stack.set(max_stack.get().max(used));
            black_box(used);
        });
    });
    println!("record_encode_stack: peak {} bytes", max_stack.get());
}

fn bench_decode(c: &mut Criterion) {
    let mut image = RecordImage::zeroed();
    encode_with_iv(&credentials(), &ENTROPY_IV, &mut image).unwrap();
    let max_stack = Cell::new(0usize);

    c.bench_function("record_decode_stack", |b| {
        b.iter(|| {
            let used = measure_stack_usage(|| {
                black_box(decode(&image).unwrap());
            });
            max_stack.set(max_stack.get().max(used));
            black_box(used);
        });
    });
    println!("record_decode_stack: peak {} bytes", max_stack.get());
}

fn bench_program(c: &mut Criterion) {
    let plain = credentials();
    let store = Box::leak(Box::new(CredentialStore::new(MemoryFram::<{ 32 * 1024 }>::new())));
    let max_stack = Cell::new(0usize);

    c.bench_function("store_program_stack", |b| {
        b.iter(|| {
            let used = measure_stack_usage(|| {
                let mut entropy = MockEntropy::from_slice(&ENTROPY_IV);
                black_box(store.program(&plain, &mut entropy).unwrap());
            });
            max_stack.set(max_stack.get().max(used));
            black_box(used);
        });
    });
    println!("store_program_stack: peak {} bytes", max_stack.get());
}

fn measure_stack_usage<F: FnOnce()>(f: F) -> usize {
    maybe_grow(32 * 1024, 128 * 1024, || {
        let before = remaining_stack();
        f();
        let after = remaining_stack();
        match (before, after) {
            (Some(b), Some(a)) => b.saturating_sub(a),
            _ => 0,
        }
    })
}

fn stack_suite(c: &mut Criterion) {
    bench_encode(c);
    bench_decode(c);
    bench_program(c);
}

criterion_group!(stack_profile, stack_suite);
criterion_main!(stack_profile);
