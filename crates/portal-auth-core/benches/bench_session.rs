//! Benchmarks for session validation and access decisions

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use portal_auth_core::{
    require_roles, AccessGuard, HmacKey, MemoryBackend, RouteTable, SessionCodec, SessionConfig,
    SessionPayload, SessionStore,
};
use portal_types::{Principal, RoleTag, RoutePolicy};

fn principal() -> Principal {
    Principal::new("user-42", "benchmark@example.com", RoleTag::Manager).with_display_name("Bench")
}

fn bench_codec(c: &mut Criterion) {
    let payload = SessionPayload::new(&principal(), None);
    let codecs = [
        ("trusted", SessionCodec::trusted()),
        ("signed", SessionCodec::signed(HmacKey::new("k".repeat(32)).unwrap())),
    ];

    let mut group = c.benchmark_group("session_codec");

    for (name, codec) in &codecs {
        group.bench_with_input(BenchmarkId::new("encode", *name), codec, |b, codec| {
            b.iter(|| codec.encode(black_box(&payload)).unwrap());
        });

        let stored = codec.encode(&payload).unwrap();
        group.bench_with_input(BenchmarkId::new("decode", *name), codec, |b, codec| {
            b.iter(|| codec.decode(black_box(&stored)).unwrap());
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let config = SessionConfig::new()
        .with_signing_secret("k".repeat(32))
        .unwrap();
    let store = SessionStore::new(MemoryBackend::new(), &config);
    store.put(&principal());

    c.bench_function("session_validate_signed", |b| {
        b.iter(|| black_box(&store).validate().unwrap());
    });
}

fn bench_guard(c: &mut Criterion) {
    let guard = AccessGuard::new(Arc::new(RouteTable::default()));
    let manager = principal();
    let consumer = Principal::new("user-7", "c@example.com", RoleTag::Consumer);

    let cases = [
        ("allow", Some(&manager), require_roles(RoleTag::WORKSPACE), "/workspace/clients"),
        ("role_home", Some(&consumer), require_roles(RoleTag::WORKSPACE), "/workspace/clients"),
        ("scope_denied", Some(&manager), RoutePolicy::authenticated(), "/es/consumer/cart"),
        ("anonymous", None, RoutePolicy::authenticated(), "/workspace"),
    ];

    let mut group = c.benchmark_group("access_guard");

    for (name, principal, policy, path) in &cases {
        group.bench_function(*name, |b| {
            b.iter(|| guard.decide(black_box(*principal), black_box(policy), black_box(path)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_codec, bench_validate, bench_guard);
criterion_main!(benches);
