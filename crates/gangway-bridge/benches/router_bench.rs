// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Router hot-path benchmarks. The parse/validate/lookup pipeline runs on the
// UI thread in production, so regressions here are user-visible jank.

use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::json;

use gangway_bridge::{RegistryBuilder, Router, Threading};
use gangway_core::capability::CapabilityGrants;

fn bench_router(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");

    let mut builder = RegistryBuilder::new();
    builder.register("echo.params", None, Threading::Inline, Ok);
    builder.register("echo.offloaded", None, Threading::Offloaded, Ok);
    let router = Router::new(builder.build(), CapabilityGrants::all());

    let payload = serde_json::to_vec(&json!({
        "id": "bench",
        "module": "echo",
        "method": "params",
        "params": {"width": 800, "height": 600}
    }))
    .expect("payload");

    c.bench_function("inline_roundtrip", |b| {
        b.iter(|| rt.block_on(router.handle(&payload)));
    });

    let offloaded = serde_json::to_vec(&json!({
        "id": "bench",
        "module": "echo",
        "method": "offloaded",
        "params": {}
    }))
    .expect("payload");

    c.bench_function("offloaded_roundtrip", |b| {
        b.iter(|| rt.block_on(router.handle(&offloaded)));
    });

    c.bench_function("parse_error_path", |b| {
        b.iter(|| rt.block_on(router.handle(b"{garbage")));
    });

    c.bench_function("method_not_found_path", |b| {
        b.iter(|| {
            rt.block_on(router.handle(br#"{"id":"x","module":"no","method":"such"}"#))
        });
    });
}

criterion_group!(benches, bench_router);
criterion_main!(benches);
