// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Benchmarks for incremental guard evaluation under wide fan-in.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use prsim::{Prs, Value};

/// `x` pulled up by a wide AND of `i*` and down by a wide OR of the same inputs.
fn wide_gate(width: usize) -> String {
    let ins: Vec<String> = (0..width).map(|i| format!("i{i}")).collect();
    format!(
        "{} -> x+\n{} -> x-\n",
        ins.join(" & "),
        ins.iter().map(|s| format!("~{s}")).collect::<Vec<_>>().join(" | ")
    )
}

fn bench_toggle_inputs(c: &mut Criterion) {
    let mut group = c.benchmark_group("guard_eval");

    for width in [4, 32, 256] {
        group.bench_with_input(BenchmarkId::new("toggle_all", width), &width, |b, &w| {
            let mut p = Prs::from_str(&wide_gate(w)).unwrap();
            let ins: Vec<_> = (0..w).map(|i| p.node(&format!("i{i}")).unwrap()).collect();
            let mut v = Value::True;
            b.iter(|| {
                for &n in &ins {
                    p.set_node(n, v);
                }
                while let Some(tr) = p.step() {
                    black_box(tr);
                }
                v = v.not();
            })
        });
    }

    group.finish();
}

fn bench_check_guards(c: &mut Criterion) {
    let p = Prs::from_str(&wide_gate(256)).unwrap();
    c.bench_function("check_guards_256", |b| b.iter(|| black_box(p.check_guards().is_ok())));
}

criterion_group!(benches, bench_toggle_inputs, bench_check_guards);
criterion_main!(benches);
