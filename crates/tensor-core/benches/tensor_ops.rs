// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for leading-dimension tensor operations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tensor_core::{concat_leading, split_leading, Shape, Tensor};

fn bench_concat(c: &mut Criterion) {
    let mut group = c.benchmark_group("concat_leading");
    for batch in [2usize, 8, 32] {
        let item = Tensor::full_f32(Shape::new(vec![1, 224, 224, 3]), 0.5);
        let items = vec![item; batch];
        group.bench_with_input(BenchmarkId::from_parameter(batch), &items, |b, items| {
            b.iter(|| concat_leading(black_box(items)).unwrap())
        });
    }
    group.finish();
}

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_leading");
    for batch in [2usize, 8, 32] {
        let joined = Tensor::full_f32(Shape::new(vec![batch, 1001]), 0.25);
        group.bench_with_input(BenchmarkId::from_parameter(batch), &joined, |b, t| {
            b.iter(|| split_leading(black_box(t), batch).unwrap())
        });
    }
    group.finish();
}

fn bench_batch_dim(c: &mut Criterion) {
    let t = Tensor::full_f32(Shape::new(vec![224, 224, 3]), 1.0);
    c.bench_function("with_batch_dim", |b| b.iter(|| black_box(&t).with_batch_dim()));
}

criterion_group!(benches, bench_concat, bench_split, bench_batch_dim);
criterion_main!(benches);
