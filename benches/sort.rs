//! Benchmark comparing the two merge sort strategies, plus `merge_many`.
//!
//! Run with: cargo bench --bench sort

use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BatchSize;
use criterion::BenchmarkId;
use criterion::Criterion;
use cyclic_queue::{merge_many_with, MergeContext, Queue, SortStrategy};
use std::iter::FromIterator;

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

/// Deterministic pseudo-random words, so every run sorts the same input.
fn words(count: usize) -> Vec<String> {
    let mut state = 0x2545_f491_u64;
    Vec::from_iter((0..count).map(|_| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        format!("{:016x}", state)
    }))
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort");
    for &size in &SIZES {
        let input = words(size);
        for &strategy in &[SortStrategy::TopDown, SortStrategy::BottomUp] {
            group.bench_with_input(
                BenchmarkId::new(strategy.to_string(), size),
                &input,
                |b, input| {
                    b.iter_batched(
                        || Queue::from_iter(input),
                        |mut queue| {
                            queue.sort_with(false, strategy);
                            black_box(queue)
                        },
                        BatchSize::LargeInput,
                    )
                },
            );
        }
    }
    group.finish();
}

fn bench_merge_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_many");
    for &size in &SIZES {
        let input = words(size);
        group.bench_with_input(BenchmarkId::new("eight_queues", size), &input, |b, input| {
            b.iter_batched(
                || {
                    Vec::from_iter(input.chunks(size / 8).map(|chunk| {
                        let mut queue = Queue::from_iter(chunk);
                        queue.sort(false);
                        queue
                    }))
                },
                |mut queues| {
                    let mut chain = Vec::from_iter(
                        queues
                            .iter_mut()
                            .enumerate()
                            .map(|(id, queue)| MergeContext::new(id, queue)),
                    );
                    black_box(merge_many_with(&mut chain, false, SortStrategy::default()))
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sort, bench_merge_many);
criterion_main!(benches);
