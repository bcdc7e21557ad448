// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_buffer::BufferTimeoutExt;
use backflux_core::{Publisher, Subscriber, UNBOUNDED};
use backflux_test_utils::{TestPublisher, TestSubscriber, VirtualTimeScheduler};
use criterion::{BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

const ITEMS: u32 = 10_000;

pub fn bench_size_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_timeout_size_flush");
    let sizes = [1_usize, 16, 256];

    for &max_size in &sizes {
        group.throughput(Throughput::Elements(u64::from(ITEMS)));
        group.bench_with_input(
            BenchmarkId::from_parameter(max_size),
            &max_size,
            |bencher, &max_size| {
                bencher.iter(|| {
                    let scheduler = VirtualTimeScheduler::new();
                    let source = TestPublisher::<u32>::new();
                    let consumer = TestSubscriber::new(UNBOUNDED);
                    source
                        .clone()
                        .buffer_timeout(max_size, Duration::from_secs(1), scheduler)
                        .unwrap()
                        .subscribe(consumer.clone() as Arc<dyn Subscriber<Vec<u32>>>);

                    for item in 0..ITEMS {
                        source.next(black_box(item));
                    }
                    source.complete();

                    black_box(consumer.value_count());
                });
            },
        );
    }

    group.finish();
}

pub fn bench_time_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_timeout_time_flush");
    let per_tick = [1_u32, 64];

    for &items_per_tick in &per_tick {
        group.throughput(Throughput::Elements(u64::from(ITEMS)));
        group.bench_with_input(
            BenchmarkId::from_parameter(items_per_tick),
            &items_per_tick,
            |bencher, &items_per_tick| {
                bencher.iter(|| {
                    let scheduler = VirtualTimeScheduler::new();
                    let source = TestPublisher::<u32>::new();
                    let consumer = TestSubscriber::new(UNBOUNDED);
                    source
                        .clone()
                        .buffer_timeout(usize::MAX, Duration::from_millis(10), scheduler.clone())
                        .unwrap()
                        .subscribe(consumer.clone() as Arc<dyn Subscriber<Vec<u32>>>);

                    for item in 0..ITEMS {
                        source.next(black_box(item));
                        if (item + 1) % items_per_tick == 0 {
                            scheduler.advance_time_by(Duration::from_millis(10));
                        }
                    }
                    source.complete();

                    black_box(consumer.value_count());
                });
            },
        );
    }

    group.finish();
}
