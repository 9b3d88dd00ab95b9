//! Benchmarks for the join, table serialization and rankings

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::time::Duration;
use tubeflow::model::{CategoryMap, VideoRecord};
use tubeflow::ranking::{rank_categories, rank_channels, RankingMetric, TOP_CHANNELS};
use tubeflow::stages::enrich::{build_join_map, join_categories, write_enriched_csv};

const SIZES: [usize; 3] = [1_000, 10_000, 50_000];

fn categories() -> CategoryMap {
    (1..=44)
        .map(|id| (id.to_string(), format!("Category {}", id)))
        .chain([("abc".to_string(), "Letters".to_string())])
        .collect()
}

fn videos(count: usize) -> Vec<VideoRecord> {
    (0..count)
        .map(|i| VideoRecord {
            video_id: format!("vid{:08}", i),
            trending_date: "17.14.11".to_string(),
            title: format!("Trending video number {}", i),
            channel_title: format!("Channel {}", i % 500),
            category_id: (i % 50) as i64,
            publish_time: "2017-11-10T07:38:29.000Z".to_string(),
            views: (i as u64 * 7_919) % 1_000_000,
            likes: (i as u64 * 104_729) % 50_000,
            dislikes: (i % 300) as u64,
            comment_count: (i % 1_000) as u64,
        })
        .collect()
}

fn bench_join(c: &mut Criterion) {
    let join_map = build_join_map(&categories());
    let mut group = c.benchmark_group("join_categories");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(5));

    for size in SIZES.iter() {
        let records = videos(*size);
        group.bench_with_input(BenchmarkId::new("left_join", size), &records, |b, records| {
            b.iter(|| join_categories(black_box(records.clone()), black_box(&join_map)))
        });
    }
    group.finish();
}

fn bench_write_table(c: &mut Criterion) {
    let join_map = build_join_map(&categories());
    let mut group = c.benchmark_group("write_enriched_csv");

    for size in SIZES.iter() {
        let enriched = join_categories(videos(*size), &join_map);
        group.bench_with_input(BenchmarkId::new("to_buffer", size), &enriched, |b, enriched| {
            b.iter(|| {
                let mut buffer = Vec::with_capacity(enriched.len() * 128);
                write_enriched_csv(&mut buffer, black_box(enriched)).unwrap();
                buffer
            })
        });
    }
    group.finish();
}

fn bench_rankings(c: &mut Criterion) {
    let join_map = build_join_map(&categories());
    let mut group = c.benchmark_group("rankings");

    for size in SIZES.iter() {
        let enriched = join_categories(videos(*size), &join_map);
        group.bench_with_input(BenchmarkId::new("categories", size), &enriched, |b, enriched| {
            b.iter(|| rank_categories(black_box(enriched)))
        });
        group.bench_with_input(BenchmarkId::new("channels", size), &enriched, |b, enriched| {
            b.iter(|| rank_channels(black_box(enriched), RankingMetric::Likes, TOP_CHANNELS))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_join, bench_write_table, bench_rankings);
criterion_main!(benches);
