//! Query Path Benchmarks
//!
//! Compares the candidate acquisition strategies and the write path:
//! - Index lookup vs full scan for the same selective query
//! - Sort + limit cost over a full table
//! - Create and update with index maintenance
//!
//! ## Running
//!
//! ```bash
//! cargo bench --bench query_paths
//! cargo bench --bench query_paths -- "query/indexed"
//! cargo bench --bench query_paths -- "write"
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use recordkv::{
    record, FieldKind, MemoryStore, Record, Schema, SortDirection, Table, TableDefinition,
    TableOptions, UnindexedQueries, Value,
};

// =============================================================================
// Constants and Configuration
// =============================================================================

/// Table sizes for scaling benchmarks.
const TABLE_SIZES: &[usize] = &[100, 1_000, 10_000];

/// Distinct workspace values; each holds `size / WORKSPACES` records.
const WORKSPACES: usize = 50;

// =============================================================================
// Helper Functions
// =============================================================================

fn definition(options: TableOptions) -> TableDefinition {
    TableDefinition::new(
        "events",
        Schema::new()
            .field("id", FieldKind::Text)
            .field("ws", FieldKind::Text)
            .field("kind", FieldKind::Text)
            .field("ts", FieldKind::Timestamp),
    )
    .index("ws")
    .with_options(options)
}

fn event(i: usize) -> Record {
    let base = chrono::DateTime::from_timestamp(1_704_067_200, 0).unwrap_or_default();
    record! {
        "id" => format!("e{i:08}"),
        "ws" => format!("ws{}", i % WORKSPACES),
        "kind" => format!("k{}", i % WORKSPACES),
        "ts" => base + chrono::Duration::seconds(i as i64),
    }
}

fn populated(size: usize, options: TableOptions) -> Table {
    let table = Table::new(Arc::new(MemoryStore::new()), definition(options)).unwrap();
    for i in 0..size {
        table.create(event(i)).unwrap();
    }
    table
}

// =============================================================================
// Query Benchmarks
// =============================================================================

fn bench_query_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");

    for &size in TABLE_SIZES {
        group.throughput(Throughput::Elements(size as u64));

        let table = populated(
            size,
            TableOptions {
                unindexed_queries: UnindexedQueries::Scan,
                ..Default::default()
            },
        );

        // Same selectivity; `ws` is indexed, `kind` is not.
        group.bench_with_input(BenchmarkId::new("indexed", size), &table, |b, t| {
            b.iter(|| black_box(t.query().where_eq("ws", "ws7").execute().unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("scan", size), &table, |b, t| {
            b.iter(|| black_box(t.query().where_eq("kind", "k7").execute().unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("sorted_top10", size), &table, |b, t| {
            b.iter(|| {
                black_box(
                    t.query()
                        .order_by("ts", SortDirection::Desc)
                        .limit(10)
                        .execute()
                        .unwrap(),
                )
            })
        });
    }

    group.finish();
}

// =============================================================================
// Write Benchmarks
// =============================================================================

fn bench_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");

    let table = populated(1_000, TableOptions::default());
    let next = AtomicU64::new(1_000);
    group.bench_function("create", |b| {
        b.iter(|| {
            let i = next.fetch_add(1, Ordering::Relaxed) as usize;
            black_box(table.create(event(i)).unwrap())
        })
    });

    let flip = AtomicU64::new(0);
    group.bench_function("update_reindex", |b| {
        b.iter(|| {
            let n = flip.fetch_add(1, Ordering::Relaxed);
            let ws = Value::from(format!("ws{}", n % 2));
            black_box(table.update("e00000001", record! { "ws" => ws }).unwrap())
        })
    });

    group.bench_function("update_unindexed", |b| {
        b.iter(|| black_box(table.update("e00000002", record! { "kind" => "k0" }).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_query_paths, bench_writes);
criterion_main!(benches);
