//! Tree Operations Benchmarks
//!
//! Benchmarks for reading the taxon tree back from the page, flattening and
//! counting a snapshot, and parsing tree selectors.
//!
//! Run with: `cargo bench --bench tree_ops`

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shop_probe::mock::{render_taxon_tree, MockDriver, MockTaxon, SelectorList};
use shop_probe::prelude::*;

/// `width` roots, each with `width` children, each with `width` leaves
fn catalogue(width: usize) -> Vec<MockTaxon> {
    (0..width)
        .map(|i| {
            MockTaxon::new(format!("Root {i}")).with_children(
                (0..width)
                    .map(|j| {
                        MockTaxon::new(format!("Branch {i}.{j}")).with_children(
                            (0..width)
                                .map(|k| MockTaxon::new(format!("Leaf {i}.{j}.{k}")))
                                .collect(),
                        )
                    })
                    .collect(),
            )
        })
        .collect()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");
    let rt = runtime();

    for width in [2, 4, 6] {
        let driver = MockDriver::new(render_taxon_tree(&catalogue(width)));
        let locator =
            HierarchicalElementLocator::new(&driver, TreeSelectors::default(), WaitOptions::new());
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |bench, _| {
            bench.iter(|| {
                let snapshot = rt.block_on(locator.snapshot()).unwrap();
                black_box(snapshot);
            });
        });
    }

    group.finish();
}

fn bench_snapshot_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_queries");
    let rt = runtime();
    let driver = MockDriver::new(render_taxon_tree(&catalogue(6)));
    let locator =
        HierarchicalElementLocator::new(&driver, TreeSelectors::default(), WaitOptions::new());
    let snapshot = rt.block_on(locator.snapshot()).unwrap();

    group.bench_function("flatten", |bench| {
        bench.iter(|| black_box(snapshot.flatten().len()));
    });
    group.bench_function("count_containing", |bench| {
        bench.iter(|| black_box(snapshot.count_containing(black_box("Leaf 3"))));
    });
    group.bench_function("find_first_last", |bench| {
        bench.iter(|| black_box(snapshot.find_first(black_box("Leaf 5.5.5")).is_some()));
    });

    group.finish();
}

fn bench_selector_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("selector_parsing");
    let selectors = TreeSelectors::default();

    let cases = vec![
        ("tree", selectors.tree.clone()),
        ("item", selectors.item.clone()),
        ("label", selectors.label.clone()),
        ("move_button", selectors.move_button(MoveDirection::Up)),
        ("attribute", r#"div[data-form-collection="item"]"#.to_string()),
    ];

    for (name, selector) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &selector, |bench, sel| {
            bench.iter(|| black_box(SelectorList::parse(black_box(sel)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_snapshot,
    bench_snapshot_queries,
    bench_selector_parsing
);
criterion_main!(benches);
