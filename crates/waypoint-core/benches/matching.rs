//! Matching and rendering benchmarks for Waypoint.
//!
//! These benchmarks measure route resolution against trees of different
//! sizes and the cost of rendering a nested chain.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tenvis_waypoint_core::{Route, Router, View};
use waypoint_location::Location;

fn layout_route(path: &str) -> Route {
    Route::new(path).element(|ctx| Ok(View::fragment(vec![View::heading("Layout"), ctx.outlet()?])))
}

/// A root with `sections` static sections, each with a parameterized child.
fn wide_router(sections: usize) -> Router {
    let children = (0..sections).map(|i| {
        layout_route(&format!("section{i}")).children(vec![
            Route::index().element(|_| Ok(View::paragraph("index"))),
            Route::new(":itemId").element(|ctx| {
                Ok(View::paragraph(format!(
                    "item {}",
                    ctx.param("itemId").unwrap_or_default()
                )))
            }),
        ])
    });
    Router::new(vec![layout_route("/")
        .error_element(|_| Ok(View::heading("Not Found")))
        .children(children)])
    .unwrap()
}

/// Benchmark resolution by tree size.
fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for sections in [10usize, 100, 1000] {
        let router = wide_router(sections);
        let last = Location::parse(&format!("/section{}/42", sections - 1)).unwrap();
        let missing = Location::parse("/nowhere/at/all").unwrap();

        group.bench_with_input(BenchmarkId::new("matched", sections), &last, |b, loc| {
            b.iter(|| router.resolve(black_box(loc)))
        });
        group.bench_with_input(BenchmarkId::new("not_found", sections), &missing, |b, loc| {
            b.iter(|| router.resolve(black_box(loc)))
        });
    }

    group.finish();
}

/// Benchmark rendering a resolved chain.
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    let router = wide_router(10);
    let matched = Location::parse("/section3/7").unwrap();
    let matched_resolution = router.resolve(&matched);
    group.bench_function("nested", |b| {
        b.iter(|| router.render(black_box(&matched), black_box(&matched_resolution)))
    });

    let missing = Location::parse("/section3/7/extra").unwrap();
    let missing_resolution = router.resolve(&missing);
    group.bench_function("boundary", |b| {
        b.iter(|| router.render(black_box(&missing), black_box(&missing_resolution)))
    });

    group.finish();
}

/// Benchmark building the route table.
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for sections in [10usize, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(sections), &sections, |b, &n| {
            b.iter(|| wide_router(black_box(n)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resolve, bench_render, bench_build);
criterion_main!(benches);
