#![allow(clippy::expect_used, clippy::unwrap_used, missing_docs)]
//! Benchmark for composing and rendering map figures.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fmap::prelude::*;

fn field(step: f32) -> Field {
    let nx = (9.0 / step) as usize;
    let ny = (6.0 / step) as usize;
    let lons: Vec<f32> = (0..=nx).map(|i| -112.0 + i as f32 * step).collect();
    let lats: Vec<f32> = (0..=ny).map(|j| 40.0 + j as f32 * step).collect();
    Field::from_fn(lons, lats, |lon, lat| ((lon * 0.7).sin() * (lat * 0.9).cos() + 1.0) / 2.0)
        .expect("field creation should succeed")
}

fn padding() -> Padding {
    Padding::new(0.05, 0.9, 0.9, 0.1, 0.1, 0.2).expect("padding should be valid")
}

fn contour_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("contour");

    for step in [0.25, 0.1, 0.05] {
        let f = field(step);
        let id = BenchmarkId::from_parameter(format!("{}x{}", f.nx(), f.ny()));
        group.bench_with_input(id, &f, |b, f| {
            b.iter(|| {
                ContourSet::from_field(black_box(f), &Levels::default(), LineStyle::default())
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn compose_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose_render");
    group.sample_size(20);
    let f = field(0.1);

    for (rows, cols) in [(1, 1), (2, 2), (3, 4)] {
        let id = BenchmarkId::from_parameter(format!("{rows}x{cols}"));
        group.bench_with_input(id, &(rows, cols), |b, &(rows, cols)| {
            b.iter(|| {
                let mut composed = make_plots(
                    rows,
                    cols,
                    &padding(),
                    LabelStyle::outer(),
                    RotationSpec::NONE,
                    &PlotOptions::default(),
                    |_, axes| axes.contourf(&f, &Levels::default(), &FillStyle::default()),
                )
                .unwrap();
                let mappable = composed.artifact(0, 0).unwrap().clone();
                let spec = ColorbarSpec::default();
                make_colorbar(&mut composed.figure, ColorbarAnchor::Figure, &mappable, &spec)
                    .unwrap();
                black_box(composed.figure.render_svg().unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, contour_benchmark, compose_benchmark);
criterion_main!(benches);
