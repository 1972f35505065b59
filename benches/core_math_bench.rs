use chart_plots::core::{
    Accessor, DEFAULT_TENSION, Dataset, ExtentFilter, Interpolation, InterpolationMode,
    LinearScale, Point, build_line_path, compute_stack_extent, compute_stack_offsets,
    edge_intersections, field,
};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_stack_offsets_10k(c: &mut Criterion) {
    let datasets: Vec<Dataset<(u32, f64)>> = (0..10)
        .map(|d| {
            Dataset::new(
                (0..1_000)
                    .map(|k| {
                        let value = if (k + d) % 3 == 0 { -1.5 } else { 2.0 };
                        (k, value)
                    })
                    .collect(),
            )
        })
        .collect();
    let key: Accessor<(u32, f64)> = field(|r: &(u32, f64)| r.0);
    let value: Accessor<(u32, f64)> = field(|r: &(u32, f64)| r.1);
    let filter = ExtentFilter::all();

    c.bench_function("stack_offsets_and_extent_10k", |b| {
        b.iter(|| {
            let offsets = compute_stack_offsets(black_box(&datasets), &key, &value);
            let _ = compute_stack_extent(&offsets, &datasets, &filter);
        })
    });
}

fn bench_line_paths_10k(c: &mut Criterion) {
    let vertices: Vec<Option<Point>> = (0..10_000)
        .map(|i| {
            let x = i as f64;
            (i % 997 != 0).then(|| Point::new(x, (x * 0.01).sin() * 100.0))
        })
        .collect();

    for mode in [
        InterpolationMode::Linear,
        InterpolationMode::Cardinal,
        InterpolationMode::Monotone,
    ] {
        let interpolation = Interpolation::Mode(mode);
        c.bench_function(&format!("line_path_{}_10k", mode.name()), |b| {
            b.iter(|| {
                let _ = build_line_path(
                    black_box(vertices.iter().copied()),
                    &interpolation,
                    DEFAULT_TENSION,
                );
            })
        });
    }
}

fn bench_edge_intersections(c: &mut Criterion) {
    let x = LinearScale::with_range(100.0, 9_900.0, 0.0, 1_920.0).expect("x scale");
    let y = LinearScale::with_range(-100.0, 100.0, 1_080.0, 0.0).expect("y scale");
    let lines: Vec<Vec<Point>> = (0..20)
        .map(|line| {
            (0..10_000)
                .map(|i| {
                    let t = i as f64;
                    Point::new(t * 0.196 - 20.0, 540.0 + ((t + line as f64) * 0.02).cos() * 400.0)
                })
                .collect()
        })
        .collect();

    c.bench_function("edge_intersections_20x10k", |b| {
        b.iter(|| {
            let _ = edge_intersections(black_box(lines.iter().map(Vec::as_slice)), &x, &y);
        })
    });
}

criterion_group!(
    benches,
    bench_stack_offsets_10k,
    bench_line_paths_10k,
    bench_edge_intersections
);
criterion_main!(benches);
