#[macro_use]
extern crate criterion;
extern crate mandelbrot;
extern crate num;

use criterion::{black_box, Criterion};
use mandelbrot::pool::compute;
use mandelbrot::{escape_depth, generate_work, Bounds, IntegralPlane, Viewport};
use num::Complex;

fn depth_benchmark(c: &mut Criterion) {
    // Just outside the main cardioid, so the bulb check does not apply.
    c.bench_function("escape depth near the boundary", |b| {
        b.iter(|| escape_depth(black_box(Complex::new(-0.75, 0.1)), 1024))
    });
    c.bench_function("escape depth inside the cardioid", |b| {
        b.iter(|| escape_depth(black_box(Complex::new(-0.1, 0.1)), 1024))
    });
}

fn batch_benchmark(c: &mut Criterion) {
    let viewport = Viewport::new(
        IntegralPlane(64, 64),
        Bounds {
            x_min: -2.0,
            x_max: 1.0,
            y_min: -1.5,
            y_max: 1.5,
        },
        256,
    );
    c.bench_function("compute a 64x64 screen in batches of 20", move |b| {
        b.iter(|| {
            generate_work(viewport.screen.pixels(), viewport, 20, 1)
                .map(compute)
                .count()
        })
    });
}

criterion_group!(benches, depth_benchmark, batch_benchmark);
criterion_main!(benches);
