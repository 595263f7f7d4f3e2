use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::{DMatrix, DVector};
use wavefront_accumulator::{
    accumulator::AccumulatedState,
    frame::Frame,
    grid::{AxisDef, Grid},
    interpolation::{resample, EdgePolicy},
};

fn gaussian_frame(n: usize, width: f64) -> Frame {
    let axis = DVector::from_fn(n, |i, _| -1.0 + 2.0 * i as f64 / (n - 1) as f64);
    let intensity = DMatrix::from_fn(n, n, |row, col| {
        f64::exp(-(axis[col] * axis[col] + axis[row] * axis[row]) / (width * width))
    });
    Frame::new(intensity, axis.clone(), axis).unwrap()
}

fn criterion_resample(c: &mut Criterion) {
    let frame = gaussian_frame(200, 0.3);
    let grid = Grid::new(
        AxisDef::new(-1.2, 1.2, 256).unwrap(),
        AxisDef::new(-1.2, 1.2, 256).unwrap(),
    );
    c.bench_function("resample", |b| {
        b.iter(|| resample(&frame, &grid, EdgePolicy::Extrapolate))
    });
}

fn criterion_accumulate(c: &mut Criterion) {
    let frame = gaussian_frame(256, 0.3);
    let mut state = AccumulatedState::default();
    c.bench_function("accumulate", |b| b.iter(|| state.accumulate(&frame)));
}

criterion_group!(benches, criterion_resample, criterion_accumulate);
criterion_main!(benches);
