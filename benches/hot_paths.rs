use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::DVec2;
use map_sketch::map::geometry::{point_in_polygon, subdivide_polygon};
use map_sketch::map::{GeoCoord, Projection, ProjectionConfig, Shape, ViewState};
use ratatui::style::Color;

fn world_projection() -> Projection {
    Projection::from_config(&ProjectionConfig::Cylindrical {
        top_latitude: 82.0,
        bottom_latitude: -82.0,
        central_meridian: 0.0,
    })
}

/// A circular ring in map coordinates, subdivided the way committed
/// annotations are.
fn dense_ring() -> (Vec<f64>, Vec<f64>) {
    let n = 64;
    let mut xs = Vec::with_capacity(n + 1);
    let mut ys = Vec::with_capacity(n + 1);
    for i in 0..=n {
        let a = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
        xs.push(0.3 * a.cos());
        ys.push(0.3 * a.sin());
    }
    subdivide_polygon(&xs, &ys, 0.01)
}

fn bench_projection(c: &mut Criterion) {
    let proj = world_projection();
    let g = GeoCoord::from_degrees(18.0, 59.0);

    c.bench_function("projection_round_trip", |b| {
        b.iter(|| {
            let p = proj.forward(black_box(g));
            black_box(proj.inverse(p))
        })
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let mut view = ViewState::new(2.0, 400, 200);
    view.center = DVec2::new(0.2, -0.1);
    view.zoom = 3.0;
    let p = DVec2::new(123.0, 77.0);

    c.bench_function("pipeline_round_trip", |b| {
        b.iter(|| {
            let m = view.document_to_map(black_box(p));
            black_box(view.map_to_document(m))
        })
    });
}

fn bench_move_shape(c: &mut Criterion) {
    let proj = world_projection();
    let (xs, ys) = dense_ring();
    let shape = Shape::new(xs, ys, Color::Green);
    let mut working = shape.clone();
    let anchor = GeoCoord::new(0.0, 0.0);
    let current = GeoCoord::new(0.4, 0.3);

    c.bench_function("move_dense_ring", |b| {
        b.iter(|| {
            shape.move_and_assign(
                black_box(&mut working),
                &proj,
                black_box(anchor),
                black_box(current),
            )
        })
    });
}

fn bench_hit_test(c: &mut Criterion) {
    let (xs, ys) = dense_ring();

    c.bench_function("point_in_polygon_dense", |b| {
        b.iter(|| point_in_polygon(black_box(0.05), black_box(-0.02), &xs, &ys))
    });
}

fn bench_subdivide(c: &mut Criterion) {
    let n = 16;
    let mut xs = Vec::with_capacity(n + 1);
    let mut ys = Vec::with_capacity(n + 1);
    for i in 0..=n {
        let a = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
        xs.push(0.5 * a.cos());
        ys.push(0.5 * a.sin());
    }

    c.bench_function("subdivide_polygon", |b| {
        b.iter(|| subdivide_polygon(black_box(&xs), black_box(&ys), 0.01))
    });
}

criterion_group!(
    benches,
    bench_projection,
    bench_pipeline,
    bench_move_shape,
    bench_hit_test,
    bench_subdivide
);
criterion_main!(benches);
