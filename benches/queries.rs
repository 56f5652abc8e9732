use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use nearthree::{BoundingBox, BspTree, random_points};

fn benchmark_queries(c: &mut Criterion) {
    let bounds = BoundingBox::new([0.0, 0.0, 0.0], [100.0, 100.0, 100.0]);
    let points = random_points(10_000, &bounds);
    let queries = random_points(256, &bounds);
    let query = |i: usize| {
        [
            queries[i * 3],
            queries[i * 3 + 1],
            queries[i * 3 + 2],
        ]
    };

    let mut tree = BspTree::new();
    tree.build(points.as_slice(), 8, 24);

    let mut group = c.benchmark_group("queries");

    group.bench_function("nearest", |b| {
        let mut i = 0;
        b.iter(|| {
            let q = query(i);
            i = (i + 1) % 256;
            tree.nearest(points.as_slice(), q).unwrap()
        })
    });

    group.bench_function("k_nearest_16", |b| {
        let mut i = 0;
        b.iter(|| {
            let q = query(i);
            i = (i + 1) % 256;
            tree.k_nearest(q, 16).unwrap()
        })
    });

    group.bench_function("ball_r5", |b| {
        let mut i = 0;
        b.iter(|| {
            let q = query(i);
            i = (i + 1) % 256;
            tree.ball(q, 5.0).unwrap()
        })
    });

    // the baseline every query has to beat
    group.bench_function("nearest_linear_scan", |b| {
        let mut i = 0;
        b.iter(|| {
            let q = query(i);
            i = (i + 1) % 256;
            let mut best = f64::INFINITY;
            let mut best_index = 0;
            for j in 0..points.len() / 3 {
                let dx = points[j * 3] - q[0];
                let dy = points[j * 3 + 1] - q[1];
                let dz = points[j * 3 + 2] - q[2];
                let d = dx * dx + dy * dy + dz * dz;
                if d < best {
                    best = d;
                    best_index = j;
                }
            }
            best_index
        })
    });

    group.finish();
}

fn benchmark_build(c: &mut Criterion) {
    let bounds = BoundingBox::new([0.0, 0.0, 0.0], [100.0, 100.0, 100.0]);

    let mut group = c.benchmark_group("build");
    group.sample_size(10);
    for &size in &[1_000usize, 10_000, 100_000] {
        let points = random_points(size, &bounds);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            let mut tree = BspTree::new();
            b.iter(|| tree.build(points.as_slice(), 8, 32))
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_queries, benchmark_build);
criterion_main!(benches);
