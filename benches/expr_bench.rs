use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dense_expr::{eglue, glue, strans, strans2, unique, Mat, Operand, PreferAt};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

fn make_random(n: usize, seed: u64) -> Mat<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Mat::from_fn(n, n, |_, _| rng.sample(StandardNormal))
}

fn bench_elementwise(c: &mut Criterion) {
    let mut group = c.benchmark_group("eglue_plus");
    for size in [16usize, 256, 1000] {
        group.throughput(Throughput::Elements((size * size) as u64));
        let a = make_random(size, 1);
        let b = make_random(size, 2);
        let mut out = Mat::zeros(size, size);

        group.bench_with_input(BenchmarkId::new("flat", size), &size, |bench, _| {
            let x = glue::plus(&a, &b).unwrap();
            bench.iter(|| eglue::apply(&mut out, &x));
        });

        group.bench_with_input(BenchmarkId::new("coordinate", size), &size, |bench, _| {
            let x = glue::plus(PreferAt(&a), &b).unwrap();
            bench.iter(|| eglue::apply(&mut out, &x));
        });

        group.bench_with_input(BenchmarkId::new("inplace_schur", size), &size, |bench, _| {
            let x = glue::minus(&a, &b).unwrap();
            bench.iter(|| eglue::apply_inplace_schur(&mut out, &x).unwrap());
        });
    }
    group.finish();
}

fn bench_transpose(c: &mut Criterion) {
    let mut group = c.benchmark_group("strans");
    for size in [4usize, 100, 500, 1000] {
        group.throughput(Throughput::Elements((size * size) as u64));
        let a = make_random(size, 3);

        group.bench_with_input(BenchmarkId::new("noalias", size), &size, |bench, _| {
            let mut out = Mat::new();
            bench.iter(|| strans::apply_noalias(&mut out, &a));
        });

        group.bench_with_input(BenchmarkId::new("inplace", size), &size, |bench, _| {
            let mut out = a.clone();
            bench.iter(|| strans::apply(&mut out, Operand::Output));
        });

        group.bench_with_input(BenchmarkId::new("scaled", size), &size, |bench, _| {
            let mut out = Mat::new();
            bench.iter(|| strans2::apply_noalias(&mut out, &a, 2.0));
        });
    }
    group.finish();
}

fn bench_unique(c: &mut Criterion) {
    let mut group = c.benchmark_group("unique");
    for size in [32usize, 256] {
        group.throughput(Throughput::Elements((size * size) as u64));
        let mut rng = StdRng::seed_from_u64(4);
        let a = Mat::from_fn(size, size, |_, _| rng.gen_range(0..1000) as f64);

        group.bench_with_input(BenchmarkId::new("f64", size), &size, |bench, _| {
            let mut out = Mat::new();
            bench.iter(|| unique::apply(&mut out, &a).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_elementwise, bench_transpose, bench_unique);
criterion_main!(benches);
