use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nutrichoice::knn::SearchIndex;

fn build_index(n: usize) -> SearchIndex {
    let points: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let x = i as f64;
            vec![x.sin(), (x * 0.7).cos(), (x * 1.3).sin(), (x * 2.1).cos()]
        })
        .collect();
    SearchIndex::build((0..n).collect(), points)
}

fn bench_knn_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("knn_query");
    for n in [100, 1000, 5000] {
        let index = build_index(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &index, |b, index| {
            b.iter(|| index.query(black_box(&[0.1, -0.4, 0.7, 0.2]), 5).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_knn_query);
criterion_main!(benches);
