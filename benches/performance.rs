use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use fracture_agg::function::AggregateFunction;
use fracture_core::schema::DataType;
use fracture_core::types::Scalar;
use fracture_exchange::{FinalAggregator, PartialAggregator};

fn make_rows(n: usize) -> Vec<(Scalar, Scalar)> {
    (0..n)
        .map(|i| (Scalar::I64((i % 16) as i64), Scalar::I64((i * 7 % 1024) as i64)))
        .collect()
}

fn bench_variant(c: &mut Criterion, name: &str, function: AggregateFunction) {
    let function = Arc::new(function);
    let rows = make_rows(4096);

    c.bench_function(&format!("{name}_partial_to_final"), |b| {
        b.iter(|| {
            let mut partial = PartialAggregator::new(Arc::clone(&function));
            for (group, value) in &rows {
                partial.push(group.clone(), value).unwrap();
            }
            let wire = partial.into_wire().unwrap();

            let mut merger = FinalAggregator::new(Arc::clone(&function));
            merger.merge_batch(&wire).unwrap();
            merger.finish().unwrap()
        })
    });
}

fn bench_max_paths(c: &mut Criterion) {
    bench_variant(c, "max_boxed", AggregateFunction::max(DataType::Int64).unwrap());
    bench_variant(
        c,
        "max_native_wire",
        AggregateFunction::max_alternative(DataType::Int64).unwrap(),
    );
}

criterion_group!(benches, bench_max_paths);
criterion_main!(benches);
