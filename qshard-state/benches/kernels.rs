use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qshard_state::{KernelType, StateVector};

fn benchmark_single_qubit(c: &mut Criterion) {
    let mut group = c.benchmark_group("hadamard");

    for n in [10usize, 14, 18] {
        for &kernel in KernelType::ALL {
            let mut state = StateVector::new(n).unwrap();
            group.bench_with_input(BenchmarkId::new(kernel.name(), n), &n, |b, &n| {
                b.iter(|| {
                    state
                        .apply_operation_with_kernel(kernel, "Hadamard", &[n / 2], false, &[])
                        .unwrap();
                    black_box(state.data()[0])
                })
            });
        }
    }

    group.finish();
}

fn benchmark_multi_qubit(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_qubit");

    for n in [12usize, 16] {
        for &kernel in &[KernelType::Scalar, KernelType::Parallel] {
            let mut state = StateVector::new(n).unwrap();
            group.bench_with_input(BenchmarkId::new(kernel.name(), n), &n, |b, _| {
                b.iter(|| {
                    state
                        .apply_operation_with_kernel(kernel, "CSWAP", &[0, 3, 7], false, &[])
                        .unwrap();
                    black_box(state.data()[0])
                })
            });
        }
    }

    group.finish();
}

fn benchmark_probs(c: &mut Criterion) {
    let mut state = StateVector::new(16).unwrap();
    for w in 0..16 {
        state.apply_operation("RY", &[w], false, &[0.1 * w as f64]).unwrap();
    }
    c.bench_function("probs_wire_8", |b| b.iter(|| black_box(state.probs(8).unwrap())));
}

criterion_group!(benches, benchmark_single_qubit, benchmark_multi_qubit, benchmark_probs);
criterion_main!(benches);
