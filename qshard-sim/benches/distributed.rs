//! Benchmark cross-rank routing and reductions

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qshard_comm::LocalCluster;
use qshard_sim::{DistributedStateVector, Measurements, SimulatorConfig};

fn layer(state: &mut DistributedStateVector) {
    let n = state.num_qubits();
    for q in 0..n {
        state.apply_operation("Hadamard", &[q], false, &[]).unwrap();
    }
    for q in 0..n - 1 {
        state.apply_operation("CNOT", &[q, q + 1], false, &[]).unwrap();
    }
}

fn bench_layers(c: &mut Criterion) {
    let mut group = c.benchmark_group("hadamard_cnot_layer");
    let num_qubits = 14;
    let config = SimulatorConfig::default();

    for ranks in [1usize, 2, 4] {
        group.bench_with_input(BenchmarkId::new("ranks", ranks), &ranks, |b, &ranks| {
            b.iter(|| {
                LocalCluster::run(ranks, |comm| {
                    let mut state = DistributedStateVector::new(num_qubits, comm, &config).unwrap();
                    layer(&mut state);
                    black_box(state.norm().unwrap())
                })
                .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_expval(c: &mut Criterion) {
    let mut group = c.benchmark_group("expval_pauli_z");
    let num_qubits = 14;
    let config = SimulatorConfig::default();

    for ranks in [1usize, 4] {
        group.bench_with_input(BenchmarkId::new("ranks", ranks), &ranks, |b, &ranks| {
            b.iter(|| {
                LocalCluster::run(ranks, |comm| {
                    let mut state = DistributedStateVector::new(num_qubits, comm, &config).unwrap();
                    state.apply_operation("RY", &[0], false, &[0.3]).unwrap();
                    let m = Measurements::new(&mut state);
                    (0..num_qubits)
                        .map(|w| m.expval_named("PauliZ", &[w], &[]).unwrap())
                        .sum::<f64>()
                })
                .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_layers, bench_expval);
criterion_main!(benches);
