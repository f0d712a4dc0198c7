use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qshard_gates::{gate_matrix, matrices, GateOperation};
use std::f64::consts::PI;

fn benchmark_rotations(c: &mut Criterion) {
    let mut group = c.benchmark_group("rotation_matrices");

    for angle in [0.01, PI / 4.0, PI] {
        group.bench_with_input(
            BenchmarkId::new("RX", format!("{:.4}", angle)),
            &angle,
            |b, &angle| b.iter(|| black_box(matrices::rotation_x(angle))),
        );
        group.bench_with_input(
            BenchmarkId::new("Rot", format!("{:.4}", angle)),
            &angle,
            |b, &angle| b.iter(|| black_box(matrices::rot(angle, angle, angle))),
        );
    }

    group.finish();
}

fn benchmark_gate_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate_matrix");

    for op in [GateOperation::Hadamard, GateOperation::CRY, GateOperation::Toffoli] {
        let wires = qshard_gates::GateRegistry::info(op).num_wires.unwrap_or(1);
        let params = vec![0.5; qshard_gates::GateRegistry::info(op).num_params];
        group.bench_function(op.name(), |b| {
            b.iter(|| black_box(gate_matrix(op, &params, wires).unwrap()))
        });
    }

    for n in [2usize, 6, 10] {
        group.bench_with_input(BenchmarkId::new("MultiRZ", n), &n, |b, &n| {
            b.iter(|| black_box(matrices::multi_rz_diagonal(0.3, n)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_rotations, benchmark_gate_matrix);
criterion_main!(benches);
