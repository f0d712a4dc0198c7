//! Properties of the local shard engine across kernel families

use approx::assert_relative_eq;
use num_complex::Complex64;
use qshard_gates::{ControlledGateOperation, GateOperation, GateRegistry};
use qshard_state::{KernelConfig, KernelType, StateVector, Threading};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const N: usize = 5;

fn random_state(seed: u64) -> StateVector {
    let mut rng = StdRng::seed_from_u64(seed);
    let amps: Vec<Complex64> = (0..1 << N)
        .map(|_| Complex64::new(rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5))
        .collect();
    let mut state = StateVector::from_amplitudes(N, &amps).unwrap();
    state.normalize();
    state
}

fn assert_states_close(a: &StateVector, b: &StateVector) {
    for (x, y) in a.data().iter().zip(b.data()) {
        assert_relative_eq!(x.re, y.re, epsilon = 1e-10);
        assert_relative_eq!(x.im, y.im, epsilon = 1e-10);
    }
}

fn wires_for(op: GateOperation, rng: &mut StdRng) -> Vec<usize> {
    let k = GateRegistry::info(op).num_wires.unwrap_or(3);
    let mut wires: Vec<usize> = (0..N).collect();
    for i in 0..k {
        let j = rng.gen_range(i..N);
        wires.swap(i, j);
    }
    wires.truncate(k);
    wires
}

#[test]
fn test_every_gate_inverts_on_every_kernel() {
    let mut rng = StdRng::seed_from_u64(11);
    let original = random_state(1);

    for &kernel in KernelType::ALL {
        for &op in kernel.implemented_gates() {
            let wires = wires_for(op, &mut rng);
            let params: Vec<f64> = (0..GateRegistry::info(op).num_params)
                .map(|_| rng.gen_range(-3.0..3.0))
                .collect();

            let mut state = original.clone();
            state
                .apply_operation_with_kernel(kernel, op.name(), &wires, false, &params)
                .unwrap();
            assert_relative_eq!(state.norm(), 1.0, epsilon = 1e-10);
            state
                .apply_operation_with_kernel(kernel, op.name(), &wires, true, &params)
                .unwrap();
            assert_states_close(&state, &original);
        }
    }
}

#[test]
fn test_controlled_gates_invert() {
    let original = random_state(2);
    for &op in ControlledGateOperation::ALL {
        let info = GateRegistry::info(op.base());
        let k = info.num_wires.unwrap_or(2);
        let wires: Vec<usize> = (N - k..N).collect();
        let params = vec![0.61; info.num_params];

        let mut state = original.clone();
        state
            .apply_controlled_operation(op.name(), &[0, 1], &[true, false], &wires, false, &params)
            .unwrap();
        state
            .apply_controlled_operation(op.name(), &[0, 1], &[true, false], &wires, true, &params)
            .unwrap();
        assert_states_close(&state, &original);
    }
}

#[test]
fn test_matrix_paths_match_named_gates() {
    let original = random_state(3);
    for (op, wires) in [
        (GateOperation::RY, vec![2]),
        (GateOperation::CRX, vec![4, 1]),
        (GateOperation::CSWAP, vec![3, 0, 2]),
    ] {
        let params = vec![0.37; GateRegistry::info(op).num_params];
        let matrix = qshard_gates::gate_matrix(op, &params, wires.len())
            .unwrap()
            .to_dense();

        let mut named = original.clone();
        named.apply_operation(op.name(), &wires, false, &params).unwrap();
        let mut raw = original.clone();
        raw.apply_matrix(&matrix, &wires, false).unwrap();
        assert_states_close(&named, &raw);
    }
}

#[test]
fn test_parallel_and_sequential_shards_agree() {
    let parallel = KernelConfig::default()
        .with_threading(Threading::MultiThread)
        .with_parallel_threshold(1);
    let mut a = StateVector::with_config(N, parallel).unwrap();
    let mut b = StateVector::with_config(N, KernelConfig::single_threaded()).unwrap();

    for s in [&mut a, &mut b] {
        for w in 0..N {
            s.apply_operation("Hadamard", &[w], false, &[]).unwrap();
        }
        s.apply_operation("Toffoli", &[4, 0, 2], false, &[]).unwrap();
        s.apply_operation("IsingYY", &[1, 3], false, &[1.1]).unwrap();
        s.apply_controlled_operation("Rot", &[2], &[false], &[0], false, &[0.1, 0.2, 0.3])
            .unwrap();
        s.apply_generator("MultiRZ", &[0, 1, 2], false).unwrap();
    }
    assert_states_close(&a, &b);
}
