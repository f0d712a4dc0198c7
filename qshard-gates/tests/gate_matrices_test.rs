//! Tests for gate matrices and generators against their defining relations

use approx::assert_relative_eq;
use num_complex::Complex64;
use qshard_gates::matrices;
use qshard_gates::{gate_matrix, generator_spec, GateOperation, GeneratorAction, GeneratorOperation};
use std::f64::consts::PI;

const EPSILON: f64 = 1e-10;

fn mat_vec(m: &[Complex64], v: &[Complex64]) -> Vec<Complex64> {
    let dim = v.len();
    (0..dim)
        .map(|i| (0..dim).map(|k| m[i * dim + k] * v[k]).sum())
        .collect()
}

fn basis(dim: usize, k: usize) -> Vec<Complex64> {
    let mut v = vec![Complex64::new(0.0, 0.0); dim];
    v[k] = Complex64::new(1.0, 0.0);
    v
}

#[test]
fn test_rx_pi_is_x_up_to_phase() {
    let rx = gate_matrix(GateOperation::RX, &[PI], 1).unwrap().to_dense();
    // RX(π) = -iX
    assert_relative_eq!(rx[1].im, -1.0, epsilon = EPSILON);
    assert_relative_eq!(rx[2].im, -1.0, epsilon = EPSILON);
    assert_relative_eq!(rx[0].norm(), 0.0, epsilon = EPSILON);
}

#[test]
fn test_hadamard_creates_superposition() {
    let h = gate_matrix(GateOperation::Hadamard, &[], 1).unwrap().to_dense();
    let out = mat_vec(&h, &basis(2, 0));
    assert_relative_eq!(out[0].re, 1.0 / 2f64.sqrt(), epsilon = EPSILON);
    assert_relative_eq!(out[1].re, 1.0 / 2f64.sqrt(), epsilon = EPSILON);
}

#[test]
fn test_cswap_swaps_targets_when_control_set() {
    let cswap = gate_matrix(GateOperation::CSWAP, &[], 3).unwrap().to_dense();
    // |101⟩ -> |110⟩
    let out = mat_vec(&cswap, &basis(8, 0b101));
    assert_relative_eq!(out[0b110].re, 1.0, epsilon = EPSILON);
    // |001⟩ unchanged
    let out = mat_vec(&cswap, &basis(8, 0b001));
    assert_relative_eq!(out[0b001].re, 1.0, epsilon = EPSILON);
}

#[test]
fn test_crot_is_controlled_rot() {
    let params = [0.3, 0.9, -1.2];
    let crot = gate_matrix(GateOperation::CRot, &params, 2).unwrap().to_dense();
    let rot = matrices::rot(params[0], params[1], params[2]);
    for r in 0..2 {
        for c in 0..2 {
            let a = crot[(2 + r) * 4 + 2 + c];
            let b = rot[r * 2 + c];
            assert_relative_eq!(a.re, b.re, epsilon = EPSILON);
            assert_relative_eq!(a.im, b.im, epsilon = EPSILON);
        }
    }
    assert_relative_eq!(crot[0].re, 1.0, epsilon = EPSILON);
    assert_relative_eq!(crot[5].re, 1.0, epsilon = EPSILON);
}

#[test]
fn test_adjoint_inverts_rotation() {
    let m = gate_matrix(GateOperation::IsingYY, &[0.77], 2).unwrap();
    let inv = gate_matrix(GateOperation::IsingYY, &[-0.77], 2).unwrap();
    for (a, b) in m.adjoint().to_dense().iter().zip(inv.to_dense().iter()) {
        assert_relative_eq!(a.re, b.re, epsilon = EPSILON);
        assert_relative_eq!(a.im, b.im, epsilon = EPSILON);
    }
}

#[test]
fn test_generators_reproduce_derivative() {
    // d/dθ RZ(θ) at θ = 0 equals i·c·G with c = -0.5, G = Z
    let spec = generator_spec(GeneratorOperation::RZ, 1).unwrap();
    let h = 1e-6;
    let plus = gate_matrix(GateOperation::RZ, &[h], 1).unwrap().to_dense();
    let minus = gate_matrix(GateOperation::RZ, &[-h], 1).unwrap().to_dense();
    let derivative: Vec<Complex64> = plus
        .iter()
        .zip(minus.iter())
        .map(|(p, m)| (p - m) / (2.0 * h))
        .collect();

    let pauli = match spec.action {
        GeneratorAction::Paulis(ref p) => p[0].matrix(),
        GeneratorAction::ProjectOne => panic!("RZ generator is a Pauli"),
    };
    for (d, g) in derivative.iter().zip(pauli.iter()) {
        let expected = Complex64::new(0.0, spec.coefficient) * g;
        assert_relative_eq!(d.re, expected.re, epsilon = 1e-6);
        assert_relative_eq!(d.im, expected.im, epsilon = 1e-6);
    }
}
