//! Gate matrices in row-major order
//!
//! All matrices use the convention that the first wire of a gate is the
//! most significant bit of the row/column index, so `CNOT` on wires `[c, t]`
//! flips `t` when `c` is set. Constant matrices are computed at compile time;
//! parametric gates are built on demand by [`gate_matrix`].

use crate::error::Result;
use crate::operations::GateOperation;
use crate::registry::GateRegistry;
use num_complex::Complex64;

// Compile-time constant helpers
const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);
const NEG_I: Complex64 = Complex64::new(0.0, -1.0);
const NEG_ONE: Complex64 = Complex64::new(-1.0, 0.0);

const INV_SQRT2: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Hadamard gate
/// H = 1/√2 * [[1,  1],
///             [1, -1]]
pub const HADAMARD: [Complex64; 4] = [
    Complex64::new(INV_SQRT2, 0.0),
    Complex64::new(INV_SQRT2, 0.0),
    Complex64::new(INV_SQRT2, 0.0),
    Complex64::new(-INV_SQRT2, 0.0),
];

/// Pauli-X gate
/// X = [[0, 1],
///      [1, 0]]
pub const PAULI_X: [Complex64; 4] = [ZERO, ONE, ONE, ZERO];

/// Pauli-Y gate
/// Y = [[0, -i],
///      [i,  0]]
pub const PAULI_Y: [Complex64; 4] = [ZERO, NEG_I, I, ZERO];

/// Pauli-Z gate
/// Z = [[1,  0],
///      [0, -1]]
pub const PAULI_Z: [Complex64; 4] = [ONE, ZERO, ZERO, NEG_ONE];

/// Identity gate
pub const IDENTITY: [Complex64; 4] = [ONE, ZERO, ZERO, ONE];

/// SX gate (√X)
/// SX = 1/2 * [[1+i, 1-i],
///             [1-i, 1+i]]
pub const SX_GATE: [Complex64; 4] = [
    Complex64::new(0.5, 0.5),
    Complex64::new(0.5, -0.5),
    Complex64::new(0.5, -0.5),
    Complex64::new(0.5, 0.5),
];

/// SWAP gate
pub const SWAP: [Complex64; 16] = [
    ONE, ZERO, ZERO, ZERO, //
    ZERO, ZERO, ONE, ZERO, //
    ZERO, ONE, ZERO, ZERO, //
    ZERO, ZERO, ZERO, ONE,
];

/// A gate matrix, either dense or diagonal
#[derive(Debug, Clone, PartialEq)]
pub enum GateMatrix {
    /// Full `2^n × 2^n` matrix, row-major
    Dense { num_wires: usize, data: Vec<Complex64> },
    /// Diagonal of a `2^n × 2^n` matrix
    Diagonal { num_wires: usize, data: Vec<Complex64> },
}

impl GateMatrix {
    /// Wrap a dense row-major matrix
    pub fn dense(num_wires: usize, data: Vec<Complex64>) -> Self {
        debug_assert_eq!(data.len(), 1 << (2 * num_wires));
        GateMatrix::Dense { num_wires, data }
    }

    /// Wrap a diagonal
    pub fn diagonal(num_wires: usize, data: Vec<Complex64>) -> Self {
        debug_assert_eq!(data.len(), 1 << num_wires);
        GateMatrix::Diagonal { num_wires, data }
    }

    /// Number of wires the matrix acts on
    pub fn num_wires(&self) -> usize {
        match self {
            GateMatrix::Dense { num_wires, .. } | GateMatrix::Diagonal { num_wires, .. } => {
                *num_wires
            }
        }
    }

    /// Row/column dimension (`2^num_wires`)
    pub fn dimension(&self) -> usize {
        1 << self.num_wires()
    }

    /// Whether the matrix is stored as a diagonal
    pub fn is_diagonal(&self) -> bool {
        matches!(self, GateMatrix::Diagonal { .. })
    }

    /// Conjugate transpose
    pub fn adjoint(&self) -> Self {
        match self {
            GateMatrix::Dense { num_wires, data } => GateMatrix::Dense {
                num_wires: *num_wires,
                data: adjoint_dense(data, 1 << num_wires),
            },
            GateMatrix::Diagonal { num_wires, data } => GateMatrix::Diagonal {
                num_wires: *num_wires,
                data: data.iter().map(|z| z.conj()).collect(),
            },
        }
    }

    /// Expand to a dense row-major matrix
    pub fn to_dense(&self) -> Vec<Complex64> {
        match self {
            GateMatrix::Dense { data, .. } => data.clone(),
            GateMatrix::Diagonal { num_wires, data } => {
                let dim = 1 << num_wires;
                let mut dense = vec![ZERO; dim * dim];
                for (i, &d) in data.iter().enumerate() {
                    dense[i * dim + i] = d;
                }
                dense
            }
        }
    }
}

/// Conjugate transpose of a square row-major matrix
pub fn adjoint_dense(matrix: &[Complex64], dim: usize) -> Vec<Complex64> {
    let mut out = vec![ZERO; dim * dim];
    for row in 0..dim {
        for col in 0..dim {
            out[col * dim + row] = matrix[row * dim + col].conj();
        }
    }
    out
}

/// Build the matrix of a gate controlled on `num_controls` leading wires
///
/// The result acts as identity unless every control bit is set, in which
/// case `base` is applied to the trailing wires.
pub fn controlled(base: &[Complex64], base_wires: usize, num_controls: usize) -> Vec<Complex64> {
    let base_dim = 1 << base_wires;
    let dim = base_dim << num_controls;
    let offset = dim - base_dim;
    let mut out = vec![ZERO; dim * dim];
    for i in 0..offset {
        out[i * dim + i] = ONE;
    }
    for row in 0..base_dim {
        for col in 0..base_dim {
            out[(offset + row) * dim + offset + col] = base[row * base_dim + col];
        }
    }
    out
}

#[inline]
fn expi(theta: f64) -> Complex64 {
    Complex64::new(theta.cos(), theta.sin())
}

/// RX(θ) = [[cos(θ/2),    -i·sin(θ/2)],
///          [-i·sin(θ/2),  cos(θ/2)]]
#[inline]
pub fn rotation_x(theta: f64) -> [Complex64; 4] {
    let (s, c) = (theta / 2.0).sin_cos();
    [
        Complex64::new(c, 0.0),
        Complex64::new(0.0, -s),
        Complex64::new(0.0, -s),
        Complex64::new(c, 0.0),
    ]
}

/// RY(θ) = [[cos(θ/2), -sin(θ/2)],
///          [sin(θ/2),  cos(θ/2)]]
#[inline]
pub fn rotation_y(theta: f64) -> [Complex64; 4] {
    let (s, c) = (theta / 2.0).sin_cos();
    [
        Complex64::new(c, 0.0),
        Complex64::new(-s, 0.0),
        Complex64::new(s, 0.0),
        Complex64::new(c, 0.0),
    ]
}

/// Diagonal of RZ(θ) = diag(e^(-iθ/2), e^(iθ/2))
#[inline]
pub fn rotation_z_diagonal(theta: f64) -> [Complex64; 2] {
    [expi(-theta / 2.0), expi(theta / 2.0)]
}

/// Diagonal of P(θ) = diag(1, e^(iθ))
#[inline]
pub fn phase_shift_diagonal(theta: f64) -> [Complex64; 2] {
    [ONE, expi(theta)]
}

/// Rot(φ, θ, ω) = RZ(ω)·RY(θ)·RZ(φ)
#[inline]
pub fn rot(phi: f64, theta: f64, omega: f64) -> [Complex64; 4] {
    let (s, c) = (theta / 2.0).sin_cos();
    [
        expi(-(phi + omega) / 2.0) * c,
        -expi((phi - omega) / 2.0) * s,
        expi(-(phi - omega) / 2.0) * s,
        expi((phi + omega) / 2.0) * c,
    ]
}

/// IsingXX(θ) = exp(-i θ/2 X⊗X)
#[inline]
pub fn ising_xx(theta: f64) -> [Complex64; 16] {
    let (s, c) = (theta / 2.0).sin_cos();
    let c = Complex64::new(c, 0.0);
    let s = Complex64::new(0.0, -s);
    [
        c, ZERO, ZERO, s, //
        ZERO, c, s, ZERO, //
        ZERO, s, c, ZERO, //
        s, ZERO, ZERO, c,
    ]
}

/// IsingYY(θ) = exp(-i θ/2 Y⊗Y)
#[inline]
pub fn ising_yy(theta: f64) -> [Complex64; 16] {
    let (s, c) = (theta / 2.0).sin_cos();
    let c = Complex64::new(c, 0.0);
    let s = Complex64::new(0.0, s);
    [
        c, ZERO, ZERO, s, //
        ZERO, c, -s, ZERO, //
        ZERO, -s, c, ZERO, //
        s, ZERO, ZERO, c,
    ]
}

/// Diagonal of exp(-i θ/2 Z⊗…⊗Z) on `num_wires` wires
pub fn multi_rz_diagonal(theta: f64, num_wires: usize) -> Vec<Complex64> {
    let even = expi(-theta / 2.0);
    let odd = expi(theta / 2.0);
    (0..1usize << num_wires)
        .map(|j| if j.count_ones() % 2 == 0 { even } else { odd })
        .collect()
}

/// Matrix of a named gate
///
/// `num_wires` only matters for variable-arity gates; for the others it is
/// validated against the registry.
///
/// # Example
/// ```
/// use qshard_gates::{gate_matrix, GateOperation};
///
/// let cnot = gate_matrix(GateOperation::CNOT, &[], 2).unwrap();
/// assert_eq!(cnot.num_wires(), 2);
/// assert!(!cnot.is_diagonal());
/// ```
pub fn gate_matrix(op: GateOperation, params: &[f64], num_wires: usize) -> Result<GateMatrix> {
    GateRegistry::info(op).validate(num_wires, params.len())?;

    let matrix = match op {
        GateOperation::Identity => GateMatrix::diagonal(1, vec![ONE, ONE]),
        GateOperation::PauliX => GateMatrix::dense(1, PAULI_X.to_vec()),
        GateOperation::PauliY => GateMatrix::dense(1, PAULI_Y.to_vec()),
        GateOperation::PauliZ => GateMatrix::diagonal(1, vec![ONE, NEG_ONE]),
        GateOperation::Hadamard => GateMatrix::dense(1, HADAMARD.to_vec()),
        GateOperation::S => GateMatrix::diagonal(1, vec![ONE, I]),
        GateOperation::T => GateMatrix::diagonal(1, vec![ONE, Complex64::new(INV_SQRT2, INV_SQRT2)]),
        GateOperation::SX => GateMatrix::dense(1, SX_GATE.to_vec()),
        GateOperation::RX => GateMatrix::dense(1, rotation_x(params[0]).to_vec()),
        GateOperation::RY => GateMatrix::dense(1, rotation_y(params[0]).to_vec()),
        GateOperation::RZ => GateMatrix::diagonal(1, rotation_z_diagonal(params[0]).to_vec()),
        GateOperation::PhaseShift => {
            GateMatrix::diagonal(1, phase_shift_diagonal(params[0]).to_vec())
        }
        GateOperation::Rot => GateMatrix::dense(1, rot(params[0], params[1], params[2]).to_vec()),
        GateOperation::CNOT => GateMatrix::dense(2, controlled(&PAULI_X, 1, 1)),
        GateOperation::CY => GateMatrix::dense(2, controlled(&PAULI_Y, 1, 1)),
        GateOperation::CZ => GateMatrix::diagonal(2, vec![ONE, ONE, ONE, NEG_ONE]),
        GateOperation::SWAP => GateMatrix::dense(2, SWAP.to_vec()),
        GateOperation::ControlledPhaseShift => {
            GateMatrix::diagonal(2, vec![ONE, ONE, ONE, expi(params[0])])
        }
        GateOperation::CRX => GateMatrix::dense(2, controlled(&rotation_x(params[0]), 1, 1)),
        GateOperation::CRY => GateMatrix::dense(2, controlled(&rotation_y(params[0]), 1, 1)),
        GateOperation::CRZ => {
            let [d0, d1] = rotation_z_diagonal(params[0]);
            GateMatrix::diagonal(2, vec![ONE, ONE, d0, d1])
        }
        GateOperation::CRot => GateMatrix::dense(
            2,
            controlled(&rot(params[0], params[1], params[2]), 1, 1),
        ),
        GateOperation::IsingXX => GateMatrix::dense(2, ising_xx(params[0]).to_vec()),
        GateOperation::IsingYY => GateMatrix::dense(2, ising_yy(params[0]).to_vec()),
        GateOperation::IsingZZ => GateMatrix::diagonal(2, multi_rz_diagonal(params[0], 2)),
        GateOperation::Toffoli => GateMatrix::dense(3, controlled(&PAULI_X, 1, 2)),
        GateOperation::CSWAP => GateMatrix::dense(3, controlled(&SWAP, 2, 1)),
        GateOperation::MultiRZ => {
            GateMatrix::diagonal(num_wires, multi_rz_diagonal(params[0], num_wires))
        }
    };

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn matmul(a: &[Complex64], b: &[Complex64], dim: usize) -> Vec<Complex64> {
        let mut out = vec![ZERO; dim * dim];
        for i in 0..dim {
            for j in 0..dim {
                for k in 0..dim {
                    out[i * dim + j] += a[i * dim + k] * b[k * dim + j];
                }
            }
        }
        out
    }

    fn assert_identity(m: &[Complex64], dim: usize) {
        for i in 0..dim {
            for j in 0..dim {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(m[i * dim + j].re, expected, epsilon = 1e-12);
                assert_relative_eq!(m[i * dim + j].im, 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_every_gate_is_unitary() {
        for &op in GateOperation::ALL {
            let info = GateRegistry::info(op);
            let wires = info.num_wires.unwrap_or(3);
            let params: Vec<f64> = (0..info.num_params).map(|k| 0.3 + k as f64).collect();
            let m = gate_matrix(op, &params, wires).unwrap();
            let dim = m.dimension();
            let dense = m.to_dense();
            let product = matmul(&m.adjoint().to_dense(), &dense, dim);
            assert_identity(&product, dim);
        }
    }

    #[test]
    fn test_cnot_layout() {
        let cnot = gate_matrix(GateOperation::CNOT, &[], 2).unwrap().to_dense();
        // |10⟩ -> |11⟩
        assert_eq!(cnot[3 * 4 + 2], ONE);
        assert_eq!(cnot[2 * 4 + 3], ONE);
        assert_eq!(cnot[0], ONE);
        assert_eq!(cnot[5], ONE);
    }

    #[test]
    fn test_toffoli_flips_only_111() {
        let toffoli = gate_matrix(GateOperation::Toffoli, &[], 3).unwrap().to_dense();
        assert_eq!(toffoli[6 * 8 + 7], ONE);
        assert_eq!(toffoli[7 * 8 + 6], ONE);
        for i in 0..6 {
            assert_eq!(toffoli[i * 8 + i], ONE);
        }
    }

    #[test]
    fn test_rot_matches_composition() {
        let (phi, theta, omega) = (0.2, 1.1, -0.7);
        let rz = |a: f64| {
            let [d0, d1] = rotation_z_diagonal(a);
            vec![d0, ZERO, ZERO, d1]
        };
        let composed = matmul(&rz(omega), &matmul(&rotation_y(theta), &rz(phi), 2), 2);
        let direct = rot(phi, theta, omega);
        for (a, b) in composed.iter().zip(direct.iter()) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-12);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_multi_rz_parity() {
        let d = multi_rz_diagonal(PI, 3);
        // exp(-iπ/2) = -i on even parity, +i on odd parity
        assert_relative_eq!(d[0].im, -1.0, epsilon = 1e-12);
        assert_relative_eq!(d[1].im, 1.0, epsilon = 1e-12);
        assert_relative_eq!(d[3].im, -1.0, epsilon = 1e-12);
        assert_relative_eq!(d[7].im, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ising_zz_matches_multi_rz() {
        let zz = gate_matrix(GateOperation::IsingZZ, &[0.4], 2).unwrap();
        let mrz = gate_matrix(GateOperation::MultiRZ, &[0.4], 2).unwrap();
        assert_eq!(zz.to_dense(), mrz.to_dense());
    }

    #[test]
    fn test_parameter_validation() {
        assert!(gate_matrix(GateOperation::RX, &[], 1).is_err());
        assert!(gate_matrix(GateOperation::CNOT, &[], 3).is_err());
    }
}
