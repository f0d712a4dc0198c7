//! Observables that can be applied to a distributed state
//!
//! An [`Observable`] is built once, validated at construction, and applied
//! in place as many times as needed. Composite variants hold their factors
//! behind [`Arc`] so terms can be shared between observables.

use crate::error::{Result, SimError};
use crate::sparse::apply_sparse_hamiltonian;
use crate::state::DistributedStateVector;
use num_complex::Complex64;
use qshard_gates::GateRegistry;
use qshard_state::CsrMatrix;
use std::sync::Arc;

/// A Hermitian operator acting on some wires of a state
#[derive(Debug, Clone, PartialEq)]
pub enum Observable {
    /// A registered gate used as an observable, e.g. `PauliZ`
    Named {
        name: String,
        wires: Vec<usize>,
        params: Vec<f64>,
    },
    /// Explicit row-major matrix on `wires`
    Hermitian {
        matrix: Vec<Complex64>,
        wires: Vec<usize>,
    },
    /// Factors on disjoint wires, applied in order
    TensorProduct(Vec<Arc<Observable>>),
    /// `Σ coefficients[i] · terms[i]`
    Hamiltonian {
        coefficients: Vec<f64>,
        terms: Vec<Arc<Observable>>,
    },
    /// Full-register operator in CSR form
    ///
    /// Only rank 0's matrix is read; it partitions and distributes it. Other
    /// ranks may hold an empty `0 × 0` placeholder.
    SparseHamiltonian {
        matrix: Arc<CsrMatrix>,
        wires: Vec<usize>,
    },
}

fn check_distinct(wires: &[usize]) -> Result<()> {
    for (i, w) in wires.iter().enumerate() {
        if wires[..i].contains(w) {
            return Err(SimError::Validation(format!(
                "wire {w} appears more than once"
            )));
        }
    }
    Ok(())
}

impl Observable {
    /// Gate observable; wire and parameter counts must match the gate
    pub fn named(name: &str, wires: Vec<usize>, params: Vec<f64>) -> Result<Self> {
        let info = GateRegistry::lookup(name)
            .map_err(|_| SimError::Validation(format!("'{name}' is not a registered gate")))?;
        info.validate(wires.len(), params.len())
            .map_err(|e| SimError::Validation(e.to_string()))?;
        check_distinct(&wires)?;
        Ok(Observable::Named {
            name: info.name().to_string(),
            wires,
            params,
        })
    }

    /// Matrix observable; `matrix` must be `2^m × 2^m` for `m` wires
    pub fn hermitian(matrix: Vec<Complex64>, wires: Vec<usize>) -> Result<Self> {
        if wires.is_empty() {
            return Err(SimError::Validation(
                "Hermitian observable needs at least one wire".to_string(),
            ));
        }
        check_distinct(&wires)?;
        let expected = 1usize
            .checked_shl(2 * wires.len() as u32)
            .unwrap_or(usize::MAX);
        if matrix.len() != expected {
            return Err(SimError::Validation(format!(
                "Hermitian matrix on {} wires needs {expected} entries, got {}",
                wires.len(),
                matrix.len()
            )));
        }
        Ok(Observable::Hermitian { matrix, wires })
    }

    /// Product of factors acting on pairwise disjoint wires
    pub fn tensor_product(factors: Vec<Arc<Observable>>) -> Result<Self> {
        if factors.is_empty() {
            return Err(SimError::Validation(
                "tensor product needs at least one factor".to_string(),
            ));
        }
        let wires: Vec<usize> = factors.iter().flat_map(|f| f.wires()).collect();
        check_distinct(&wires)
            .map_err(|_| SimError::Validation("tensor product factors overlap".to_string()))?;
        Ok(Observable::TensorProduct(factors))
    }

    /// Weighted sum of terms
    pub fn hamiltonian(coefficients: Vec<f64>, terms: Vec<Arc<Observable>>) -> Result<Self> {
        if coefficients.len() != terms.len() {
            return Err(SimError::DimensionMismatch {
                expected: terms.len(),
                actual: coefficients.len(),
            });
        }
        Ok(Observable::Hamiltonian {
            coefficients,
            terms,
        })
    }

    /// Sparse operator over `wires`, which must list the register in order
    ///
    /// `matrix` is either the full `2^n × 2^n` operator or, on ranks other
    /// than 0, [`CsrMatrix::default`]. Rank 0's size is checked again when
    /// the observable is applied.
    pub fn sparse_hamiltonian(matrix: CsrMatrix, wires: Vec<usize>) -> Result<Self> {
        if wires.iter().enumerate().any(|(i, &w)| i != w) {
            return Err(SimError::Validation(
                "sparse Hamiltonian wires must be 0, 1, ..., n-1".to_string(),
            ));
        }
        let dim = 1usize << wires.len();
        let placeholder = matrix.num_rows() == 0 && matrix.num_cols() == 0;
        if !placeholder && (matrix.num_rows() != dim || matrix.num_cols() != dim) {
            return Err(SimError::Validation(format!(
                "sparse Hamiltonian on {} wires must be {dim}x{dim}, got {}x{}",
                wires.len(),
                matrix.num_rows(),
                matrix.num_cols()
            )));
        }
        Ok(Observable::SparseHamiltonian {
            matrix: Arc::new(matrix),
            wires,
        })
    }

    pub fn name(&self) -> String {
        match self {
            Observable::Named { name, .. } => name.clone(),
            Observable::Hermitian { .. } => "Hermitian".to_string(),
            Observable::TensorProduct(factors) => factors
                .iter()
                .map(|f| f.name())
                .collect::<Vec<_>>()
                .join(" @ "),
            Observable::Hamiltonian { .. } => "Hamiltonian".to_string(),
            Observable::SparseHamiltonian { .. } => "SparseHamiltonian".to_string(),
        }
    }

    /// Wires acted on, in first-use order without repeats
    pub fn wires(&self) -> Vec<usize> {
        match self {
            Observable::Named { wires, .. }
            | Observable::Hermitian { wires, .. }
            | Observable::SparseHamiltonian { wires, .. } => wires.clone(),
            Observable::TensorProduct(factors) => factors.iter().flat_map(|f| f.wires()).collect(),
            Observable::Hamiltonian { terms, .. } => {
                let mut wires = Vec::new();
                for w in terms.iter().flat_map(|t| t.wires()) {
                    if !wires.contains(&w) {
                        wires.push(w);
                    }
                }
                wires
            }
        }
    }

    /// Check the observable fits a `num_qubits`-qubit state
    ///
    /// Runs on every rank before any communication, so a bad observable fails
    /// the same way everywhere.
    pub fn validate(&self, num_qubits: usize) -> Result<()> {
        if let Some(&w) = self.wires().iter().find(|&&w| w >= num_qubits) {
            return Err(SimError::Validation(format!(
                "{} acts on wire {w} of a {num_qubits}-qubit state",
                self.name()
            )));
        }
        match self {
            Observable::SparseHamiltonian { wires, .. } if wires.len() != num_qubits => {
                Err(SimError::Validation(format!(
                    "sparse Hamiltonian on {} wires applied to a {num_qubits}-qubit state",
                    wires.len()
                )))
            }
            Observable::TensorProduct(factors) => {
                factors.iter().try_for_each(|f| f.validate(num_qubits))
            }
            Observable::Hamiltonian { terms, .. } => {
                terms.iter().try_for_each(|t| t.validate(num_qubits))
            }
            _ => Ok(()),
        }
    }

    /// Replace `state` with `O|state⟩`
    ///
    /// The result is generally not normalized.
    pub fn apply_in_place(&self, state: &mut DistributedStateVector) -> Result<()> {
        self.validate(state.num_qubits())?;
        self.apply_validated(state)
    }

    fn apply_validated(&self, state: &mut DistributedStateVector) -> Result<()> {
        match self {
            Observable::Named {
                name,
                wires,
                params,
            } => state.apply_operation(name, wires, false, params),
            Observable::Hermitian { matrix, wires } => state.apply_matrix(matrix, wires, false),
            Observable::TensorProduct(factors) => {
                for factor in factors {
                    factor.apply_validated(state)?;
                }
                Ok(())
            }
            Observable::Hamiltonian {
                coefficients,
                terms,
            } => {
                let mut sum = state.clone();
                sum.set_zero();
                for (&c, term) in coefficients.iter().zip(terms) {
                    let mut image = state.clone();
                    term.apply_validated(&mut image)?;
                    sum.scale_and_add(Complex64::new(c, 0.0), &image)?;
                }
                state.update_local_data(sum.local_data())
            }
            Observable::SparseHamiltonian { matrix, .. } => {
                apply_sparse_hamiltonian(matrix, state)
            }
        }
    }
}
