//! Compressed sparse row matrices over complex amplitudes
//!
//! Row `i` spans `row_offsets[i]..row_offsets[i+1]` in `column_indices` and
//! `values`. Used for sparse Hamiltonians and their per-rank blocks.

use crate::error::{Result, StateError};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Complex CSR matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix {
    num_rows: usize,
    num_cols: usize,
    row_offsets: Vec<usize>,
    column_indices: Vec<usize>,
    values: Vec<Complex64>,
}

/// The `0 × 0` matrix
impl Default for CsrMatrix {
    fn default() -> Self {
        Self {
            num_rows: 0,
            num_cols: 0,
            row_offsets: vec![0],
            column_indices: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl CsrMatrix {
    /// Build from raw CSR arrays, checking well-formedness
    pub fn new(
        num_rows: usize,
        num_cols: usize,
        row_offsets: Vec<usize>,
        column_indices: Vec<usize>,
        values: Vec<Complex64>,
    ) -> Result<Self> {
        if row_offsets.len() != num_rows + 1 {
            return Err(StateError::DimensionMismatch {
                expected: num_rows + 1,
                actual: row_offsets.len(),
            });
        }
        if column_indices.len() != values.len() {
            return Err(StateError::DimensionMismatch {
                expected: values.len(),
                actual: column_indices.len(),
            });
        }
        if row_offsets[0] != 0 || row_offsets[num_rows] != values.len() {
            return Err(StateError::Validation(format!(
                "row offsets must run from 0 to {}",
                values.len()
            )));
        }
        if row_offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(StateError::Validation(
                "row offsets must be non-decreasing".to_string(),
            ));
        }
        if let Some(&col) = column_indices.iter().find(|&&c| c >= num_cols) {
            return Err(StateError::Validation(format!(
                "column index {col} out of range for {num_cols} columns"
            )));
        }

        Ok(Self {
            num_rows,
            num_cols,
            row_offsets,
            column_indices,
            values,
        })
    }

    /// Build from `(row, col, value)` entries
    pub fn from_coo<I>(num_rows: usize, num_cols: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, Complex64)>,
    {
        let mut sorted: Vec<_> = entries.into_iter().collect();
        sorted.sort_by_key(|(r, c, _)| (*r, *c));

        let mut row_offsets = vec![0usize; num_rows + 1];
        for &(r, _, _) in &sorted {
            if r >= num_rows {
                return Err(StateError::Validation(format!(
                    "row index {r} out of range for {num_rows} rows"
                )));
            }
            row_offsets[r + 1] += 1;
        }
        for i in 1..=num_rows {
            row_offsets[i] += row_offsets[i - 1];
        }

        let (column_indices, values) = sorted.into_iter().map(|(_, c, v)| (c, v)).unzip();
        Self::new(num_rows, num_cols, row_offsets, column_indices, values)
    }

    /// Build from a dense row-major matrix, dropping exact zeros
    pub fn from_dense(num_rows: usize, num_cols: usize, dense: &[Complex64]) -> Result<Self> {
        if dense.len() != num_rows * num_cols {
            return Err(StateError::DimensionMismatch {
                expected: num_rows * num_cols,
                actual: dense.len(),
            });
        }
        let entries = dense
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != Complex64::new(0.0, 0.0))
            .map(|(i, &v)| (i / num_cols, i % num_cols, v));
        Self::from_coo(num_rows, num_cols, entries)
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[inline]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Number of stored entries
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn row_offsets(&self) -> &[usize] {
        &self.row_offsets
    }

    pub fn column_indices(&self) -> &[usize] {
        &self.column_indices
    }

    pub fn values(&self) -> &[Complex64] {
        &self.values
    }

    /// Sparse matrix-vector product
    pub fn spmv(&self, input: &[Complex64]) -> Result<Vec<Complex64>> {
        let mut output = vec![Complex64::new(0.0, 0.0); self.num_rows];
        self.spmv_into(input, &mut output)?;
        Ok(output)
    }

    /// Sparse matrix-vector product into a pre-allocated buffer
    pub fn spmv_into(&self, input: &[Complex64], output: &mut [Complex64]) -> Result<()> {
        if input.len() != self.num_cols {
            return Err(StateError::DimensionMismatch {
                expected: self.num_cols,
                actual: input.len(),
            });
        }
        if output.len() != self.num_rows {
            return Err(StateError::DimensionMismatch {
                expected: self.num_rows,
                actual: output.len(),
            });
        }

        for (row, out) in output.iter_mut().enumerate() {
            let span = self.row_offsets[row]..self.row_offsets[row + 1];
            *out = self.column_indices[span.clone()]
                .iter()
                .zip(&self.values[span])
                .map(|(&col, v)| v * input[col])
                .sum();
        }
        Ok(())
    }

    /// Extract the sub-matrix covering `rows × cols`, with re-based indices
    pub fn block(&self, rows: Range<usize>, cols: Range<usize>) -> Result<Self> {
        if rows.end > self.num_rows || cols.end > self.num_cols {
            return Err(StateError::Validation(format!(
                "block {rows:?} x {cols:?} exceeds {}x{} matrix",
                self.num_rows, self.num_cols
            )));
        }

        let mut row_offsets = Vec::with_capacity(rows.len() + 1);
        let mut column_indices = Vec::new();
        let mut values = Vec::new();
        row_offsets.push(0);

        for row in rows.clone() {
            let span = self.row_offsets[row]..self.row_offsets[row + 1];
            for (&col, &v) in self.column_indices[span.clone()].iter().zip(&self.values[span]) {
                if cols.contains(&col) {
                    column_indices.push(col - cols.start);
                    values.push(v);
                }
            }
            row_offsets.push(values.len());
        }

        Ok(Self {
            num_rows: rows.len(),
            num_cols: cols.len(),
            row_offsets,
            column_indices,
            values,
        })
    }

    /// Expand to a dense row-major matrix
    pub fn to_dense(&self) -> Vec<Complex64> {
        let mut dense = vec![Complex64::new(0.0, 0.0); self.num_rows * self.num_cols];
        for row in 0..self.num_rows {
            for idx in self.row_offsets[row]..self.row_offsets[row + 1] {
                dense[row * self.num_cols + self.column_indices[idx]] = self.values[idx];
            }
        }
        dense
    }
}
