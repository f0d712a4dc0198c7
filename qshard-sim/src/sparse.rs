//! Distributed sparse-Hamiltonian application
//!
//! The full operator lives on rank 0 only. For each row-owning rank `i` in turn,
//! rank 0 cuts row block `i` into one column block per rank and scatters
//! them. Rank `j` multiplies its block by its own shard, and the partial rows
//! are summed onto rank `i` inside a sub-communicator holding `i` plus every
//! rank whose block had entries. Each phase is bracketed by barriers.
//!
//! This costs one phase per rank whatever the sparsity pattern.

use crate::error::{Result, SimError};
use crate::state::DistributedStateVector;
use num_complex::Complex64;
use qshard_comm::ReduceOp;
use qshard_state::CsrMatrix;

/// Blocks of row band `owner`, one per rank, each `shard × shard`
fn row_band_blocks(matrix: &CsrMatrix, owner: usize, ranks: usize, shard: usize) -> Result<Vec<CsrMatrix>> {
    let rows = owner * shard..(owner + 1) * shard;
    (0..ranks)
        .map(|col| Ok(matrix.block(rows.clone(), col * shard..(col + 1) * shard)?))
        .collect()
}

fn check_dimensions(matrix: &CsrMatrix, dim: usize) -> std::result::Result<(), String> {
    if matrix.num_rows() != dim || matrix.num_cols() != dim {
        return Err(format!(
            "sparse Hamiltonian is {}x{}, state needs {dim}x{dim}",
            matrix.num_rows(),
            matrix.num_cols()
        ));
    }
    Ok(())
}

/// Replace `state` with `matrix · state`
///
/// Only rank 0's `matrix` is read, and it must be `2^n × 2^n` for the
/// state's `n` qubits. Other ranks may pass [`CsrMatrix::default`]. Rank 0
/// shares the outcome of its size check before the first phase, so a bad
/// operator fails on every rank.
pub fn apply_sparse_hamiltonian(matrix: &CsrMatrix, state: &mut DistributedStateVector) -> Result<()> {
    let comm = state.comm().clone();
    let rank = comm.rank();

    let checked = if rank == 0 {
        check_dimensions(matrix, 1usize << state.num_qubits())
    } else {
        Ok(())
    };
    comm.broadcast(checked, 0)?.map_err(SimError::Validation)?;

    let ranks = comm.size();
    let shard_len = state.local_data().len();
    let mut result = vec![Complex64::new(0.0, 0.0); shard_len];

    for owner in 0..ranks {
        comm.barrier()?;

        let blocks = if rank == 0 {
            Some(row_band_blocks(matrix, owner, ranks, shard_len)?)
        } else {
            None
        };
        let block: CsrMatrix = comm.scatter(blocks, 0)?;
        let partial = block.spmv(state.local_data())?;

        comm.barrier()?;

        let contributes = !block.is_empty();
        let color = (rank == owner || contributes).then_some(0);
        // Owner sorts first so it is rank 0 of the sub-group.
        let key = if rank == owner { 0 } else { rank as u32 + 1 };
        tracing::debug!(owner, rank, nnz = block.nnz(), member = color.is_some(), "sparse phase");

        if let Some(group) = comm.split(color, key)? {
            let mut reduced = vec![Complex64::new(0.0, 0.0); shard_len];
            group.reduce(&partial, &mut reduced, 0, ReduceOp::Sum)?;
            if rank == owner {
                result = reduced;
            }
        }

        comm.barrier()?;
    }

    state.update_local_data(&result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_band_blocks_tile_the_band() {
        let entries = (0..8).map(|i| (i, 7 - i, Complex64::new(i as f64, 0.0)));
        let m = CsrMatrix::from_coo(8, 8, entries).unwrap();

        let blocks = row_band_blocks(&m, 1, 4, 2).unwrap();
        assert_eq!(blocks.len(), 4);
        // rows 2 and 3 hit columns 5 and 4, both in column block 2
        assert_eq!(blocks.iter().map(CsrMatrix::nnz).collect::<Vec<_>>(), vec![0, 0, 2, 0]);
        assert_eq!(blocks[2].to_dense()[1].re, 2.0);
    }

    #[test]
    fn test_check_dimensions() {
        let m = CsrMatrix::from_coo(4, 4, std::iter::empty()).unwrap();
        assert!(check_dimensions(&m, 4).is_ok());
        assert!(check_dimensions(&m, 8).is_err());
        assert!(check_dimensions(&CsrMatrix::default(), 4).is_err());
    }
}
