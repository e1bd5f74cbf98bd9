//! Compressed sparse row storage for the assembled operators.
//!
//! Assembly-order CSR: entries within a row are stored in the order the
//! assembler pushed them, which for the stiffness operator is
//! {+i neighbor, -i neighbor, +j neighbor, -j neighbor, diagonal}
//! filtered to in-bounds neighbors. Column indices within a row are
//! therefore NOT sorted; this is a documented contract and consumers
//! must not assume sorted order.

use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::error::{Result, SolverError};

/// Square sparse matrix in CSR format.
///
/// Invariants: `row_index` is non-decreasing with `row_index[0] == 0`
/// and `row_index[n_rows] == nnz`; the entries of row i occupy
/// `values[row_index[i]..row_index[i+1]]`. Built once by an assembler,
/// read-only thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrixCsr {
    pub n_rows: usize,
    pub n_cols: usize,
    pub nnz: usize,
    pub values: Vec<f64>,
    pub columns: Vec<usize>,
    pub row_index: Vec<usize>,
}

impl SparseMatrixCsr {
    /// Empty n×n matrix with room for `nnz_estimate` entries.
    pub fn with_capacity(n: usize, nnz_estimate: usize) -> Self {
        let mut row_index = Vec::with_capacity(n + 1);
        row_index.push(0);
        Self {
            n_rows: n,
            n_cols: n,
            nnz: 0,
            values: Vec::with_capacity(nnz_estimate),
            columns: Vec::with_capacity(nnz_estimate),
            row_index,
        }
    }

    /// Append one entry to the row currently being filled.
    #[inline]
    pub(crate) fn push_entry(&mut self, column: usize, value: f64) {
        self.values.push(value);
        self.columns.push(column);
        self.nnz += 1;
    }

    /// Close the current row. Must be called exactly once per row, in
    /// row order; after the last row `row_index[n_rows] == nnz` holds.
    #[inline]
    pub(crate) fn close_row(&mut self) {
        self.row_index.push(self.nnz);
    }

    /// Entries of row i as (column, value) pairs in storage order.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let span = self.row_index[i]..self.row_index[i + 1];
        span.map(move |k| (self.columns[k], self.values[k]))
    }

    /// Fraction of structurally zero entries.
    pub fn sparsity(&self) -> f64 {
        1.0 - self.nnz as f64 / (self.n_rows as f64 * self.n_cols as f64)
    }

    /// One-line shape/density summary for console reporting.
    pub fn describe(&self) -> String {
        format!(
            "{} x {}, NNZ = {} (sparsity {:.4}%)",
            self.n_rows,
            self.n_cols,
            self.nnz,
            100.0 * self.sparsity()
        )
    }

    /// Convert to the ecosystem CSR type via COO triplets.
    ///
    /// Goes through `CooMatrix` because the in-house format keeps
    /// unsorted columns within rows, which `CsrMatrix` does not accept
    /// directly. Duplicate entries, if any, are summed.
    pub fn to_csr(&self) -> Result<CsrMatrix<f64>> {
        let mut rows = Vec::with_capacity(self.nnz);
        let mut cols = Vec::with_capacity(self.nnz);
        let mut vals = Vec::with_capacity(self.nnz);
        for i in 0..self.n_rows {
            for (col, val) in self.row(i) {
                rows.push(i);
                cols.push(col);
                vals.push(val);
            }
        }
        let coo = CooMatrix::try_from_triplets(self.n_rows, self.n_cols, rows, cols, vals)
            .map_err(|e| SolverError::SparseFormat(format!("{:?}", e)))?;
        Ok(CsrMatrix::from(&coo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matrix() -> SparseMatrixCsr {
        // 3x3: row 0 keeps its off-diagonal before the diagonal to
        // exercise the unsorted-column contract.
        let mut mat = SparseMatrixCsr::with_capacity(3, 5);
        mat.push_entry(1, -1.0);
        mat.push_entry(0, 2.0);
        mat.close_row();
        mat.push_entry(1, 2.0);
        mat.close_row();
        mat.push_entry(2, 2.0);
        mat.push_entry(1, -1.0);
        mat.close_row();
        mat
    }

    #[test]
    fn row_index_invariants_hold() {
        let mat = sample_matrix();
        assert_eq!(mat.row_index[0], 0);
        assert_eq!(mat.row_index[mat.n_rows], mat.nnz);
        assert!(mat.row_index.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(mat.nnz, 5);
    }

    #[test]
    fn rows_preserve_insertion_order() {
        let mat = sample_matrix();
        let row0: Vec<_> = mat.row(0).collect();
        assert_eq!(row0, vec![(1, -1.0), (0, 2.0)]);
        let row2: Vec<_> = mat.row(2).collect();
        assert_eq!(row2, vec![(2, 2.0), (1, -1.0)]);
    }

    #[test]
    fn converts_to_ecosystem_csr() {
        let mat = sample_matrix();
        let csr = mat.to_csr().expect("conversion should succeed");
        assert_eq!(csr.nnz(), mat.nnz);
        assert_eq!(csr.nrows(), 3);
        // Same values, now column-sorted within rows.
        let row0 = csr.row(0);
        assert_eq!(row0.col_indices(), &[0, 1]);
        assert_eq!(row0.values(), &[2.0, -1.0]);
    }

    #[test]
    fn sparsity_counts_structural_zeros() {
        let mat = sample_matrix();
        assert!((mat.sparsity() - (1.0 - 5.0 / 9.0)).abs() < 1e-15);
        assert!(mat.describe().contains("NNZ = 5"));
    }
}
