//! Sparse assembly of the membrane operators.
//!
//! The stiffness operator discretizes `-div(p·grad u) + q·u` with a
//! second-order 5-point stencil; the interface tension between two
//! adjacent nodes is the arithmetic mean of their nodal values. The
//! mass operator is lumped: a diagonal of raw density samples.

use crate::mesh::Mesh;
use crate::sparse::SparseMatrixCsr;

/// Upper bound on stencil entries per row: diagonal plus 4 neighbors.
const MAX_NNZ_PER_ROW: usize = 5;

/// Build the stiffness matrix A for `-div(p·grad u) + q·u`.
///
/// For each interior node, every in-bounds axis-aligned neighbor
/// contributes an off-diagonal `-p_half/h²` and accumulates `+p_half/h²`
/// onto the diagonal, where `p_half = 0.5·(p[node] + p[neighbor])`. The
/// diagonal entry `accum + q[node]` is appended after the neighbors, so
/// rows at grid edges and corners hold 3-5 entries. Both rows of a
/// neighbor pair evaluate the identical averaged expression, which makes
/// the assembled operator symmetric to floating-point equality.
pub fn build_stiffness_matrix(mesh: &Mesh) -> SparseMatrixCsr {
    let n = mesh.n;
    let h2 = mesh.h * mesh.h;

    let mut a = SparseMatrixCsr::with_capacity(mesh.total_points, mesh.total_points * MAX_NNZ_PER_ROW);

    for i in 0..n {
        for j in 0..n {
            let idx = mesh.idx(i, j);
            let mut diag = 0.0;

            // p(i+1/2, j)
            if i < n - 1 {
                let nb = mesh.idx(i + 1, j);
                let p_half = 0.5 * (mesh.p_vals[idx] + mesh.p_vals[nb]);
                a.push_entry(nb, -p_half / h2);
                diag += p_half / h2;
            }

            // p(i-1/2, j)
            if i > 0 {
                let nb = mesh.idx(i - 1, j);
                let p_half = 0.5 * (mesh.p_vals[idx] + mesh.p_vals[nb]);
                a.push_entry(nb, -p_half / h2);
                diag += p_half / h2;
            }

            // p(i, j+1/2)
            if j < n - 1 {
                let nb = mesh.idx(i, j + 1);
                let p_half = 0.5 * (mesh.p_vals[idx] + mesh.p_vals[nb]);
                a.push_entry(nb, -p_half / h2);
                diag += p_half / h2;
            }

            // p(i, j-1/2)
            if j > 0 {
                let nb = mesh.idx(i, j - 1);
                let p_half = 0.5 * (mesh.p_vals[idx] + mesh.p_vals[nb]);
                a.push_entry(nb, -p_half / h2);
                diag += p_half / h2;
            }

            a.push_entry(idx, diag + mesh.q_vals[idx]);
            a.close_row();
        }
    }

    a
}

/// Build the lumped mass matrix B: `B[idx][idx] = w_vals[idx]`.
///
/// Raw density samples, no area scaling. Exactly one entry per row.
pub fn build_mass_matrix(mesh: &Mesh) -> SparseMatrixCsr {
    let mut b = SparseMatrixCsr::with_capacity(mesh.total_points, mesh.total_points);

    for idx in 0..mesh.total_points {
        b.push_entry(idx, mesh.w_vals[idx]);
        b.close_row();
    }

    b
}
