//! Direct dense generalized eigensolver.
//!
//! Solves `A·x = λ·B·x` for symmetric A and symmetric positive definite
//! B by densifying both operators and reducing to a standard symmetric
//! problem through the Cholesky factorization of B:
//!
//! 1. B = L·Lᵀ
//! 2. A* = L⁻¹·A·L⁻ᵀ
//! 3. A*·ψ = λ·ψ  (LAPACK symmetric eigendecomposition, all n pairs)
//! 4. x = L⁻ᵀ·ψ
//!
//! This is a direct method with no partial "top-k" mode: the full
//! ascending spectrum is computed and the k smallest pairs extracted
//! afterwards. Densification makes the solve O(n²) memory and O(n³)
//! time regardless of sparsity, a deliberate trade of cost for the
//! robustness of a direct solver.

use std::time::Instant;

use nalgebra::linalg::Cholesky;
use nalgebra::DMatrix;
use nalgebra_lapack::SymmetricEigen;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};
use crate::sparse::SparseMatrixCsr;

/// Eigenvectors with Euclidean norm below this floor are left unscaled.
const NORM_FLOOR: f64 = 1e-12;

/// Solver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Number of eigenpairs to extract.
    pub num_eigenvalues: usize,
    /// Tolerance, reserved for iterative backends.
    pub eps: f64,
    /// Worker threads for the linear-algebra backend.
    pub num_threads: usize,
}

impl SolverConfig {
    pub fn new(num_eigenvalues: usize) -> Self {
        Self {
            num_eigenvalues,
            eps: 1e-10,
            num_threads: 4,
        }
    }
}

/// Eigenpairs of one solve.
///
/// A decomposition failure is signaled by `n_eigenvalues == 0` on an
/// otherwise valid result; callers must branch on the count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EigenResults {
    /// Number of usable eigenpairs (0 on decomposition failure).
    pub n_eigenvalues: usize,
    /// Ascending eigenvalues, length `n_eigenvalues`.
    pub eigenvalues: Vec<f64>,
    /// Unit-norm eigenvectors, one `Vec<f64>` of length n per mode.
    pub eigenvectors: Vec<Vec<f64>>,
    /// Always 0.0 per mode; the direct solver reports no residual.
    pub residuals: Vec<f64>,
    /// Wall-clock seconds spent in the solve.
    pub computation_time: f64,
    /// Always 1; the method is direct.
    pub iterations: usize,
}

impl EigenResults {
    /// Vibration frequency `sqrt(λ)/(2π)` of a mode, 0.0 when the
    /// eigenvalue is not positive.
    pub fn frequency_hz(&self, mode: usize) -> Option<f64> {
        self.eigenvalues.get(mode).map(|&lambda| {
            if lambda > 0.0 {
                lambda.sqrt() / (2.0 * std::f64::consts::PI)
            } else {
                0.0
            }
        })
    }

    fn failed(elapsed: f64) -> Self {
        Self {
            n_eigenvalues: 0,
            eigenvalues: Vec::new(),
            eigenvectors: Vec::new(),
            residuals: Vec::new(),
            computation_time: elapsed,
            iterations: 1,
        }
    }
}

/// Configure the process-wide thread pool backing the dense solve.
/// Applied once at startup; later calls return false and change nothing.
pub fn configure_threads(num_threads: usize) -> bool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .is_ok()
}

/// Scatter a CSR matrix into dense symmetric form.
///
/// Every stored entry is written at (row, col) AND (col, row)
/// unconditionally, so even an asymmetric source comes out symmetric.
/// Should the source ever hold conflicting duplicates for a symmetric
/// pair, the later write silently wins; a latent hazard kept as-is.
pub(crate) fn densify_symmetric(mat: &SparseMatrixCsr) -> DMatrix<f64> {
    let n = mat.n_rows;
    let mut dense = DMatrix::zeros(n, n);
    for row in 0..n {
        for (col, val) in mat.row(row) {
            dense[(row, col)] = val;
            dense[(col, row)] = val;
        }
    }
    dense
}

/// Solve the generalized eigenproblem `A·x = λ·B·x`.
///
/// Returns the `config.num_eigenvalues` smallest eigenpairs (clamped to
/// the problem size with a non-fatal warning). Numerical failure — B
/// not positive definite, factor inversion failure, or a failed
/// eigendecomposition — yields `Ok` with `n_eigenvalues == 0` rather
/// than an error; only structural misuse (mismatched dimensions) is
/// an `Err`.
pub fn solve_eigenproblem(
    a: &SparseMatrixCsr,
    b: &SparseMatrixCsr,
    config: &SolverConfig,
) -> Result<EigenResults> {
    if a.n_rows != b.n_rows || a.n_cols != b.n_cols {
        return Err(SolverError::DimensionMismatch(format!(
            "A is {}x{} but B is {}x{}",
            a.n_rows, a.n_cols, b.n_rows, b.n_cols
        )));
    }

    let n = a.n_rows;
    let mut k = config.num_eigenvalues;
    if k > n {
        eprintln!(
            "Warning: requested {} eigenvalues but only {} DOF; computing {}",
            k, n, n
        );
        k = n;
    }

    let start = Instant::now();

    let a_dense = densify_symmetric(a);
    let b_dense = densify_symmetric(b);

    // B = L·Lᵀ; failure here means B is not positive definite.
    let Some(chol_b) = Cholesky::new(b_dense) else {
        eprintln!("Warning: mass matrix is not positive definite; no eigenpairs computed");
        return Ok(EigenResults::failed(start.elapsed().as_secs_f64()));
    };

    let Some(l_inv) = chol_b.l().try_inverse() else {
        eprintln!("Warning: Cholesky factor is numerically singular; no eigenpairs computed");
        return Ok(EigenResults::failed(start.elapsed().as_secs_f64()));
    };

    // A* = L⁻¹·A·L⁻ᵀ
    let a_star = &l_inv * &a_dense * l_inv.transpose();

    let Some(eigen) = SymmetricEigen::try_new(a_star) else {
        eprintln!("Warning: symmetric eigendecomposition failed; no eigenpairs computed");
        return Ok(EigenResults::failed(start.elapsed().as_secs_f64()));
    };

    // LAPACK returns the spectrum ascending; the argsort keeps the
    // extraction correct regardless.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| eigen.eigenvalues[i].total_cmp(&eigen.eigenvalues[j]));
    let selected = &order[..k];

    let eigenvalues: Vec<f64> = selected.iter().map(|&i| eigen.eigenvalues[i]).collect();

    // Back-transform x = L⁻ᵀ·ψ and normalize each mode. The per-mode
    // work is independent and runs on the backend thread pool.
    let l_inv_t = l_inv.transpose();
    let eigenvectors: Vec<Vec<f64>> = selected
        .par_iter()
        .map(|&i| {
            let psi = eigen.eigenvectors.column(i).into_owned();
            let phi = &l_inv_t * &psi;
            let norm = phi.norm();
            let mut mode: Vec<f64> = phi.iter().copied().collect();
            if norm > NORM_FLOOR {
                for v in &mut mode {
                    *v /= norm;
                }
            }
            mode
        })
        .collect();

    Ok(EigenResults {
        n_eigenvalues: k,
        eigenvalues,
        eigenvectors,
        residuals: vec![0.0; k],
        computation_time: start.elapsed().as_secs_f64(),
        iterations: 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{build_mass_matrix, build_stiffness_matrix};
    use crate::membrane::Coefficients;
    use crate::mesh::Mesh;

    fn diagonal_matrix(diag: &[f64]) -> SparseMatrixCsr {
        let mut mat = SparseMatrixCsr::with_capacity(diag.len(), diag.len());
        for (i, &v) in diag.iter().enumerate() {
            mat.push_entry(i, v);
            mat.close_row();
        }
        mat
    }

    #[test]
    fn diagonal_problem_reproduces_the_diagonal() {
        let a = diagonal_matrix(&[3.0, 1.0, 2.0]);
        let b = diagonal_matrix(&[1.0, 1.0, 1.0]);
        let results = solve_eigenproblem(&a, &b, &SolverConfig::new(3)).unwrap();

        assert_eq!(results.n_eigenvalues, 3);
        let expected = [1.0, 2.0, 3.0];
        for (lambda, want) in results.eigenvalues.iter().zip(expected) {
            assert!((lambda - want).abs() < 1e-10, "got {lambda}, want {want}");
        }
        assert_eq!(results.iterations, 1);
        assert!(results.residuals.iter().all(|&r| r == 0.0));
        assert!(results.computation_time >= 0.0);
    }

    #[test]
    fn mass_scaling_divides_the_spectrum() {
        // A = diag(2, 8), B = diag(2, 2)  →  λ = {1, 4}
        let a = diagonal_matrix(&[2.0, 8.0]);
        let b = diagonal_matrix(&[2.0, 2.0]);
        let results = solve_eigenproblem(&a, &b, &SolverConfig::new(2)).unwrap();
        assert!((results.eigenvalues[0] - 1.0).abs() < 1e-10);
        assert!((results.eigenvalues[1] - 4.0).abs() < 1e-10);
    }

    #[test]
    fn oversized_request_clamps_to_problem_size() {
        let a = diagonal_matrix(&[1.0, 2.0, 3.0]);
        let b = diagonal_matrix(&[1.0, 1.0, 1.0]);
        let results = solve_eigenproblem(&a, &b, &SolverConfig::new(10)).unwrap();
        assert_eq!(results.n_eigenvalues, 3);
        assert_eq!(results.eigenvectors.len(), 3);
    }

    #[test]
    fn indefinite_mass_matrix_yields_zero_eigenpairs() {
        let a = diagonal_matrix(&[1.0, 2.0, 3.0]);
        let b = diagonal_matrix(&[1.0, -1.0, 1.0]);
        let results = solve_eigenproblem(&a, &b, &SolverConfig::new(2)).unwrap();
        assert_eq!(results.n_eigenvalues, 0);
        assert!(results.eigenvalues.is_empty());
        assert!(results.eigenvectors.is_empty());
    }

    #[test]
    fn mismatched_dimensions_are_an_error() {
        let a = diagonal_matrix(&[1.0, 2.0]);
        let b = diagonal_matrix(&[1.0, 1.0, 1.0]);
        let err = solve_eigenproblem(&a, &b, &SolverConfig::new(1)).expect_err("must fail");
        assert!(matches!(err, SolverError::DimensionMismatch(_)));
    }

    #[test]
    fn densification_lets_the_later_duplicate_win() {
        // Entry (0,1)=5 then entry (1,0)=7: both symmetric writes of the
        // second entry overwrite the first pair.
        let mut mat = SparseMatrixCsr::with_capacity(2, 4);
        mat.push_entry(0, 1.0);
        mat.push_entry(1, 5.0);
        mat.close_row();
        mat.push_entry(0, 7.0);
        mat.push_entry(1, 1.0);
        mat.close_row();

        let dense = densify_symmetric(&mat);
        assert_eq!(dense[(0, 1)], 7.0);
        assert_eq!(dense[(1, 0)], 7.0);
    }

    #[test]
    fn membrane_modes_are_positive_ascending_unit_norm() {
        let coeffs = Coefficients::default_membrane();
        let mesh = Mesh::generate(10, &coeffs).unwrap();
        let a = build_stiffness_matrix(&mesh);
        let b = build_mass_matrix(&mesh);
        let results = solve_eigenproblem(&a, &b, &SolverConfig::new(5)).unwrap();

        assert_eq!(results.n_eigenvalues, 5);
        assert!(results.eigenvalues[0] > 0.0);
        for pair in results.eigenvalues.windows(2) {
            assert!(pair[0] <= pair[1], "spectrum not ascending: {:?}", pair);
        }
        // Reference bracket for the fundamental mode of the default
        // membrane at N=10 (near-uniform tension, central potential bump).
        assert!(
            results.eigenvalues[0] > 18.0 && results.eigenvalues[0] < 45.0,
            "fundamental eigenvalue {} outside reference bracket",
            results.eigenvalues[0]
        );
        for mode in &results.eigenvectors {
            let norm: f64 = mode.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-8, "mode norm {norm}");
        }
        for mode in 0..5 {
            let freq = results.frequency_hz(mode).unwrap();
            assert!(freq > 0.0);
        }
    }
}
