//! Vibration modes of a rectangular membrane with spatially varying
//! tension, density and potential.
//!
//! The membrane equation `-div(p·grad u) + q·u = λ·w·u` with zero
//! Dirichlet boundary is discretized by second-order finite differences
//! on a uniform interior grid, producing a generalized eigenvalue
//! problem `A·x = λ·B·x` with a sparse 5-point stiffness operator A and
//! a diagonal lumped mass operator B. The problem is then densified and
//! handed to a direct dense symmetric-definite eigensolver.
//!
//! Pipeline: [`Coefficients`] → [`Mesh`] → {[`build_stiffness_matrix`],
//! [`build_mass_matrix`]} → [`solve_eigenproblem`], repeated across grid
//! resolutions by [`ConvergenceStudy`] for discretization-error study.

pub mod assembly;
pub mod convergence;
pub mod error;
pub mod export;
pub mod membrane;
pub mod mesh;
pub mod solver;
pub mod sparse;

pub use assembly::{build_mass_matrix, build_stiffness_matrix};
pub use convergence::{
    ConvergenceData, ConvergenceStudy, CONVERGENCE_GRID_SIZES, CONVERGENCE_MODE_COUNT,
};
pub use error::{Result, SolverError};
pub use export::{
    write_convergence_csv, write_eigenvalues_csv, write_matrix_csv, write_mesh_csv,
    write_mode_csv,
};
pub use membrane::{Coefficients, Obstacle, DOMAIN_SIZE, MIN_GRID_SIZE};
pub use mesh::Mesh;
pub use solver::{configure_threads, solve_eigenproblem, EigenResults, SolverConfig};
pub use sparse::SparseMatrixCsr;
