//! Uniform interior grid sampling of a coefficient field.
//!
//! The unit square is discretized with N interior points per dimension;
//! boundary nodes are never materialized (implicit zero Dirichlet
//! condition), so `x[i] = (i+1)·h` with `h = DOMAIN_SIZE / (N+1)`.

use crate::error::{Result, SolverError};
use crate::membrane::{Coefficients, DOMAIN_SIZE, MIN_GRID_SIZE};

/// Sampled mesh: coordinates of the interior grid and the per-node
/// coefficient values, row-major with `idx(i, j) = i·n + j`.
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Interior points per dimension.
    pub n: usize,
    /// Total interior points, `n²`.
    pub total_points: usize,
    /// Grid spacing, `DOMAIN_SIZE / (n + 1)`.
    pub h: f64,
    /// x coordinates of interior columns (length n).
    pub x: Vec<f64>,
    /// y coordinates of interior rows (length n).
    pub y: Vec<f64>,
    /// Sampled tension values (length n²).
    pub p_vals: Vec<f64>,
    /// Sampled density values (length n²).
    pub w_vals: Vec<f64>,
    /// Sampled potential values (length n²).
    pub q_vals: Vec<f64>,
}

impl Mesh {
    /// Sample `coeffs` on the interior N×N grid.
    pub fn generate(n: usize, coeffs: &Coefficients) -> Result<Self> {
        if n < MIN_GRID_SIZE {
            return Err(SolverError::InvalidParameter(format!(
                "grid size {} is below the minimum of {}",
                n, MIN_GRID_SIZE
            )));
        }

        let total_points = n * n;
        let h = DOMAIN_SIZE / (n as f64 + 1.0);

        let x: Vec<f64> = (0..n).map(|i| (i as f64 + 1.0) * h).collect();
        let y = x.clone();

        let mut p_vals = Vec::with_capacity(total_points);
        let mut w_vals = Vec::with_capacity(total_points);
        let mut q_vals = Vec::with_capacity(total_points);

        for i in 0..n {
            for j in 0..n {
                p_vals.push(coeffs.tension(x[i], y[j]));
                w_vals.push(coeffs.density(x[i], y[j]));
                q_vals.push(coeffs.potential(x[i], y[j]));
            }
        }

        Ok(Self {
            n,
            total_points,
            h,
            x,
            y,
            p_vals,
            w_vals,
            q_vals,
        })
    }

    /// Linear index of grid point (i, j).
    #[inline]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        i * self.n + j
    }

    /// x coordinate of column i.
    #[inline]
    pub fn x(&self, i: usize) -> f64 {
        self.x[i]
    }

    /// y coordinate of row j.
    #[inline]
    pub fn y(&self, j: usize) -> f64 {
        self.y[j]
    }
}
