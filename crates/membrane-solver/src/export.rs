//! CSV artifact writers.
//!
//! The solver hands fixed-schema CSV files to external plotting and
//! analysis tooling. Schemas are part of the data contract: headers,
//! row order and numeric formatting are stable.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::convergence::ConvergenceData;
use crate::error::Result;
use crate::membrane::DOMAIN_SIZE;
use crate::mesh::Mesh;
use crate::solver::EigenResults;
use crate::sparse::SparseMatrixCsr;

/// Write the sampled mesh: `i,j,x,y,p,w,q`, row-major, 6-decimal fixed.
pub fn write_mesh_csv(mesh: &Mesh, path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "i,j,x,y,p,w,q")?;
    for i in 0..mesh.n {
        for j in 0..mesh.n {
            let idx = mesh.idx(i, j);
            writeln!(
                file,
                "{},{},{:.6},{:.6},{:.6},{:.6},{:.6}",
                i,
                j,
                mesh.x(i),
                mesh.y(j),
                mesh.p_vals[idx],
                mesh.w_vals[idx],
                mesh.q_vals[idx]
            )?;
        }
    }
    Ok(())
}

/// Write the sparsity pattern: `row,col,value`, one row per stored CSR
/// entry in storage order (not column-sorted), scientific formatting.
pub fn write_matrix_csv(mat: &SparseMatrixCsr, path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "row,col,value")?;
    for i in 0..mat.n_rows {
        for (col, val) in mat.row(i) {
            writeln!(file, "{},{},{:.6e}", i, col, val)?;
        }
    }
    Ok(())
}

/// Write the spectrum: `index,eigenvalue,frequency_hz`, 1-based index.
pub fn write_eigenvalues_csv(results: &EigenResults, path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "index,eigenvalue,frequency_hz")?;
    for mode in 0..results.n_eigenvalues {
        writeln!(
            file,
            "{},{:.10e},{:.10e}",
            mode + 1,
            results.eigenvalues[mode],
            results.frequency_hz(mode).unwrap_or(0.0)
        )?;
    }
    Ok(())
}

/// Write one mode shape over the mesh: `i,j,x,y,amplitude`.
pub fn write_mode_csv(mesh: &Mesh, mode: &[f64], path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "i,j,x,y,amplitude")?;
    for i in 0..mesh.n {
        for j in 0..mesh.n {
            writeln!(
                file,
                "{},{},{:.6},{:.6},{:.6e}",
                i,
                j,
                mesh.x(i),
                mesh.y(j),
                mode[mesh.idx(i, j)]
            )?;
        }
    }
    Ok(())
}

/// Write per-resolution eigenvalues: `n,h,mode,eigenvalue`, skipping
/// resolutions that produced no data. Callers should only emit this
/// artifact when the study is conclusive.
pub fn write_convergence_csv(data: &ConvergenceData, path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "n,h,mode,eigenvalue")?;
    for (&n, entry) in data.grid_sizes.iter().zip(&data.eigenvalues) {
        let Some(lambdas) = entry else { continue };
        let h = DOMAIN_SIZE / (n as f64 + 1.0);
        for (mode, lambda) in lambdas.iter().enumerate() {
            writeln!(file, "{},{:.6},{},{:.10e}", n, h, mode + 1, lambda)?;
        }
    }
    Ok(())
}
