use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use membrane_solver::{
    build_mass_matrix, build_stiffness_matrix, configure_threads, solve_eigenproblem,
    write_convergence_csv, write_eigenvalues_csv, write_matrix_csv, write_mesh_csv,
    write_mode_csv, Coefficients, ConvergenceStudy, Mesh, SolverConfig, MIN_GRID_SIZE,
};

const DEFAULT_GRID_SIZE: usize = 50;
const DEFAULT_NUM_EIGENVALUES: usize = 10;
const DATA_DIR: &str = "data";

fn usage() {
    eprintln!("usage: membrane-cli [grid_size] [num_eigenvalues]");
    eprintln!("  grid_size        interior points per dimension (default {DEFAULT_GRID_SIZE}, min {MIN_GRID_SIZE})");
    eprintln!("  num_eigenvalues  modes to compute (default {DEFAULT_NUM_EIGENVALUES}, max grid_size²)");
}

/// Parse and validate the positional arguments before any pipeline
/// stage runs.
fn parse_args(args: &[String]) -> Result<(usize, usize), String> {
    let n = match args.first() {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| format!("invalid grid size '{raw}'"))?,
        None => DEFAULT_GRID_SIZE,
    };
    let k = match args.get(1) {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| format!("invalid eigenvalue count '{raw}'"))?,
        None => DEFAULT_NUM_EIGENVALUES,
    };

    if n < MIN_GRID_SIZE {
        return Err(format!("grid size N must be at least {MIN_GRID_SIZE}"));
    }
    if k < 1 {
        return Err("must compute at least 1 eigenvalue".to_string());
    }
    if k > n * n {
        return Err("cannot compute more eigenvalues than DOF".to_string());
    }
    Ok((n, k))
}

fn run(n: usize, k: usize) -> Result<(), String> {
    let start = Instant::now();

    println!("Configuration:");
    println!("  Grid size: {} x {}", n, n);
    println!("  Total DOF: {}", n * n);
    println!("  Eigenvalues to compute: {}\n", k);

    let config = SolverConfig::new(k);
    if configure_threads(config.num_threads) {
        println!("Solver thread pool: {} threads\n", config.num_threads);
    }

    let coeffs = Coefficients::default_membrane();
    let mesh = Mesh::generate(n, &coeffs).map_err(|e| e.to_string())?;
    println!("Mesh created with h = {:.6}", mesh.h);

    let data_dir = Path::new(DATA_DIR);
    std::fs::create_dir_all(data_dir)
        .map_err(|e| format!("failed to create {DATA_DIR}/: {e}"))?;
    write_mesh_csv(&mesh, &data_dir.join("mesh_data.csv")).map_err(|e| e.to_string())?;

    println!("\nBuilding stiffness matrix A...");
    let a = build_stiffness_matrix(&mesh);
    println!("A: {}", a.describe());

    println!("Building mass matrix B...");
    let b = build_mass_matrix(&mesh);
    println!("B: {}", b.describe());

    write_matrix_csv(&a, &data_dir.join("matrix_A_pattern.csv")).map_err(|e| e.to_string())?;
    write_matrix_csv(&b, &data_dir.join("matrix_B_pattern.csv")).map_err(|e| e.to_string())?;

    println!("\nSolving eigenvalue problem...");
    let results = solve_eigenproblem(&a, &b, &config).map_err(|e| e.to_string())?;
    if results.n_eigenvalues == 0 {
        return Err("eigenvalue solver produced no usable eigenpairs".to_string());
    }
    println!(
        "Solve completed in {:.3} s ({} iteration)",
        results.computation_time, results.iterations
    );

    println!("\nIndex    Eigenvalue    Frequency (Hz)");
    println!("-------------------------------------");
    for mode in 0..results.n_eigenvalues {
        println!(
            "{:3}    {:12.6}    {:8.3}",
            mode + 1,
            results.eigenvalues[mode],
            results.frequency_hz(mode).unwrap_or(0.0)
        );
    }

    write_eigenvalues_csv(&results, &data_dir.join("eigenvalues.csv"))
        .map_err(|e| e.to_string())?;

    let modes_to_save = results.n_eigenvalues.min(5);
    for mode in 0..modes_to_save {
        let filename = format!("mode_{:02}.csv", mode + 1);
        write_mode_csv(&mesh, &results.eigenvectors[mode], &data_dir.join(&filename))
            .map_err(|e| e.to_string())?;
    }

    println!("\nPerforming convergence analysis...");
    let study = ConvergenceStudy::new(&coeffs);
    let data = study.run(n).map_err(|e| e.to_string())?;
    if data.is_conclusive() {
        write_convergence_csv(&data, &data_dir.join("convergence.csv"))
            .map_err(|e| e.to_string())?;
    } else {
        println!("Insufficient data for convergence analysis");
    }

    let summary = serde_json::json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "grid_size": n,
        "total_dof": n * n,
        "h": mesh.h,
        "num_eigenvalues": results.n_eigenvalues,
        "eigenvalues": results.eigenvalues,
        "computation_time": results.computation_time,
        "convergence_resolutions_usable": data.usable(),
        "solver": "dense-cholesky-symmetric-eigen",
    });
    std::fs::write(
        data_dir.join("summary.json"),
        serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?,
    )
    .map_err(|e| e.to_string())?;

    println!(
        "\nTotal execution time: {:.2} s; results saved in '{}/'",
        start.elapsed().as_secs_f64(),
        DATA_DIR
    );
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") || args.len() > 2 {
        usage();
        return ExitCode::from(2);
    }

    let (n, k) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::from(1);
        }
    };

    match run(n, k) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(1)
        }
    }
}
