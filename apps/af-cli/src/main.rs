use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use af_config::{CaseSetup, ConfigResult, load_yaml};
use af_flow::FlowContext;
use af_mesh::{Geometry, SerialComm};
use af_solver::{IterationReport, Loads, RunSummary, StepReport, pressure_loads};
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "af-cli")]
#[command(about = "AeroFlow CLI - compressible RANS finite-volume solver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate case file syntax and values
    Validate {
        /// Path to the case YAML file
        case_path: PathBuf,
    },
    /// Show the resolved setup of a case
    Info {
        /// Path to the case YAML file
        case_path: PathBuf,
    },
    /// Run a case, steady or unsteady as the case file says
    Run {
        /// Path to the case YAML file
        case_path: PathBuf,
        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Include the per-iteration residual history in the report
        #[arg(long)]
        history: bool,
        /// Suppress the progress line
        #[arg(long)]
        quiet: bool,
    },
}

/// JSON report of one run.
#[derive(Serialize)]
struct RunReport {
    case: String,
    cells: usize,
    wall_time_s: f64,
    summary: RunSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    loads: Option<Loads>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    history: Vec<IterationReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    steps: Vec<StepReport>,
}

fn main() -> ConfigResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Info { case_path } => cmd_info(&case_path),
        Commands::Run {
            case_path,
            output,
            history,
            quiet,
        } => cmd_run(&case_path, output.as_deref(), history, quiet),
    }
}

fn cmd_validate(case_path: &Path) -> ConfigResult<()> {
    println!("Validating case: {}", case_path.display());
    let case = load_yaml(case_path)?;
    case.into_setup()?;
    println!("✓ Case is valid");
    Ok(())
}

fn cmd_info(case_path: &Path) -> ConfigResult<()> {
    let setup = load_yaml(case_path)?.into_setup()?;
    let mesh = &setup.mesh;
    println!("Case: {}", setup.name);
    println!(
        "  Mesh: {} cells, {} faces ({} internal)",
        mesh.n_cells(),
        mesh.n_faces(),
        mesh.n_internal_faces()
    );
    for patch in mesh.patches() {
        println!("    {:<6} {:?} ({} faces)", patch.name, patch.kind, patch.len());
    }
    let fs = setup.free_stream;
    println!(
        "  Free stream: p = {:.1} Pa, T = {:.2} K, U = ({:.2}, {:.2}, {:.2}) m/s",
        fs.p, fs.t, fs.u.x, fs.u.y, fs.u.z
    );
    println!("  Physics: {:?}, reconstruction {:?}", setup.flow.physics, setup.flow.reconstruction);
    println!("  Turbulence: {}", setup.turbulence);
    println!(
        "  Stages: {:?}, CFL {}, {:?} stepping",
        setup.solver.stages, setup.solver.cfl, setup.solver.stepping
    );
    match setup.solver.unsteady {
        Some(u) => println!(
            "  Unsteady: dt = {:e} s, {} steps, {} inner iterations, motion {:?}",
            u.dt, u.steps, u.inner_iterations, setup.motion
        ),
        None => println!(
            "  Steady: up to {} iterations, tolerance {:e}",
            setup.solver.max_iterations, setup.solver.tolerance
        ),
    }
    Ok(())
}

fn cmd_run(case_path: &Path, output: Option<&Path>, keep_history: bool, quiet: bool) -> ConfigResult<()> {
    let setup = load_yaml(case_path)?.into_setup()?;
    let comm = SerialComm;
    let mut solver = setup.build_solver(&comm)?;
    let CaseSetup {
        name,
        mut mesh,
        gas,
        motion,
        loads: loads_request,
        ..
    } = setup;
    info!(case = %name, cells = mesh.n_cells(), "starting run");

    let start = Instant::now();
    let mut history = Vec::new();
    let mut steps = Vec::new();
    let summary = if solver.options().unsteady.is_some() {
        let total = solver.options().unsteady.map_or(0, |u| u.steps);
        solver.run_unsteady(&mut mesh, &gas, &comm, motion, |s| {
            if !quiet {
                render_step(s, total);
            }
            if keep_history {
                history.push(s.last);
            }
            steps.push(*s);
        })?
    } else {
        let max = solver.options().max_iterations;
        let ctx = FlowContext::new(&mesh, &gas, &comm);
        solver.run_steady(&ctx, |r| {
            if !quiet {
                render_iteration(r, max);
            }
            if keep_history {
                history.push(*r);
            }
        })?
    };
    if !quiet {
        clear_progress_line();
    }
    let wall_time_s = start.elapsed().as_secs_f64();

    let loads = match &loads_request {
        Some(req) => {
            let ctx = FlowContext::new(&mesh, &gas, &comm);
            let patches: Vec<&str> = req.patches.iter().map(String::as_str).collect();
            Some(pressure_loads(
                &ctx,
                solver.flow(),
                &patches,
                req.reference_pressure,
                req.centre,
            )?)
        }
        None => None,
    };

    if summary.converged {
        println!("✓ Run finished: {}", name);
    } else {
        println!("! Run stopped before convergence: {}", name);
    }
    println!(
        "  Iterations: {}, physical steps: {}, wall time {:.2} s",
        summary.iterations, summary.physical_steps, wall_time_s
    );

    let report = RunReport {
        case: name,
        cells: mesh.n_cells(),
        wall_time_s,
        summary,
        loads,
        history,
        steps: if keep_history { steps } else { Vec::new() },
    };
    let json = serde_json::to_string_pretty(&report)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            println!("  Report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn progress_bar(fraction: f64) -> String {
    let width = 28usize;
    let filled = ((fraction * width as f64).round() as usize).min(width);
    format!("{}{}", "#".repeat(filled), "-".repeat(width.saturating_sub(filled)))
}

fn render_iteration(r: &IterationReport, max: usize) {
    let fraction = r.iteration as f64 / max.max(1) as f64;
    print!(
        "\r[{}] iter={:>6}  flow={:.3e}  turb={:.3e}  co_max={:.2}",
        progress_bar(fraction),
        r.iteration,
        r.flow_residual,
        r.turbulence_residual,
        r.courant_max
    );
    let _ = io::stdout().flush();
}

fn render_step(s: &StepReport, total: usize) {
    let fraction = s.step as f64 / total.max(1) as f64;
    print!(
        "\r[{}] {:>6.2}%  step={}  t={:.4e}s  inner={}  residual={:.3e}",
        progress_bar(fraction),
        fraction * 100.0,
        s.step,
        s.time,
        s.inner_iterations,
        s.last.residual()
    );
    let _ = io::stdout().flush();
}
