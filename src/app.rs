//! Top-level application orchestration.
//!
//! `src/main.rs` only sets up logging; this module parses arguments, runs the
//! requested workflow and prints reports, plots and exports.

use clap::Parser;

use crate::cli::{Command, FitArgs, ModelArgs, PlotArgs, SpeciesArgs, SweepArgs};
use crate::data::SpeciesCatalog;
use crate::domain::FitOptions;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `biofilm` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    let mut catalog = SpeciesCatalog::builtin();

    match cli.command {
        Command::Model(args) => handle_model(&catalog, args),
        Command::Fit(args) => handle_fit(&mut catalog, args),
        Command::Species(args) => handle_species(&catalog, args),
        Command::Sweep(args) => handle_sweep(&catalog, args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_model(catalog: &SpeciesCatalog, args: ModelArgs) -> Result<(), AppError> {
    let (label, params, options) = pipeline::model_inputs(catalog, &args.biofilm, args.conc)?;
    let run = pipeline::run_model(label, params, &options)?;
    let trajectory = run.model.trajectory();

    println!("{}", crate::report::format_model_summary(&run.label, &params, &trajectory));
    println!("{}", crate::report::format_trajectory_table(&trajectory));

    if !args.no_plot {
        println!(
            "{}",
            crate::plot::render_trajectory_plot(&trajectory, args.width, args.height)
        );
    }

    if let Some(path) = &args.export_csv {
        crate::io::write_trajectory_csv(path, &trajectory)?;
    }
    if let Some(path) = &args.export_json {
        crate::io::write_trajectory_json(path, &params, &trajectory)?;
    }

    Ok(())
}

fn handle_fit(catalog: &mut SpeciesCatalog, args: FitArgs) -> Result<(), AppError> {
    let run = pipeline::run_fit(catalog, &args)?;

    println!("{}", crate::report::format_fit_summary(&run.label, &run.fit));

    if args.plot {
        println!(
            "{}",
            crate::plot::render_fit_plot(&run.dataset, &run.fit, args.width, args.height)
        );
    }

    if args.name.is_some() {
        println!("{}", crate::report::format_catalog(catalog));
    }

    Ok(())
}

fn handle_species(catalog: &SpeciesCatalog, args: SpeciesArgs) -> Result<(), AppError> {
    if args.refit {
        let refits = crate::fit::refit_catalog(catalog, &FitOptions::default());
        println!("{}", crate::report::format_refits(&refits));
    } else {
        println!("{}", crate::report::format_catalog(catalog));
    }
    Ok(())
}

fn handle_sweep(catalog: &SpeciesCatalog, args: SweepArgs) -> Result<(), AppError> {
    let (label, params, options) = pipeline::model_inputs(catalog, &args.biofilm, 0.0)?;
    let rows = crate::models::sweep_concentrations(&params, &args.conc, &options)?;
    tracing::info!(species = %label, n = rows.len(), "concentration sweep done");

    println!("Organism: {label}");
    println!("{}", crate::report::format_sweep(&params, &rows));
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let saved = crate::io::read_trajectory_json(&args.trajectory)?;
    println!(
        "Trajectory from {} at {} (k_b={:.4}/h)",
        saved.tool,
        saved.generated_at.to_rfc3339(),
        saved.params.growth_rate
    );
    println!(
        "{}",
        crate::plot::render_trajectory_plot(&saved.trajectory, args.width, args.height)
    );
    Ok(())
}
