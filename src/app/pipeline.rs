//! Shared workflow steps behind the CLI commands.
//!
//! Each step resolves inputs against the species catalog, runs the numerical
//! core and hands back plain values; printing stays in `app`.

use tracing::info;

use crate::cli::{BiofilmArgs, FitArgs, RateSource};
use crate::data::{SpeciesCatalog, SpeciesRecord, SyntheticSpec, parse_densities, synthetic_growth};
use crate::domain::{FitDataset, FitOptions, GrowthFit, GrowthParams, SolverOptions};
use crate::error::AppError;
use crate::fit::ExponentialFitter;
use crate::math::hourly_times_for;
use crate::models::GrowthModel;

/// Species used when no growth-rate source is given.
pub const DEFAULT_SPECIES: &str = "P. aeruginosa";

/// Outputs of one `biofilm model` run.
#[derive(Debug, Clone)]
pub struct ModelRun {
    pub label: String,
    pub model: GrowthModel,
}

/// Outputs of one `biofilm fit` run.
#[derive(Debug, Clone)]
pub struct FitRun {
    pub label: String,
    pub dataset: FitDataset,
    pub fit: GrowthFit,
}

/// Resolve the growth rate: explicit value, named species, or the default species.
pub fn resolve_growth_rate(catalog: &SpeciesCatalog, source: &RateSource) -> Result<(String, f64), AppError> {
    if let Some(k) = source.growth_rate {
        return Ok((format!("custom (k_b={k})"), k));
    }
    let name = source.species.as_deref().unwrap_or(DEFAULT_SPECIES);
    let record = catalog.require(name)?;
    Ok((record.name.clone(), record.growth_rate))
}

/// Build model parameters and solver options from CLI inputs.
pub fn model_inputs(
    catalog: &SpeciesCatalog,
    args: &BiofilmArgs,
    conc: f64,
) -> Result<(String, GrowthParams, SolverOptions), AppError> {
    let (label, growth_rate) = resolve_growth_rate(catalog, &args.rate)?;
    let params = GrowthParams {
        growth_rate,
        initial_state: args.initial,
        max_capacity: args.max_capacity,
        antibiotic_mic: args.mic,
        antibiotic_conc: conc,
    };
    let options = SolverOptions {
        rtol: args.rtol,
        atol: args.atol,
        ..SolverOptions::default()
    };
    options.validate()?;
    Ok((label, params, options))
}

/// Solve one biofilm model.
pub fn run_model(label: String, params: GrowthParams, options: &SolverOptions) -> Result<ModelRun, AppError> {
    let model = GrowthModel::with_options(params, options)?;
    info!(
        species = %label,
        growth_rate = params.growth_rate,
        final_density = model.solution().last().copied().unwrap_or(f64::NAN),
        "model solved"
    );
    Ok(ModelRun { label, model })
}

/// Fit a growth rate from a catalog species, entered data, or synthetic data.
///
/// With `args.name` set the fitted dataset is registered in `catalog`.
pub fn run_fit(catalog: &mut SpeciesCatalog, args: &FitArgs) -> Result<FitRun, AppError> {
    let options = FitOptions {
        initial_rate: args.initial_rate,
        max_iterations: args.max_iterations,
        ..FitOptions::default()
    };

    let (label, dataset) = fit_dataset(catalog, args)?;
    let fit = ExponentialFitter::from_dataset(dataset.clone())
        .with_options(options)
        .fit_report()?;
    info!(dataset = %label, growth_rate = fit.growth_rate, n = fit.n, "growth rate fitted");

    let label = match args.name.as_deref().map(str::trim) {
        Some("") => return Err(AppError::new(2, "Invalid name: please enter a bacteria name")),
        Some(name) => {
            catalog.insert(SpeciesRecord {
                name: name.to_string(),
                growth_rate: fit.growth_rate,
                dataset: dataset.clone(),
            });
            info!(species = name, "species registered");
            name.to_string()
        }
        None => label,
    };

    Ok(FitRun { label, dataset, fit })
}

fn fit_dataset(catalog: &SpeciesCatalog, args: &FitArgs) -> Result<(String, FitDataset), AppError> {
    if let Some(text) = &args.data {
        let densities = parse_densities(text)?;
        let end = match args.end {
            Some(end) => end,
            None => i64::try_from(densities.len() - 1)
                .ok()
                .and_then(|span| args.start.checked_add(span))
                .ok_or_else(|| AppError::new(2, "Invalid start time: hour window overflows"))?,
        };
        let times = hourly_times_for(args.start, end, densities.len())?;
        return Ok(("entered data".to_string(), FitDataset::new(times, densities)?));
    }

    if let Some(rate) = args.synthetic_rate {
        let spec = SyntheticSpec {
            growth_rate: rate,
            noise: args.noise,
            seed: args.seed,
            ..SyntheticSpec::default()
        };
        let dataset = synthetic_growth(&spec)?;
        return Ok((format!("synthetic (k_b={rate}, noise={}, seed={})", args.noise, args.seed), dataset));
    }

    let name = args.species.as_deref().unwrap_or(DEFAULT_SPECIES);
    let record = catalog.require(name)?;
    Ok((record.name.clone(), record.dataset.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn fit_args(argv: &[&str]) -> FitArgs {
        let mut full = vec!["fit"];
        full.extend_from_slice(argv);
        FitArgs::parse_from(full)
    }

    #[test]
    fn explicit_rate_beats_default_species() {
        let catalog = SpeciesCatalog::builtin();
        let (_, k) = resolve_growth_rate(&catalog, &RateSource { species: None, growth_rate: Some(0.3) }).unwrap();
        assert_eq!(k, 0.3);

        let (label, k) = resolve_growth_rate(&catalog, &RateSource { species: None, growth_rate: None }).unwrap();
        assert_eq!(label, DEFAULT_SPECIES);
        assert_eq!(k, 0.957);
    }

    #[test]
    fn unknown_species_is_exit_code_2() {
        let catalog = SpeciesCatalog::builtin();
        let err = resolve_growth_rate(
            &catalog,
            &RateSource {
                species: Some("E. coli".to_string()),
                growth_rate: None,
            },
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn entered_data_defaults_to_one_value_per_hour() {
        let mut catalog = SpeciesCatalog::builtin();
        let run = run_fit(&mut catalog, &fit_args(&["--data", "0.1 0.2 0.4 0.8", "--start", "2"])).unwrap();
        assert_eq!(run.dataset.times(), &[2.0, 3.0, 4.0, 5.0]);
        // The amplitude is the first value, applied at t = 0 rather than t = 2.
        assert!(run.fit.growth_rate.is_finite());
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn named_fit_registers_species() {
        let mut catalog = SpeciesCatalog::builtin();
        let run = run_fit(&mut catalog, &fit_args(&["--data", "0.1,0.2,0.4", "--name", "B. subtilis"])).unwrap();
        assert_eq!(run.label, "B. subtilis");
        let record = catalog.get("B. subtilis").unwrap();
        assert!((record.growth_rate - std::f64::consts::LN_2).abs() < 1e-4);
    }

    #[test]
    fn mismatched_window_is_rejected() {
        let mut catalog = SpeciesCatalog::builtin();
        let err = run_fit(&mut catalog, &fit_args(&["--data", "0.1 0.2 0.4", "--end", "5"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn extreme_hour_bounds_are_rejected() {
        let mut catalog = SpeciesCatalog::builtin();
        let max = i64::MAX.to_string();
        let err = run_fit(&mut catalog, &fit_args(&["--data", "0.1 0.2", "--end", max.as_str()])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let err = run_fit(&mut catalog, &fit_args(&["--data", "0.1 0.2", "--start", max.as_str()])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn single_value_is_insufficient() {
        let mut catalog = SpeciesCatalog::builtin();
        let err = run_fit(&mut catalog, &fit_args(&["--data", "0.1"])).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn model_run_uses_catalog_rate() {
        let catalog = SpeciesCatalog::builtin();
        let args = BiofilmArgs {
            rate: RateSource {
                species: Some("S. aereus".to_string()),
                growth_rate: None,
            },
            initial: 0.002,
            max_capacity: 1.75,
            mic: 0.0,
            rtol: 1e-6,
            atol: 1e-9,
        };
        let (label, params, options) = model_inputs(&catalog, &args, 0.0).unwrap();
        let run = run_model(label, params, &options).unwrap();
        assert_eq!(run.label, "S. aereus");
        assert_eq!(run.model.params().growth_rate, 0.386);
    }
}
