//! Formatted terminal output.
//!
//! All formatting lives here so the numerical code stays free of presentation
//! and output changes stay local to this module.

use crate::data::SpeciesCatalog;
use crate::domain::{GrowthFit, GrowthParams, Trajectory};
use crate::fit::SpeciesRefit;
use crate::models::{SweepRow, inhibition_coefficient};

/// Header block for a solved model.
pub fn format_model_summary(label: &str, params: &GrowthParams, trajectory: &Trajectory) -> String {
    let mut out = String::new();

    out.push_str("=== biofilm - Logistic Biofilm Growth ===\n");
    out.push_str(&format!("Organism: {label}\n"));
    out.push_str(&format!(
        "Params: k_b={:.4}/h | B0={:.4} OD | B_max={:.4} OD\n",
        params.growth_rate, params.initial_state, params.max_capacity
    ));
    out.push_str(&format!(
        "Antibiotic: MIC={:.4} | C={:.4} | theta={:.4}\n",
        params.antibiotic_mic,
        params.antibiotic_conc,
        inhibition_coefficient(params)
    ));
    if let (Some(last), Some(peak)) = (trajectory.final_density(), trajectory.peak_density()) {
        out.push_str(&format!("Result: final={last:.4} OD | peak={peak:.4} OD\n"));
    }
    out.push('\n');

    out
}

/// Hour-by-hour density table.
pub fn format_trajectory_table(trajectory: &Trajectory) -> String {
    let mut out = String::new();
    push_row(&mut out, format!("{:>8} {:>14}", "hour", "density_od"));
    push_row(&mut out, format!("{:-<8} {:-<14}", "", ""));
    for (t, b) in trajectory.points() {
        push_row(&mut out, format!("{t:>8.2} {b:>14.6}"));
    }
    out
}

/// Fit diagnostics for one dataset.
pub fn format_fit_summary(label: &str, fit: &GrowthFit) -> String {
    let mut out = String::new();

    out.push_str("=== biofilm - Exponential Growth Fit ===\n");
    out.push_str(&format!("Dataset: {label} (n={})\n", fit.n));
    out.push_str(&format!("Model: b(t) = {:.4} * exp(k_b * t)\n", fit.amplitude));
    out.push_str(&format!("Fitted k_b: {:.6} /h\n", fit.growth_rate));
    out.push_str(&format!(
        "SSE={:.6e} RMSE={:.6e} iterations={}\n",
        fit.sse, fit.rmse, fit.iterations
    ));

    out
}

/// Species catalog listing.
pub fn format_catalog(catalog: &SpeciesCatalog) -> String {
    let mut out = String::new();
    push_row(&mut out, format!("{:<24} {:>10} {:>6} {:>12}", "species", "k_b", "n", "hours"));
    push_row(&mut out, format!("{:-<24} {:-<10} {:-<6} {:-<12}", "", "", "", ""));

    for r in catalog.records() {
        let times = r.dataset.times();
        let hours = match (times.first(), times.last()) {
            (Some(a), Some(b)) => format!("{a:.0}..{b:.0}"),
            _ => String::new(),
        };
        push_row(
            &mut out,
            format!(
                "{:<24} {:>10.4} {:>6} {:>12}",
                truncate(&r.name, 24),
                r.growth_rate,
                r.dataset.len(),
                hours
            ),
        );
    }
    out
}

/// Stored versus refitted growth rates.
pub fn format_refits(refits: &[SpeciesRefit]) -> String {
    let mut out = String::new();
    push_row(&mut out, format!("{:<24} {:>10} {:>10} {:>12}", "species", "stored", "fitted", "rmse"));
    push_row(&mut out, format!("{:-<24} {:-<10} {:-<10} {:-<12}", "", "", "", ""));

    for r in refits {
        let row = match &r.fit {
            Ok(fit) => format!(
                "{:<24} {:>10.4} {:>10.4} {:>12.4e}",
                truncate(&r.name, 24),
                r.stored_rate,
                fit.growth_rate,
                fit.rmse
            ),
            Err(e) => format!("{:<24} {:>10.4} (failed) {e}", truncate(&r.name, 24), r.stored_rate),
        };
        push_row(&mut out, row);
    }
    out
}

/// Concentration sweep table.
pub fn format_sweep(params: &GrowthParams, rows: &[SweepRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Sweep: k_b={:.4}/h | MIC={:.4} | {} concentrations\n",
        params.growth_rate,
        params.antibiotic_mic,
        rows.len()
    ));
    push_row(&mut out, format!("{:>12} {:>14} {:>14}", "conc", "final_od", "peak_od"));
    push_row(&mut out, format!("{:-<12} {:-<14} {:-<14}", "", "", ""));
    for r in rows {
        push_row(
            &mut out,
            format!(
                "{:>12.4} {:>14.6} {:>14.6}",
                r.concentration, r.final_density, r.peak_density
            ),
        );
    }
    out
}

fn push_row(out: &mut String, row: String) {
    out.push_str(row.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitOptions;
    use crate::error::ModelError;
    use crate::fit::refit_catalog;

    #[test]
    fn trajectory_table_has_one_row_per_point() {
        let traj = Trajectory {
            time_hours: vec![0.0, 1.0],
            density_od: vec![0.002, 0.0051],
        };
        let txt = format_trajectory_table(&traj);
        let expected = concat!(
            "    hour     density_od\n",
            "-------- --------------\n",
            "    0.00       0.002000\n",
            "    1.00       0.005100\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn catalog_lists_species_in_order() {
        let txt = format_catalog(&SpeciesCatalog::builtin());
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].starts_with("P. aeruginosa"));
        assert!(lines[2].contains("0.9570"));
        assert!(lines[4].starts_with("S. aereus"));
        assert!(lines[4].ends_with("0..7"));
    }

    #[test]
    fn refit_failures_are_shown_inline() {
        let mut refits = refit_catalog(&SpeciesCatalog::builtin(), &FitOptions::default());
        refits[1].fit = Err(ModelError::InsufficientData { found: 1, required: 2 });

        let txt = format_refits(&refits);
        assert!(txt.lines().nth(3).unwrap().contains("(failed)"));
        assert!(!txt.lines().nth(2).unwrap().contains("(failed)"));
    }

    #[test]
    fn model_summary_shows_theta() {
        let params = GrowthParams {
            antibiotic_mic: 2.0,
            antibiotic_conc: 1.0,
            ..GrowthParams::untreated(1.0)
        };
        let traj = Trajectory {
            time_hours: vec![0.0],
            density_od: vec![0.002],
        };
        let txt = format_model_summary("custom", &params, &traj);
        assert!(txt.contains("theta=0.5000"));
        assert!(txt.contains("final=0.0020 OD"));
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
