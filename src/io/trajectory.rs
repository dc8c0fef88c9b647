//! Read/write trajectory JSON files.
//!
//! A trajectory file is the portable form of one solved model: the
//! parameters it was solved with plus the hourly solution, so it can be
//! re-plotted without re-solving. The schema is `domain::TrajectoryFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{GrowthParams, Trajectory, TrajectoryFile};
use crate::error::AppError;

/// Write a trajectory JSON file stamped with the current UTC time.
pub fn write_trajectory_json(path: &Path, params: &GrowthParams, trajectory: &Trajectory) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create trajectory JSON '{}': {e}", path.display())))?;

    let saved = TrajectoryFile {
        tool: "biofilm".to_string(),
        generated_at: Utc::now(),
        params: *params,
        trajectory: trajectory.clone(),
    };

    serde_json::to_writer_pretty(file, &saved)
        .map_err(|e| AppError::new(2, format!("Failed to write trajectory JSON: {e}")))?;

    Ok(())
}

/// Read a trajectory JSON file.
pub fn read_trajectory_json(path: &Path) -> Result<TrajectoryFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open trajectory JSON '{}': {e}", path.display())))?;
    let saved: TrajectoryFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid trajectory JSON: {e}")))?;

    if saved.trajectory.time_hours.len() != saved.trajectory.density_od.len() {
        return Err(AppError::new(
            2,
            format!(
                "Invalid trajectory JSON: {} times but {} densities",
                saved.trajectory.time_hours.len(),
                saved.trajectory.density_od.len()
            ),
        ));
    }
    Ok(saved)
}
