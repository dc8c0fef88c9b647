//! Export a solved trajectory to CSV.
//!
//! Two columns, one row per grid point, easy to load into spreadsheets.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::Trajectory;
use crate::error::AppError;

/// Write `time_hours,density_od` rows to `path`.
pub fn write_trajectory_csv(path: &Path, trajectory: &Trajectory) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writeln!(file, "time_hours,density_od")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (t, b) in trajectory.points() {
        writeln!(file, "{t:.6},{b:.10}")
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("traj.csv");
        let traj = Trajectory {
            time_hours: vec![0.0, 1.0],
            density_od: vec![0.002, 0.005],
        };

        write_trajectory_csv(&path, &traj).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["time_hours,density_od", "0.000000,0.0020000000", "1.000000,0.0050000000"]);
    }

    #[test]
    fn missing_directory_is_exit_code_2() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("traj.csv");
        let err = write_trajectory_csv(&path, &Trajectory { time_hours: vec![], density_od: vec![] }).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
