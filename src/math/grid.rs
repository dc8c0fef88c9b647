//! Evenly spaced evaluation grids.

use crate::error::ModelError;

/// `n` evenly spaced points from `start` to `end`, both included.
///
/// The end point is set exactly (no accumulated rounding).
pub fn linspace(start: f64, end: f64, n: usize) -> Result<Vec<f64>, ModelError> {
    if !(start.is_finite() && end.is_finite()) {
        return Err(ModelError::invalid(
            "time grid",
            format!("bounds must be finite, got [{start}, {end}]"),
        ));
    }
    if n < 2 {
        return Err(ModelError::invalid("time grid", "needs at least 2 points"));
    }

    let step = (end - start) / (n as f64 - 1.0);
    let mut out: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
    out[n - 1] = end;
    Ok(out)
}

/// Whole hours `start..=end`, as used for sampled growth curves.
pub fn hourly_times(start: i64, end: i64) -> Result<Vec<f64>, ModelError> {
    let count = hour_count(start, end)?;
    let mut out = Vec::new();
    out.try_reserve_exact(count).map_err(|_| {
        ModelError::invalid("end time", format!("window {start}..={end} is too long"))
    })?;
    out.extend((start..=end).map(|h| h as f64));
    Ok(out)
}

/// Whole hours `start..=end` for exactly `expected` observations.
///
/// The window length is checked before anything is allocated.
pub fn hourly_times_for(start: i64, end: i64, expected: usize) -> Result<Vec<f64>, ModelError> {
    let count = hour_count(start, end)?;
    if count != expected {
        return Err(ModelError::invalid(
            "data",
            format!("{expected} values supplied for {count} hours ({start}..={end})"),
        ));
    }
    hourly_times(start, end)
}

fn hour_count(start: i64, end: i64) -> Result<usize, ModelError> {
    if end < start {
        return Err(ModelError::invalid(
            "end time",
            format!("must not be before the start time ({end} < {start})"),
        ));
    }
    end.checked_sub(start)
        .and_then(|span| usize::try_from(span).ok())
        .and_then(|span| span.checked_add(1))
        .ok_or_else(|| ModelError::invalid("end time", format!("window {start}..={end} is too long")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_hits_both_ends() {
        let t = linspace(0.0, 24.0, 25).unwrap();
        assert_eq!(t.len(), 25);
        assert_eq!(t[0], 0.0);
        assert_eq!(t[24], 24.0);
        for (i, v) in t.iter().enumerate() {
            assert!((v - i as f64).abs() < 1e-12);
        }
    }

    #[test]
    fn linspace_rejects_single_point() {
        assert!(linspace(0.0, 1.0, 1).is_err());
    }

    #[test]
    fn hourly_times_inclusive() {
        assert_eq!(hourly_times(2, 5).unwrap(), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(hourly_times(3, 3).unwrap(), vec![3.0]);
        assert!(hourly_times(5, 2).is_err());
    }

    #[test]
    fn huge_window_is_an_error_not_a_panic() {
        assert!(matches!(
            hourly_times(i64::MIN, i64::MAX),
            Err(ModelError::InvalidParameter { field: "end time", .. })
        ));
        assert!(hourly_times(0, i64::MAX).is_err());
        assert!(matches!(
            hourly_times_for(0, i64::MAX, 3),
            Err(ModelError::InvalidParameter { field: "data", .. })
        ));
    }

    #[test]
    fn window_must_match_value_count() {
        assert_eq!(hourly_times_for(1, 3, 3).unwrap(), vec![1.0, 2.0, 3.0]);
        assert!(hourly_times_for(1, 3, 2).is_err());
    }
}
