//! ASCII plotting for terminal output.
//!
//! Fixed-size character grid with deterministic output:
//! - line series (solved or fitted curves): `-`
//! - observed points: `o`

use crate::domain::{FitDataset, GrowthFit, TIME_END, TIME_START, Trajectory};

/// Render a solved biofilm trajectory as a line.
pub fn render_trajectory_plot(trajectory: &Trajectory, width: usize, height: usize) -> String {
    render_ascii_plot(&trajectory.points(), &[], width, height)
}

/// Render observations with the fitted exponential through them.
pub fn render_fit_plot(dataset: &FitDataset, fit: &GrowthFit, width: usize, height: usize) -> String {
    let points = dataset.points();
    let (t_min, t_max) = x_range(&[], &points).unwrap_or((TIME_START, TIME_END));
    let curve = sample_curve(|t| fit.predict(t), t_min, t_max, width.max(2));
    render_ascii_plot(&curve, &points, width, height)
}

/// Render a line series plus overlay points on a `width` x `height` grid.
///
/// Axis ranges cover both series; the y range is padded by 5%.
pub fn render_ascii_plot(line: &[(f64, f64)], points: &[(f64, f64)], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (t_min, t_max) = x_range(line, points).unwrap_or((TIME_START, TIME_END));
    let (y_min, y_max) = y_range(line, points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so points overlay it.
    draw_curve(&mut grid, line, t_min, t_max, y_min, y_max);

    for &(t, y) in points.iter().filter(|(t, y)| t.is_finite() && y.is_finite()) {
        let x = map_x(t, t_min, t_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: t=[{t_min:.3}, {t_max:.3}] hours | y=[{y_min:.3}, {y_max:.3}] OD\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn sample_curve(f: impl Fn(f64) -> f64, t_min: f64, t_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let t = t_min + u * (t_max - t_min);
            (t, f(t))
        })
        .collect()
}

fn x_range(line: &[(f64, f64)], points: &[(f64, f64)]) -> Option<(f64, f64)> {
    finite_range(line.iter().chain(points).map(|&(t, _)| t))
}

fn y_range(line: &[(f64, f64)], points: &[(f64, f64)]) -> Option<(f64, f64)> {
    finite_range(line.iter().chain(points).map(|&(_, y)| y))
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top of the plot.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t_min: f64, t_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve.iter().filter(|(t, y)| t.is_finite() && y.is_finite()) {
        let x = map_x(t, t_min, t_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, row, '-'),
            None => grid[row][x] = '-',
        }
        prev = Some((x, row));
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
