//! Visualization tools for imported spheres.
//!
//! Renders a 2D scatter plot (x vs y) of sphere centers using the plotters
//! library, colored by the derived scalar colors when present.

use std::path::Path;

use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::core::colormap::to_rgba8;
use crate::core::stream::Sphere;

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("Nothing to plot")]
    EmptyPointCloud,

    #[error("array length mismatch: {spheres_len} spheres, {colors_len} colors")]
    LengthMismatch { spheres_len: usize, colors_len: usize },
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Default plot width in pixels.
const DEFAULT_WIDTH: u32 = 1920;

/// Default plot height in pixels.
const DEFAULT_HEIGHT: u32 = 1080;

/// Cornflower blue, used when spheres have no colors.
const DEFAULT_COLOR: (u8, u8, u8) = (100, 149, 237);

/// Plot sphere centers (x vs y) and save as PNG.
///
/// # Arguments
///
/// * `output_path` - Path to save the PNG image
/// * `spheres` - Spheres to plot
/// * `colors` - Optional per-sphere RGBA colors in unit range
/// * `max_points` - Maximum number of points to plot (subsamples if exceeded)
/// * `alpha` - Alpha/transparency value for points (0.0 to 1.0)
pub fn plot_spheres(
    output_path: &Path,
    spheres: &[Sphere],
    colors: Option<&[[f32; 4]]>,
    max_points: usize,
    alpha: f32,
) -> Result<()> {
    if spheres.is_empty() || max_points == 0 {
        return Err(VisualizationError::EmptyPointCloud);
    }
    if let Some(c) = colors {
        if c.len() != spheres.len() {
            return Err(VisualizationError::LengthMismatch {
                spheres_len: spheres.len(),
                colors_len: c.len(),
            });
        }
    }

    let n = spheres.len();

    // Compute subsampling step
    let step = if n > max_points { n / max_points } else { 1 };
    let alpha_f64 = alpha.clamp(0.0, 1.0) as f64;

    let points: Vec<(f32, f32, RGBAColor)> = (0..n)
        .step_by(step)
        .map(|i| {
            let [x, y, _] = spheres[i].position;
            let (r, g, b) = match colors {
                Some(c) => {
                    let [r, g, b, _] = to_rgba8(c[i]);
                    (r, g, b)
                }
                None => DEFAULT_COLOR,
            };
            (x, y, RGBAColor(r, g, b, alpha_f64))
        })
        .filter(|(x, y, _)| x.is_finite() && y.is_finite())
        .collect();

    // Compute bounds with padding
    let (x_min, x_max, y_min, y_max) = compute_bounds(&points);
    let x_padding = (x_max - x_min) * 0.05;
    let y_padding = (y_max - y_min) * 0.05;

    let root = BitMapBackend::new(output_path, (DEFAULT_WIDTH, DEFAULT_HEIGHT))
        .into_drawing_area();

    root.fill(&WHITE).map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(
            (x_min - x_padding)..(x_max + x_padding),
            (y_min - y_padding)..(y_max + y_padding),
        )
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .draw_series(
            points
                .iter()
                .map(|(x, y, color)| Circle::new((*x, *y), 2, color.filled())),
        )
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    root.present().map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(())
}

/// Compute the bounds (min/max) for x and y coordinates.
///
/// Non-finite coordinates are skipped. Degenerate or empty axes are
/// widened by one unit on each side.
fn compute_bounds(points: &[(f32, f32, RGBAColor)]) -> (f32, f32, f32, f32) {
    let mut x_min = f32::MAX;
    let mut x_max = f32::MIN;
    let mut y_min = f32::MAX;
    let mut y_max = f32::MIN;

    for (x, y, _) in points {
        if x.is_finite() {
            x_min = x_min.min(*x);
            x_max = x_max.max(*x);
        }
        if y.is_finite() {
            y_min = y_min.min(*y);
            y_max = y_max.max(*y);
        }
    }

    if x_min > x_max {
        (x_min, x_max) = (0.0, 0.0);
    }
    if y_min > y_max {
        (y_min, y_max) = (0.0, 0.0);
    }

    if (x_max - x_min).abs() < f32::EPSILON {
        x_min -= 1.0;
        x_max += 1.0;
    }
    if (y_max - y_min).abs() < f32::EPSILON {
        y_min -= 1.0;
        y_max += 1.0;
    }

    (x_min, x_max, y_min, y_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_plot_spheres_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spheres.png");
        let spheres = vec![
            Sphere::new([0.0, 0.0, 0.0], 0.1),
            Sphere::new([1.0, 2.0, 0.0], 0.1),
        ];
        let colors = [[1.0, 0.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0]];

        plot_spheres(&path, &spheres, Some(&colors), 100, 0.5).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_plot_empty_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.png");

        let result = plot_spheres(&path, &[], None, 100, 0.5);

        assert!(matches!(result, Err(VisualizationError::EmptyPointCloud)));
    }

    #[test]
    fn test_compute_bounds_pads_degenerate_axes() {
        let points = vec![(3.0, 4.0, RGBAColor(0, 0, 0, 1.0))];
        assert_eq!(compute_bounds(&points), (2.0, 4.0, 3.0, 5.0));
    }

    #[test]
    fn test_compute_bounds_skips_non_finite() {
        let black = RGBAColor(0, 0, 0, 1.0);
        let points = vec![
            (0.0, 0.0, black),
            (f32::NAN, 10.0, black),
            (4.0, f32::INFINITY, black),
            (f32::NEG_INFINITY, 2.0, black),
        ];
        assert_eq!(compute_bounds(&points), (0.0, 4.0, 0.0, 10.0));

        let points = vec![(f32::NAN, f32::INFINITY, black)];
        assert_eq!(compute_bounds(&points), (-1.0, 1.0, -1.0, 1.0));
    }

    #[test]
    fn test_plot_skips_non_finite_positions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mixed.png");
        let spheres = vec![
            Sphere::new([0.0, 0.0, 0.0], 0.1),
            Sphere::new([f32::INFINITY, 1.0, 0.0], 0.1),
            Sphere::new([1.0, f32::NAN, 0.0], 0.1),
            Sphere::new([2.0, 3.0, 0.0], 0.1),
        ];

        plot_spheres(&path, &spheres, None, 100, 1.0).unwrap();

        assert!(path.exists());
    }
}
