//! Artifact rasterization
//!
//! Minimal renderers for the disk artifacts: a heatmap for matrix-shaped
//! data and a line series for the lag trend. Axis styling and annotation
//! belong to external tooling; these draw the data and nothing else.

use std::error::Error as StdError;
use std::path::Path;

use plotters::prelude::*;

use crate::error::{Error, Result};

/// Render a row-major matrix as a heatmap. Row 0 is drawn at the top.
pub fn heatmap(path: &Path, data: &[f32], rows: usize, cols: usize) -> Result<()> {
    draw_heatmap(path, data, rows, cols).map_err(|e| Error::Render(e.to_string()))
}

/// Render a value series as a line plot.
pub fn series(path: &Path, values: &[f32]) -> Result<()> {
    draw_series(path, values).map_err(|e| Error::Render(e.to_string()))
}

fn draw_heatmap(
    path: &Path,
    data: &[f32],
    rows: usize,
    cols: usize,
) -> std::result::Result<(), Box<dyn StdError>> {
    if data.len() != rows * cols || rows == 0 || cols == 0 {
        return Err("heatmap data does not match its dimensions".into());
    }

    // Scale small matrices up to a readable canvas.
    let scale = (512 / rows.max(cols)).max(1) as u32;
    let width = cols as u32 * scale;
    let height = rows as u32 * scale;

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart =
        ChartBuilder::on(&root).build_cartesian_2d(0.0..cols as f64, 0.0..rows as f64)?;

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &value in data {
        if value.is_finite() {
            min = min.min(value);
            max = max.max(value);
        }
    }
    if !min.is_finite() {
        min = 0.0;
        max = 0.0;
    }
    let span = (max - min).max(1e-12) as f64;
    let floor = min as f64;

    chart.draw_series((0..rows).flat_map(|r| {
        (0..cols).map(move |c| {
            let value = data[r * cols + c];
            let value = if value.is_finite() { value as f64 } else { floor };
            let t = (value - floor) / span;
            let y0 = (rows - r) as f64;
            let y1 = (rows - r - 1) as f64;
            Rectangle::new(
                [(c as f64, y0), ((c + 1) as f64, y1)],
                jet_colormap(t).filled(),
            )
        })
    }))?;

    root.present()?;
    Ok(())
}

fn draw_series(path: &Path, values: &[f32]) -> std::result::Result<(), Box<dyn StdError>> {
    let root = BitMapBackend::new(path, (640, 360)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut min = 0.0f64;
    let mut max = 0.0f64;
    for &value in values {
        if value.is_finite() {
            min = min.min(value as f64);
            max = max.max(value as f64);
        }
    }
    if max - min < 1e-9 {
        max = min + 1.0;
    }
    let x_max = values.len().saturating_sub(1).max(1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(0.0..x_max, min..max)?;

    chart.draw_series(LineSeries::new(
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, &v)| (i as f64, v as f64)),
        &BLUE,
    ))?;

    root.present()?;
    Ok(())
}

/// Jet-style value-to-color ramp for `t` in `[0, 1]`.
fn jet_colormap(t: f64) -> RGBColor {
    let four_t = 4.0 * t.clamp(0.0, 1.0);
    let r = (1.5 - (four_t - 3.0).abs()).clamp(0.0, 1.0);
    let g = (1.5 - (four_t - 2.0).abs()).clamp(0.0, 1.0);
    let b = (1.5 - (four_t - 1.0).abs()).clamp(0.0, 1.0);
    RGBColor((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}
