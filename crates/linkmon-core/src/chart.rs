//! PNG charts for a recorded run.
//!
//! One chart per field with data (`<column>.png`), each with horizontal
//! min/mean/max reference lines, plus `overview.png` with one panel per field.

use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{Error, Result};
use crate::sample::{Field, Sample};
use crate::summary::{FieldStats, Summary};

const FIELD_CHART_SIZE: (u32, u32) = (900, 300);
const OVERVIEW_SIZE: (u32, u32) = (1800, 1400);
const OVERVIEW_GRID: (usize, usize) = (4, 2);
const OVERVIEW_FILE: &str = "overview.png";

fn chart_err<E: std::fmt::Display>(e: E) -> Error {
    Error::chart(e.to_string())
}

/// `(row index, value)` for every row where `field` is present.
pub fn series(samples: &[Sample], field: Field) -> Vec<(usize, f64)> {
    samples
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.value(field).map(|v| (i, v)))
        .collect()
}

/// Y axis range with 10% headroom; flat series get a small band around the value.
pub fn y_bounds(stats: &FieldStats) -> (f64, f64) {
    let span = stats.max - stats.min;
    let pad = if span > 0.0 {
        span * 0.1
    } else {
        stats.min.abs().max(1.0) * 0.05
    };
    (stats.min - pad, stats.max + pad)
}

fn time_labels(samples: &[Sample]) -> Vec<String> {
    samples
        .iter()
        .map(|s| s.timestamp.format("%H:%M:%S").to_string())
        .collect()
}

/// Render all charts into `dir` (created if missing). Returns the files written.
pub fn render_charts(samples: &[Sample], summary: &Summary, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let labels = time_labels(samples);
    let mut written = Vec::new();

    for fs in &summary.fields {
        let Some(stats) = &fs.stats else {
            log::info!("{}: no valid data, chart skipped", fs.field.column());
            continue;
        };
        let path = dir.join(format!("{}.png", fs.field.column()));
        {
            let root = BitMapBackend::new(&path, FIELD_CHART_SIZE).into_drawing_area();
            root.fill(&WHITE).map_err(chart_err)?;
            let points = series(samples, fs.field);
            draw_field_panel(&root, fs.field, &points, stats, &labels, 22)?;
            root.present().map_err(chart_err)?;
        }
        written.push(path);
    }

    let overview = dir.join(OVERVIEW_FILE);
    render_overview(&overview, samples, summary, &labels)?;
    written.push(overview);

    log::info!("wrote {} charts to {}", written.len(), dir.display());
    Ok(written)
}

fn render_overview(
    path: &Path,
    samples: &[Sample],
    summary: &Summary,
    labels: &[String],
) -> Result<()> {
    let root = BitMapBackend::new(path, OVERVIEW_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;
    let root = root
        .titled(
            &format!("Wireless link overview ({} samples)", samples.len()),
            ("sans-serif", 30),
        )
        .map_err(chart_err)?;

    let panels = root.split_evenly(OVERVIEW_GRID);
    for (panel, fs) in panels.iter().zip(&summary.fields) {
        match &fs.stats {
            Some(stats) => {
                let points = series(samples, fs.field);
                draw_field_panel(panel, fs.field, &points, stats, labels, 18)?;
            }
            None => {
                panel
                    .titled(&format!("{} - no valid data", fs.field), ("sans-serif", 18))
                    .map_err(chart_err)?;
            }
        }
    }

    root.present().map_err(chart_err)?;
    Ok(())
}

fn draw_field_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    field: Field,
    points: &[(usize, f64)],
    stats: &FieldStats,
    labels: &[String],
    caption_size: u32,
) -> Result<()> {
    let x_max = labels.len().max(2) - 1;
    let (y_min, y_max) = y_bounds(stats);

    let mut chart = ChartBuilder::on(area)
        .caption(field.to_string(), ("sans-serif", caption_size))
        .margin(12)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(0..x_max, y_min..y_max)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|idx| labels.get(*idx).cloned().unwrap_or_default())
        .x_desc("Time (HH:MM:SS)")
        .y_desc(field.unit())
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
        .map_err(chart_err)?
        .label(field.label())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    // A single point draws no line segment.
    if points.len() == 1 {
        chart
            .draw_series(points.iter().map(|&p| Circle::new(p, 3, BLUE.filled())))
            .map_err(chart_err)?;
    }

    for (name, value, color) in [
        ("min", stats.min, GREEN),
        ("mean", stats.mean, BLACK),
        ("max", stats.max, RED),
    ] {
        chart
            .draw_series(LineSeries::new(
                vec![(0, value), (x_max, value)],
                color.stroke_width(1),
            ))
            .map_err(chart_err)?
            .label(format!("{name} {value:.2}"))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(chart_err)?;

    Ok(())
}
