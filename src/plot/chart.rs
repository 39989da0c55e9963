//! Plotters-powered session chart.
//!
//! One shared time axis with up to three independently scaled y-axes:
//!
//! - left: step intensity as markers
//! - right: average heart rate as a line
//! - right, offset: temperature as a line with square markers (only when the
//!   session has temperature readings)
//!
//! Plotters has no native third y-axis. The temperature axis is drawn in its
//! own strip to the right of the main chart, aligned vertically with the main
//! plotting area, and the temperature values are mapped into the primary
//! coordinates so the line lands in the shared plotting area and shares the
//! single legend.

use std::path::Path;
use std::time::Instant;

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use tracing::info;

use crate::domain::Series;
use crate::error::AppError;
use crate::plot::layout::{ChartArtifact, ChartPlan, rescale};

pub const CHART_TITLE: &str = "Step Intensity, Avg BPM, and Temperature";
pub const INTENSITY_AXIS_LABEL: &str = "Intensity";
pub const INTENSITY_SERIES_LABEL: &str = "Step Intensity";
pub const BPM_LABEL: &str = "Avg BPM";
pub const TEMPERATURE_AXIS_LABEL: &str = "Temperature (°C)";
pub const TEMPERATURE_SERIES_LABEL: &str = "Temperature";

/// 12 x 7 inches at 300 DPI.
pub const CANVAS_SIZE: (u32, u32) = (3600, 2100);

const INTENSITY_COLOR: RGBColor = RGBColor(31, 119, 180); // blue
const BPM_COLOR: RGBColor = RGBColor(214, 39, 40); // red
const TEMPERATURE_COLOR: RGBColor = RGBColor(44, 160, 44); // green

const MARGIN: u32 = 40;
const X_LABEL_AREA: u32 = 140;
const Y_LABEL_AREA: u32 = 210;
/// Space between the heart-rate labels and the temperature axis line.
const TEMPERATURE_AXIS_GAP: u32 = 50;
const TEMPERATURE_PLOT_WIDTH: u32 = 4;
const TEMPERATURE_STRIP_WIDTH: u32 = TEMPERATURE_AXIS_GAP + TEMPERATURE_PLOT_WIDTH + Y_LABEL_AREA;

const MARKER_RADIUS: i32 = 11;
const SQUARE_HALF: i32 = 8;
const LINE_WIDTH: u32 = 6;
const LEGEND_SWATCH: i32 = 60;

fn title_font() -> FontDesc<'static> {
    ("sans-serif", 60).into_font()
}

fn desc_font() -> FontDesc<'static> {
    ("sans-serif", 46).into_font()
}

fn tick_font() -> FontDesc<'static> {
    ("sans-serif", 36).into_font()
}

fn legend_font() -> FontDesc<'static> {
    ("sans-serif", 38).into_font()
}

/// Render `series` to a PNG at `output_path`.
///
/// Fails on an empty series and on any drawing or file write error; there is
/// no fallback output.
pub fn render(series: &Series, output_path: &Path) -> Result<ChartArtifact, AppError> {
    let plan = ChartPlan::for_series(series)
        .ok_or_else(|| AppError::render("Cannot render a chart from an empty series."))?;

    let started = Instant::now();
    let root = BitMapBackend::new(output_path, CANVAS_SIZE).into_drawing_area();
    draw_chart(&root, series, &plan).map_err(|e| {
        AppError::render(format!("Failed to draw chart '{}': {e}", output_path.display()))
    })?;
    root.present().map_err(|e| {
        AppError::render(format!("Failed to write chart '{}': {e}", output_path.display()))
    })?;

    info!(
        path = %output_path.display(),
        samples = series.len(),
        temperature_axis = plan.has_temperature_axis(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "rendered chart"
    );
    println!("Saved plot to '{}'", output_path.display());

    Ok(plan.artifact(output_path.to_path_buf()))
}

/// Draw the whole figure onto `root`.
///
/// Generic over the backend so the layout can be exercised without a bitmap.
pub fn draw_chart<DB>(
    root: &DrawingArea<DB, Shift>,
    series: &Series,
    plan: &ChartPlan,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE)?;
    let body = root.titled(CHART_TITLE, title_font())?;

    let (main_area, temperature_strip) = if plan.has_temperature_axis() {
        let (width, _) = body.dim_in_pixel();
        let (main, strip) = body.split_horizontally(width.saturating_sub(TEMPERATURE_STRIP_WIDTH));
        (main, Some(strip))
    } else {
        (body, None)
    };

    let mut chart = ChartBuilder::on(&main_area)
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .right_y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(plan.x_range.clone(), plan.intensity_range.clone())?
        .set_secondary_coord(plan.x_range.clone(), plan.bpm_range.clone());

    // Grid, the shared time axis and the left tick labels. The axis
    // descriptions share one style per pass, so the colored intensity
    // description gets a second, mesh-less pass with identical tick labels.
    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .bold_line_style(&BLACK.mix(0.12))
        .x_desc(plan.x_label.as_str())
        .x_labels(12)
        .y_labels(10)
        .x_label_style(tick_font().color(&BLACK))
        .y_label_style(tick_font().color(&INTENSITY_COLOR))
        .axis_desc_style(desc_font().color(&BLACK))
        .draw()?;

    chart
        .configure_mesh()
        .disable_mesh()
        .y_desc(INTENSITY_AXIS_LABEL)
        .x_labels(12)
        .y_labels(10)
        .x_label_style(tick_font().color(&BLACK))
        .y_label_style(tick_font().color(&INTENSITY_COLOR))
        .axis_desc_style(desc_font().color(&INTENSITY_COLOR))
        .draw()?;

    chart
        .configure_secondary_axes()
        .y_desc(BPM_LABEL)
        .y_labels(10)
        .label_style(tick_font().color(&BPM_COLOR))
        .axis_desc_style(desc_font().color(&BPM_COLOR))
        .draw()?;

    chart
        .draw_series(
            series
                .times()
                .iter()
                .zip(series.intensities())
                .map(|(&t, &i)| Circle::new((t, i as f64), MARKER_RADIUS, INTENSITY_COLOR.mix(0.7).filled())),
        )?
        .label(INTENSITY_SERIES_LABEL)
        .legend(|(x, y)| Circle::new((x + LEGEND_SWATCH / 2, y), MARKER_RADIUS, INTENSITY_COLOR.filled()));

    chart
        .draw_secondary_series(LineSeries::new(
            series
                .times()
                .iter()
                .copied()
                .zip(series.bpms().iter().copied())
                .filter(|(_, bpm)| bpm.is_finite()),
            BPM_COLOR.mix(0.8).stroke_width(LINE_WIDTH),
        ))?
        .label(BPM_LABEL)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + LEGEND_SWATCH, y)], BPM_COLOR.stroke_width(LINE_WIDTH)));

    if let Some(temperature_range) = &plan.temperature_range {
        let points: Vec<(f64, f64)> = series
            .times()
            .iter()
            .zip(series.temperatures())
            .filter(|(_, temp)| temp.is_finite())
            .map(|(&t, &temp)| (t, rescale(temp, temperature_range, &plan.intensity_range)))
            .collect();

        chart
            .draw_series(LineSeries::new(
                points.iter().copied(),
                TEMPERATURE_COLOR.stroke_width(LINE_WIDTH),
            ))?
            .label(TEMPERATURE_SERIES_LABEL)
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + LEGEND_SWATCH, y)], TEMPERATURE_COLOR.stroke_width(LINE_WIDTH))
            });

        chart.draw_series(points.iter().map(|&p| {
            EmptyElement::at(p)
                + Rectangle::new(
                    [(-SQUARE_HALF, -SQUARE_HALF), (SQUARE_HALF, SQUARE_HALF)],
                    TEMPERATURE_COLOR.filled(),
                )
        }))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .margin(20)
        .legend_area_size(LEGEND_SWATCH + 20)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK.mix(0.3))
        .label_font(legend_font().color(&BLACK))
        .draw()?;

    if let (Some(strip), Some(temperature_range)) = (&temperature_strip, &plan.temperature_range) {
        draw_temperature_axis(strip, temperature_range.clone())?;
    }

    Ok(())
}

/// Draw the offset temperature axis in `strip`.
///
/// The strip reserves the same space above and below as the main chart (its
/// bottom margin covers the main chart's time labels), so the two plotting
/// areas share their vertical extent. With no x label area, no x axis is drawn.
fn draw_temperature_axis<DB>(
    strip: &DrawingArea<DB, Shift>,
    range: std::ops::Range<f64>,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
{
    let mut axis = ChartBuilder::on(strip)
        .margin_top(MARGIN)
        .margin_bottom(MARGIN + X_LABEL_AREA)
        .margin_left(TEMPERATURE_AXIS_GAP)
        .right_y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(0.0..1.0, range)?;

    axis.configure_mesh()
        .disable_mesh()
        .y_desc(TEMPERATURE_AXIS_LABEL)
        .y_labels(10)
        .label_style(tick_font().color(&TEMPERATURE_COLOR))
        .axis_desc_style(desc_font().color(&TEMPERATURE_COLOR))
        .axis_style(&TEMPERATURE_COLOR)
        .draw()?;

    Ok(())
}
