//! Chart layout decided before anything is drawn.
//!
//! Everything here is plain data: axis ranges, labels and whether the
//! temperature axis exists. The drawing code in [`super::chart`] only reads it.

use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::domain::Series;

/// Fraction of the data span added above and below each axis range.
const RANGE_PADDING: f64 = 0.05;

/// Resolved axis ranges and labels for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlan {
    pub x_range: Range<f64>,
    pub x_label: String,
    pub intensity_range: Range<f64>,
    pub bpm_range: Range<f64>,
    /// `Some` only when at least one temperature reading is above zero.
    pub temperature_range: Option<Range<f64>>,
}

impl ChartPlan {
    /// Plan a chart for `series`, or `None` if there is nothing to plot.
    pub fn for_series(series: &Series) -> Option<Self> {
        let total = series.total_duration_s()?;

        let temperature_range = series
            .has_temperature()
            .then(|| padded_range(series.temperatures().iter().copied()));

        Some(Self {
            x_range: padded_range(series.times().iter().copied()),
            x_label: format!("Time (s) [Total: {total:.1}s]"),
            intensity_range: padded_range(series.intensities().iter().map(|&i| i as f64)),
            bpm_range: padded_range(series.bpms().iter().copied()),
            temperature_range,
        })
    }

    pub fn has_temperature_axis(&self) -> bool {
        self.temperature_range.is_some()
    }

    /// The artifact this plan produces once saved at `path`.
    pub fn artifact(&self, path: PathBuf) -> ChartArtifact {
        if self.has_temperature_axis() {
            ChartArtifact::ThreeSeries { path }
        } else {
            ChartArtifact::TwoSeries { path }
        }
    }
}

/// A chart written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartArtifact {
    /// Intensity and heart rate.
    TwoSeries { path: PathBuf },
    /// Intensity, heart rate and temperature.
    ThreeSeries { path: PathBuf },
}

impl ChartArtifact {
    pub fn path(&self) -> &Path {
        match self {
            ChartArtifact::TwoSeries { path } | ChartArtifact::ThreeSeries { path } => path,
        }
    }

    pub fn series_count(&self) -> usize {
        match self {
            ChartArtifact::TwoSeries { .. } => 2,
            ChartArtifact::ThreeSeries { .. } => 3,
        }
    }
}

/// Min/max of the finite values, widened by [`RANGE_PADDING`] on both ends.
///
/// A flat series gets a unit-wide range centred on its value, and a series
/// with no finite values falls back to `0..1`.
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }

    let span = hi - lo;
    if span <= 0.0 {
        return (lo - 0.5)..(hi + 0.5);
    }

    let pad = span * RANGE_PADDING;
    (lo - pad)..(hi + pad)
}

/// Linearly map `value` from one axis range onto another.
///
/// Used to draw a series on a coordinate system other than its own while its
/// own axis shows the original scale.
pub fn rescale(value: f64, from: &Range<f64>, to: &Range<f64>) -> f64 {
    let from_span = from.end - from.start;
    if from_span == 0.0 {
        return to.start;
    }
    let t = (value - from.start) / from_span;
    to.start + t * (to.end - to.start)
}
