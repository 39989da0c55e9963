//! Shared domain types.
//!
//! These are the values handed from the ingest stage to the renderer:
//!
//! - validated per-step points (`Sample`)
//! - the aligned column set built from them (`Series`)
//! - the run configuration (`RunConfig`)

use std::path::PathBuf;

/// Input file read when nothing else is configured.
pub const DEFAULT_INPUT_PATH: &str = "step_data.csv";

/// Image written when nothing else is configured.
pub const DEFAULT_OUTPUT_PATH: &str = "visualised_data_from_csv.png";

/// One validated step of an exercise session.
///
/// `time_s` is the elapsed time at the *end* of the step, i.e. the running sum
/// of all step periods up to and including this one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time_s: f64,
    pub intensity: i64,
    pub bpm: f64,
    pub temperature: f64,
}

/// Ordered samples stored column-wise.
///
/// The four columns always have the same length: the only way to grow a
/// `Series` is [`Series::push`], which appends a whole `Sample`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    times: Vec<f64>,
    intensities: Vec<i64>,
    bpms: Vec<f64>,
    temperatures: Vec<f64>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: Sample) {
        self.times.push(sample.time_s);
        self.intensities.push(sample.intensity);
        self.bpms.push(sample.bpm);
        self.temperatures.push(sample.temperature);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Elapsed seconds per sample.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn intensities(&self) -> &[i64] {
        &self.intensities
    }

    pub fn bpms(&self) -> &[f64] {
        &self.bpms
    }

    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    /// Elapsed time of the last sample, i.e. the session length.
    pub fn total_duration_s(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Whether any sample carries a real (positive) temperature reading.
    pub fn has_temperature(&self) -> bool {
        self.temperatures.iter().any(|&t| t > 0.0)
    }
}

impl FromIterator<Sample> for Series {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        let mut series = Series::new();
        for sample in iter {
            series.push(sample);
        }
        series
    }
}

/// Resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time_s: f64, temperature: f64) -> Sample {
        Sample {
            time_s,
            intensity: 3,
            bpm: 110.0,
            temperature,
        }
    }

    #[test]
    fn series_columns_stay_aligned() {
        let series: Series = [sample(1.0, 0.0), sample(2.5, 21.0)].into_iter().collect();

        assert_eq!(series.len(), 2);
        assert_eq!(series.times(), &[1.0, 2.5]);
        assert_eq!(series.intensities(), &[3, 3]);
        assert_eq!(series.bpms(), &[110.0, 110.0]);
        assert_eq!(series.temperatures(), &[0.0, 21.0]);
        assert_eq!(series.total_duration_s(), Some(2.5));
    }

    #[test]
    fn temperature_needs_a_strictly_positive_reading() {
        let flat: Series = [sample(1.0, 0.0), sample(2.0, -4.0)].into_iter().collect();
        assert!(!flat.has_temperature());

        let warm: Series = [sample(1.0, 0.0), sample(2.0, 0.1)].into_iter().collect();
        assert!(warm.has_temperature());

        assert!(!Series::new().has_temperature());
        assert_eq!(Series::new().total_duration_s(), None);
    }
}
