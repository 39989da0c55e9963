//! The ingest -> render workflow behind `step-chart`.
//!
//! Ingest never fails (it reports on stdout and hands back an empty series);
//! the only error that escapes is a failed render.

use tracing::info;

use crate::domain::RunConfig;
use crate::error::AppError;
use crate::io::ingest;
use crate::plot::{ChartArtifact, render};

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A chart was written.
    Rendered(ChartArtifact),
    /// Nothing to plot: missing input or no usable rows. No file was written.
    NoData,
}

/// Ingest `config.input_path` and, if anything survived, render it.
pub fn run_pipeline(config: &RunConfig) -> Result<RunOutcome, AppError> {
    let series = ingest(&config.input_path);
    if series.is_empty() {
        info!(input = %config.input_path.display(), "no samples; skipping render");
        return Ok(RunOutcome::NoData);
    }

    let artifact = render(&series, &config.output_path)?;
    info!(
        path = %artifact.path().display(),
        series = artifact.series_count(),
        "run complete"
    );
    Ok(RunOutcome::Rendered(artifact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use plotters::prelude::IntoFont;
    use std::fs;
    use std::path::Path;

    const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    // Bitmap text goes through the system font lookup; hosts without a
    // sans-serif face cannot produce a real PNG.
    fn fonts_available() -> bool {
        ("sans-serif", 36).into_font().box_size("Avg BPM").is_ok()
    }

    fn assert_png_written(outcome: &RunOutcome, expected: &Path) {
        let RunOutcome::Rendered(artifact) = outcome else {
            panic!("expected a rendered chart, got {outcome:?}");
        };
        assert_eq!(artifact.path(), expected);
        let bytes = fs::read(artifact.path()).unwrap();
        assert!(bytes.starts_with(PNG_SIGNATURE));
    }

    fn config_in(dir: &Path, csv: Option<&str>) -> RunConfig {
        let input_path = dir.join("step_data.csv");
        if let Some(csv) = csv {
            fs::write(&input_path, csv).unwrap();
        }
        RunConfig {
            input_path,
            output_path: dir.join("visualised_data_from_csv.png"),
        }
    }

    #[test]
    fn missing_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), None);

        assert_eq!(run_pipeline(&config).unwrap(), RunOutcome::NoData);
        assert!(!config.output_path.exists());
    }

    #[test]
    fn sentinel_only_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), Some("Period,Intensity,AvgBPM,Temperature\n0,0,,\n"));

        assert_eq!(run_pipeline(&config).unwrap(), RunOutcome::NoData);
        assert!(!config.output_path.exists());
    }

    #[test]
    fn unparseable_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), Some("Period,Intensity,AvgBPM\nabc,5,100\n"));

        assert_eq!(run_pipeline(&config).unwrap(), RunOutcome::NoData);
        assert!(!config.output_path.exists());
    }

    #[test]
    fn empty_file_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), Some(""));

        assert_eq!(run_pipeline(&config).unwrap(), RunOutcome::NoData);
        assert!(!config.output_path.exists());
    }

    #[test]
    fn temperature_log_renders_three_series_png() {
        if !fonts_available() {
            eprintln!("skipping: no sans-serif font available");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(
            dir.path(),
            Some("Period,Intensity,AvgBPM,Temperature\n1000,5,120,20\n2000,0,,0\n"),
        );

        let outcome = run_pipeline(&config).unwrap();

        assert!(matches!(outcome, RunOutcome::Rendered(ChartArtifact::ThreeSeries { .. })));
        assert_png_written(&outcome, &config.output_path);
    }

    #[test]
    fn log_without_temperature_renders_two_series_png() {
        if !fonts_available() {
            eprintln!("skipping: no sans-serif font available");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), Some("Period,Intensity,AvgBPM\n500,10,130\n1000,12,135\n"));

        let outcome = run_pipeline(&config).unwrap();

        assert!(matches!(outcome, RunOutcome::Rendered(ChartArtifact::TwoSeries { .. })));
        assert_png_written(&outcome, &config.output_path);
    }

    #[test]
    fn unwritable_output_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path(), Some("Period,Intensity,AvgBPM\n500,10,130\n"));
        config.output_path = dir.path().join("no_such_dir").join("chart.png");

        let err = run_pipeline(&config).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Render);
        assert_eq!(err.exit_code(), 4);
        assert!(!config.output_path.exists());
    }
}
