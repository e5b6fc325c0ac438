use crate::config::RunConfig;
use crate::estimator::StationEvaluation;
use crate::reporting::{ensure_output_dir, ReportError, Reporter};
use log::info;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Writes three CSV tables into `RunConfig::output_dir`:
///
/// * `<prefix>-errors.csv`: one row of scalar error metrics,
/// * `<prefix>-monthly.csv`: per calendar month truth and estimate,
/// * `<prefix>-donors.csv`: every candidate donor with its QC verdict.
///
/// The prefix defaults to the station id. Each file is written to a
/// temporary file in the output directory first and then moved into place.
#[derive(Debug, Clone, Default)]
pub struct CsvReporter {
    prefix: Option<String>,
}

impl CsvReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn prefix<'a>(&'a self, evaluation: &'a StationEvaluation) -> &'a str {
        self.prefix.as_deref().unwrap_or(&evaluation.station_id)
    }
}

impl Reporter for CsvReporter {
    fn render(&self, evaluation: &StationEvaluation, config: &RunConfig) -> Result<(), ReportError> {
        let dir = ensure_output_dir(config)?;
        let prefix = self.prefix(evaluation);
        write_frame(&mut errors_frame(evaluation)?, &dir, &format!("{prefix}-errors.csv"))?;
        write_frame(&mut monthly_frame(evaluation)?, &dir, &format!("{prefix}-monthly.csv"))?;
        write_frame(&mut donors_frame(evaluation)?, &dir, &format!("{prefix}-donors.csv"))?;
        Ok(())
    }
}

pub fn errors_frame(evaluation: &StationEvaluation) -> PolarsResult<DataFrame> {
    let (x1r, se1r, se12) = evaluation
        .report
        .as_ref()
        .map(|r| (r.error_normal, r.error_standard_error, r.mean_difference_standard_error))
        .unwrap_or((f64::NAN, f64::NAN, f64::NAN));
    df!(
        "stationcode" => [evaluation.station_id.as_str()],
        "error_x1r" => [x1r],
        "error_SE1r" => [se1r],
        "error_SE12" => [se12],
        "error_long_run" => [evaluation.long_run.error],
    )
}

pub fn monthly_frame(evaluation: &StationEvaluation) -> PolarsResult<DataFrame> {
    let estimate = evaluation.estimate.normal.entries();
    let truth = evaluation.truth.map(|t| *t.entries());
    let month: Vec<u32> = estimate.iter().map(|(m, _)| m.number()).collect();
    let truth_mean: Vec<f64> = estimate
        .iter()
        .map(|(m, _)| truth.map_or(f64::NAN, |t| t[m].mean))
        .collect();
    let truth_se: Vec<f64> = estimate
        .iter()
        .map(|(m, _)| truth.map_or(f64::NAN, |t| t[m].standard_error))
        .collect();
    let estimate_mean: Vec<f64> = estimate.values().map(|e| e.mean).collect();
    let estimate_se: Vec<f64> = estimate.values().map(|e| e.standard_error).collect();
    let difference_se: Vec<f64> = evaluation.estimate.difference_standard_errors.values().copied().collect();
    let overlap: Vec<u64> = estimate.values().map(|e| e.count as u64).collect();
    df!(
        "month" => month,
        "truth_mean" => truth_mean,
        "truth_se" => truth_se,
        "estimate_mean" => estimate_mean,
        "estimate_se" => estimate_se,
        "difference_se" => difference_se,
        "overlap_count" => overlap,
    )
}

pub fn donors_frame(evaluation: &StationEvaluation) -> PolarsResult<DataFrame> {
    let a = &evaluation.assessments;
    df!(
        "stationcode" => a.iter().map(|d| d.station_id.as_str()).collect::<Vec<_>>(),
        "stationname" => a.iter().map(|d| d.station_name.as_str()).collect::<Vec<_>>(),
        "distance_km" => a.iter().map(|d| d.distance_km).collect::<Vec<_>>(),
        "min_overlap" => a.iter().map(|d| d.overlap_counts.values().min().copied().unwrap_or_default() as u64).collect::<Vec<_>>(),
        "min_baseline" => a.iter().map(|d| d.baseline_counts.values().min().copied().unwrap_or_default() as u64).collect::<Vec<_>>(),
        "admitted" => a.iter().map(|d| d.admitted).collect::<Vec<_>>(),
    )
}

fn write_frame(frame: &mut DataFrame, dir: &Path, file_name: &str) -> Result<PathBuf, ReportError> {
    let path = dir.join(file_name);
    let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| ReportError::Write(path.clone(), e))?;
    CsvWriter::new(temp_file.as_file_mut())
        .include_header(true)
        .finish(frame)?;
    temp_file
        .persist(&path)
        .map_err(|e| ReportError::Persist(path.clone(), e.error))?;
    info!("Wrote {} ({} rows)", path.display(), frame.height());
    Ok(path)
}
