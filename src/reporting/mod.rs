//! Rendering of evaluation results. Reporters only read a finished
//! [`StationEvaluation`]; nothing here feeds back into the estimate.

pub mod csv;
#[cfg(feature = "plotting")]
pub mod plot;
pub mod summary;

use crate::config::RunConfig;
use crate::estimator::StationEvaluation;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to create output directory '{0}'")]
    OutputDir(PathBuf, #[source] std::io::Error),

    #[error("Failed to write report file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to persist report file '{0}'")]
    Persist(PathBuf, #[source] std::io::Error),

    #[error("Failed building report table: {0}")]
    Table(#[from] PolarsError),
}

/// Something that turns an evaluation into output: files, log lines, figures.
pub trait Reporter {
    fn render(&self, evaluation: &StationEvaluation, config: &RunConfig) -> Result<(), ReportError>;
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn render(&self, evaluation: &StationEvaluation, config: &RunConfig) -> Result<(), ReportError> {
        (**self).render(evaluation, config)
    }
}

pub(crate) fn ensure_output_dir(config: &RunConfig) -> Result<PathBuf, ReportError> {
    let dir = config.output_dir.clone();
    std::fs::create_dir_all(&dir).map_err(|e| ReportError::OutputDir(dir.clone(), e))?;
    Ok(dir)
}
