use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read archive '{0}'")]
    ArchiveRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to decompress archive '{0}'")]
    Decompression(PathBuf, #[source] std::io::Error),

    #[error("Unsupported archive format '{0}' (expected .parquet, .csv or .csv.gz)")]
    UnsupportedFormat(PathBuf),

    #[error("Failed to stage decompressed archive in a temporary file")]
    TempFile(#[source] std::io::Error),

    #[error("Parsing error reading CSV archive '{path}'")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("Failed to scan parquet archive '{0}'")]
    ParquetScan(PathBuf, #[source] PolarsError),

    #[error("Missing required column '{0}' in archive")]
    MissingColumn(String),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    // Covers errors joining tokio blocking tasks
    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
