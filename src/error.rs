use crate::config::ConfigError;
use crate::reporting::ReportError;
use crate::stations::error::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BaselineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Station '{0}' is not in the catalog")]
    UnknownStation(String),

    #[error("Background evaluation task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
