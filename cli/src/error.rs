use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Client(#[from] stallion_client::Error),
    #[error(transparent)]
    Store(#[from] stallion_client::StoreError),
    #[error("Deadline cannot be parsed, use RFC 3339 (e.g. 2026-01-31T00:00:00Z)")]
    ParseDeadlineError,
    #[error("Distribution cannot be parsed from string, use position:percentage pairs")]
    ParseDistributionError,
    #[error("Could not determine a data directory, pass --path")]
    NoDataDir,
}

pub type Result<T> = core::result::Result<T, Error>;
