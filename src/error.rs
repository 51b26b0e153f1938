use thiserror::Error;

/// Commands the dashboard state refuses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    #[error("unknown filter column '{0}'")]
    InvalidColumn(String),

    #[error("no dataset named '{0}' in the catalog")]
    UnknownDataset(String),
}
