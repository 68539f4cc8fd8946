//! Errors surfaced by tracker collaborators.

use devhub_logic::catalog::CatalogError;

/// Errors that can occur while tracking progress.
///
/// The engine itself never fails; every variant originates in a collaborator
/// or in loading configuration.
#[derive(Debug)]
pub enum TrackerError {
    /// Loading or saving a snapshot failed.
    Store(String),
    /// Reading or writing the activity ledger failed.
    Ledger(String),
    /// A notice could not be delivered.
    Notification(String),
    /// Engine configuration was rejected.
    Config(CatalogError),
}

impl From<CatalogError> for TrackerError {
    fn from(e: CatalogError) -> Self {
        TrackerError::Config(e)
    }
}

impl std::fmt::Display for TrackerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackerError::Store(e) => write!(f, "Snapshot store error: {}", e),
            TrackerError::Ledger(e) => write!(f, "Activity ledger error: {}", e),
            TrackerError::Notification(e) => write!(f, "Notification error: {}", e),
            TrackerError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for TrackerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackerError::Config(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
