use thiserror::Error;

/// Reasons a record draft is rejected before it can reach a report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidRecord {
    #[error("Rack ID is required")]
    MissingRackId,

    #[error("Too many photos: {count} (at most {max} per record)")]
    TooManyPhotos { count: usize, max: usize },

    #[error("Unknown severity: {0:?}")]
    UnknownSeverity(String),

    #[error("Unknown component: {0:?}")]
    UnknownComponent(String),
}
