use inspection_types::InvalidRecord;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A photo could not be read or decoded; the compositor normally skips it
    #[error("Photo {photo_index} of rack {rack_id} unavailable: {reason}")]
    MissingAsset {
        rack_id: String,
        photo_index: usize,
        reason: String,
    },

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Page {0} does not exist")]
    PageOutOfRange(u32),

    #[error("PDF document error: {0}")]
    DocumentError(String),

    #[error("Invalid record: {0}")]
    Record(#[from] InvalidRecord),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}
