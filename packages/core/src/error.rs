//! Error types for decoding job descriptors.

/// Reasons an inbound creation body yields no job.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("Empty job description")]
    Empty,

    #[error("Malformed job description: {0}")]
    Json(#[from] serde_json::Error),
}
