use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid payload: {0}")]
    Validation(String),

    #[error("Post update ignored as post was just updated.")]
    DuplicateUpdate,

    #[error("{vendor} call failed: {message}")]
    Vendor {
        vendor: &'static str,
        message: String,
    },

    #[error("Database error: {0}")]
    Persistence(String),
}

impl PipelineError {
    pub fn vendor(vendor: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Vendor {
            vendor,
            message: err.to_string(),
        }
    }
}
