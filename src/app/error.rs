use crate::storage::StoreError;

/// Failures surfaced by the catalog use cases.
///
/// Validation and not-found errors are detected before any write. Upstream errors carry the
/// collaborator's message; notification failures never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Image upload failed at index {index}: {message}")]
    ImageUpload { index: usize, message: String },

    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::Upstream(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
