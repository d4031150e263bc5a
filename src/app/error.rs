use crate::infra::clock::TimeFormatError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("store failure: {0}")]
    Store(#[from] sqlx::Error),
    #[error(transparent)]
    TimeFormat(#[from] TimeFormatError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Rejects blank or oversized text fields.
pub(crate) fn require_text(field: &str, value: &str, max_chars: usize) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(format!("{} cannot be empty", field)));
    }
    if value.chars().count() > max_chars {
        return Err(ServiceError::validation(format!(
            "{} must be at most {} characters",
            field, max_chars
        )));
    }
    Ok(())
}
