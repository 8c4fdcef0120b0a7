use thiserror::Error;

/// Failure to turn a named geometry resource into a [`Shape`](crate::shape::Shape).
///
/// Any single failure aborts the aggregate shape-set load; there is no retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("Shape resource unavailable: {key}: {reason}")]
    ResourceUnavailable { key: String, reason: String },
    #[error("Shape resource contains no geometry: {key}")]
    NoGeometry { key: String },
}

impl LoadError {
    pub fn unavailable(key: impl Into<String>, reason: impl ToString) -> Self {
        LoadError::ResourceUnavailable {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// The resource identifier the error refers to.
    pub fn key(&self) -> &str {
        match self {
            LoadError::ResourceUnavailable { key, .. } => key,
            LoadError::NoGeometry { key } => key,
        }
    }
}
