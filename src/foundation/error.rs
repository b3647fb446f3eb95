/// Convenience result type used across scrubline.
pub type ScrubResult<T> = Result<T, ScrubError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum ScrubError {
    /// Invalid registration or engine configuration. The element is never activated.
    #[error("configuration error: {0}")]
    Config(String),

    /// A trigger marker string could not be parsed or is not valid in its position.
    #[error("marker error: {0}")]
    Marker(String),

    /// Operation attempted on a component that has already been torn down.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// Errors when serializing or deserializing scenes and reports.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScrubError {
    /// Build a [`ScrubError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`ScrubError::Marker`] value.
    pub fn marker(msg: impl Into<String>) -> Self {
        Self::Marker(msg.into())
    }

    /// Build a [`ScrubError::Lifecycle`] value.
    pub fn lifecycle(msg: impl Into<String>) -> Self {
        Self::Lifecycle(msg.into())
    }

    /// Build a [`ScrubError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
