/// Result alias used throughout the crate.
pub type KineticaResult<T> = Result<T, KineticaError>;

/// Crate-wide error type.
#[derive(thiserror::Error, Debug)]
pub enum KineticaError {
    /// Subscription to a timing band that was never registered.
    #[error("unknown timing signal \"{0}\": register it before subscribing")]
    UnknownSignal(String),

    /// Invalid input (configuration, geometry binding, frame ranges).
    #[error("validation error: {0}")]
    Validation(String),

    /// Scene lifecycle transition that is not allowed from the current state.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// Rasterization failure.
    #[error("render error: {0}")]
    Render(String),

    /// Frame sink / encoder failure.
    #[error("encode error: {0}")]
    Encode(String),

    /// Configuration (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KineticaError {
    /// Build an [`KineticaError::UnknownSignal`].
    pub fn unknown_signal(name: impl Into<String>) -> Self {
        Self::UnknownSignal(name.into())
    }

    /// Build a [`KineticaError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`KineticaError::Lifecycle`].
    pub fn lifecycle(msg: impl Into<String>) -> Self {
        Self::Lifecycle(msg.into())
    }

    /// Build a [`KineticaError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`KineticaError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`KineticaError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
