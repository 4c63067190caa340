/// Convenience result type used across backdrop.
pub type BackdropResult<T> = Result<T, BackdropError>;

/// Top-level error taxonomy used by the render pipeline and its collaborators.
#[derive(thiserror::Error, Debug)]
pub enum BackdropError {
    /// Invalid preferences, sizes or user-provided strings.
    #[error("validation error: {0}")]
    Validation(String),

    /// Faults while filling, resampling or compositing pixel buffers.
    #[error("render error: {0}")]
    Render(String),

    /// Shared display server failures (surface creation, publish, grab).
    ///
    /// These are recoverable: renderer state stays valid and a later apply retries.
    #[error("display error: {0}")]
    Display(String),

    /// Configuration loading and legacy store failures.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BackdropError {
    /// Build a [`BackdropError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BackdropError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`BackdropError::Display`] value.
    pub fn display(msg: impl Into<String>) -> Self {
        Self::Display(msg.into())
    }

    /// Build a [`BackdropError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True when the error came from the shared display and a retry may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Display(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
