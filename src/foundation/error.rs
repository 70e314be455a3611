/// Convenience result type used across refcard.
pub type RefcardResult<T> = Result<T, RefcardError>;

/// Top-level error taxonomy.
///
/// Only `Validation`, `Serde` and `Other` normally escape a request: the rest are
/// recorded in the [`RequestLog`](crate::RequestLog) and the smallest failing unit
/// (a line, an action, an overlay, a render task) is dropped.
#[derive(thiserror::Error, Debug)]
pub enum RefcardError {
    /// Malformed token or number in an uploaded binding file.
    #[error("format error: {0}")]
    Format(String),

    /// Device, input or action absent from the reference model.
    #[error("unknown reference: {0}")]
    UnknownReference(String),

    /// Overlay rectangle out of bounds or unset.
    #[error("layout error: {0}")]
    Layout(String),

    /// Geometry the renderer cannot satisfy, e.g. a label taller than its box.
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// Invalid reference data or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when deserializing reference data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RefcardError {
    /// Build a [`RefcardError::Format`] value.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Build a [`RefcardError::UnknownReference`] value.
    pub fn unknown_reference(msg: impl Into<String>) -> Self {
        Self::UnknownReference(msg.into())
    }

    /// Build a [`RefcardError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`RefcardError::Invariant`] value.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Build a [`RefcardError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RefcardError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
