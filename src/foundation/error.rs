/// Convenience result type used across solarwave.
pub type SolarResult<T> = Result<T, SolarError>;

/// Top-level error taxonomy.
///
/// `Data` and `Config` errors are deterministic and abort startup. `Render` errors are
/// transient: the clock reports them for the offending tick and keeps going.
#[derive(thiserror::Error, Debug)]
pub enum SolarError {
    /// Malformed or insufficient dataset.
    #[error("data error: {0}")]
    Data(String),

    /// Invalid timing or scene configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A render surface or sink failed for one frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SolarError {
    /// Build a [`SolarError::Data`] value.
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    /// Build a [`SolarError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`SolarError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SolarError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for errors that only affect a single frame.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Render(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
