/// Errors that can occur across the Cadence engine.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate converts to `miette` diagnostics at the boundary.
///
/// # Examples
///
/// ```
/// use cadence_core::CadenceError;
///
/// let err = CadenceError::Config("scoring weights must sum to 1.0".into());
/// assert!(err.to_string().contains("sum to 1.0"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum CadenceError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Caller requested an insight type the composer does not implement.
    ///
    /// This is a programmer or configuration error and fails loudly instead
    /// of being silently skipped.
    #[error("unknown insight type: {0}")]
    UnknownInsightType(String),

    /// Structurally unusable input that cannot be repaired by defaulting.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CadenceError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = CadenceError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn unknown_insight_type_names_the_offender() {
        let err = CadenceError::UnknownInsightType("sentiment".into());
        assert_eq!(err.to_string(), "unknown insight type: sentiment");
    }
}
