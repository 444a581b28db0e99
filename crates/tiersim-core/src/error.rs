//! Error types for tiersim

use thiserror::Error;

/// Result type for simulator operations
pub type Result<T> = std::result::Result<T, TierSimError>;

/// Core error type for tiersim operations
///
/// Every variant except `Io` and `Json` is a validation error: the requested
/// action was refused and nothing was mutated.
#[derive(Error, Debug)]
pub enum TierSimError {
    #[error("Please enter a file name")]
    EmptyName,

    #[error("Invalid file size {0:?}: expected a whole number of MB")]
    InvalidSize(String),

    #[error("Please enter a file size in MB after the name")]
    MissingSize,

    #[error("Please enter valid size and duration")]
    InvalidEstimate,

    #[error("Please upload some files first")]
    NothingToAdvance,

    #[error("No files to {0}")]
    NoFiles(&'static str),

    #[error("File {0} not found")]
    FileNotFound(u64),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Invalid policy setting: {0}")]
    InvalidPolicy(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TierSimError {
    /// Create a command parse error
    pub fn command(msg: impl Into<String>) -> Self {
        Self::InvalidCommand(msg.into())
    }

    /// Create a policy setting error
    pub fn policy(msg: impl Into<String>) -> Self {
        Self::InvalidPolicy(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(TierSimError::EmptyName.to_string(), "Please enter a file name");
        assert_eq!(TierSimError::NoFiles("delete").to_string(), "No files to delete");
        assert_eq!(
            TierSimError::NothingToAdvance.to_string(),
            "Please upload some files first"
        );
        assert_eq!(
            TierSimError::InvalidSize("abc".into()).to_string(),
            "Invalid file size \"abc\": expected a whole number of MB"
        );
        assert_eq!(
            TierSimError::MissingSize.to_string(),
            "Please enter a file size in MB after the name"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: TierSimError = err.into();
        assert!(matches!(err, TierSimError::Json(_)));
    }
}
