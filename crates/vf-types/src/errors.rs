use thiserror::Error;

/// Main error type for the VoltForge system
#[derive(Error, Debug)]
pub enum VfError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Numeric degeneracy: {message}")]
    NumericDegeneracy { message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VfError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn degeneracy(message: impl Into<String>) -> Self {
        Self::NumericDegeneracy {
            message: message.into(),
        }
    }

    /// True for errors caused by the caller's arguments rather than by the
    /// evaluator or its environment.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, VfError::InvalidInput { .. })
    }
}

/// Result type alias for VoltForge operations
pub type VfResult<T> = Result<T, VfError>;

/// Macro for creating invalid-input errors
#[macro_export]
macro_rules! invalid_input {
    ($($arg:tt)*) => {
        $crate::VfError::InvalidInput { message: format!($($arg)*) }
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::VfError::Config(format!($($arg)*))
    };
}

/// Reject non-finite values with an `InvalidInput` naming the offending field.
pub fn ensure_finite(name: &str, value: f64) -> VfResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid_input!("{name} must be finite, got {value}"))
    }
}
