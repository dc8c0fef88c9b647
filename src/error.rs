//! Error types.
//!
//! Two layers:
//! - `ModelError`: typed failures of the numerical core (model construction,
//!   integration, curve fitting). Callers can match on the kind to show a
//!   field-specific message.
//! - `AppError`: what the binary reports (message + process exit code).

/// Failure of a numerical routine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// Structurally invalid or non-finite input, detected before computing.
    #[error("Invalid {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    /// Too few paired observations for a meaningful fit.
    #[error("Not enough data: {found} paired points supplied, at least {required} required.")]
    InsufficientData { found: usize, required: usize },

    /// The iterative solver gave up.
    #[error("Solver did not converge: {0}")]
    ConvergenceFailure(String),
}

impl ModelError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    /// Exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            ModelError::InvalidParameter { .. } => 2,
            ModelError::InsufficientData { .. } => 3,
            ModelError::ConvergenceFailure(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
