use thiserror::Error;

/// Errors raised by the background model.
///
/// Every fallible operation checks its preconditions before touching model
/// state, so an error never leaves a partially updated model behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Invalid creation parameters
    #[error("Invalid model configuration: {0}")]
    Configuration(String),

    /// Frame size differs from the model's grid
    #[error("Frame is {actual_width}x{actual_height}, model expects {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },

    /// Backing storage could not be reserved
    #[error("Failed to allocate {bytes} bytes for {what}")]
    Allocation { what: &'static str, bytes: usize },

    /// Frame buffer does not describe a valid strided pixel grid
    #[error("Invalid frame buffer: {0}")]
    InvalidFrame(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
