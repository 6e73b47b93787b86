//! # Error Types
//!
//! Custom error types for psxpad using `thiserror`.

use thiserror::Error;

/// Main error type for psxpad
#[derive(Debug, Error)]
pub enum PadError {
    /// Caller passed a value the protocol engine cannot act on
    /// (channel out of range, empty command, unsupported pad count).
    /// Recoverable: no bytes were put on the bus.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Bus-level fault reported by the transport. The bus state is unknown
    /// afterwards, so the session should end.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PadError {
    /// True when the error leaves the bus in an unknown state.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PadError::Transport(_))
    }
}

/// Result type alias for psxpad
pub type Result<T> = std::result::Result<T, PadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_failure_is_fatal() {
        assert!(PadError::Transport("bus busy".to_string()).is_fatal());
        assert!(!PadError::InvalidArgument("channel 3".to_string()).is_fatal());
    }

    #[test]
    fn test_error_messages() {
        let err = PadError::InvalidArgument("channel 2 out of range".to_string());
        assert_eq!(err.to_string(), "Invalid argument: channel 2 out of range");

        let err = PadError::Transport("ioctl failed".to_string());
        assert_eq!(err.to_string(), "Transport failure: ioctl failed");
    }
}
