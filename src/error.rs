// Error types for capture-source binding
//
// Only resource acquisition can fail in this engine: an invalid session
// handle is a defined no-op, and malformed or empty capture buffers are
// neutral ticks, never errors. Everything here degrades to "no analysis"
// rather than propagating into the capture thread.

use std::fmt;

/// Errors raised when binding the engine to a capture source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The capture source refused to bind the session handle
    BindFailed { reason: String },

    /// Audio capture permission was denied by the platform
    PermissionDenied,

    /// The capture source is already serving another client
    SourceBusy,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::BindFailed { reason } => {
                write!(f, "failed to bind capture session: {}", reason)
            }
            CaptureError::PermissionDenied => {
                write!(f, "audio capture permission denied")
            }
            CaptureError::SourceBusy => {
                write!(f, "capture source is busy serving another client")
            }
        }
    }
}

impl std::error::Error for CaptureError {}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::BindFailed {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = CaptureError::BindFailed {
            reason: "visualizer unavailable".to_string(),
        };
        assert!(err.to_string().contains("visualizer unavailable"));
        assert!(CaptureError::PermissionDenied.to_string().contains("permission"));
        assert!(CaptureError::SourceBusy.to_string().contains("busy"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::other("device lost");
        let err: CaptureError = io_err.into();
        match err {
            CaptureError::BindFailed { reason } => assert!(reason.contains("device lost")),
            other => panic!("expected BindFailed, got {:?}", other),
        }
    }
}
