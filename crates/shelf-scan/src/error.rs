//! # Scanner Error Types
//!
//! ## Failure Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CameraError       start() fails, engine → Error, user retries         │
//! │  BackendInitError  start() succeeds, engine → Running(ManualOnly)      │
//! │  DecodeError       logged at trace, frame loop continues               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::io;

use thiserror::Error;

/// Camera acquisition errors.
///
/// Terminal for the start attempt that raised them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// The operator (or the OS) refused access to the device.
    #[error("permission denied")]
    PermissionDenied,

    /// The runtime only grants camera access from a secure context.
    #[error("camera access requires a secure context")]
    InsecureContext,

    /// Another process holds the device.
    #[error("device is busy")]
    DeviceBusy,

    /// The requested device is not present.
    #[error("device '{device}' not found")]
    NotFound { device: String },

    /// No capture device is available at all.
    #[error("no camera available")]
    NoDevice,

    /// Any other acquisition failure.
    #[error("{0}")]
    Other(String),
}

impl CameraError {
    /// Maps an I/O error raised while opening a device.
    pub fn from_io(device: &str, err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => CameraError::PermissionDenied,
            io::ErrorKind::NotFound => CameraError::NotFound {
                device: device.to_string(),
            },
            io::ErrorKind::WouldBlock | io::ErrorKind::AddrInUse => CameraError::DeviceBusy,
            _ => CameraError::Other(err.to_string()),
        }
    }
}

/// Fallback decoder failed to load or initialize.
///
/// Never fatal: the camera stays on and codes can be typed manually.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendInitError {
    #[error("decoder unavailable: {0}")]
    Unavailable(String),

    /// The stream offers nothing the decoder can bind to.
    #[error("stream has no feed to bind to")]
    NoFeed,

    #[error("decoder failed to start: {0}")]
    Init(String),
}

/// A single frame failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decode failed: {0}")]
pub struct DecodeError(pub String);

/// Errors returned by scanner operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Scanner backend error: {0}")]
    Backend(#[from] BackendInitError),
}

/// Result type for scanner operations.
pub type ScanResult<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mapping() {
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(
            CameraError::from_io("/dev/ttyACM0", &denied),
            CameraError::PermissionDenied
        );

        let missing = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(
            CameraError::from_io("/dev/ttyACM0", &missing),
            CameraError::NotFound {
                device: "/dev/ttyACM0".into()
            }
        );
    }

    #[test]
    fn test_scan_error_messages() {
        let err: ScanError = CameraError::PermissionDenied.into();
        assert_eq!(err.to_string(), "Camera error: permission denied");
    }
}
