// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the scanner application

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera-related errors
    Camera(CameraError),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Camera-specific errors
#[derive(Debug, Clone)]
pub enum CameraError {
    /// No camera devices found
    NoCameraFound,
    /// Access to the device was denied
    PermissionDenied(String),
    /// Camera initialization failed
    InitializationFailed(String),
    /// No capture format usable by the pixel converters
    InvalidFormat(String),
    /// Camera disconnected during operation
    Disconnected,
}

impl CameraError {
    /// Classify an open(2) failure on a capture node.
    pub fn from_open_error(err: &std::io::Error, path: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                CameraError::PermissionDenied(path.to_string())
            }
            std::io::ErrorKind::NotFound => CameraError::NoCameraFound,
            _ => CameraError::InitializationFailed(format!("{}: {}", path, err)),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NoCameraFound => write!(f, "No camera devices found"),
            CameraError::PermissionDenied(path) => {
                write!(f, "Permission denied opening camera {}", path)
            }
            CameraError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            CameraError::InvalidFormat(msg) => write!(f, "No usable capture format: {}", msg),
            CameraError::Disconnected => write!(f, "Camera disconnected"),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}

impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Other(err.to_string())
    }
}
