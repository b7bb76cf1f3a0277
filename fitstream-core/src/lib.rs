//! Fitstream Core - Essential media streaming functionality
//!
//! This crate provides the fundamental building blocks for serving coaching
//! video content: HTTP range resolution, chunked file streaming, media
//! library management, view logging, and configuration.

pub mod config;
pub mod library;
pub mod streaming;
pub mod tracing_setup;
pub mod views;

// Re-export main types for convenient access
pub use config::FitstreamConfig;
pub use library::{LibraryError, MediaId, MediaLibrary};
pub use streaming::{StreamingError, VideoStream};
pub use views::{InMemoryViewLog, ViewLog};

/// Core errors that can bubble up from any Fitstream subsystem.
#[derive(Debug, thiserror::Error)]
pub enum FitstreamError {
    #[error("Streaming error: {0}")]
    Streaming(#[from] StreamingError),

    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FitstreamError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            FitstreamError::Streaming(e) => match e {
                StreamingError::NotFound { .. } => "Video file not found".to_string(),
                StreamingError::UnsupportedRange { .. } => {
                    "Multiple ranges not supported".to_string()
                }
                StreamingError::RangeNotSatisfiable { .. } => "Invalid range".to_string(),
                _ => "Streaming error occurred".to_string(),
            },
            FitstreamError::Library(_) => "Media library error occurred".to_string(),
            FitstreamError::Configuration { .. } => "Configuration error occurred".to_string(),
            FitstreamError::Io(_) => "File system error occurred".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FitstreamError>;
