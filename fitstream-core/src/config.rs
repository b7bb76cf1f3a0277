//! Centralized configuration for Fitstream.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Central configuration for all Fitstream components.
///
/// Groups related configuration settings into logical sections.
#[derive(Debug, Clone, Default)]
pub struct FitstreamConfig {
    pub streaming: StreamingConfig,
    pub library: LibraryConfig,
    pub server: ServerConfig,
}

/// Video delivery configuration.
///
/// Controls chunking behavior and client cache policy for media responses.
#[derive(Debug, Clone)]
pub struct StreamingConfig {
    /// Read buffer per chunk. Balances syscall overhead against memory
    /// footprint and seek responsiveness.
    pub chunk_size: usize,
    /// Client cache lifetime in seconds; media files are treated as
    /// immutable once published.
    pub cache_max_age: u32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100 * 1024, // 100 KiB
            cache_max_age: 86400,   // 24 hours
        }
    }
}

/// Media library scanning configuration.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Root directory scanned for workout videos.
    pub media_dir: PathBuf,
    /// File extensions recognized as video content.
    pub video_extensions: &'static [&'static str],
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            media_dir: PathBuf::from("media"),
            video_extensions: &["mp4", "mkv", "avi", "mov", "m4v", "webm", "flv", "ogg"],
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the server binds to.
    pub bind_address: IpAddr,
    /// Port the server listens on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
        }
    }
}
