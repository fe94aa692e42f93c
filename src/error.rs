//! Error type shared by the buffer descriptor, config loader and SDL host

/// Error type for snowfall operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Pixel buffer descriptor does not fit the backing storage
    #[error("invalid pixel buffer: {width}x{height}, pitch {pitch}, {len} bytes ({reason})")]
    InvalidBuffer {
        width: u32,
        height: u32,
        pitch: usize,
        len: usize,
        reason: &'static str,
    },

    /// Malformed host configuration
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SDL window, renderer or texture failure
    #[error("display error: {0}")]
    Display(String),
}

/// Result type for snowfall operations
pub type Result<T> = std::result::Result<T, Error>;
