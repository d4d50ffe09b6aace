//! Error types
//!
//! One top-level [`Error`] with component-specific enums nested under it.
//! Stream-termination conditions (`EndOfStream`, `ConnectionClosed`) are
//! ordinary variants of [`ProtocolError`]: callers match on them to decide
//! whether a read loop ended normally or the stream is corrupt.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Encoder(#[from] EncoderError),

    #[error("render failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while decoding the visibility frame protocol.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The magic constant did not match; the stream is corrupt or
    /// misaligned and decoding cannot proceed.
    #[error("bad header magic: expected {expected:#010x}, got {actual:#010x}")]
    BadMagic { expected: u32, actual: u32 },

    /// A header slice shorter than the decoded fields.
    #[error("header too short: expected at least {expected} bytes, got {actual}")]
    ShortHeader { expected: usize, actual: usize },

    /// A file transport could not fill the requested block. Expected
    /// termination condition for file-mode playback.
    #[error("end of stream")]
    EndOfStream,

    /// The peer closed the socket mid-block. The listener recovers by
    /// returning to accept.
    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading the antenna position table.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("antenna table line {line}: expected three coordinates")]
    Parse { line: usize },

    #[error("antenna table has {actual} rows, expected {expected}")]
    WrongRowCount { expected: usize, actual: usize },

    #[error("failed to read antenna table: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the external video encoder handle.
#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("failed to spawn encoder: {0}")]
    Spawn(std::io::Error),

    #[error("encoder stdin was not captured")]
    Stdin,

    /// The encoder process exited. Retryable: the stream sink respawns the
    /// encoder on the next product.
    #[error("encoder exited: {0}")]
    Exited(std::process::ExitStatus),

    #[error("failed to poll encoder: {0}")]
    Wait(std::io::Error),

    #[error("failed to write to encoder: {0}")]
    Write(std::io::Error),
}
