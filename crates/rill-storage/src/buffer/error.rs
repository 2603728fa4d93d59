//! Buffer pool errors.

use thiserror::Error;

use crate::disk::IoError;

/// Result type for buffer pool operations.
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer pool operations.
///
/// Logical conditions the pool recovers from locally (a full pool, a
/// non-resident page, an already-zero pin count) are expressed as
/// `Option`/`bool` returns, not errors; everything here is either a
/// caller mistake or a disk failure.
#[derive(Debug, Error)]
#[allow(missing_docs)] // Fields are documented by variant docs
pub enum BufferError {
    /// Frame id out of range for the pool.
    #[error("invalid frame id {frame_id}, pool capacity is {capacity}")]
    InvalidFrameId { frame_id: usize, capacity: usize },

    /// Attempted to remove a frame the replacer considers non-evictable.
    #[error("frame {frame_id} is not evictable")]
    NotEvictable { frame_id: usize },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Disk I/O error. Fatal: the pool does not retry.
    #[error("disk I/O error: {0}")]
    Io(#[from] IoError),
}

impl BufferError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid frame id error.
    pub fn invalid_frame(frame_id: usize, capacity: usize) -> Self {
        Self::InvalidFrameId { frame_id, capacity }
    }

    /// Returns true if this is a fatal error.
    ///
    /// Disk failures are fatal; the pool never discards a dirty frame
    /// whose write-back failed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BufferError::invalid_frame(9, 4);
        assert!(matches!(
            err,
            BufferError::InvalidFrameId {
                frame_id: 9,
                capacity: 4
            }
        ));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_io_is_fatal() {
        let io = IoError::short_write(10, 3);
        let err: BufferError = io.into();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_display() {
        let err = BufferError::config("bad pool size");
        assert_eq!(err.to_string(), "configuration error: bad pool size");
    }
}
