use crate::gem::engine::EngineClass;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GemError {
    /// The ioctl itself failed.
    #[error("I/O Error: {0}")]
    Io(#[from] io::Error),

    /// The kernel accepted the query but rejected this item.
    #[error("Query item {query_id:#x} failed with status {status}")]
    QueryItem { query_id: u64, status: i32 },

    #[error("Query {query_id:#x} reported {expected} bytes but filled {actual}")]
    QueryLengthMismatch {
        query_id: u64,
        expected: usize,
        actual: usize,
    },

    #[error("Query buffer of {0} bytes does not fit the kernel length field")]
    BufferTooLarge(usize),

    #[error("Malformed query payload: {0}")]
    Malformed(String),

    #[error("No {0:?} engine is available on this device")]
    EngineUnavailable(EngineClass),

    #[error("Protected contexts are not supported by this device")]
    ProtectedContextUnsupported,

    #[error("Out of Memory")]
    OutOfMemory,
}

impl GemError {
    /// The negative status a C caller would have seen for this failure.
    ///
    /// Transport failures map to `-errno`, per-item query failures to the
    /// item's own negative length.
    #[must_use]
    pub fn errno(&self) -> i32 {
        match self {
            Self::Io(e) => -e.raw_os_error().unwrap_or(libc::EIO),
            Self::QueryItem { status, .. } => *status,
            Self::QueryLengthMismatch { .. } | Self::Malformed(_) => -libc::EIO,
            Self::BufferTooLarge(_) => -libc::EINVAL,
            Self::EngineUnavailable(_) => -libc::ENOENT,
            Self::ProtectedContextUnsupported => -libc::ENODEV,
            Self::OutOfMemory => -libc::ENOMEM,
        }
    }

    /// Whether this is a "feature absent on this device" answer rather than
    /// a genuine failure.
    #[must_use]
    pub fn is_not_supported(&self) -> bool {
        matches!(
            -self.errno(),
            libc::ENODEV | libc::EINVAL | libc::EOPNOTSUPP
        ) && !matches!(self, Self::BufferTooLarge(_))
    }
}

// A convenient alias
pub type GemResult<T> = Result<T, GemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_item_failures_keep_their_status() {
        let transport = GemError::from(io::Error::from_raw_os_error(libc::EFAULT));
        assert_eq!(transport.errno(), -libc::EFAULT);

        let item = GemError::QueryItem {
            query_id: 2,
            status: -libc::EINVAL,
        };
        assert_eq!(item.errno(), -libc::EINVAL);
    }

    #[test]
    fn not_supported_classification() {
        assert!(GemError::from(io::Error::from_raw_os_error(libc::ENODEV)).is_not_supported());
        assert!(GemError::ProtectedContextUnsupported.is_not_supported());
        assert!(!GemError::from(io::Error::from_raw_os_error(libc::EBADF)).is_not_supported());
        assert!(!GemError::BufferTooLarge(usize::MAX).is_not_supported());
    }
}
