//! Error types of the queue engine.

use std::alloc::Layout;
use thiserror::Error;

/// Result type for fallible queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;

/// Errors reported by the queue engine.
///
/// Operations on an empty queue are not errors: they report `false`, `None`
/// or `0` through their return values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Allocating a node or duplicating a string failed. The queue is left
    /// exactly as it was before the call.
    #[error("allocation of {} bytes (align {}) failed", .layout.size(), .layout.align())]
    AllocFailed { layout: Layout },

    /// The ring is not doubly linked at the given position, counted from the
    /// first element (the sentinel is at position `size`).
    #[error("broken link at position {position}")]
    BrokenLink { position: usize },

    #[error("unknown sort strategy: {0}")]
    UnknownStrategy(String),
}

impl QueueError {
    pub(crate) fn alloc_failed(layout: Layout) -> Self {
        QueueError::AllocFailed { layout }
    }
}

#[cfg(test)]
mod tests {
    use super::QueueError;
    use std::alloc::Layout;

    #[test]
    fn error_messages() {
        let err = QueueError::alloc_failed(Layout::from_size_align(24, 8).unwrap());
        assert_eq!(err.to_string(), "allocation of 24 bytes (align 8) failed");

        let err = QueueError::BrokenLink { position: 3 };
        assert_eq!(err.to_string(), "broken link at position 3");

        let err = QueueError::UnknownStrategy("quick".to_owned());
        assert_eq!(err.to_string(), "unknown sort strategy: quick");
    }
}
