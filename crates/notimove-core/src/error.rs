use std::result::Result as StdResult;

use thiserror::Error;

use crate::geom::Point;

/// Convenient result type for the core crate.
pub type Result<T> = StdResult<T, Error>;

/// Failure of a single call into a foreign UI-automation tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AxError {
    /// The OS call failed with the given error code.
    #[error("AX operation failed: code {0}")]
    Code(i32),

    /// The element became invalid (window closed) during the operation.
    #[error("AX element invalid (window gone)")]
    Gone,

    /// The attribute is missing or has an unexpected type on this element.
    #[error("Unsupported attribute")]
    Unsupported,
}

/// Errors produced while discovering and positioning notifications.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// No stage of the element resolver matched. Expected for many candidate windows.
    #[error("no positionable element found")]
    NotFound,

    /// The element exposes its position as read-only.
    #[error("position attribute is not settable")]
    NotSettable,

    /// The OS call that writes the position failed.
    #[error("position write failed: {0}")]
    WriteError(AxError),

    /// The write was accepted but the element did not end up where requested.
    #[error(
        "post-move verification failed: expected ({:.1},{:.1}) got ({:.1},{:.1})",
        expected.x, expected.y, actual.x, actual.y
    )]
    VerificationFailed {
        /// Requested origin.
        expected: Point,
        /// Origin read back after the write.
        actual: Point,
    },

    /// Accessibility permission is required but not granted.
    #[error("Accessibility permission missing")]
    PermissionDenied,

    /// A foreign call did not finish within its budget.
    #[error("foreign call timed out after {ms}ms")]
    Timeout {
        /// The budget that was exceeded.
        ms: u64,
    },

    /// Reading an attribute of a foreign element failed.
    #[error("attribute read failed: {0}")]
    Ax(#[from] AxError),

    /// The foreign-call worker pool is gone or dropped the job.
    #[error("worker pool closed")]
    PoolClosed,

    /// The service's background tasks have exited.
    #[error("service stopped")]
    ServiceStopped,

    /// A worker thread could not be started.
    #[error("failed to spawn worker: {0}")]
    Spawn(String),
}

impl Error {
    /// Short stable name for logs and event consumers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::NotSettable => "not_settable",
            Self::WriteError(_) => "write_error",
            Self::VerificationFailed { .. } => "verification_failed",
            Self::PermissionDenied => "permission_denied",
            Self::Timeout { .. } => "timeout",
            Self::Ax(_) => "ax",
            Self::PoolClosed => "pool_closed",
            Self::ServiceStopped => "service_stopped",
            Self::Spawn(_) => "spawn",
        }
    }

    /// True for outcomes that are routine rather than faults.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
