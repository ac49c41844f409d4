//! Error types for queue engine operations.

use crate::request::RequestId;
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Error taxonomy for the request queue engine.
///
/// The engine never retries internally and never produces user-facing prose;
/// every failure is returned to the caller as a kind plus minimal context
/// (the offending id, the offending field).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A required field was missing or empty after trimming.
    #[error("{field} is required")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The submitted title matches an active (pending or approved) request.
    #[error("\"{song_title}\" has already been requested")]
    DuplicateTitle {
        /// Title as submitted.
        song_title: String,
    },

    /// No request exists with this id, or it is outside the operation's
    /// domain (a played request has no queue position).
    #[error("request {id} not found")]
    NotFound {
        /// The offending id.
        id: RequestId,
    },

    /// A status value outside the five-element enumeration.
    ///
    /// Only reachable at the wire boundary; a typed [`crate::RequestStatus`]
    /// is always legal.
    #[error("unknown status value: {value}")]
    InvalidStatus {
        /// The rejected raw value.
        value: String,
    },

    /// A non-operator invoked an operator-only operation.
    ///
    /// Detected by the identity collaborator; the engine only surfaces it.
    #[error("operator role required")]
    Unauthorized,

    /// The durable store is unreachable or rejected the operation.
    #[error("store error: {0}")]
    Store(String),
}

impl EngineError {
    /// Returns `true` if this error is due to invalid caller input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use encore_core::EngineError;
    /// assert!(EngineError::Validation { field: "name" }.is_user_error());
    /// assert!(!EngineError::Store("connection reset".to_string()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::DuplicateTitle { .. }
                | Self::InvalidStatus { .. }
                | Self::Unauthorized
        )
    }
}
