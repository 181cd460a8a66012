//! Error types
//!
//! [`FluxError`] covers the usage errors that are returned to the caller.
//! [`ActionHandlerError`] describes a failed dispatch; it is only ever handed to
//! the store's [`ErrorReporter`](crate::ErrorReporter), never returned.

use thiserror::Error;

/// Errors surfaced synchronously to the caller
#[derive(Debug, Error)]
pub enum FluxError {
    /// The store spec registered no action handler
    #[error("store must have one or more action handlers")]
    Configuration,

    /// The scope id is unknown, expired, or belongs to a store of another type
    #[error("context must be created with create_context")]
    InvalidScope,

    /// No active provider for the scope encloses the caller
    #[error("use_context must be used within the descendant component of {display_name}.Provider")]
    OutOfScope { display_name: String },

    /// A dispatch failed
    #[error(transparent)]
    ActionHandler(#[from] ActionHandlerError),
}

/// Failure of a single dispatch
///
/// Mutations performed on the draft before the failure are still committed.
#[derive(Debug, Error)]
pub enum ActionHandlerError {
    #[error("action handler `{action}` is not present on the store")]
    Missing { action: String },

    #[error("action handler `{action}` expects arguments of type `{expected}`")]
    ArgumentMismatch {
        action: String,
        expected: &'static str,
    },

    #[error("action handler `{action}` failed: {source:#}")]
    Failed {
        action: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("action handler `{action}` panicked: {message}")]
    Panicked { action: String, message: String },
}

impl ActionHandlerError {
    /// Name of the action whose dispatch failed
    pub fn action(&self) -> &str {
        match self {
            Self::Missing { action }
            | Self::ArgumentMismatch { action, .. }
            | Self::Failed { action, .. }
            | Self::Panicked { action, .. } => action,
        }
    }
}
