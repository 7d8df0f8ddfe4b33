//! Error taxonomy for configuration-time and lifecycle failures.
//!
//! Trading decisions (a risk-gate denial, a zero score) are never errors.
//! Only malformed input and misuse of the registry or scheduler end up here.

use thiserror::Error;

/// Errors returned synchronously by the strategy execution core.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentError {
    /// A strategy or one of its conditions is malformed.
    #[error("Validation failed: {reason}")]
    Validation {
        /// What was wrong with the input.
        reason: String,
    },

    /// A strategy with this id is already registered.
    #[error("Strategy {id} already exists")]
    DuplicateId {
        /// The conflicting id.
        id: String,
    },

    /// No strategy with this id is registered.
    #[error("Strategy {id} not found")]
    NotFound {
        /// The missing id.
        id: String,
    },

    /// `start` was called on a scheduler that is already running.
    #[error("Scheduler is already running")]
    AlreadyRunning,
}

impl AgentError {
    /// Shorthand for a [`AgentError::Validation`] error.
    #[must_use]
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }
}
