//! Error types for propman.
//!
//! All errors are strongly typed using thiserror so callers can match
//! on specific conditions. Construction problems (machines, formulas)
//! are `ValidationError`s; problems raised while driving a monitor are
//! `ExecutionError`s.

use thiserror::Error;

/// Validation errors raised while building machines, formulas or events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("State {state} already has an otherwise transition")]
    DuplicateOtherwise {
        state: String,
    },

    #[error("Transitions {first} and {second} of state {state} share valuation {witness}")]
    NondeterministicTransitions {
        state: String,
        first: usize,
        second: usize,
        witness: String,
    },

    #[error("Machine has no initial state")]
    MissingInitialState,

    #[error("Malformed formula at offset {offset}: {reason}")]
    MalformedFormula {
        offset: usize,
        reason: String,
    },

    #[error("Unknown variable '{name}'")]
    UnknownVariable {
        name: String,
    },
}

/// Execution errors raised while a monitor is running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("Multi-event has {valuations} valuations, limit is {limit}")]
    InputTooLarge {
        valuations: usize,
        limit: usize,
    },

    #[error("Channel disconnected: {path}")]
    Disconnected {
        path: String,
    },

    #[error("Operation timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },
}

/// Top-level error type for propman.
#[derive(Debug, Error)]
pub enum PropmanError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl PropmanError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Result type alias for propman operations.
pub type PropmanResult<T> = Result<T, PropmanError>;
