//! Error types.
//!
//! Two kinds of failure exist in a chain:
//!
//! - [`ChainError`]: misuse detected while building steps or registering them.
//!   These are returned synchronously and never enter the asynchronous flow.
//! - [`Fault`]: an application error a step reports through its continuation.
//!   The engine forwards it, untouched, to the terminal step.

use std::fmt;

use crate::Args;

/// Construction and registration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// A combinator was handed an argument of the wrong shape.
    #[error("{argument} argument missing or not {expected}")]
    InvalidArgument {
        argument: &'static str,
        expected: &'static str,
    },

    /// A step was appended after the chain started dispatching.
    #[error("chain already dispatching; steps must be appended before the first deferral fires")]
    AlreadyDispatching,

    /// A bridge was requested on a chain that no longer accepts steps.
    #[error("chain closed; cannot bridge into a chain that is already dispatching")]
    BridgeClosed,
}

impl ChainError {
    pub(crate) fn invalid(argument: &'static str, expected: &'static str) -> Self {
        ChainError::InvalidArgument { argument, expected }
    }
}

/// An application error travelling down a chain.
///
/// Carries the error itself plus any values the failing step passed along
/// with it. The engine never looks inside.
pub struct Fault {
    pub error: anyhow::Error,
    pub values: Args,
}

impl Fault {
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Fault {
            error: error.into(),
            values: Vec::new(),
        }
    }

    pub fn with_values(error: impl Into<anyhow::Error>, values: Args) -> Self {
        Fault {
            error: error.into(),
            values,
        }
    }

    /// Attempt to downcast the carried error to a concrete type.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.error.downcast_ref::<E>()
    }

    pub fn into_error(self) -> anyhow::Error {
        self.error
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("error", &self.error)
            .field("values", &self.values)
            .finish()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl From<anyhow::Error> for Fault {
    fn from(error: anyhow::Error) -> Self {
        Fault::new(error)
    }
}

impl From<ChainError> for Fault {
    fn from(error: ChainError) -> Self {
        Fault::new(error)
    }
}
