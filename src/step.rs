//! Units of chain work.

use std::fmt;

use serde_json::Value;

use crate::{Fault, Next};

/// Values forwarded from one step to the next.
pub type Args = Vec<Value>;

/// What a step reports through its continuation: forwarded values on success,
/// or a [`Fault`] to be fast-forwarded to the terminal step.
pub type Outcome = Result<Args, Fault>;

/// A unit of work in a chain.
///
/// A step runs once. In an intermediate position it receives a [`Next`] and
/// the values forwarded by the previous step, and must eventually call the
/// continuation. In the terminal position it receives whatever the previous
/// step reported, error included, together with a detached continuation that
/// goes nowhere.
///
/// Steps come in three flavours:
///
/// - [`Step::new`]: a plain `(next, args)` step. Any `FnOnce(Next, Args)`
///   converts into one.
/// - [`Step::handler`]: a terminal handler that sees the full [`Outcome`].
/// - [`Step::bind`]: a plain step that observes a bound context on invocation.
pub struct Step {
    run: Box<dyn FnOnce(Next, Outcome)>,
}

impl Step {
    /// A plain step.
    ///
    /// If this step ends up last and the chain fails, it has no way to see the
    /// error; the error is logged and dropped.
    pub fn new<F>(f: F) -> Step
    where
        F: FnOnce(Next, Args) + 'static,
    {
        Step::raw(move |next, outcome| match outcome {
            Ok(args) => f(next, args),
            Err(fault) => {
                tracing::warn!(error = %fault, "error reached a step that cannot handle it; dropped")
            }
        })
    }

    /// A terminal handler.
    ///
    /// Receives `Ok(values)` on normal completion or `Err(fault)` when any
    /// earlier step failed. Placed anywhere but last, it sees the forwarded
    /// values and then lets the chain continue with nothing forwarded.
    pub fn handler<F>(f: F) -> Step
    where
        F: FnOnce(Outcome) + 'static,
    {
        Step::raw(move |next, outcome| {
            f(outcome);
            next.done()
        })
    }

    /// A plain step that observes `context` whenever it runs.
    pub fn bind<C, F>(context: C, f: F) -> Step
    where
        C: 'static,
        F: FnOnce(&C, Next, Args) + 'static,
    {
        Step::new(move |next, args| f(&context, next, args))
    }

    /// A step with direct access to the incoming [`Outcome`].
    pub fn raw<F>(f: F) -> Step
    where
        F: FnOnce(Next, Outcome) + 'static,
    {
        Step { run: Box::new(f) }
    }

    pub(crate) fn invoke(self, next: Next, outcome: Outcome) {
        (self.run)(next, outcome)
    }
}

impl<F> From<F> for Step
where
    F: FnOnce(Next, Args) + 'static,
{
    fn from(f: F) -> Self {
        Step::new(f)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step").finish_non_exhaustive()
    }
}
