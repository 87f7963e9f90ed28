//! The continuation handed to every step.

use std::fmt;
use std::rc::Rc;

use crate::{Args, Fault, Outcome, Scheduler};

/// Error-first completion callback, for code that is not written as a step.
///
/// `Ok(values)` continues the chain with `values`; `Err(error)` fast-forwards
/// `error` to the terminal step.
pub type Callback = Box<dyn FnOnce(anyhow::Result<Args>)>;

/// Continuation a step calls to report that it finished.
///
/// Every method consumes the continuation, so a step reports completion at
/// most once. Dropping a `Next` without calling it stalls the chain for good.
pub struct Next {
    resume: Box<dyn FnOnce(Outcome)>,
    scheduler: Rc<dyn Scheduler>,
}

impl Next {
    /// Build a continuation from a closure.
    ///
    /// `scheduler` is what combinators receiving this continuation will use
    /// when they need to defer.
    pub fn new<F>(scheduler: Rc<dyn Scheduler>, resume: F) -> Self
    where
        F: FnOnce(Outcome) + 'static,
    {
        Next {
            resume: Box::new(resume),
            scheduler,
        }
    }

    /// Continuation given to a terminal step. Calling it has no effect.
    pub(crate) fn detached(scheduler: Rc<dyn Scheduler>) -> Self {
        Next::new(scheduler, |outcome| match outcome {
            Ok(values) => {
                tracing::trace!(values = values.len(), "continuation called after terminal step")
            }
            Err(fault) => {
                tracing::warn!(error = %fault, "error reported after terminal step; dropped")
            }
        })
    }

    /// Report `outcome` exactly as given.
    pub fn resume(self, outcome: Outcome) {
        (self.resume)(outcome)
    }

    /// Report success, forwarding `values` to the next step.
    pub fn ok(self, values: Args) {
        self.resume(Ok(values))
    }

    /// Report success with nothing to forward.
    pub fn done(self) {
        self.resume(Ok(Vec::new()))
    }

    /// Report an error. Remaining intermediate steps are skipped.
    pub fn fail(self, error: impl Into<anyhow::Error>) {
        self.resume(Err(Fault::new(error)))
    }

    /// Report an error together with extra values for the terminal step.
    pub fn fail_with(self, error: impl Into<anyhow::Error>, values: Args) {
        self.resume(Err(Fault::with_values(error, values)))
    }

    /// Scheduler of the chain this continuation belongs to.
    pub fn scheduler(&self) -> Rc<dyn Scheduler> {
        self.scheduler.clone()
    }

    /// Observe the outcome on its way through, then pass it on unchanged.
    pub fn inspect<F>(self, f: F) -> Next
    where
        F: FnOnce(&Outcome) + 'static,
    {
        let Next { resume, scheduler } = self;
        Next::new(scheduler, move |outcome| {
            f(&outcome);
            resume(outcome)
        })
    }

    /// Turn this continuation into an error-first [`Callback`].
    pub fn into_callback(self) -> Callback {
        Box::new(move |result| self.resume(result.map_err(Fault::from)))
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualScheduler;
    use serde_json::json;
    use std::cell::RefCell;

    fn capture() -> (Rc<RefCell<Option<Outcome>>>, Next) {
        let slot = Rc::new(RefCell::new(None));
        let s = slot.clone();
        let next = Next::new(Rc::new(ManualScheduler::new()), move |outcome| {
            *s.borrow_mut() = Some(outcome)
        });
        (slot, next)
    }

    #[test]
    fn test_ok_forwards_values() {
        let (slot, next) = capture();
        next.ok(vec![json!(1), json!("two")]);
        match slot.borrow_mut().take() {
            Some(Ok(values)) => assert_eq!(vec![json!(1), json!("two")], values),
            other => panic!("Expected Ok, got {:?}", other),
        };
    }

    #[test]
    fn test_fail_with_keeps_extra_values() {
        let (slot, next) = capture();
        next.fail_with(anyhow::anyhow!("boom"), vec![json!(7)]);
        match slot.borrow_mut().take() {
            Some(Err(fault)) => {
                assert_eq!("boom", fault.to_string());
                assert_eq!(vec![json!(7)], fault.values);
            }
            other => panic!("Expected Err, got {:?}", other),
        };
    }

    #[test]
    fn test_inspect_sees_outcome_before_forwarding() {
        let (slot, next) = capture();
        let seen = Rc::new(RefCell::new(0));
        let s = seen.clone();
        let next = next.inspect(move |outcome| {
            if let Ok(values) = outcome {
                *s.borrow_mut() = values.len();
            }
        });
        next.ok(vec![json!(null), json!(null)]);

        assert_eq!(2, *seen.borrow());
        assert!(matches!(slot.borrow().as_ref(), Some(Ok(v)) if v.len() == 2));
    }

    #[test]
    fn test_callback_maps_error_first_convention() {
        let (slot, next) = capture();
        let callback = next.into_callback();
        callback(Err(anyhow::anyhow!("no such file")));
        match slot.borrow_mut().take() {
            Some(Err(fault)) => {
                assert_eq!("no such file", fault.to_string());
                assert!(fault.values.is_empty());
            }
            other => panic!("Expected Err, got {:?}", other),
        };
    }
}
