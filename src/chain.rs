//! The chain engine.
//!
//! A [`Chain`] owns an ordered queue of [`Step`]s. Creating one schedules a
//! single deferred kickoff; everything appended before that kickoff fires
//! becomes part of the run. Dispatch then pulls steps from the front:
//!
//! - on success, the next step receives a fresh continuation and the
//!   forwarded values, or, if it is the last one, the outcome as-is;
//! - on error, every remaining intermediate step is skipped and the step at
//!   the back of the queue receives the error.
//!
//! ```
//! use std::{cell::RefCell, rc::Rc};
//! use jam::{Chain, ManualScheduler};
//! use serde_json::json;
//!
//! let scheduler = Rc::new(ManualScheduler::new());
//! let result = Rc::new(RefCell::new(None));
//! let r = result.clone();
//!
//! let chain = Chain::with_scheduler(scheduler.clone(), |next: jam::Next, _: jam::Args| next.ok(vec![json!(2)]));
//! chain
//!     .then(|next, args| next.ok(vec![json!(args[0].as_i64().unwrap_or(0) * 21)]))?
//!     .finally(move |outcome| *r.borrow_mut() = outcome.ok())?;
//!
//! scheduler.run_until_idle();
//! assert_eq!(Some(vec![json!(42)]), *result.borrow());
//! # Ok::<(), jam::ChainError>(())
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::{Args, Bridge, ChainConfig, ChainError, Next, Outcome, Scheduler, Step};

thread_local! {
    static CHAIN_IDS: Cell<u64> = const { Cell::new(1) };
}

fn next_chain_id() -> u64 {
    CHAIN_IDS.with(|ids| {
        let id = ids.get();
        ids.set(id + 1);
        id
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Registering,
    Dispatching,
    Finished,
}

struct Engine {
    steps: RefCell<VecDeque<Step>>,
    phase: Cell<Phase>,
    dispatched: Cell<usize>,
    /// Set while a dispatch loop is on the stack.
    draining: Cell<bool>,
    /// Outcome reported synchronously by the running step, picked up by the
    /// dispatch loop once that step returns.
    pending: RefCell<Option<Outcome>>,
    scheduler: Rc<dyn Scheduler>,
    span: tracing::Span,
}

impl Engine {
    fn append(&self, step: Step) -> Result<(), ChainError> {
        if self.phase.get() != Phase::Registering {
            let _entered = self.span.enter();
            tracing::debug!(phase = ?self.phase.get(), "rejected step appended after kickoff");
            return Err(ChainError::AlreadyDispatching);
        }
        self.steps.borrow_mut().push_back(step);
        Ok(())
    }

    fn kickoff(this: Rc<Self>) {
        this.phase.set(Phase::Dispatching);
        {
            let _entered = this.span.enter();
            tracing::debug!(steps = this.steps.borrow().len(), "dispatch started");
        }
        Engine::dispatch(&this, Ok(Vec::new()));
    }

    /// Hand `outcome` to the next step.
    ///
    /// Steps that call their continuation synchronously do not recurse: the
    /// outcome is parked and the outermost call keeps looping, so stack depth
    /// stays constant however many steps complete in one go.
    fn dispatch(this: &Rc<Self>, outcome: Outcome) {
        if this.draining.get() {
            *this.pending.borrow_mut() = Some(outcome);
            return;
        }

        this.draining.set(true);
        let mut outcome = Some(outcome);
        while let Some(current) = outcome {
            Engine::advance(this, current);
            outcome = this.pending.borrow_mut().take();
        }
        this.draining.set(false);
    }

    fn advance(this: &Rc<Self>, outcome: Outcome) {
        let _entered = this.span.enter();
        match outcome {
            Err(fault) => {
                // Unrun steps are dropped outside the borrow; their captures may
                // reach back into this chain.
                let mut skipped = std::mem::take(&mut *this.steps.borrow_mut());
                this.phase.set(Phase::Finished);
                match skipped.pop_back() {
                    Some(last) => {
                        tracing::debug!(
                            error = %fault,
                            skipped = skipped.len(),
                            "fast-forwarding error to terminal step"
                        );
                        drop(skipped);
                        last.invoke(Next::detached(this.scheduler.clone()), Err(fault));
                    }
                    None => {
                        tracing::warn!(error = %fault, "error reported on a finished chain; dropped")
                    }
                }
            }
            Ok(args) => {
                let (step, remaining) = {
                    let mut steps = this.steps.borrow_mut();
                    let step = steps.pop_front();
                    (step, steps.len())
                };
                let Some(step) = step else {
                    tracing::warn!("continuation called on a finished chain; ignored");
                    return;
                };
                let index = this.dispatched.get();
                this.dispatched.set(index + 1);

                if remaining > 0 {
                    tracing::trace!(index, values = args.len(), "dispatching step");
                    let engine = this.clone();
                    let next = Next::new(this.scheduler.clone(), move |outcome| {
                        Engine::dispatch(&engine, outcome)
                    });
                    step.invoke(next, Ok(args));
                } else {
                    this.phase.set(Phase::Finished);
                    tracing::debug!(index, values = args.len(), "dispatching terminal step");
                    step.invoke(Next::detached(this.scheduler.clone()), Ok(args));
                }
            }
        }
    }
}

/// Fluent handle to a chain of steps.
///
/// Cloning the handle does not clone the chain; all clones append to the same
/// queue.
#[derive(Clone)]
pub struct Chain {
    engine: Rc<Engine>,
}

impl Chain {
    /// Create a chain with the default configuration.
    ///
    /// The default scheduler is [`LocalScheduler`](crate::LocalScheduler), so
    /// this must be called inside a tokio `LocalSet`.
    pub fn new(step: impl Into<Step>) -> Chain {
        Chain::configured(ChainConfig::default(), step)
    }

    /// Like [`Chain::new`], taking a closure so its argument types are inferred.
    pub fn start<F>(f: F) -> Chain
    where
        F: FnOnce(Next, Args) + 'static,
    {
        Chain::new(Step::new(f))
    }

    pub fn with_scheduler(scheduler: Rc<dyn Scheduler>, step: impl Into<Step>) -> Chain {
        Chain::configured(ChainConfig::default().scheduler(scheduler), step)
    }

    /// Create a chain and schedule its one and only kickoff.
    pub fn configured(config: ChainConfig, step: impl Into<Step>) -> Chain {
        Chain::launch(config, VecDeque::from([step.into()]))
    }

    /// Create a chain already holding `steps`, terminal step included.
    pub(crate) fn from_steps(config: ChainConfig, steps: Vec<Step>) -> Chain {
        Chain::launch(config, steps.into())
    }

    fn launch(config: ChainConfig, steps: VecDeque<Step>) -> Chain {
        let id = next_chain_id();
        let ChainConfig { label, scheduler } = config;
        let engine = Rc::new(Engine {
            steps: RefCell::new(steps),
            phase: Cell::new(Phase::Registering),
            dispatched: Cell::new(0),
            draining: Cell::new(false),
            pending: RefCell::new(None),
            scheduler: scheduler.clone(),
            span: tracing::debug_span!("chain", %label, id),
        });

        let kickoff = engine.clone();
        scheduler.defer(Box::new(move || Engine::kickoff(kickoff)));
        Chain { engine }
    }

    /// Append a plain `(next, args)` step.
    pub fn then<F>(&self, f: F) -> Result<&Self, ChainError>
    where
        F: FnOnce(Next, Args) + 'static,
    {
        self.push(Step::new(f))
    }

    /// Append any step, e.g. one built by a combinator.
    pub fn push(&self, step: impl Into<Step>) -> Result<&Self, ChainError> {
        self.engine.append(step.into())?;
        Ok(self)
    }

    /// Append a step that observes `context` when it runs.
    pub fn then_bound<C, F>(&self, context: C, f: F) -> Result<&Self, ChainError>
    where
        C: 'static,
        F: FnOnce(&C, Next, Args) + 'static,
    {
        self.push(Step::bind(context, f))
    }

    /// Append a terminal handler.
    pub fn finally<F>(&self, f: F) -> Result<&Self, ChainError>
    where
        F: FnOnce(Outcome) + 'static,
    {
        self.push(Step::handler(f))
    }

    /// Register a bridge point on this chain; see [`crate::bridge`].
    pub fn bridge(&self) -> Result<Bridge, ChainError> {
        crate::bridge(self)
    }

    pub fn scheduler(&self) -> Rc<dyn Scheduler> {
        self.engine.scheduler.clone()
    }

    /// Whether steps can still be appended.
    pub fn is_open(&self) -> bool {
        self.engine.phase.get() == Phase::Registering
    }

    /// Whether the terminal step has been reached.
    pub fn is_finished(&self) -> bool {
        self.engine.phase.get() == Phase::Finished
    }

    /// Steps not yet dispatched.
    pub fn pending(&self) -> usize {
        self.engine.steps.borrow().len()
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("phase", &self.engine.phase.get())
            .field("pending", &self.pending())
            .field("dispatched", &self.engine.dispatched.get())
            .finish()
    }
}
