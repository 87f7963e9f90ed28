//! Folding an outside callback back into a chain.
//!
//! [`bridge`] registers a step on a chain and hands back a [`Bridge`]. Two
//! events then race: the chain's dispatch reaching that step, and the outside
//! code resolving the bridge. Whichever comes second forwards the outside
//! result to the rest of the chain; the first only parks its half.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use either::Either;

use crate::{Args, Callback, Chain, ChainError, Fault, Next, Outcome};

enum Rendezvous {
    /// Neither side has arrived.
    Open,
    /// One side arrived: the outside result, or the chain's continuation.
    Parked(Either<Outcome, Next>),
    Resolved,
}

fn arrive(slot: &RefCell<Rendezvous>, event: Either<Outcome, Next>) {
    let state = std::mem::replace(&mut *slot.borrow_mut(), Rendezvous::Resolved);
    match (state, event) {
        (Rendezvous::Open, event) => {
            tracing::trace!(chain_first = event.is_right(), "bridge parked");
            *slot.borrow_mut() = Rendezvous::Parked(event);
        }
        (Rendezvous::Parked(Either::Left(outcome)), Either::Right(next))
        | (Rendezvous::Parked(Either::Right(next)), Either::Left(outcome)) => {
            tracing::trace!("bridge resolved");
            next.resume(outcome)
        }
        (Rendezvous::Parked(parked), _) => {
            tracing::warn!("same side arrived twice at a bridge; ignored");
            *slot.borrow_mut() = Rendezvous::Parked(parked);
        }
        (Rendezvous::Resolved, _) => tracing::warn!("bridge already resolved; ignored"),
    }
}

/// Register a bridge point on `chain`.
///
/// The returned [`Bridge`] is the completion handle for some unrelated
/// asynchronous operation. Whatever it is resolved with, success values or
/// an error, is what the step after the bridge point observes.
///
/// ```
/// # use std::{cell::RefCell, rc::Rc};
/// # use jam::{bridge, identity, Chain, ManualScheduler};
/// # use serde_json::json;
/// let scheduler = Rc::new(ManualScheduler::new());
/// let chain = Chain::with_scheduler(scheduler.clone(), identity);
/// let resolver = bridge(&chain)?;
///
/// let seen = Rc::new(RefCell::new(None));
/// let s = seen.clone();
/// chain.finally(move |outcome| *s.borrow_mut() = outcome.ok())?;
///
/// // resolving before the chain gets there is fine
/// resolver.ok(vec![json!("hello"), json!("world")]);
/// scheduler.run_until_idle();
/// assert_eq!(Some(vec![json!("hello"), json!("world")]), *seen.borrow());
/// # Ok::<(), jam::ChainError>(())
/// ```
pub fn bridge(chain: &Chain) -> Result<Bridge, ChainError> {
    let slot = Rc::new(RefCell::new(Rendezvous::Open));
    let arrival = slot.clone();
    chain
        .then(move |next, _| arrive(&arrival, Either::Right(next)))
        .map_err(|_| ChainError::BridgeClosed)?;
    Ok(Bridge { slot })
}

/// Outside half of a bridge. Resolving it consumes it.
pub struct Bridge {
    slot: Rc<RefCell<Rendezvous>>,
}

impl Bridge {
    /// Deliver `outcome` to the chain.
    pub fn resolve(self, outcome: Outcome) {
        arrive(&self.slot, Either::Left(outcome))
    }

    pub fn ok(self, values: Args) {
        self.resolve(Ok(values))
    }

    pub fn fail(self, error: impl Into<anyhow::Error>) {
        self.resolve(Err(Fault::new(error)))
    }

    /// Turn this bridge into an error-first [`Callback`].
    pub fn into_callback(self) -> Callback {
        Box::new(move |result| self.resolve(result.map_err(Fault::from)))
    }
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.slot.borrow() {
            Rendezvous::Open => "open",
            Rendezvous::Parked(Either::Left(_)) => "result parked",
            Rendezvous::Parked(Either::Right(_)) => "chain parked",
            Rendezvous::Resolved => "resolved",
        };
        f.debug_struct("Bridge").field("state", &state).finish()
    }
}
