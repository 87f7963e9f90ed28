//! # Jam: ordered chains of callback-style steps
//!
//! Compose asynchronous, continuation-passing work into a flat pipeline
//! instead of nesting callbacks.
//!
//! ## Core Types
//!
//! - **[`Step`]**: a unit of work. Receives a continuation ([`Next`]) and the
//!   values forwarded by the previous step.
//! - **[`Next`]**: the continuation. Called once with either forwarded values
//!   or an error.
//! - **[`Chain`]**: an ordered queue of steps. Registration is synchronous;
//!   dispatch starts on the first deferral after the chain is created.
//!
//! ## Protocol
//!
//! - Steps run strictly in registration order, one at a time.
//! - Values passed to `next.ok(..)` are what the following step receives.
//! - An error passed to `next.fail(..)` skips every remaining intermediate
//!   step and goes straight to the last registered step, usually a handler
//!   added with [`Chain::finally`].
//! - Steps must not panic; report failures through the continuation instead.
//!
//! ## Example
//!
//! ```
//! use std::{cell::RefCell, rc::Rc};
//! use jam::prelude::*;
//! use serde_json::json;
//!
//! let scheduler = Rc::new(ManualScheduler::new());
//! let total = Rc::new(RefCell::new(None));
//! let t = total.clone();
//!
//! let chain = Chain::with_scheduler(scheduler.clone(), inject(vec![json!([1, 2, 3])]));
//! chain
//!     .push(collect(None, |next, n, _| next.ok(vec![json!(n.as_i64().unwrap_or(0) * 10)]))?)?
//!     .push(delay(5)?)?
//!     .finally(move |outcome| match outcome {
//!         Ok(values) => *t.borrow_mut() = Some(values),
//!         Err(fault) => eprintln!("failed: {fault}"),
//!     })?;
//!
//! scheduler.run_until_idle();
//! assert_eq!(Some(vec![json!([10, 20, 30])]), *total.borrow());
//! # Ok::<(), jam::ChainError>(())
//! ```
//!
//! ## Combinators
//!
//! - [`inject(values)`](inject): forward fixed values
//! - [`absorb`] / [`make_absorb()`](make_absorb): forward nothing
//! - [`identity`] / [`make_identity()`](make_identity): forward unchanged after one deferral
//! - [`adapt(f, fixed)`](adapt): run an error-first callback function as a step
//! - [`each_of(sequence, iterator)`](each_of) / [`collect(sequence, iterator)`](collect): serial iteration
//! - [`delay(ms)`](delay): pause, then forward unchanged
//! - [`bridge(&chain)`](bridge): fold an outside callback into the chain
//! - [`tap(f)`](tap) / [`transform(f)`](transform): observe or rewrite forwarded values

mod chain;
mod combinators;
mod config;
mod error;
mod next;
mod scheduler;
mod step;

pub mod prelude;

pub use chain::*;
pub use combinators::*;
pub use config::*;
pub use error::*;
pub use next::*;
pub use scheduler::*;
pub use step::*;
