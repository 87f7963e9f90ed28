//! Commonly used imports
//!
//! Use `use jam::prelude::*;` for quick access to the most common types and functions.

// Core types
pub use crate::{Args, Chain, ChainConfig, ChainError, Fault, Next, Outcome, Step};

// Deferral
pub use crate::{LocalScheduler, ManualScheduler, Scheduler};

// Combinators
pub use crate::{
    absorb, adapt, bridge, collect, delay, delay_for, each_of, identity, inject, make_absorb,
    make_identity, tap, transform, Bridge, Callback,
};
