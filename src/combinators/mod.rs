//! Ready-made steps.
//!
//! Every combinator produces an ordinary [`Step`](crate::Step), so it mixes
//! freely with hand-written steps and with other combinators.

mod bridge;
mod delay;
mod func;
mod sequence;
mod value;

pub use bridge::{bridge, Bridge};
pub use delay::{delay, delay_for};
pub use func::adapt;
pub use sequence::{collect, each_of};
pub use value::{
    absorb, identity, identity as next_tick, inject, make_absorb, make_identity,
    make_identity as make_next_tick, tap, transform,
};
