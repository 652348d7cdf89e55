//! Worker primitives shared by the strata engine.
//!
//! * [`TaskClass`] tags every spawned unit of work for tracing.
//! * [`spawn_blocking`] runs work on the ambient tokio runtime, or on
//!   a lazily built global one when the caller is plain synchronous code.
//! * [`GenerationClock`] lets a newer request supersede an older in-flight one.
//! * [`Debouncer`] coalesces bursts of requests (viewport motion).

mod class;
mod debounce;
mod spawn;
mod token;

pub use class::TaskClass;
pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use spawn::spawn_blocking;
pub use token::GenerationClock;
