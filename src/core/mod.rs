//! Core application primitives (clock, dispatcher, scheduler)

pub mod clock;
pub mod runtime;
pub mod scheduler;

pub use clock::*;
pub use runtime::*;
pub use scheduler::*;
