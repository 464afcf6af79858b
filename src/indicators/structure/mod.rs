//! Market structure: swings, support/resistance levels, regression channels

pub mod channel;
pub mod support_resistance;
pub mod swing;

pub use channel::*;
pub use support_resistance::*;
pub use swing::*;
