//! From raw detections to publishable signals.

pub mod aggregation;
pub mod cooldown;
pub mod decision;
pub mod engine;

pub use aggregation::*;
pub use cooldown::*;
pub use decision::*;
pub use engine::*;
