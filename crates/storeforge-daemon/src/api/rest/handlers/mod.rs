//! REST API handlers

mod engines;
mod health;
mod orchestrate;
mod teardown;

pub use engines::*;
pub use health::*;
pub use orchestrate::*;
pub use teardown::*;
