//! Systems - logic that operates on the farm and worker entities

mod movement;
mod scheduler;
mod tasks;
mod worker;

pub use movement::*;
pub use scheduler::*;
pub use tasks::*;
pub use worker::*;
