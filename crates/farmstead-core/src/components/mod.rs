//! Component definitions for the farm simulation.
//!
//! Components are plain data. Plots, plantables and the inventory live inside
//! the `Farm`; worker components are attached to entities in the engine's
//! `hecs` world.

mod common;
mod inventory;
mod plantable;
mod plot;
mod task;
mod worker;

pub use common::*;
pub use inventory::*;
pub use plantable::*;
pub use plot::*;
pub use task::*;
pub use worker::*;
