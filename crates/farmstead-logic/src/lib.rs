//! Pure farm rules for Farmstead.
//!
//! This crate holds everything about the farm that is plain data: the closed
//! item enums, which zone accepts which crop or animal, the balance tables
//! loaded from config, the worker rarity draw, and the plot grid layout.
//! Nothing here knows about clocks, workers in flight, or persistence, so it
//! is shared by the simulation core and the headless harness alike.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Crop/animal/product/zone/task/rarity/worker-state enums |
//! | [`config`] | `GameConfig` balance tables, defaults, tolerant JSON loader |
//! | [`rarity`] | Cumulative-weight rarity draw and stat rolls |
//! | [`layout`] | World position of a plot from its zone and index |

pub mod config;
pub mod constants;
pub mod layout;
pub mod rarity;
