//! Farmstead Core - Farm Simulation Engine
//!
//! Simulates an idle farm: plots grouped into zones grow crops or keep
//! livestock, an inventory tracks seeds, animals and products, and a roster
//! of workers harvests and replants on their own.
//!
//! # Architecture
//!
//! - **Farm** (`farm`): aggregate root owning plots, inventory, gold,
//!   equipment levels, the worker-id roster and the plot reservation table.
//! - **Components** (`components`): plain data for plots, plantables,
//!   inventory and worker profiles.
//! - **Systems** (`systems`): the worker state machine, task effects,
//!   movement and the auto-assignment scheduler.
//! - **Engine** (`engine`): owns the farm, the worker entities (an `hecs`
//!   world) and the simulated clock, and drives everything from `update`.
//!
//! # Example
//!
//! ```rust,no_run
//! use farmstead_core::prelude::*;
//!
//! let mut engine = FarmEngine::new_game(GameConfig::default(), Timestamp::now());
//!
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//! }
//! ```

pub mod components;
pub mod engine;
pub mod events;
pub mod farm;
pub mod persistence;
pub mod systems;
pub mod time;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{FarmEngine, OfflineReport};
    pub use crate::events::FarmEvent;
    pub use crate::farm::{Farm, FarmError};
    pub use crate::time::Timestamp;
    pub use farmstead_logic::config::GameConfig;
    pub use farmstead_logic::constants::*;
}
