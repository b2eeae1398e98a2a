//! Movement system - walks workers toward their destinations

use crate::components::Walker;
use hecs::World;

/// Step every walker that has somewhere to go.
pub fn movement_system(world: &mut World, delta_seconds: f32) {
    for (_, walker) in world.query_mut::<&mut Walker>() {
        if walker.destination.is_some() {
            walker.step(delta_seconds);
        }
    }
}
