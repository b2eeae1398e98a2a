//! Worker components: identity, rolled stats and the walking body.

use super::{Vec2, WorkerId};
use farmstead_logic::constants::Rarity;
use farmstead_logic::rarity::WorkerStats;
use serde::{Deserialize, Serialize};

/// Distance at which a walker counts as arrived.
pub const ARRIVAL_THRESHOLD: f32 = 0.5;

/// Who a worker is and how good they are at the job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkerProfile {
    pub id: WorkerId,
    pub rarity: Rarity,
    pub move_speed: f32,
    /// Seconds spent in Working per task
    pub work_duration: f32,
}

impl WorkerProfile {
    pub fn new(id: WorkerId, stats: WorkerStats) -> Self {
        Self {
            id,
            rarity: stats.rarity,
            move_speed: stats.move_speed,
            work_duration: stats.work_duration,
        }
    }
}

/// Navigation capability the worker state machine drives.
///
/// `move_towards` is fire-and-forget; arrival is discovered by polling.
pub trait Mover {
    fn move_towards(&mut self, target: Vec2);
    fn is_at_target_position(&self) -> bool;
    fn stop_moving(&mut self);
}

/// Straight-line walker on the farm ground.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Walker {
    pub position: Vec2,
    pub destination: Option<Vec2>,
    /// Units per second
    pub speed: f32,
}

impl Walker {
    pub fn new(position: Vec2, speed: f32) -> Self {
        Self {
            position,
            destination: None,
            speed,
        }
    }

    /// Advance toward the destination by one step of `delta_seconds`.
    pub fn step(&mut self, delta_seconds: f32) {
        let Some(target) = self.destination else {
            return;
        };
        let diff = target - self.position;
        let distance = diff.length();
        let step = self.speed * delta_seconds;
        if step >= distance {
            self.position = target;
        } else {
            self.position = self.position + diff.normalize() * step;
        }
    }
}

impl Mover for Walker {
    fn move_towards(&mut self, target: Vec2) {
        self.destination = Some(target);
    }

    fn is_at_target_position(&self) -> bool {
        match self.destination {
            Some(target) => self.position.distance(&target) <= ARRIVAL_THRESHOLD,
            None => true,
        }
    }

    fn stop_moving(&mut self) {
        self.destination = None;
    }
}
