//! Plantable - anything that occupies a plot and grows on a timer.
//!
//! Crops and animals share one shape: a growth interval, a harvest budget and
//! two timestamps. The kind only decides the product and the display name.

use crate::time::Timestamp;
use farmstead_logic::config::GameConfig;
use farmstead_logic::constants::{PlantableKind, ProductType};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plantable {
    pub kind: PlantableKind,
    pub growth: Duration,
    pub max_harvests: u32,
    pub current_harvests: u32,
    pub planted_at: Timestamp,
    pub last_harvest_at: Timestamp,
}

impl Plantable {
    /// Fresh, unplanted content. `max_harvests` is at least 1.
    pub fn new(kind: PlantableKind, growth: Duration, max_harvests: u32) -> Self {
        Self {
            kind,
            growth,
            max_harvests: max_harvests.max(1),
            current_harvests: 0,
            planted_at: Timestamp::EPOCH,
            last_harvest_at: Timestamp::EPOCH,
        }
    }

    /// Build from the config's growth table.
    pub fn from_config(kind: PlantableKind, config: &GameConfig) -> Self {
        let spec = config.growth_spec(kind);
        Self::new(
            kind,
            Duration::from_secs(u64::from(spec.harvest_minutes) * 60),
            spec.max_harvests,
        )
    }

    /// Rebuild saved content exactly, without going through `plant`.
    pub fn restore(
        kind: PlantableKind,
        growth: Duration,
        max_harvests: u32,
        current_harvests: u32,
        planted_at: Timestamp,
        last_harvest_at: Timestamp,
    ) -> Self {
        let max_harvests = max_harvests.max(1);
        Self {
            kind,
            growth,
            max_harvests,
            current_harvests: current_harvests.min(max_harvests),
            planted_at,
            last_harvest_at,
        }
    }

    /// Start the growth timer. Harvest count is left alone so restored
    /// content keeps its progress.
    pub fn plant(&mut self, now: Timestamp) {
        self.planted_at = now;
        self.last_harvest_at = now;
    }

    pub fn product(&self) -> ProductType {
        self.kind.product()
    }

    pub fn next_harvest_at(&self) -> Timestamp {
        self.last_harvest_at + self.growth
    }

    pub fn is_ready(&self, now: Timestamp) -> bool {
        now >= self.next_harvest_at() && self.current_harvests < self.max_harvests
    }

    /// Take one harvest. `None` when not ready; nothing changes in that case.
    pub fn harvest(&mut self, now: Timestamp) -> Option<ProductType> {
        if !self.is_ready(now) {
            return None;
        }
        self.current_harvests += 1;
        self.last_harvest_at = now;
        Some(self.product())
    }

    pub fn is_expired(&self) -> bool {
        self.current_harvests >= self.max_harvests
    }

    pub fn time_to_next_harvest(&self, now: Timestamp) -> Duration {
        if self.is_ready(now) {
            Duration::ZERO
        } else {
            self.next_harvest_at().saturating_since(now)
        }
    }

    /// Visual identifier: crops switch from seed to mature art when ready.
    pub fn display_name(&self, now: Timestamp) -> String {
        if self.kind.is_animal() {
            return format!("{:?}", self.kind);
        }
        let stage = if self.is_ready(now) { "Mature" } else { "Seed" };
        format!("{:?}{}", self.kind, stage)
    }
}
