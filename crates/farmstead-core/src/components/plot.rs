//! Plot - a single farmable cell bound to a zone

use super::{Plantable, PlotId};
use crate::time::Timestamp;
use farmstead_logic::constants::{
    AnimalType, CropType, PlantableKind, PlotState, PlotZone, ProductType,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Plot state is never stored; it is derived from `content` on demand.
/// Change notifications are the owning farm's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    pub id: PlotId,
    pub zone: PlotZone,
    pub content: Option<Plantable>,
    pub last_action_at: Timestamp,
}

impl Plot {
    pub fn new(id: PlotId, zone: PlotZone, now: Timestamp) -> Self {
        Self {
            id,
            zone,
            content: None,
            last_action_at: now,
        }
    }

    pub fn can_plant(&self) -> bool {
        self.content.is_none()
    }

    pub fn can_plant_kind(&self, kind: PlantableKind) -> bool {
        self.can_plant() && self.zone.accepts(kind)
    }

    pub fn can_plant_type(&self, crop: CropType) -> bool {
        self.can_plant_kind(crop.plantable())
    }

    pub fn can_place_animal(&self, animal: AnimalType) -> bool {
        self.can_plant_kind(animal.plantable())
    }

    pub fn can_harvest(&self, now: Timestamp) -> bool {
        self.content.as_ref().is_some_and(|c| c.is_ready(now))
    }

    pub fn state(&self, now: Timestamp) -> PlotState {
        match &self.content {
            None => PlotState::Empty,
            Some(c) if c.is_expired() => PlotState::Dead,
            Some(c) if c.is_ready(now) => PlotState::ReadyToHarvest,
            Some(_) => PlotState::Growing,
        }
    }

    /// Take ownership of `plantable` and start its timer. Returns false and
    /// drops nothing into the plot if it is occupied or the zone rejects it.
    pub fn plant(&mut self, mut plantable: Plantable, now: Timestamp) -> bool {
        if !self.can_plant_kind(plantable.kind) {
            return false;
        }
        plantable.plant(now);
        self.content = Some(plantable);
        self.last_action_at = now;
        true
    }

    /// Harvest the content; expired content is cleared afterwards.
    pub fn harvest(&mut self, now: Timestamp) -> Option<ProductType> {
        let content = self.content.as_mut()?;
        let product = content.harvest(now)?;
        if content.is_expired() {
            self.content = None;
        }
        self.last_action_at = now;
        Some(product)
    }

    pub fn time_to_next_harvest(&self, now: Timestamp) -> Option<Duration> {
        self.content.as_ref().map(|c| c.time_to_next_harvest(now))
    }

    pub fn display_name(&self, now: Timestamp) -> Option<String> {
        self.content.as_ref().map(|c| c.display_name(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crop(kind: PlantableKind, max: u32) -> Plantable {
        Plantable::new(kind, Duration::from_secs(600), max)
    }

    #[test]
    fn test_tomato_zone_accepts_only_tomato() {
        let plot = Plot::new(PlotId(0), PlotZone::Tomato, Timestamp::EPOCH);
        assert!(plot.can_plant_type(CropType::Tomato));
        assert!(!plot.can_plant_type(CropType::Blueberry));
        assert!(!plot.can_place_animal(AnimalType::Cow));
    }

    #[test]
    fn test_plant_rejects_wrong_zone() {
        let mut plot = Plot::new(PlotId(0), PlotZone::Cow, Timestamp::EPOCH);
        assert!(!plot.plant(crop(PlantableKind::Tomato, 5), Timestamp::EPOCH));
        assert!(plot.content.is_none());
        assert!(plot.plant(crop(PlantableKind::Cow, 5), Timestamp::EPOCH));
        assert!(!plot.can_plant());
    }

    #[test]
    fn test_occupied_plot_rejects_plant() {
        let mut plot = Plot::new(PlotId(0), PlotZone::Tomato, Timestamp::EPOCH);
        assert!(plot.plant(crop(PlantableKind::Tomato, 5), Timestamp::EPOCH));
        assert!(!plot.plant(crop(PlantableKind::Tomato, 9), Timestamp::from_minutes(1)));
        assert_eq!(plot.content.as_ref().map(|c| c.max_harvests), Some(5));
    }

    #[test]
    fn test_state_progression() {
        let mut plot = Plot::new(PlotId(3), PlotZone::Strawberry, Timestamp::EPOCH);
        assert_eq!(plot.state(Timestamp::EPOCH), PlotState::Empty);

        plot.plant(crop(PlantableKind::Strawberry, 2), Timestamp::EPOCH);
        assert_eq!(plot.state(Timestamp::from_minutes(5)), PlotState::Growing);
        assert_eq!(plot.state(Timestamp::from_minutes(10)), PlotState::ReadyToHarvest);
    }

    #[test]
    fn test_harvest_clears_expired() {
        let mut plot = Plot::new(PlotId(1), PlotZone::Blueberry, Timestamp::EPOCH);
        plot.plant(crop(PlantableKind::Blueberry, 2), Timestamp::EPOCH);

        assert_eq!(plot.harvest(Timestamp::from_minutes(5)), None);
        assert_eq!(plot.harvest(Timestamp::from_minutes(10)), Some(ProductType::Blueberry));
        assert!(plot.content.is_some());
        assert_eq!(plot.harvest(Timestamp::from_minutes(20)), Some(ProductType::Blueberry));
        assert!(plot.content.is_none());
        assert_eq!(plot.last_action_at, Timestamp::from_minutes(20));
    }

    #[test]
    fn test_dead_state_is_reported() {
        let mut plot = Plot::new(PlotId(1), PlotZone::Blueberry, Timestamp::EPOCH);
        let mut spent = crop(PlantableKind::Blueberry, 1);
        spent.current_harvests = 1;
        plot.content = Some(spent);
        assert_eq!(plot.state(Timestamp::from_minutes(60)), PlotState::Dead);
        assert!(!plot.can_harvest(Timestamp::from_minutes(60)));
    }
}
