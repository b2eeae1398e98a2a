//! Farm constants: crop, animal, product, zone, task and worker enums.
//!
//! All of these are closed sets. A plot zone accepts exactly one plantable
//! kind, and every crop or animal belongs to exactly one zone, so the
//! zone/kind mapping is a bijection expressed by the `zone()` and
//! `plantable()` pairs below.

use serde::{Deserialize, Serialize};

/// Seed types sold in the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CropType {
    Tomato,
    Blueberry,
    Strawberry,
}

impl CropType {
    pub const ALL: [CropType; 3] = [CropType::Tomato, CropType::Blueberry, CropType::Strawberry];

    pub fn zone(self) -> PlotZone {
        match self {
            CropType::Tomato => PlotZone::Tomato,
            CropType::Blueberry => PlotZone::Blueberry,
            CropType::Strawberry => PlotZone::Strawberry,
        }
    }

    pub fn product(self) -> ProductType {
        self.plantable().product()
    }

    pub fn plantable(self) -> PlantableKind {
        match self {
            CropType::Tomato => PlantableKind::Tomato,
            CropType::Blueberry => PlantableKind::Blueberry,
            CropType::Strawberry => PlantableKind::Strawberry,
        }
    }
}

/// Livestock types sold in the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnimalType {
    Cow,
}

impl AnimalType {
    pub const ALL: [AnimalType; 1] = [AnimalType::Cow];

    pub fn zone(self) -> PlotZone {
        match self {
            AnimalType::Cow => PlotZone::Cow,
        }
    }

    pub fn product(self) -> ProductType {
        self.plantable().product()
    }

    pub fn plantable(self) -> PlantableKind {
        match self {
            AnimalType::Cow => PlantableKind::Cow,
        }
    }
}

/// Harvested goods. "No product" is expressed as `Option::None` by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProductType {
    Tomato,
    Blueberry,
    Strawberry,
    Milk,
}

impl ProductType {
    pub const ALL: [ProductType; 4] = [
        ProductType::Tomato,
        ProductType::Blueberry,
        ProductType::Strawberry,
        ProductType::Milk,
    ];
}

/// A fixed partition of plots. Each zone hosts exactly one plantable kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlotZone {
    Strawberry,
    Tomato,
    Blueberry,
    Cow,
}

impl PlotZone {
    /// Zones in creation order. Ties in "fewest plots" resolve to the earliest.
    pub const ALL: [PlotZone; 4] = [
        PlotZone::Strawberry,
        PlotZone::Tomato,
        PlotZone::Blueberry,
        PlotZone::Cow,
    ];

    /// The only plantable kind this zone accepts.
    pub fn plantable(self) -> PlantableKind {
        match self {
            PlotZone::Strawberry => PlantableKind::Strawberry,
            PlotZone::Tomato => PlantableKind::Tomato,
            PlotZone::Blueberry => PlantableKind::Blueberry,
            PlotZone::Cow => PlantableKind::Cow,
        }
    }

    pub fn accepts(self, kind: PlantableKind) -> bool {
        self.plantable() == kind
    }

    pub fn accepts_crop(self, crop: CropType) -> bool {
        self.accepts(crop.plantable())
    }

    pub fn accepts_animal(self, animal: AnimalType) -> bool {
        self.accepts(animal.plantable())
    }
}

/// Discriminant of anything that can occupy a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlantableKind {
    Tomato,
    Blueberry,
    Strawberry,
    Cow,
}

impl PlantableKind {
    pub const ALL: [PlantableKind; 4] = [
        PlantableKind::Tomato,
        PlantableKind::Blueberry,
        PlantableKind::Strawberry,
        PlantableKind::Cow,
    ];

    pub fn zone(self) -> PlotZone {
        match self {
            PlantableKind::Tomato => PlotZone::Tomato,
            PlantableKind::Blueberry => PlotZone::Blueberry,
            PlantableKind::Strawberry => PlotZone::Strawberry,
            PlantableKind::Cow => PlotZone::Cow,
        }
    }

    pub fn product(self) -> ProductType {
        match self {
            PlantableKind::Tomato => ProductType::Tomato,
            PlantableKind::Blueberry => ProductType::Blueberry,
            PlantableKind::Strawberry => ProductType::Strawberry,
            PlantableKind::Cow => ProductType::Milk,
        }
    }

    pub fn crop(self) -> Option<CropType> {
        match self {
            PlantableKind::Tomato => Some(CropType::Tomato),
            PlantableKind::Blueberry => Some(CropType::Blueberry),
            PlantableKind::Strawberry => Some(CropType::Strawberry),
            PlantableKind::Cow => None,
        }
    }

    pub fn animal(self) -> Option<AnimalType> {
        match self {
            PlantableKind::Cow => Some(AnimalType::Cow),
            _ => None,
        }
    }

    pub fn is_animal(self) -> bool {
        self.animal().is_some()
    }

    /// The work a worker performs to collect this plantable's product.
    pub fn harvest_task(self) -> TaskType {
        if self.is_animal() {
            TaskType::Milk
        } else {
            TaskType::Harvest
        }
    }
}

/// Derived state of a plot; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlotState {
    Empty,
    Growing,
    ReadyToHarvest,
    /// Content has used up its harvests but has not been cleared yet.
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    Harvest,
    Plant,
    Milk,
    Feed,
}

/// Worker quality tier, ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WorkerState {
    #[default]
    Idle,
    Moving,
    Working,
    Sleeping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_kind_bijection() {
        for zone in PlotZone::ALL {
            assert_eq!(zone.plantable().zone(), zone);
        }
        for kind in PlantableKind::ALL {
            assert_eq!(kind.zone().plantable(), kind);
        }
    }

    #[test]
    fn test_cow_zone_rejects_crops() {
        for crop in CropType::ALL {
            assert!(!PlotZone::Cow.accepts_crop(crop));
        }
        assert!(PlotZone::Cow.accepts_animal(AnimalType::Cow));
    }

    #[test]
    fn test_crop_zones_reject_animals() {
        for zone in [PlotZone::Strawberry, PlotZone::Tomato, PlotZone::Blueberry] {
            assert!(!zone.accepts_animal(AnimalType::Cow));
        }
    }

    #[test]
    fn test_each_crop_has_one_zone() {
        for crop in CropType::ALL {
            let accepting: Vec<_> = PlotZone::ALL
                .iter()
                .filter(|z| z.accepts_crop(crop))
                .collect();
            assert_eq!(accepting, vec![&crop.zone()]);
        }
    }

    #[test]
    fn test_cow_is_milked() {
        assert_eq!(PlantableKind::Cow.product(), ProductType::Milk);
        assert_eq!(PlantableKind::Cow.harvest_task(), TaskType::Milk);
        assert_eq!(PlantableKind::Tomato.harvest_task(), TaskType::Harvest);
    }
}
