//! Inventory - seed, animal and product counters

use farmstead_logic::constants::{AnimalType, CropType, PlantableKind, ProductType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stock of the farm. Counts never go negative: every `use_*` is a
/// check-then-decrement that either removes the full amount or nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    seeds: BTreeMap<CropType, u32>,
    animals: BTreeMap<AnimalType, u32>,
    products: BTreeMap<ProductType, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_seeds(&mut self, crop: CropType, amount: u32) {
        add(&mut self.seeds, crop, amount);
    }

    pub fn add_animals(&mut self, animal: AnimalType, amount: u32) {
        add(&mut self.animals, animal, amount);
    }

    pub fn add_product(&mut self, product: ProductType, amount: u32) {
        add(&mut self.products, product, amount);
    }

    pub fn use_seeds(&mut self, crop: CropType, amount: u32) -> bool {
        take(&mut self.seeds, crop, amount)
    }

    pub fn use_animals(&mut self, animal: AnimalType, amount: u32) -> bool {
        take(&mut self.animals, animal, amount)
    }

    /// Remove products for sale. Pricing is the caller's business.
    pub fn sell_product(&mut self, product: ProductType, amount: u32) -> bool {
        take(&mut self.products, product, amount)
    }

    pub fn seed_count(&self, crop: CropType) -> u32 {
        self.seeds.get(&crop).copied().unwrap_or(0)
    }

    pub fn animal_count(&self, animal: AnimalType) -> u32 {
        self.animals.get(&animal).copied().unwrap_or(0)
    }

    pub fn product_count(&self, product: ProductType) -> u32 {
        self.products.get(&product).copied().unwrap_or(0)
    }

    /// True if there is at least one seed or animal for this plantable.
    pub fn has_stock_for(&self, kind: PlantableKind) -> bool {
        match (kind.crop(), kind.animal()) {
            (Some(crop), _) => self.seed_count(crop) > 0,
            (None, Some(animal)) => self.animal_count(animal) > 0,
            (None, None) => false,
        }
    }
}

// Zero counts are never stored, so two inventories with the same counts
// compare equal.
fn add<K: Ord>(map: &mut BTreeMap<K, u32>, key: K, amount: u32) {
    if amount == 0 {
        return;
    }
    let count = map.entry(key).or_insert(0);
    *count = count.saturating_add(amount);
}

fn take<K: Ord>(map: &mut BTreeMap<K, u32>, key: K, amount: u32) -> bool {
    let Some(count) = map.get_mut(&key) else {
        return amount == 0;
    };
    if *count < amount {
        return false;
    }
    *count -= amount;
    if *count == 0 {
        map.remove(&key);
    }
    true
}
