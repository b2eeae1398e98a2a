//! Balance tables: costs, sale values, growth timings, worker rarity stats.
//!
//! `GameConfig::default()` carries the hardcoded fallback values. A config
//! document is a JSON object of row tables:
//!
//! ```json
//! {
//!   "general":  [{ "name": "PlotCost", "value": 500 }],
//!   "crops":    [{ "crop": "Tomato", "seed_cost": 30, "harvest_minutes": 20, "max_harvests": 50 }],
//!   "animals":  [{ "animal": "Cow", "cost": 100, "harvest_minutes": 30, "max_harvests": 100 }],
//!   "products": [{ "product": "Milk", "value": 15 }],
//!   "rarities": [{ "rarity": "Common", "rate_percent": 50, "speed_min": 1.5,
//!                  "speed_max": 2.0, "duration_min": 100, "duration_max": 120 }],
//!   "night":    { "start_hour": 22, "end_hour": 6 }
//! }
//! ```
//!
//! Rows are decoded one at a time: a malformed row is skipped and the default
//! for that entry stays in place. A missing or unparsable file never fails the
//! game, `GameConfig::load` just hands back the defaults.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{AnimalType, CropType, PlantableKind, ProductType, Rarity};

const FALLBACK_SEED_COST: u64 = 30;
const FALLBACK_ANIMAL_COST: u64 = 100;
const FALLBACK_PRODUCT_VALUE: u64 = 5;

/// How long a plantable takes between harvests and how many it yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthSpec {
    pub harvest_minutes: u32,
    pub max_harvests: u32,
}

/// One row of the rarity table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RarityStats {
    /// Chance of drawing this tier, in percent. Rows should sum to 100.
    pub rate_percent: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    /// Work duration bounds in seconds.
    pub duration_min: f32,
    pub duration_max: f32,
}

/// Hours of the day (0-23) during which workers sleep. Both ends inclusive,
/// wrapping past midnight when `start_hour > end_hour`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightWindow {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl NightWindow {
    pub fn contains(&self, hour: u8) -> bool {
        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour <= self.end_hour
        } else {
            hour >= self.start_hour || hour <= self.end_hour
        }
    }
}

/// Read-only lookup tables consumed by the farm, the shop and worker hiring.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub worker_cost: u64,
    pub equipment_upgrade_cost: u64,
    pub plot_cost: u64,
    pub starting_gold: u64,
    pub max_plots: u32,
    pub max_workers: u32,
    pub win_gold: u64,
    pub seed_costs: BTreeMap<CropType, u64>,
    pub animal_costs: BTreeMap<AnimalType, u64>,
    pub product_values: BTreeMap<ProductType, u64>,
    pub growth: BTreeMap<PlantableKind, GrowthSpec>,
    pub rarities: BTreeMap<Rarity, RarityStats>,
    /// `None` keeps workers available around the clock.
    pub night: Option<NightWindow>,
    /// General rows with names the game does not interpret itself.
    pub extra: BTreeMap<String, i64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let seed_costs = BTreeMap::from([
            (CropType::Tomato, 30),
            (CropType::Blueberry, 50),
            (CropType::Strawberry, 40),
        ]);
        let animal_costs = BTreeMap::from([(AnimalType::Cow, 100)]);
        let product_values = BTreeMap::from([
            (ProductType::Tomato, 5),
            (ProductType::Blueberry, 8),
            (ProductType::Strawberry, 12),
            (ProductType::Milk, 15),
        ]);
        let growth = BTreeMap::from([
            (PlantableKind::Tomato, GrowthSpec { harvest_minutes: 20, max_harvests: 50 }),
            (PlantableKind::Blueberry, GrowthSpec { harvest_minutes: 25, max_harvests: 40 }),
            (PlantableKind::Strawberry, GrowthSpec { harvest_minutes: 15, max_harvests: 30 }),
            (PlantableKind::Cow, GrowthSpec { harvest_minutes: 30, max_harvests: 100 }),
        ]);
        let rarities = BTreeMap::from([
            (Rarity::Common, RarityStats::new(50.0, 1.5, 2.0, 100.0, 120.0)),
            (Rarity::Uncommon, RarityStats::new(25.0, 2.0, 2.5, 80.0, 100.0)),
            (Rarity::Rare, RarityStats::new(15.0, 2.5, 3.0, 60.0, 80.0)),
            (Rarity::Epic, RarityStats::new(8.0, 3.0, 3.5, 45.0, 60.0)),
            (Rarity::Legendary, RarityStats::new(2.0, 3.5, 4.0, 30.0, 45.0)),
        ]);

        Self {
            worker_cost: 500,
            equipment_upgrade_cost: 500,
            plot_cost: 500,
            starting_gold: 500,
            max_plots: 64,
            max_workers: 10,
            win_gold: 1_000_000,
            seed_costs,
            animal_costs,
            product_values,
            growth,
            rarities,
            night: None,
            extra: BTreeMap::new(),
        }
    }
}

impl RarityStats {
    pub fn new(
        rate_percent: f32,
        speed_min: f32,
        speed_max: f32,
        duration_min: f32,
        duration_max: f32,
    ) -> Self {
        Self {
            rate_percent,
            speed_min,
            speed_max,
            duration_min,
            duration_max,
        }
    }
}

impl GameConfig {
    /// Load from a JSON file, falling back to defaults on any failure.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Config file {} not readable ({}), using defaults", path.display(), e);
                return Self::default();
            }
        };
        match Self::from_json_str(&text) {
            Ok(config) => {
                log::info!("Game configuration loaded from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Failed to parse config {}: {}. Using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Apply a config document on top of the defaults.
    ///
    /// Fails only when the text is not a JSON object at all; individual bad
    /// rows are skipped.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let document: ConfigDocument = serde_json::from_str(text)?;
        let mut config = Self::default();
        config.apply(document);
        Ok(config)
    }

    /// Re-read the tables from disk, replacing everything currently loaded.
    pub fn reload(&mut self, path: impl AsRef<Path>) {
        *self = Self::load(path);
    }

    fn apply(&mut self, document: ConfigDocument) {
        for row in document.general {
            match serde_json::from_value::<GeneralRow>(row) {
                Ok(row) => self.apply_general(row),
                Err(e) => log::warn!("Skipping malformed general row: {}", e),
            }
        }
        for row in document.crops {
            match serde_json::from_value::<CropRow>(row) {
                Ok(row) => {
                    self.seed_costs.insert(row.crop, row.seed_cost);
                    self.apply_growth(row.crop.plantable(), row.harvest_minutes, row.max_harvests);
                }
                Err(e) => log::warn!("Skipping malformed crop row: {}", e),
            }
        }
        for row in document.animals {
            match serde_json::from_value::<AnimalRow>(row) {
                Ok(row) => {
                    self.animal_costs.insert(row.animal, row.cost);
                    self.apply_growth(
                        row.animal.plantable(),
                        row.harvest_minutes,
                        row.max_harvests,
                    );
                }
                Err(e) => log::warn!("Skipping malformed animal row: {}", e),
            }
        }
        for row in document.products {
            match serde_json::from_value::<ProductRow>(row) {
                Ok(row) => {
                    self.product_values.insert(row.product, row.value);
                }
                Err(e) => log::warn!("Skipping malformed product row: {}", e),
            }
        }
        for row in document.rarities {
            match serde_json::from_value::<RarityRow>(row) {
                Ok(row) if row.stats.speed_min <= row.stats.speed_max
                    && row.stats.duration_min <= row.stats.duration_max
                    && row.stats.rate_percent >= 0.0 =>
                {
                    self.rarities.insert(row.rarity, row.stats);
                }
                Ok(row) => log::warn!("Skipping rarity row {:?} with inverted ranges", row.rarity),
                Err(e) => log::warn!("Skipping malformed rarity row: {}", e),
            }
        }
        if document.night.is_some() {
            self.night = document.night;
        }
    }

    fn apply_general(&mut self, row: GeneralRow) {
        let value = u64::try_from(row.value);
        match (row.name.as_str(), value) {
            ("WorkerCost", Ok(v)) => self.worker_cost = v,
            ("EquipmentUpgradeCost", Ok(v)) => self.equipment_upgrade_cost = v,
            ("PlotCost", Ok(v)) => self.plot_cost = v,
            ("StartingGold", Ok(v)) => self.starting_gold = v,
            ("WinGold", Ok(v)) => self.win_gold = v,
            ("MaxPlots", Ok(v)) if v <= u32::MAX as u64 => self.max_plots = v as u32,
            ("MaxWorkers", Ok(v)) if v <= u32::MAX as u64 => self.max_workers = v as u32,
            (
                "WorkerCost" | "EquipmentUpgradeCost" | "PlotCost" | "StartingGold" | "WinGold"
                | "MaxPlots" | "MaxWorkers",
                _,
            ) => log::warn!("Skipping general row {} = {}", row.name, row.value),
            (other, _) => {
                self.extra.insert(other.to_string(), row.value);
            }
        }
    }

    fn apply_growth(&mut self, kind: PlantableKind, minutes: Option<u32>, max: Option<u32>) {
        let current = self.growth_spec(kind);
        let max_harvests = max.unwrap_or(current.max_harvests);
        if max_harvests == 0 {
            log::warn!("Ignoring zero max_harvests for {:?}", kind);
            return;
        }
        self.growth.insert(
            kind,
            GrowthSpec {
                harvest_minutes: minutes.unwrap_or(current.harvest_minutes),
                max_harvests,
            },
        );
    }

    pub fn seed_cost(&self, crop: CropType) -> u64 {
        self.seed_costs.get(&crop).copied().unwrap_or(FALLBACK_SEED_COST)
    }

    pub fn animal_cost(&self, animal: AnimalType) -> u64 {
        self.animal_costs.get(&animal).copied().unwrap_or(FALLBACK_ANIMAL_COST)
    }

    pub fn product_value(&self, product: ProductType) -> u64 {
        self.product_values.get(&product).copied().unwrap_or(FALLBACK_PRODUCT_VALUE)
    }

    pub fn growth_spec(&self, kind: PlantableKind) -> GrowthSpec {
        self.growth
            .get(&kind)
            .copied()
            .or_else(|| GameConfig::default().growth.get(&kind).copied())
            .unwrap_or(GrowthSpec {
                harvest_minutes: 20,
                max_harvests: 50,
            })
    }

    pub fn rarity_stats(&self, rarity: Rarity) -> RarityStats {
        self.rarities
            .get(&rarity)
            .copied()
            .unwrap_or(RarityStats::new(0.0, 2.0, 2.0, 120.0, 120.0))
    }

    /// Look up a general value by name, including the interpreted ones.
    pub fn general_value(&self, name: &str, default: i64) -> i64 {
        let known = match name {
            "WorkerCost" => Some(self.worker_cost),
            "EquipmentUpgradeCost" => Some(self.equipment_upgrade_cost),
            "PlotCost" => Some(self.plot_cost),
            "StartingGold" => Some(self.starting_gold),
            "WinGold" => Some(self.win_gold),
            "MaxPlots" => Some(self.max_plots as u64),
            "MaxWorkers" => Some(self.max_workers as u64),
            _ => None,
        };
        match known {
            Some(v) => i64::try_from(v).unwrap_or(i64::MAX),
            None => self.extra.get(name).copied().unwrap_or(default),
        }
    }

    /// Dump the loaded tables at info level.
    pub fn log_summary(&self) {
        log::info!(
            "Config: worker {} / upgrade {} / plot {} gold, start {}, caps {} plots {} workers",
            self.worker_cost,
            self.equipment_upgrade_cost,
            self.plot_cost,
            self.starting_gold,
            self.max_plots,
            self.max_workers
        );
        for (crop, cost) in &self.seed_costs {
            log::info!("  seed {:?}: {}", crop, cost);
        }
        for (animal, cost) in &self.animal_costs {
            log::info!("  animal {:?}: {}", animal, cost);
        }
        for (product, value) in &self.product_values {
            log::info!("  product {:?}: {}", product, value);
        }
    }
}

// ── Document rows ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    general: Vec<Value>,
    #[serde(default)]
    crops: Vec<Value>,
    #[serde(default)]
    animals: Vec<Value>,
    #[serde(default)]
    products: Vec<Value>,
    #[serde(default)]
    rarities: Vec<Value>,
    #[serde(default)]
    night: Option<NightWindow>,
}

#[derive(Deserialize)]
struct GeneralRow {
    name: String,
    value: i64,
}

#[derive(Deserialize)]
struct CropRow {
    crop: CropType,
    seed_cost: u64,
    #[serde(default)]
    harvest_minutes: Option<u32>,
    #[serde(default)]
    max_harvests: Option<u32>,
}

#[derive(Deserialize)]
struct AnimalRow {
    animal: AnimalType,
    cost: u64,
    #[serde(default)]
    harvest_minutes: Option<u32>,
    #[serde(default)]
    max_harvests: Option<u32>,
}

#[derive(Deserialize)]
struct ProductRow {
    product: ProductType,
    value: u64,
}

#[derive(Deserialize)]
struct RarityRow {
    rarity: Rarity,
    #[serde(flatten)]
    stats: RarityStats,
}

/// Errors from reading a config document. `GameConfig::load` swallows these.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Json(e) => write!(f, "Config parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
