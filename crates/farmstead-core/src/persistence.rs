//! Save/Load for the farm
//!
//! The farm is flattened into a single `SaveData` record: scalar fields for
//! gold, caps and every inventory and equipment count, plus one record per
//! plot. Times are stored as raw millisecond timestamps. Reservations and
//! worker entities are not saved; workers are respawned from the id roster.
//!
//! Two encodings are supported: pretty JSON and bincode.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use crate::components::*;
use crate::farm::Farm;
use crate::time::Timestamp;
use farmstead_logic::constants::{AnimalType, CropType, PlantableKind, PlotZone, ProductType};

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Longest growth time a save may carry (one year).
const MAX_GROWTH_MINUTES: f64 = 525_600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    Json,
    Binary,
}

impl SaveFormat {
    /// `.json` files are JSON, anything else is binary.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SaveFormat::Json,
            _ => SaveFormat::Binary,
        }
    }
}

/// Flat snapshot of the farm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub gold: u64,
    pub max_plots: u32,
    pub max_workers: u32,
    pub last_save_time: i64,
    pub worker_ids: Vec<u32>,

    pub tomato_seeds: u32,
    pub blueberry_seeds: u32,
    pub strawberry_seeds: u32,
    pub cows: u32,

    pub tomatoes: u32,
    pub blueberries: u32,
    pub strawberries: u32,
    pub milk: u32,

    pub tomato_equipment: u32,
    pub blueberry_equipment: u32,
    pub strawberry_equipment: u32,
    pub milk_equipment: u32,

    pub plots: Vec<PlotRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotRecord {
    pub id: u32,
    pub zone: PlotZone,
    pub last_action_time: i64,
    pub content: Option<ContentRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub kind: PlantableKind,
    pub growth_minutes: f64,
    pub max_harvests: u32,
    pub current_harvests: u32,
    pub planted_time: i64,
    pub last_harvest_time: i64,
}

impl SaveData {
    /// Snapshot `farm` as of `saved_at`.
    pub fn from_farm(farm: &Farm, saved_at: Timestamp) -> Self {
        let inv = &farm.inventory;
        Self {
            version: SAVE_VERSION,
            gold: farm.gold(),
            max_plots: farm.max_plots(),
            max_workers: farm.max_workers(),
            last_save_time: saved_at.as_millis(),
            worker_ids: farm.worker_ids().iter().map(|w| w.0).collect(),

            tomato_seeds: inv.seed_count(CropType::Tomato),
            blueberry_seeds: inv.seed_count(CropType::Blueberry),
            strawberry_seeds: inv.seed_count(CropType::Strawberry),
            cows: inv.animal_count(AnimalType::Cow),

            tomatoes: inv.product_count(ProductType::Tomato),
            blueberries: inv.product_count(ProductType::Blueberry),
            strawberries: inv.product_count(ProductType::Strawberry),
            milk: inv.product_count(ProductType::Milk),

            tomato_equipment: farm.equipment_level(ProductType::Tomato),
            blueberry_equipment: farm.equipment_level(ProductType::Blueberry),
            strawberry_equipment: farm.equipment_level(ProductType::Strawberry),
            milk_equipment: farm.equipment_level(ProductType::Milk),

            plots: farm.plots().iter().map(PlotRecord::from).collect(),
        }
    }

    /// Rebuild the farm. Plantables are restored field by field so their
    /// harvest progress survives.
    pub fn into_farm(self) -> Result<Farm, SaveError> {
        let mut ids = BTreeSet::new();
        if let Some(dup) = self.plots.iter().find(|p| !ids.insert(p.id)) {
            return Err(SaveError::Corrupt(format!("duplicate plot id {}", dup.id)));
        }
        let plots = self
            .plots
            .into_iter()
            .map(Plot::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut farm = Farm::new(self.max_plots, self.max_workers, Timestamp(self.last_save_time));
        farm.gold = self.gold;
        farm.worker_ids = self.worker_ids.into_iter().map(WorkerId).collect();

        let inv = &mut farm.inventory;
        inv.add_seeds(CropType::Tomato, self.tomato_seeds);
        inv.add_seeds(CropType::Blueberry, self.blueberry_seeds);
        inv.add_seeds(CropType::Strawberry, self.strawberry_seeds);
        inv.add_animals(AnimalType::Cow, self.cows);
        inv.add_product(ProductType::Tomato, self.tomatoes);
        inv.add_product(ProductType::Blueberry, self.blueberries);
        inv.add_product(ProductType::Strawberry, self.strawberries);
        inv.add_product(ProductType::Milk, self.milk);

        for (product, level) in [
            (ProductType::Tomato, self.tomato_equipment),
            (ProductType::Blueberry, self.blueberry_equipment),
            (ProductType::Strawberry, self.strawberry_equipment),
            (ProductType::Milk, self.milk_equipment),
        ] {
            farm.equipment_levels.insert(product, level.max(1));
        }

        farm.plots = plots;
        Ok(farm)
    }
}

impl From<&Plot> for PlotRecord {
    fn from(plot: &Plot) -> Self {
        Self {
            id: plot.id.0,
            zone: plot.zone,
            last_action_time: plot.last_action_at.as_millis(),
            content: plot.content.as_ref().map(|c| ContentRecord {
                kind: c.kind,
                growth_minutes: c.growth.as_secs_f64() / 60.0,
                max_harvests: c.max_harvests,
                current_harvests: c.current_harvests,
                planted_time: c.planted_at.as_millis(),
                last_harvest_time: c.last_harvest_at.as_millis(),
            }),
        }
    }
}

impl TryFrom<PlotRecord> for Plot {
    type Error = SaveError;

    fn try_from(record: PlotRecord) -> Result<Self, SaveError> {
        let mut plot = Plot::new(
            PlotId(record.id),
            record.zone,
            Timestamp(record.last_action_time),
        );
        if let Some(c) = record.content {
            if !record.zone.accepts(c.kind) {
                return Err(SaveError::Corrupt(format!(
                    "plot {} in zone {:?} holds {:?}",
                    record.id, record.zone, c.kind
                )));
            }
            if !(0.0..=MAX_GROWTH_MINUTES).contains(&c.growth_minutes) {
                return Err(SaveError::Corrupt(format!(
                    "plot {} has growth time {} minutes",
                    record.id, c.growth_minutes
                )));
            }
            let growth = Duration::try_from_secs_f64(c.growth_minutes * 60.0)
                .map_err(|e| SaveError::Corrupt(format!("plot {}: {}", record.id, e)))?;
            plot.content = Some(Plantable::restore(
                c.kind,
                growth,
                c.max_harvests,
                c.current_harvests,
                Timestamp(c.planted_time),
                Timestamp(c.last_harvest_time),
            ));
        }
        Ok(plot)
    }
}

/// Write the farm to `writer`.
pub fn save_farm<W: Write>(
    writer: W,
    farm: &Farm,
    saved_at: Timestamp,
    format: SaveFormat,
) -> Result<(), SaveError> {
    let save_data = SaveData::from_farm(farm, saved_at);
    match format {
        SaveFormat::Json => serde_json::to_writer_pretty(writer, &save_data)?,
        SaveFormat::Binary => bincode::serialize_into(writer, &save_data)?,
    }
    Ok(())
}

/// Read a farm back from `reader`.
pub fn load_farm<R: Read>(reader: R, format: SaveFormat) -> Result<Farm, SaveError> {
    let save_data: SaveData = match format {
        SaveFormat::Json => serde_json::from_reader(reader)?,
        SaveFormat::Binary => bincode::deserialize_from(reader)?,
    };

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    save_data.into_farm()
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    Json(serde_json::Error),
    VersionMismatch { expected: u32, found: u32 },
    /// Decoded, but the contents break a farm invariant
    Corrupt(String),
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Json(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::Json(e) => write!(f, "JSON error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            SaveError::Corrupt(msg) => write!(f, "Corrupt save: {}", msg),
        }
    }
}

impl std::error::Error for SaveError {}
