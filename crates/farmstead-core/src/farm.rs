//! Farm - the aggregate root.
//!
//! Owns every plot, the inventory, gold, equipment levels, the worker-id
//! roster and the plot reservation table. Worker entities live in the engine's
//! world; the farm only knows their ids.
//!
//! Primitive check-and-set operations (`spend_gold`, `reserve_plot`) answer
//! with `bool` and never mutate on failure. Compound operations (shop,
//! manual farming) return `FarmError` and are equally all-or-nothing.

use crate::components::*;
use crate::events::{EventBus, FarmEvent};
use crate::time::Timestamp;
use farmstead_logic::config::GameConfig;
use farmstead_logic::constants::{
    AnimalType, CropType, PlantableKind, PlotState, PlotZone, ProductType, TaskType,
};
use farmstead_logic::layout;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Seeds stocked on a new farm, per crop.
pub const STARTING_SEEDS: u32 = 10;
/// Animals stocked on a new farm.
pub const STARTING_ANIMALS: u32 = 2;

#[derive(Debug)]
pub struct Farm {
    pub(crate) gold: u64,
    pub(crate) max_plots: u32,
    pub(crate) max_workers: u32,
    pub(crate) plots: Vec<Plot>,
    pub(crate) worker_ids: Vec<WorkerId>,
    pub inventory: Inventory,
    pub(crate) equipment_levels: BTreeMap<ProductType, u32>,
    /// Transient; never persisted.
    reservations: BTreeMap<PlotId, WorkerId>,
    pub last_save_time: Timestamp,
    events: EventBus,
}

impl Farm {
    /// Empty farm with no gold, plots or workers.
    pub fn new(max_plots: u32, max_workers: u32, now: Timestamp) -> Self {
        Self {
            gold: 0,
            max_plots,
            max_workers,
            plots: Vec::new(),
            worker_ids: Vec::new(),
            inventory: Inventory::new(),
            equipment_levels: BTreeMap::new(),
            reservations: BTreeMap::new(),
            last_save_time: now,
            events: EventBus::new(),
        }
    }

    /// The farm a new game starts with: one plot per zone, a little stock
    /// and a single worker with id 0.
    pub fn starter(config: &GameConfig, now: Timestamp) -> Self {
        let mut farm = Self::new(config.max_plots, config.max_workers, now);
        farm.gold = config.starting_gold;
        for zone in PlotZone::ALL {
            farm.push_plot(zone, now);
        }
        for crop in CropType::ALL {
            farm.inventory.add_seeds(crop, STARTING_SEEDS);
        }
        farm.inventory.add_animals(AnimalType::Cow, STARTING_ANIMALS);
        farm.worker_ids.push(WorkerId(0));
        farm
    }

    // ── Notifications ───────────────────────────────────────────────

    pub fn subscribe(&mut self, listener: impl FnMut(&FarmEvent) + 'static) {
        self.events.subscribe(listener);
    }

    pub fn emit(&mut self, event: FarmEvent) {
        self.events.emit(event);
    }

    fn notify_plot(&mut self, plot_id: PlotId) {
        self.events.emit(FarmEvent::PlotStateChanged(plot_id));
        self.events.emit(FarmEvent::FarmStateChanged);
    }

    fn notify_gold(&mut self) {
        self.events.emit(FarmEvent::GoldChanged(self.gold));
        self.events.emit(FarmEvent::FarmStateChanged);
    }

    // ── Gold ────────────────────────────────────────────────────────

    pub fn gold(&self) -> u64 {
        self.gold
    }

    pub fn spend_gold(&mut self, amount: u64) -> bool {
        if self.gold < amount {
            return false;
        }
        self.gold -= amount;
        self.notify_gold();
        true
    }

    pub fn add_gold(&mut self, amount: u64) {
        self.gold = self.gold.saturating_add(amount);
        self.notify_gold();
    }

    fn charge(&mut self, cost: u64) -> Result<(), FarmError> {
        if self.spend_gold(cost) {
            Ok(())
        } else {
            Err(FarmError::InsufficientGold {
                needed: cost,
                available: self.gold,
            })
        }
    }

    // ── Expansion ───────────────────────────────────────────────────

    /// Buy a plot in the zone that currently has the fewest.
    pub fn buy_plot(&mut self, config: &GameConfig, now: Timestamp) -> Result<PlotId, FarmError> {
        if self.plots.len() >= self.max_plots as usize {
            return Err(FarmError::PlotLimitReached);
        }
        self.charge(config.plot_cost)?;
        let zone = self.least_planted_zone();
        let id = self.push_plot(zone, now);
        log::info!("Bought plot {} in {:?} zone", id, zone);
        self.notify_plot(id);
        Ok(id)
    }

    fn least_planted_zone(&self) -> PlotZone {
        PlotZone::ALL
            .into_iter()
            .min_by_key(|zone| self.plots_in_zone(*zone))
            .unwrap_or(PlotZone::Strawberry)
    }

    pub(crate) fn push_plot(&mut self, zone: PlotZone, now: Timestamp) -> PlotId {
        let id = self
            .plots
            .iter()
            .map(|p| p.id.0 + 1)
            .max()
            .map_or(PlotId(0), PlotId);
        self.plots.push(Plot::new(id, zone, now));
        id
    }

    /// Register a new worker id. The caller spawns the worker itself.
    pub fn buy_worker(&mut self, config: &GameConfig) -> Result<WorkerId, FarmError> {
        if self.worker_ids.len() >= self.max_workers as usize {
            return Err(FarmError::WorkerLimitReached);
        }
        self.charge(config.worker_cost)?;
        let id = self
            .worker_ids
            .iter()
            .map(|w| w.0 + 1)
            .max()
            .map_or(WorkerId(0), WorkerId);
        self.worker_ids.push(id);
        log::info!("Hired worker {}", id);
        self.events.emit(FarmEvent::FarmStateChanged);
        Ok(id)
    }

    /// Raise the equipment level for `product`; returns the new level.
    pub fn upgrade_equipment(
        &mut self,
        config: &GameConfig,
        product: ProductType,
    ) -> Result<u32, FarmError> {
        self.charge(config.equipment_upgrade_cost)?;
        let level = self.equipment_levels.entry(product).or_insert(1);
        *level += 1;
        let level = *level;
        log::info!("Upgraded {:?} equipment to level {}", product, level);
        self.events.emit(FarmEvent::FarmStateChanged);
        Ok(level)
    }

    pub fn equipment_level(&self, product: ProductType) -> u32 {
        self.equipment_levels.get(&product).copied().unwrap_or(1)
    }

    /// Units gained per manual harvest: one extra unit every ten levels.
    pub fn production_bonus(&self, product: ProductType) -> u32 {
        1 + (self.equipment_level(product) - 1) / 10
    }

    // ── Shop ────────────────────────────────────────────────────────

    /// Returns the gold spent.
    pub fn buy_seeds(
        &mut self,
        config: &GameConfig,
        crop: CropType,
        amount: u32,
    ) -> Result<u64, FarmError> {
        let cost = config.seed_cost(crop).saturating_mul(u64::from(amount));
        self.charge(cost)?;
        self.inventory.add_seeds(crop, amount);
        log::info!("Bought {} {:?} seeds for {} gold", amount, crop, cost);
        self.events.emit(FarmEvent::FarmStateChanged);
        Ok(cost)
    }

    pub fn buy_animal(
        &mut self,
        config: &GameConfig,
        animal: AnimalType,
    ) -> Result<u64, FarmError> {
        let cost = config.animal_cost(animal);
        self.charge(cost)?;
        self.inventory.add_animals(animal, 1);
        log::info!("Bought a {:?} for {} gold", animal, cost);
        self.events.emit(FarmEvent::FarmStateChanged);
        Ok(cost)
    }

    /// Returns the gold earned.
    pub fn sell_product(
        &mut self,
        config: &GameConfig,
        product: ProductType,
        amount: u32,
    ) -> Result<u64, FarmError> {
        if !self.inventory.sell_product(product, amount) {
            return Err(FarmError::InsufficientProducts(product));
        }
        let earnings = config.product_value(product).saturating_mul(u64::from(amount));
        log::info!("Sold {} {:?} for {} gold", amount, product, earnings);
        self.add_gold(earnings);
        Ok(earnings)
    }

    // ── Reservations ────────────────────────────────────────────────

    /// Claim `plot_id` for `worker_id`. Fails if anyone holds it, including
    /// the same worker.
    pub fn reserve_plot(&mut self, plot_id: PlotId, worker_id: WorkerId) -> bool {
        match self.reservations.entry(plot_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(worker_id);
                true
            }
        }
    }

    /// Drop the claim, but only if `worker_id` is the one holding it.
    pub fn release_plot(&mut self, plot_id: PlotId, worker_id: WorkerId) {
        if self.reservations.get(&plot_id) == Some(&worker_id) {
            self.reservations.remove(&plot_id);
        }
    }

    pub fn reservation(&self, plot_id: PlotId) -> Option<WorkerId> {
        self.reservations.get(&plot_id).copied()
    }

    pub fn is_reserved(&self, plot_id: PlotId) -> bool {
        self.reservations.contains_key(&plot_id)
    }

    pub fn reservation_count(&self) -> usize {
        self.reservations.len()
    }

    // ── Work discovery ──────────────────────────────────────────────

    /// Task candidates in plot creation order. For each unreserved plot:
    /// harvest (or milk) if ready, otherwise plant if empty and the zone's
    /// seed or animal is in stock.
    pub fn get_work_tasks(&self, now: Timestamp) -> Vec<SimpleTask> {
        self.plots
            .iter()
            .filter(|plot| !self.is_reserved(plot.id))
            .filter_map(|plot| self.task_for_plot(plot, now))
            .collect()
    }

    fn task_for_plot(&self, plot: &Plot, now: Timestamp) -> Option<SimpleTask> {
        match &plot.content {
            Some(content) if content.is_ready(now) => {
                Some(SimpleTask::harvest(plot.id, content.kind))
            }
            Some(_) => None,
            None => {
                let kind = plot.zone.plantable();
                self.inventory
                    .has_stock_for(kind)
                    .then(|| SimpleTask::plant(plot.id, kind))
            }
        }
    }

    /// Whether `task` could still be carried out right now.
    pub fn is_task_valid(&self, task: &SimpleTask, now: Timestamp) -> bool {
        let Some(plot) = self.plot(task.plot_id) else {
            return false;
        };
        match (task.task_type, task.plantable) {
            (TaskType::Plant, Some(kind)) => {
                plot.can_plant_kind(kind) && self.inventory.has_stock_for(kind)
            }
            (TaskType::Plant, None) => false,
            _ => plot.can_harvest(now),
        }
    }

    // ── Plots ───────────────────────────────────────────────────────

    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    pub fn plot(&self, plot_id: PlotId) -> Option<&Plot> {
        self.plots.iter().find(|p| p.id == plot_id)
    }

    fn plot_mut(&mut self, plot_id: PlotId) -> Option<&mut Plot> {
        self.plots.iter_mut().find(|p| p.id == plot_id)
    }

    pub fn plot_state(&self, plot_id: PlotId, now: Timestamp) -> Option<PlotState> {
        self.plot(plot_id).map(|p| p.state(now))
    }

    /// Harvest a plot without touching the inventory.
    pub fn harvest_plot(&mut self, plot_id: PlotId, now: Timestamp) -> Option<ProductType> {
        let product = self.plot_mut(plot_id)?.harvest(now)?;
        self.notify_plot(plot_id);
        Some(product)
    }

    /// Put `plantable` into a plot without touching the inventory.
    pub fn plant_plot(&mut self, plot_id: PlotId, plantable: Plantable, now: Timestamp) -> bool {
        let planted = self
            .plot_mut(plot_id)
            .is_some_and(|plot| plot.plant(plantable, now));
        if planted {
            self.notify_plot(plot_id);
        }
        planted
    }

    /// Consume one seed or animal for `kind`.
    pub fn take_stock(&mut self, kind: PlantableKind) -> bool {
        match (kind.crop(), kind.animal()) {
            (Some(crop), _) => self.inventory.use_seeds(crop, 1),
            (None, Some(animal)) => self.inventory.use_animals(animal, 1),
            (None, None) => false,
        }
    }

    /// Player-initiated planting: consumes one seed or animal and plants at
    /// once.
    pub fn plant_now(
        &mut self,
        config: &GameConfig,
        plot_id: PlotId,
        kind: PlantableKind,
        now: Timestamp,
    ) -> Result<(), FarmError> {
        let plot = self.plot(plot_id).ok_or(FarmError::PlotNotFound(plot_id))?;
        if self.is_reserved(plot_id) {
            return Err(FarmError::PlotReserved(plot_id));
        }
        if !plot.can_plant_kind(kind) {
            return Err(FarmError::PlotNotPlantable(plot_id, kind));
        }
        if !self.take_stock(kind) {
            return Err(match (kind.crop(), kind.animal()) {
                (Some(crop), _) => FarmError::InsufficientSeeds(crop),
                (None, Some(animal)) => FarmError::InsufficientAnimals(animal),
                (None, None) => FarmError::PlotNotPlantable(plot_id, kind),
            });
        }
        self.plant_plot(plot_id, Plantable::from_config(kind, config), now);
        log::info!("Planted {:?} on plot {}", kind, plot_id);
        Ok(())
    }

    /// Player-initiated harvest, including the equipment bonus. Returns the
    /// product and how many units went to the inventory.
    pub fn harvest_now(
        &mut self,
        plot_id: PlotId,
        now: Timestamp,
    ) -> Result<(ProductType, u32), FarmError> {
        let plot = self.plot(plot_id).ok_or(FarmError::PlotNotFound(plot_id))?;
        if self.is_reserved(plot_id) {
            return Err(FarmError::PlotReserved(plot_id));
        }
        if !plot.can_harvest(now) {
            return Err(FarmError::NothingToHarvest(plot_id));
        }
        let product = self
            .harvest_plot(plot_id, now)
            .ok_or(FarmError::NothingToHarvest(plot_id))?;
        let amount = self.production_bonus(product);
        self.inventory.add_product(product, amount);
        log::info!("Harvested {} {:?} from plot {}", amount, product, plot_id);
        Ok((product, amount))
    }

    // ── Offline progress ────────────────────────────────────────────

    /// One catch-up harvest for every ready plot, one unit each. Returns how
    /// many plots were harvested.
    pub fn apply_offline_progress(&mut self, now: Timestamp) -> usize {
        let ready: Vec<PlotId> = self
            .plots
            .iter()
            .filter(|p| p.can_harvest(now))
            .map(|p| p.id)
            .collect();
        let mut harvested = 0;
        for plot_id in ready {
            if let Some(product) = self.harvest_plot(plot_id, now) {
                self.inventory.add_product(product, 1);
                harvested += 1;
            }
        }
        harvested
    }

    // ── Queries ─────────────────────────────────────────────────────

    pub fn plot_count(&self) -> usize {
        self.plots.len()
    }

    pub fn plots_in_zone(&self, zone: PlotZone) -> usize {
        self.plots.iter().filter(|p| p.zone == zone).count()
    }

    pub fn empty_plot_count(&self) -> usize {
        self.plots.iter().filter(|p| p.can_plant()).count()
    }

    pub fn ready_plot_count(&self, now: Timestamp) -> usize {
        self.plots.iter().filter(|p| p.can_harvest(now)).count()
    }

    pub fn worker_ids(&self) -> &[WorkerId] {
        &self.worker_ids
    }

    pub fn max_plots(&self) -> u32 {
        self.max_plots
    }

    pub fn max_workers(&self) -> u32 {
        self.max_workers
    }

    /// Ground position of a plot, from its zone and its rank within the zone.
    pub fn plot_position(&self, plot_id: PlotId) -> Option<Vec2> {
        let plot = self.plot(plot_id)?;
        let index = self
            .plots
            .iter()
            .filter(|p| p.zone == plot.zone)
            .position(|p| p.id == plot_id)?;
        Some(layout::plot_position(plot.zone, index).into())
    }

    /// End of session: drop reservations and listeners.
    pub fn cleanup(&mut self) {
        self.reservations.clear();
        self.events.clear();
    }
}

/// Errors from compound farm operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FarmError {
    InsufficientGold { needed: u64, available: u64 },
    PlotLimitReached,
    WorkerLimitReached,
    PlotNotFound(PlotId),
    PlotNotPlantable(PlotId, PlantableKind),
    NothingToHarvest(PlotId),
    PlotReserved(PlotId),
    InsufficientSeeds(CropType),
    InsufficientAnimals(AnimalType),
    InsufficientProducts(ProductType),
}

impl std::fmt::Display for FarmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FarmError::InsufficientGold { needed, available } => {
                write!(f, "Not enough gold: need {}, have {}", needed, available)
            }
            FarmError::PlotLimitReached => write!(f, "Plot limit reached"),
            FarmError::WorkerLimitReached => write!(f, "Worker limit reached"),
            FarmError::PlotNotFound(id) => write!(f, "Plot {} not found", id),
            FarmError::PlotNotPlantable(id, kind) => {
                write!(f, "Plot {} cannot take {:?}", id, kind)
            }
            FarmError::NothingToHarvest(id) => write!(f, "Plot {} has nothing to harvest", id),
            FarmError::PlotReserved(id) => write!(f, "Plot {} is reserved by a worker", id),
            FarmError::InsufficientSeeds(crop) => write!(f, "No {:?} seeds left", crop),
            FarmError::InsufficientAnimals(animal) => write!(f, "No {:?} left", animal),
            FarmError::InsufficientProducts(product) => write!(f, "Not enough {:?}", product),
        }
    }
}

impl std::error::Error for FarmError {}
