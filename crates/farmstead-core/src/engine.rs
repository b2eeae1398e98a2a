//! Farm engine - main entry point for running a farm session

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::components::*;
use crate::events::FarmEvent;
use crate::farm::{Farm, FarmError};
use crate::persistence::{self, SaveError, SaveFormat};
use crate::systems::*;
use crate::time::Timestamp;
use farmstead_logic::config::GameConfig;
use farmstead_logic::constants::{AnimalType, CropType, ProductType, WorkerState};
use farmstead_logic::rarity;

/// Seconds of simulated time between autosaves.
pub const AUTOSAVE_INTERVAL: f64 = 60.0;
/// Offline time below this is not worth a catch-up pass.
pub const OFFLINE_THRESHOLD_SECS: u64 = 60;

/// What happened while the game was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfflineReport {
    pub offline_minutes: u64,
    pub harvested: usize,
}

/// Main farm engine
pub struct FarmEngine {
    /// Worker entities
    pub world: World,
    pub farm: Farm,
    pub config: GameConfig,
    rng: StdRng,
    /// Simulated wall clock
    now: Timestamp,
    /// Simulated seconds since the session started
    sim_seconds: f64,
    time_scale: f32,
    next_schedule_at: f64,
    next_autosave_at: f64,
    save_path: Option<PathBuf>,
    goal_reached: bool,
}

impl FarmEngine {
    /// Start a fresh farm at `now`.
    pub fn new_game(config: GameConfig, now: Timestamp) -> Self {
        Self::new_game_with_rng(config, now, StdRng::from_entropy())
    }

    /// Start a fresh farm with a deterministic worker draw.
    pub fn new_game_seeded(config: GameConfig, now: Timestamp, seed: u64) -> Self {
        Self::new_game_with_rng(config, now, StdRng::seed_from_u64(seed))
    }

    fn new_game_with_rng(config: GameConfig, now: Timestamp, rng: StdRng) -> Self {
        let farm = Farm::starter(&config, now);
        let mut engine = Self::with_farm(config, farm, now, rng);
        engine.spawn_roster();
        log::info!(
            "New game: {} gold, {} plots, {} worker(s)",
            engine.farm.gold(),
            engine.farm.plot_count(),
            engine.worker_count()
        );
        engine
    }

    fn with_farm(config: GameConfig, farm: Farm, now: Timestamp, rng: StdRng) -> Self {
        Self {
            world: World::new(),
            farm,
            config,
            rng,
            now,
            sim_seconds: 0.0,
            time_scale: 1.0,
            next_schedule_at: 0.0,
            next_autosave_at: AUTOSAVE_INTERVAL,
            save_path: None,
            goal_reached: false,
        }
    }

    /// Resume from the save at `path`, or start over if it cannot be read.
    /// The save path is kept for autosaves either way.
    pub fn continue_game(
        config: GameConfig,
        path: impl AsRef<Path>,
        now: Timestamp,
    ) -> (Self, Option<OfflineReport>) {
        let path = path.as_ref();
        let (mut engine, report) = match Self::load_from_file(config.clone(), path, now) {
            Ok(loaded) => loaded,
            Err(e) => {
                log::warn!("Could not load {}: {}, starting a new game", path.display(), e);
                (Self::new_game(config, now), None)
            }
        };
        engine.save_path = Some(path.to_path_buf());
        (engine, report)
    }

    /// Load a farm from `reader` and apply offline progress up to `now`.
    pub fn load<R: std::io::Read>(
        config: GameConfig,
        reader: R,
        format: SaveFormat,
        now: Timestamp,
    ) -> Result<(Self, Option<OfflineReport>), SaveError> {
        let farm = persistence::load_farm(reader, format)?;
        let mut engine = Self::with_farm(config, farm, now, StdRng::from_entropy());
        engine.spawn_roster();
        let report = engine.apply_offline_progress();
        log::info!(
            "Loaded farm: {} gold, {} plots, {} worker(s)",
            engine.farm.gold(),
            engine.farm.plot_count(),
            engine.worker_count()
        );
        Ok((engine, report))
    }

    pub fn load_from_file(
        config: GameConfig,
        path: impl AsRef<Path>,
        now: Timestamp,
    ) -> Result<(Self, Option<OfflineReport>), SaveError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::load(config, BufReader::new(file), SaveFormat::from_path(path), now)
    }

    fn apply_offline_progress(&mut self) -> Option<OfflineReport> {
        let offline = self.now.saturating_since(self.farm.last_save_time);
        if offline <= Duration::from_secs(OFFLINE_THRESHOLD_SECS) {
            return None;
        }
        let harvested = self.farm.apply_offline_progress(self.now);
        let report = OfflineReport {
            offline_minutes: offline.as_secs() / 60,
            harvested,
        };
        log::info!(
            "Welcome back: {} minute(s) away, {} plot(s) harvested",
            report.offline_minutes,
            report.harvested
        );
        Some(report)
    }

    /// Save to `writer`, stamping the farm's last save time.
    pub fn save<W: Write>(&mut self, writer: W, format: SaveFormat) -> Result<(), SaveError> {
        persistence::save_farm(writer, &self.farm, self.now, format)?;
        self.farm.last_save_time = self.now;
        Ok(())
    }

    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.save(&mut writer, SaveFormat::from_path(path))?;
        writer.flush()?;
        log::info!("Saved farm to {}", path.display());
        Ok(())
    }

    /// Enable autosave to `path`.
    pub fn set_save_path(&mut self, path: impl Into<PathBuf>) {
        self.save_path = Some(path.into());
    }

    pub fn save_path(&self) -> Option<&Path> {
        self.save_path.as_deref()
    }

    // ── Workers ─────────────────────────────────────────────────────

    fn spawn_roster(&mut self) {
        let ids: Vec<WorkerId> = self.farm.worker_ids().to_vec();
        for id in ids {
            self.spawn_worker(id);
        }
    }

    /// Spawn a worker entity at the farmhouse with freshly rolled stats.
    fn spawn_worker(&mut self, id: WorkerId) -> Entity {
        let stats = rarity::draw_worker_stats(
            &self.config,
            self.rng.gen_range(0.0..100.0),
            self.rng.gen(),
            self.rng.gen(),
        );
        log::debug!(
            "Worker {} is {:?} (speed {:.2}, {:.0}s per task)",
            id,
            stats.rarity,
            stats.move_speed,
            stats.work_duration
        );
        self.world.spawn((
            WorkerProfile::new(id, stats),
            WorkerBrain::new(),
            Walker::new(Vec2::ZERO, stats.move_speed),
        ))
    }

    pub fn worker_entity(&self, id: WorkerId) -> Option<Entity> {
        self.world
            .query::<&WorkerProfile>()
            .iter()
            .find(|(_, profile)| profile.id == id)
            .map(|(entity, _)| entity)
    }

    pub fn worker(&self, id: WorkerId) -> Option<(WorkerProfile, WorkerBrain)> {
        let entity = self.worker_entity(id)?;
        let profile = *self.world.get::<&WorkerProfile>(entity).ok()?;
        let brain = (*self.world.get::<&WorkerBrain>(entity).ok()?).clone();
        Some((profile, brain))
    }

    pub fn worker_count(&self) -> usize {
        self.world.query::<&WorkerProfile>().iter().count()
    }

    pub fn available_worker_count(&self) -> usize {
        available_workers(&self.world, self.is_night()).len()
    }

    /// Workers with a task in hand, walking or working.
    pub fn working_worker_count(&self) -> usize {
        self.count_workers(|brain| brain.task.is_some())
    }

    pub fn sleeping_worker_count(&self) -> usize {
        self.count_workers(|brain| brain.state == WorkerState::Sleeping)
    }

    fn count_workers(&self, pred: impl Fn(&WorkerBrain) -> bool) -> usize {
        self.world
            .query::<&WorkerBrain>()
            .iter()
            .filter(|(_, brain)| pred(brain))
            .count()
    }

    // ── Simulation ──────────────────────────────────────────────────

    /// Update the simulation by delta_seconds
    pub fn update(&mut self, delta_seconds: f32) {
        let scaled_delta = delta_seconds.max(0.0) * self.time_scale;
        self.sim_seconds += scaled_delta as f64;
        self.now = self.now.plus_seconds(scaled_delta as f64);
        let night = self.is_night();

        movement_system(&mut self.world, scaled_delta);

        let mut ctx = WorkContext {
            farm: &mut self.farm,
            config: &self.config,
            now: self.now,
            night,
        };
        worker_system(&mut self.world, &mut ctx, scaled_delta);

        if self.sim_seconds >= self.next_schedule_at {
            auto_assign(&mut self.world, &mut self.farm, self.now, night);
            self.next_schedule_at = self.sim_seconds + SCHEDULE_INTERVAL;
        }

        if self.sim_seconds >= self.next_autosave_at {
            self.autosave();
            self.next_autosave_at = self.sim_seconds + AUTOSAVE_INTERVAL;
        }

        self.check_goal();
    }

    fn autosave(&mut self) {
        let Some(path) = self.save_path.clone() else {
            return;
        };
        if let Err(e) = self.save_to_file(&path) {
            log::warn!("Autosave to {} failed: {}", path.display(), e);
        }
    }

    fn check_goal(&mut self) {
        if self.goal_reached || self.farm.gold() < self.config.win_gold {
            return;
        }
        self.goal_reached = true;
        log::info!("Goal reached with {} gold", self.farm.gold());
        self.farm.emit(FarmEvent::GoalReached(self.farm.gold()));
    }

    pub fn goal_reached(&self) -> bool {
        self.goal_reached
    }

    pub fn is_night(&self) -> bool {
        self.config
            .night
            .is_some_and(|window| window.contains(self.now.hour_of_day()))
    }

    /// Run a scheduling pass now instead of waiting for the timer.
    pub fn run_scheduler(&mut self) -> usize {
        let night = self.is_night();
        auto_assign(&mut self.world, &mut self.farm, self.now, night)
    }

    /// Set time scale (1.0 = real-time, 2.0 = 2x speed, etc.)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn sim_seconds(&self) -> f64 {
        self.sim_seconds
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&FarmEvent) + 'static) {
        self.farm.subscribe(listener);
    }

    // ── Shop ────────────────────────────────────────────────────────

    pub fn buy_seeds(&mut self, crop: CropType, amount: u32) -> Result<u64, FarmError> {
        self.farm.buy_seeds(&self.config, crop, amount)
    }

    pub fn buy_animal(&mut self, animal: AnimalType) -> Result<u64, FarmError> {
        self.farm.buy_animal(&self.config, animal)
    }

    pub fn sell_product(&mut self, product: ProductType, amount: u32) -> Result<u64, FarmError> {
        let earned = self.farm.sell_product(&self.config, product, amount)?;
        self.check_goal();
        Ok(earned)
    }

    pub fn buy_plot(&mut self) -> Result<PlotId, FarmError> {
        self.farm.buy_plot(&self.config, self.now)
    }

    /// Buy a worker slot and put the new worker to work.
    pub fn hire_worker(&mut self) -> Result<WorkerId, FarmError> {
        let id = self.farm.buy_worker(&self.config)?;
        self.spawn_worker(id);
        Ok(id)
    }

    pub fn upgrade_equipment(&mut self, product: ProductType) -> Result<u32, FarmError> {
        self.farm.upgrade_equipment(&self.config, product)
    }

    // ── Manual farming ──────────────────────────────────────────────

    pub fn plant_crop(&mut self, plot_id: PlotId, crop: CropType) -> Result<(), FarmError> {
        self.farm
            .plant_now(&self.config, plot_id, crop.plantable(), self.now)
    }

    pub fn place_animal(&mut self, plot_id: PlotId, animal: AnimalType) -> Result<(), FarmError> {
        self.farm
            .plant_now(&self.config, plot_id, animal.plantable(), self.now)
    }

    pub fn harvest_plot(&mut self, plot_id: PlotId) -> Result<(ProductType, u32), FarmError> {
        self.farm.harvest_now(plot_id, self.now)
    }

    // ── Bulk triggers ───────────────────────────────────────────────

    pub fn auto_harvest_all(&mut self) -> usize {
        let night = self.is_night();
        auto_harvest_all(&mut self.world, &mut self.farm, self.now, night)
    }

    pub fn auto_plant_all(&mut self, crop: CropType) -> usize {
        let night = self.is_night();
        auto_plant_all(&mut self.world, &mut self.farm, crop, self.now, night)
    }

    pub fn auto_place_animal_all(&mut self, animal: AnimalType) -> usize {
        let night = self.is_night();
        auto_place_animal_all(&mut self.world, &mut self.farm, animal, self.now, night)
    }

    // ── Teardown ────────────────────────────────────────────────────

    /// End the session: abort in-flight tasks, despawn workers, drop
    /// reservations and listeners.
    pub fn cleanup(&mut self) {
        for (_, (profile, brain, walker)) in
            self.world
                .query_mut::<(&WorkerProfile, &mut WorkerBrain, &mut Walker)>()
        {
            brain.clear_current_task(profile.id, &mut self.farm, walker);
        }
        self.world.clear();
        self.farm.cleanup();
        log::info!("Session cleaned up");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::SaveData;
    use farmstead_logic::config::NightWindow;
    use farmstead_logic::constants::PlotState;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine() -> FarmEngine {
        FarmEngine::new_game_seeded(GameConfig::default(), Timestamp::EPOCH, 7)
    }

    #[test]
    fn test_engine_creation() {
        let engine = engine();
        assert_eq!(engine.worker_count(), 1);
        assert_eq!(engine.farm.plot_count(), 4);
        assert_eq!(engine.farm.gold(), 500);
        assert_eq!(engine.sim_seconds(), 0.0);
    }

    #[test]
    fn test_engine_update_advances_clock() {
        let mut engine = engine();
        for _ in 0..60 {
            engine.update(1.0);
        }
        assert!((engine.sim_seconds() - 60.0).abs() < 0.001);
        assert_eq!(engine.now(), Timestamp::from_millis(60_000));
    }

    #[test]
    fn test_time_scale() {
        let mut engine = engine();
        engine.set_time_scale(2.0);
        engine.update(1.0);
        assert!((engine.sim_seconds() - 2.0).abs() < 0.0001);
    }

    #[test]
    fn test_first_update_schedules_work() {
        let mut engine = engine();
        engine.update(0.1);
        // Worker 0 takes the first plot in creation order
        assert_eq!(engine.farm.reservation(PlotId(0)), Some(WorkerId(0)));
        assert_eq!(engine.working_worker_count(), 1);
        assert_eq!(engine.available_worker_count(), 0);
    }

    #[test]
    fn test_workers_plant_on_their_own() {
        let mut engine = engine();
        // Longest possible walk plus the slowest work duration
        for _ in 0..(200 * 10) {
            engine.update(0.1);
        }
        assert_eq!(
            engine.farm.plot_state(PlotId(0), engine.now()),
            Some(PlotState::Growing)
        );
        assert_eq!(engine.farm.inventory.seed_count(CropType::Strawberry), 9);
    }

    #[test]
    fn test_hire_worker() {
        let mut engine = engine();
        let id = engine.hire_worker().unwrap();
        assert_eq!(id, WorkerId(1));
        assert_eq!(engine.worker_count(), 2);
        let (profile, brain) = engine.worker(id).unwrap();
        assert_eq!(profile.id, id);
        assert_eq!(brain.state, WorkerState::Idle);

        assert!(matches!(
            engine.hire_worker(),
            Err(FarmError::InsufficientGold { .. })
        ));
        assert_eq!(engine.worker_count(), 2);
    }

    #[test]
    fn test_goal_reached_once() {
        let mut config = GameConfig::default();
        config.win_gold = 600;
        let mut engine = FarmEngine::new_game_seeded(config, Timestamp::EPOCH, 1);
        let goals = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&goals);
        engine.subscribe(move |e| {
            if let FarmEvent::GoalReached(_) = e {
                *sink.borrow_mut() += 1;
            }
        });

        engine.farm.inventory.add_product(ProductType::Milk, 10);
        engine.sell_product(ProductType::Milk, 10).unwrap();
        assert!(engine.goal_reached());
        engine.update(1.0);
        assert_eq!(*goals.borrow(), 1);
    }

    #[test]
    fn test_night_puts_workers_to_sleep() {
        let mut config = GameConfig::default();
        config.night = Some(NightWindow {
            start_hour: 0,
            end_hour: 5,
        });
        let mut engine = FarmEngine::new_game_seeded(config, Timestamp::EPOCH, 3);
        engine.update(0.1);
        assert_eq!(engine.sleeping_worker_count(), 1);
        assert_eq!(engine.farm.reservation_count(), 0);
        assert_eq!(engine.run_scheduler(), 0);
    }

    #[test]
    fn test_load_applies_offline_progress() {
        let mut engine = engine();
        engine.plant_crop(PlotId(0), CropType::Strawberry).unwrap();
        let mut buffer = Vec::new();
        engine.save(&mut buffer, SaveFormat::Binary).unwrap();

        let later = Timestamp::from_minutes(20);
        let (loaded, report) =
            FarmEngine::load(GameConfig::default(), &buffer[..], SaveFormat::Binary, later)
                .unwrap();
        assert_eq!(
            report,
            Some(OfflineReport {
                offline_minutes: 20,
                harvested: 1
            })
        );
        assert_eq!(loaded.farm.inventory.product_count(ProductType::Strawberry), 1);
        assert_eq!(loaded.worker_count(), 1);
    }

    #[test]
    fn test_short_absence_has_no_report() {
        let mut engine = engine();
        let mut buffer = Vec::new();
        engine.save(&mut buffer, SaveFormat::Json).unwrap();
        let (_, report) = FarmEngine::load(
            GameConfig::default(),
            &buffer[..],
            SaveFormat::Json,
            Timestamp::from_millis(30_000),
        )
        .unwrap();
        assert_eq!(report, None);
    }

    #[test]
    fn test_continue_game_falls_back_to_new_game() {
        let path = std::env::temp_dir().join("farmstead-missing-save-test.sav");
        let _ = std::fs::remove_file(&path);
        let (engine, report) =
            FarmEngine::continue_game(GameConfig::default(), &path, Timestamp::EPOCH);
        assert!(report.is_none());
        assert_eq!(engine.farm.plot_count(), 4);
        assert_eq!(engine.save_path(), Some(path.as_path()));
    }

    #[test]
    fn test_offline_threshold_is_exclusive() {
        let mut engine = engine();
        let mut buffer = Vec::new();
        engine.save(&mut buffer, SaveFormat::Json).unwrap();
        let load_at = |millis| {
            FarmEngine::load(
                GameConfig::default(),
                &buffer[..],
                SaveFormat::Json,
                Timestamp::from_millis(millis),
            )
            .unwrap()
            .1
        };
        assert_eq!(load_at(60_000), None);
        assert_eq!(
            load_at(60_001),
            Some(OfflineReport {
                offline_minutes: 1,
                harvested: 0
            })
        );
        assert!(load_at(60_900).is_some());
    }

    #[test]
    fn test_continue_game_survives_corrupt_growth_time() {
        let path = std::env::temp_dir()
            .join(format!("farmstead-corrupt-{}.json", std::process::id()));
        let mut engine = engine();
        engine.farm.add_gold(123);
        engine.plant_crop(PlotId(0), CropType::Strawberry).unwrap();
        let mut data = SaveData::from_farm(&engine.farm, Timestamp::EPOCH);
        data.plots[0].content.as_mut().unwrap().growth_minutes = 1e300;
        std::fs::write(&path, serde_json::to_vec(&data).unwrap()).unwrap();

        let (resumed, report) =
            FarmEngine::continue_game(GameConfig::default(), &path, Timestamp::from_minutes(5));
        assert!(report.is_none());
        assert_eq!(resumed.farm.gold(), 500);
        assert!(resumed.farm.plot(PlotId(0)).unwrap().content.is_none());
        assert_eq!(resumed.save_path(), Some(path.as_path()));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_autosave_writes_file() {
        let path = std::env::temp_dir()
            .join(format!("farmstead-autosave-{}.json", std::process::id()));
        let mut engine = engine();
        engine.set_save_path(&path);
        for _ in 0..61 {
            engine.update(1.0);
        }
        let text = std::fs::read_to_string(&path).unwrap();
        let data: SaveData = serde_json::from_str(&text).unwrap();
        assert_eq!(data.gold, engine.farm.gold());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_cleanup() {
        let mut engine = engine();
        engine.update(0.1);
        assert_eq!(engine.farm.reservation_count(), 1);
        engine.cleanup();
        assert_eq!(engine.worker_count(), 0);
        assert_eq!(engine.farm.reservation_count(), 0);
    }
}
