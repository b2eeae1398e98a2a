//! Scheduler - binds idle workers to plots that need work.
//!
//! A pass pairs the farm's task list with the available workers index for
//! index, both in a stable order (plot creation order, worker id). Every
//! pairing is re-validated right before binding since the task list is a
//! snapshot.

use super::{AssignError, WorkTask, WorkerBrain};
use crate::components::{SimpleTask, Walker, WorkerId, WorkerProfile};
use crate::farm::Farm;
use crate::time::Timestamp;
use farmstead_logic::constants::{AnimalType, CropType, PlantableKind, TaskType};
use hecs::{Entity, World};

/// Seconds between automatic scheduling passes.
pub const SCHEDULE_INTERVAL: f64 = 5.0;

/// Workers that can take a task right now, sorted by id.
pub fn available_workers(world: &World, night: bool) -> Vec<(WorkerId, Entity)> {
    let mut workers: Vec<(WorkerId, Entity)> = world
        .query::<(&WorkerProfile, &WorkerBrain)>()
        .iter()
        .filter(|(_, (_, brain))| brain.is_available(night))
        .map(|(entity, (profile, _))| (profile.id, entity))
        .collect();
    workers.sort_by_key(|(id, _)| *id);
    workers
}

/// Validate `task` against the current farm and bind it to the worker.
pub fn assign_task_to_worker(
    world: &mut World,
    worker: Entity,
    task: &SimpleTask,
    farm: &mut Farm,
    now: Timestamp,
    night: bool,
) -> Result<(), AssignError> {
    let (profile, brain, walker) = world
        .query_one_mut::<(&WorkerProfile, &mut WorkerBrain, &mut Walker)>(worker)
        .map_err(|_| AssignError::WorkerNotFound)?;

    if !brain.is_available(night) {
        return Err(AssignError::WorkerUnavailable);
    }
    if farm.plot(task.plot_id).is_none() {
        return Err(AssignError::PlotNotFound(task.plot_id));
    }
    if farm.is_reserved(task.plot_id) {
        return Err(AssignError::PlotReserved(task.plot_id));
    }
    let work = WorkTask::from_simple(task)?;
    if !farm.is_task_valid(task, now) {
        return Err(AssignError::TaskNoLongerValid(task.plot_id));
    }
    let target = farm
        .plot_position(task.plot_id)
        .ok_or(AssignError::PlotNotFound(task.plot_id))?;

    brain.assign_task(profile.id, work, task.plot_id, target, farm, walker, now)
}

/// One scheduling pass. Returns how many tasks were bound.
pub fn auto_assign(world: &mut World, farm: &mut Farm, now: Timestamp, night: bool) -> usize {
    let tasks = farm.get_work_tasks(now);
    if tasks.is_empty() {
        return 0;
    }
    let workers = available_workers(world, night);
    assign_pairs(world, farm, &tasks, &workers, now, night)
}

fn assign_pairs(
    world: &mut World,
    farm: &mut Farm,
    tasks: &[SimpleTask],
    workers: &[(WorkerId, Entity)],
    now: Timestamp,
    night: bool,
) -> usize {
    let mut assigned = 0;
    for (task, (worker_id, entity)) in tasks.iter().zip(workers) {
        match assign_task_to_worker(world, *entity, task, farm, now, night) {
            Ok(()) => assigned += 1,
            Err(e) => log::debug!(
                "Skipped {:?} on plot {} for worker {}: {}",
                task.task_type,
                task.plot_id,
                worker_id,
                e
            ),
        }
    }
    if assigned > 0 {
        log::debug!("Scheduler bound {} task(s)", assigned);
    }
    assigned
}

/// Send available workers to every ready plot.
pub fn auto_harvest_all(world: &mut World, farm: &mut Farm, now: Timestamp, night: bool) -> usize {
    let tasks: Vec<SimpleTask> = farm
        .get_work_tasks(now)
        .into_iter()
        .filter(|t| matches!(t.task_type, TaskType::Harvest | TaskType::Milk))
        .collect();
    let workers = available_workers(world, night);
    assign_pairs(world, farm, &tasks, &workers, now, night)
}

/// Send available workers to plant `crop` on every empty plot of its zone,
/// up to the seeds in stock.
pub fn auto_plant_all(
    world: &mut World,
    farm: &mut Farm,
    crop: CropType,
    now: Timestamp,
    night: bool,
) -> usize {
    let stock = farm.inventory.seed_count(crop) as usize;
    plant_kind_all(world, farm, crop.plantable(), stock, now, night)
}

/// Same as `auto_plant_all`, for animals.
pub fn auto_place_animal_all(
    world: &mut World,
    farm: &mut Farm,
    animal: AnimalType,
    now: Timestamp,
    night: bool,
) -> usize {
    let stock = farm.inventory.animal_count(animal) as usize;
    plant_kind_all(world, farm, animal.plantable(), stock, now, night)
}

fn plant_kind_all(
    world: &mut World,
    farm: &mut Farm,
    kind: PlantableKind,
    stock: usize,
    now: Timestamp,
    night: bool,
) -> usize {
    let tasks: Vec<SimpleTask> = farm
        .plots()
        .iter()
        .filter(|p| p.can_plant_kind(kind) && !farm.is_reserved(p.id))
        .map(|p| SimpleTask::plant(p.id, kind))
        .take(stock)
        .collect();
    let workers = available_workers(world, night);
    assign_pairs(world, farm, &tasks, &workers, now, night)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{PlotId, Vec2};
    use farmstead_logic::config::GameConfig;
    use farmstead_logic::constants::{PlotZone, Rarity, WorkerState};

    fn spawn_worker(world: &mut World, id: u32) -> Entity {
        world.spawn((
            WorkerProfile {
                id: WorkerId(id),
                rarity: Rarity::Common,
                move_speed: 2.0,
                work_duration: 10.0,
            },
            WorkerBrain::new(),
            Walker::new(Vec2::ZERO, 2.0),
        ))
    }

    fn setup(workers: u32) -> (World, Farm, GameConfig) {
        let config = GameConfig::default();
        let farm = Farm::starter(&config, Timestamp::EPOCH);
        let mut world = World::new();
        for id in 0..workers {
            spawn_worker(&mut world, id);
        }
        (world, farm, config)
    }

    #[test]
    fn test_auto_assign_pairs_in_order() {
        let (mut world, mut farm, _) = setup(2);
        let assigned = auto_assign(&mut world, &mut farm, Timestamp::EPOCH, false);
        assert_eq!(assigned, 2);
        assert_eq!(farm.reservation(PlotId(0)), Some(WorkerId(0)));
        assert_eq!(farm.reservation(PlotId(1)), Some(WorkerId(1)));
        assert_eq!(farm.reservation(PlotId(2)), None);

        // Both are busy now
        assert_eq!(auto_assign(&mut world, &mut farm, Timestamp::EPOCH, false), 0);
    }

    #[test]
    fn test_second_worker_cannot_take_reserved_plot() {
        let (mut world, mut farm, _) = setup(0);
        let first = spawn_worker(&mut world, 0);
        let second = spawn_worker(&mut world, 1);
        let task = SimpleTask::plant(PlotId(1), PlantableKind::Tomato);

        assert_eq!(
            assign_task_to_worker(&mut world, first, &task, &mut farm, Timestamp::EPOCH, false),
            Ok(())
        );
        assert_eq!(
            assign_task_to_worker(&mut world, second, &task, &mut farm, Timestamp::EPOCH, false),
            Err(AssignError::PlotReserved(PlotId(1)))
        );
        let brain = world.get::<&WorkerBrain>(second).unwrap();
        assert!(brain.task.is_none());
    }

    #[test]
    fn test_stale_task_is_rejected() {
        let (mut world, mut farm, _) = setup(1);
        let worker = available_workers(&world, false)[0].1;
        let harvest = SimpleTask::harvest(PlotId(1), PlantableKind::Tomato);
        assert_eq!(
            assign_task_to_worker(&mut world, worker, &harvest, &mut farm, Timestamp::EPOCH, false),
            Err(AssignError::TaskNoLongerValid(PlotId(1)))
        );
        let missing = SimpleTask::plant(PlotId(42), PlantableKind::Tomato);
        assert_eq!(
            assign_task_to_worker(&mut world, worker, &missing, &mut farm, Timestamp::EPOCH, false),
            Err(AssignError::PlotNotFound(PlotId(42)))
        );
        assert!(!farm.is_reserved(PlotId(1)));
    }

    #[test]
    fn test_feed_is_unsupported() {
        let (mut world, mut farm, _) = setup(1);
        let worker = available_workers(&world, false)[0].1;
        let feed = SimpleTask {
            plot_id: PlotId(3),
            task_type: TaskType::Feed,
            plantable: None,
        };
        assert_eq!(
            assign_task_to_worker(&mut world, worker, &feed, &mut farm, Timestamp::EPOCH, false),
            Err(AssignError::UnsupportedTask(TaskType::Feed))
        );
    }

    #[test]
    fn test_night_blocks_assignment() {
        let (mut world, mut farm, _) = setup(3);
        assert!(available_workers(&world, true).is_empty());
        assert_eq!(auto_assign(&mut world, &mut farm, Timestamp::EPOCH, true), 0);
    }

    #[test]
    fn test_auto_harvest_all_ignores_planting() {
        let (mut world, mut farm, config) = setup(4);
        farm.plant_now(&config, PlotId(0), PlantableKind::Strawberry, Timestamp::EPOCH)
            .unwrap();
        let later = Timestamp::from_minutes(15);
        assert_eq!(auto_harvest_all(&mut world, &mut farm, later, false), 1);
        assert!(farm.is_reserved(PlotId(0)));
        assert_eq!(farm.reservation_count(), 1);
    }

    #[test]
    fn test_auto_plant_all_limited_by_stock() {
        let (mut world, mut farm, config) = setup(5);
        farm.add_gold(10_000);
        for _ in 0..8 {
            farm.buy_plot(&config, Timestamp::EPOCH).unwrap();
        }
        assert_eq!(farm.plots_in_zone(PlotZone::Tomato), 3);
        assert!(farm.inventory.use_seeds(CropType::Tomato, 8));

        let assigned =
            auto_plant_all(&mut world, &mut farm, CropType::Tomato, Timestamp::EPOCH, false);
        assert_eq!(assigned, 2);
    }

    #[test]
    fn test_auto_place_animal_all() {
        let (mut world, mut farm, _) = setup(2);
        let assigned = auto_place_animal_all(
            &mut world,
            &mut farm,
            AnimalType::Cow,
            Timestamp::EPOCH,
            false,
        );
        assert_eq!(assigned, 1);
        assert_eq!(farm.reservation(PlotId(3)), Some(WorkerId(0)));

        let brains: Vec<WorkerState> = world
            .query::<&WorkerBrain>()
            .iter()
            .map(|(_, b)| b.state)
            .collect();
        assert!(brains.iter().all(|s| *s == WorkerState::Idle));
    }
}
