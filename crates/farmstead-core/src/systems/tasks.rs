//! Task effects - what a worker does to a plot when the work is done

use crate::components::{Plantable, PlotId, SimpleTask};
use crate::farm::Farm;
use crate::time::Timestamp;
use farmstead_logic::config::GameConfig;
use farmstead_logic::constants::{PlantableKind, ProductType, TaskType};
use serde::{Deserialize, Serialize};

/// The domain effect bound to an assigned task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkTask {
    Harvest,
    /// Plant a crop or place an animal, consuming one from stock.
    Plant(PlantableKind),
    Milk,
}

impl WorkTask {
    pub fn from_simple(task: &SimpleTask) -> Result<Self, AssignError> {
        match (task.task_type, task.plantable) {
            (TaskType::Harvest, _) => Ok(WorkTask::Harvest),
            (TaskType::Milk, _) => Ok(WorkTask::Milk),
            (TaskType::Plant, Some(kind)) => Ok(WorkTask::Plant(kind)),
            (TaskType::Plant, None) => Err(AssignError::TaskNoLongerValid(task.plot_id)),
            (TaskType::Feed, _) => Err(AssignError::UnsupportedTask(TaskType::Feed)),
        }
    }

    pub fn task_type(&self) -> TaskType {
        match self {
            WorkTask::Harvest => TaskType::Harvest,
            WorkTask::Plant(_) => TaskType::Plant,
            WorkTask::Milk => TaskType::Milk,
        }
    }

    /// Apply the effect. Returns whether anything changed.
    pub fn execute(
        &self,
        farm: &mut Farm,
        plot_id: PlotId,
        config: &GameConfig,
        now: Timestamp,
    ) -> bool {
        match *self {
            WorkTask::Harvest => match farm.harvest_plot(plot_id, now) {
                Some(product) => {
                    farm.inventory.add_product(product, 1);
                    true
                }
                None => false,
            },
            WorkTask::Milk => {
                let gives_milk = farm
                    .plot(plot_id)
                    .and_then(|p| p.content.as_ref())
                    .is_some_and(|c| c.product() == ProductType::Milk);
                if !gives_milk {
                    return false;
                }
                match farm.harvest_plot(plot_id, now) {
                    Some(product) => {
                        farm.inventory.add_product(product, 1);
                        true
                    }
                    None => false,
                }
            }
            WorkTask::Plant(kind) => {
                let plantable = farm.plot(plot_id).is_some_and(|p| p.can_plant_kind(kind));
                if !plantable || !farm.take_stock(kind) {
                    return false;
                }
                farm.plant_plot(plot_id, Plantable::from_config(kind, config), now)
            }
        }
    }
}

/// Why a task could not be bound to a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignError {
    WorkerUnavailable,
    WorkerNotFound,
    PlotNotFound(PlotId),
    PlotReserved(PlotId),
    TaskNoLongerValid(PlotId),
    UnsupportedTask(TaskType),
}

impl std::fmt::Display for AssignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignError::WorkerUnavailable => write!(f, "Worker is not available"),
            AssignError::WorkerNotFound => write!(f, "Worker not found"),
            AssignError::PlotNotFound(id) => write!(f, "Plot {} not found", id),
            AssignError::PlotReserved(id) => write!(f, "Plot {} is already reserved", id),
            AssignError::TaskNoLongerValid(id) => {
                write!(f, "Task on plot {} is no longer valid", id)
            }
            AssignError::UnsupportedTask(t) => write!(f, "{:?} tasks are not supported", t),
        }
    }
}

impl std::error::Error for AssignError {}

#[cfg(test)]
mod tests {
    use super::*;
    use farmstead_logic::constants::{AnimalType, CropType};

    fn farm() -> (Farm, GameConfig) {
        let config = GameConfig::default();
        (Farm::starter(&config, Timestamp::EPOCH), config)
    }

    #[test]
    fn test_plant_consumes_one_seed() {
        let (mut farm, config) = farm();
        let task = WorkTask::Plant(PlantableKind::Tomato);
        assert!(task.execute(&mut farm, PlotId(1), &config, Timestamp::EPOCH));
        assert_eq!(farm.inventory.seed_count(CropType::Tomato), 9);
        assert!(!farm.plot(PlotId(1)).unwrap().can_plant());

        // Occupied now: no seed is lost
        assert!(!task.execute(&mut farm, PlotId(1), &config, Timestamp::EPOCH));
        assert_eq!(farm.inventory.seed_count(CropType::Tomato), 9);
    }

    #[test]
    fn test_plant_without_stock() {
        let (mut farm, config) = farm();
        assert!(farm.inventory.use_animals(AnimalType::Cow, 2));
        let task = WorkTask::Plant(PlantableKind::Cow);
        assert!(!task.execute(&mut farm, PlotId(3), &config, Timestamp::EPOCH));
        assert!(farm.plot(PlotId(3)).unwrap().can_plant());
    }

    #[test]
    fn test_harvest_adds_one_unit() {
        let (mut farm, config) = farm();
        let plant = WorkTask::Plant(PlantableKind::Strawberry);
        plant.execute(&mut farm, PlotId(0), &config, Timestamp::EPOCH);
        let early = Timestamp::from_minutes(1);
        let ripe = Timestamp::from_minutes(15);
        assert!(!WorkTask::Harvest.execute(&mut farm, PlotId(0), &config, early));
        assert!(WorkTask::Harvest.execute(&mut farm, PlotId(0), &config, ripe));
        assert_eq!(farm.inventory.product_count(ProductType::Strawberry), 1);
    }

    #[test]
    fn test_milk_only_counts_milk() {
        let (mut farm, config) = farm();
        let start = Timestamp::EPOCH;
        WorkTask::Plant(PlantableKind::Cow).execute(&mut farm, PlotId(3), &config, start);
        WorkTask::Plant(PlantableKind::Tomato).execute(&mut farm, PlotId(1), &config, start);
        let later = Timestamp::from_minutes(30);

        assert!(WorkTask::Milk.execute(&mut farm, PlotId(3), &config, later));
        assert_eq!(farm.inventory.product_count(ProductType::Milk), 1);

        // A ready tomato is left alone
        assert!(!WorkTask::Milk.execute(&mut farm, PlotId(1), &config, later));
        assert_eq!(farm.inventory.product_count(ProductType::Tomato), 0);
        assert!(farm.plot(PlotId(1)).unwrap().can_harvest(later));
    }

    #[test]
    fn test_from_simple() {
        let plant = SimpleTask::plant(PlotId(2), PlantableKind::Blueberry);
        assert_eq!(WorkTask::from_simple(&plant), Ok(WorkTask::Plant(PlantableKind::Blueberry)));

        let milk = SimpleTask::harvest(PlotId(3), PlantableKind::Cow);
        assert_eq!(WorkTask::from_simple(&milk), Ok(WorkTask::Milk));

        let feed = SimpleTask {
            plot_id: PlotId(3),
            task_type: TaskType::Feed,
            plantable: None,
        };
        assert_eq!(
            WorkTask::from_simple(&feed),
            Err(AssignError::UnsupportedTask(TaskType::Feed))
        );
    }
}
