//! Task candidates produced by the farm scan

use super::PlotId;
use farmstead_logic::constants::{PlantableKind, TaskType};
use serde::{Deserialize, Serialize};

/// One unit of work on one plot. Built fresh every scheduling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleTask {
    pub plot_id: PlotId,
    pub task_type: TaskType,
    /// What to put in the plot, for `Plant` tasks.
    pub plantable: Option<PlantableKind>,
}

impl SimpleTask {
    pub fn harvest(plot_id: PlotId, kind: PlantableKind) -> Self {
        Self {
            plot_id,
            task_type: kind.harvest_task(),
            plantable: None,
        }
    }

    pub fn plant(plot_id: PlotId, kind: PlantableKind) -> Self {
        Self {
            plot_id,
            task_type: TaskType::Plant,
            plantable: Some(kind),
        }
    }
}
