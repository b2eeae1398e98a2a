//! Worker state machine.
//!
//! States: Idle -> Moving -> Working -> Idle, plus Sleeping at night.
//! Every tick checks the any-state transition (night) first, then the
//! transitions out of the current state:
//!
//! | From     | To       | When                                   |
//! |----------|----------|----------------------------------------|
//! | Idle     | Moving   | has a task, not at the target          |
//! | Idle     | Working  | has a task, already at the target      |
//! | Moving   | Working  | arrived                                |
//! | Moving   | Idle     | task cleared                           |
//! | Working  | Idle     | task cleared or finished               |
//! | Sleeping | Idle     | night is over                          |
//! | any      | Sleeping | night                                  |
//!
//! A worker stuck in Moving for longer than `MOVE_TIMEOUT` has its task
//! force-completed so an unreachable target cannot hold a plot forever.

use super::{AssignError, WorkTask};
use crate::components::{Mover, PlotId, Vec2, Walker, WorkerId, WorkerProfile};
use crate::events::FarmEvent;
use crate::farm::Farm;
use crate::time::Timestamp;
use farmstead_logic::config::GameConfig;
use farmstead_logic::constants::WorkerState;
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MOVE_TIMEOUT: Duration = Duration::from_secs(30);

/// A task bound to a worker, with the plot it targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssignedTask {
    pub work: WorkTask,
    pub plot_id: PlotId,
    pub target: Vec2,
}

/// Per-worker state machine component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkerBrain {
    pub state: WorkerState,
    pub task: Option<AssignedTask>,
    pub assigned_at: Timestamp,
    /// Seconds spent in the current Working state
    pub work_elapsed: f32,
    pub progress: f32,
}

/// Everything a worker touches during one tick.
pub struct WorkContext<'a> {
    pub farm: &'a mut Farm,
    pub config: &'a GameConfig,
    pub now: Timestamp,
    pub night: bool,
}

impl WorkerBrain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_available(&self, night: bool) -> bool {
        self.state == WorkerState::Idle && self.task.is_none() && !night
    }

    pub fn target_plot(&self) -> Option<PlotId> {
        self.task.map(|t| t.plot_id)
    }

    /// Bind a task. Fails unless the worker is Idle and the plot can be
    /// reserved for it.
    #[allow(clippy::too_many_arguments)]
    pub fn assign_task<M: Mover + ?Sized>(
        &mut self,
        id: WorkerId,
        work: WorkTask,
        plot_id: PlotId,
        target: Vec2,
        farm: &mut Farm,
        mover: &mut M,
        now: Timestamp,
    ) -> Result<(), AssignError> {
        if self.state != WorkerState::Idle || self.task.is_some() {
            return Err(AssignError::WorkerUnavailable);
        }
        if !farm.reserve_plot(plot_id, id) {
            return Err(AssignError::PlotReserved(plot_id));
        }
        self.task = Some(AssignedTask {
            work,
            plot_id,
            target,
        });
        self.assigned_at = now;
        mover.move_towards(target);
        log::debug!("Worker {} assigned {:?} on plot {}", id, work, plot_id);
        Ok(())
    }

    /// Advance the state machine by `delta_seconds`.
    pub fn tick<M: Mover + ?Sized>(
        &mut self,
        profile: &WorkerProfile,
        mover: &mut M,
        ctx: &mut WorkContext<'_>,
        delta_seconds: f32,
    ) {
        let id = profile.id;

        if ctx.night {
            if self.state != WorkerState::Sleeping {
                self.set_state(id, WorkerState::Sleeping, ctx.farm, mover);
            }
            return;
        }

        match self.state {
            WorkerState::Idle => {
                if self.task.is_some() {
                    let next = if mover.is_at_target_position() {
                        WorkerState::Working
                    } else {
                        WorkerState::Moving
                    };
                    self.set_state(id, next, ctx.farm, mover);
                }
            }
            WorkerState::Moving => {
                if self.task.is_none() {
                    self.set_state(id, WorkerState::Idle, ctx.farm, mover);
                } else if mover.is_at_target_position() {
                    self.set_state(id, WorkerState::Working, ctx.farm, mover);
                } else if ctx.now.saturating_since(self.assigned_at) > MOVE_TIMEOUT {
                    log::warn!(
                        "Worker {} could not reach plot {:?} in {}s, completing task in place",
                        id,
                        self.target_plot(),
                        MOVE_TIMEOUT.as_secs()
                    );
                    self.complete_task(id, mover, ctx);
                    self.set_state(id, WorkerState::Idle, ctx.farm, mover);
                }
            }
            WorkerState::Working => {
                if self.task.is_none() {
                    self.set_state(id, WorkerState::Idle, ctx.farm, mover);
                    return;
                }
                self.work_elapsed += delta_seconds;
                self.progress = if profile.work_duration > 0.0 {
                    (self.work_elapsed / profile.work_duration).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                ctx.farm.emit(FarmEvent::WorkerProgress(id, self.progress));
                if self.work_elapsed >= profile.work_duration {
                    self.complete_task(id, mover, ctx);
                    self.set_state(id, WorkerState::Idle, ctx.farm, mover);
                }
            }
            WorkerState::Sleeping => {
                self.set_state(id, WorkerState::Idle, ctx.farm, mover);
            }
        }
    }

    /// Release the plot, apply the task's effect and go back to no task.
    pub fn complete_task<M: Mover + ?Sized>(
        &mut self,
        id: WorkerId,
        mover: &mut M,
        ctx: &mut WorkContext<'_>,
    ) {
        let Some(task) = self.task.take() else {
            return;
        };
        ctx.farm.release_plot(task.plot_id, id);
        let applied = task.work.execute(ctx.farm, task.plot_id, ctx.config, ctx.now);
        if !applied {
            log::debug!(
                "Worker {} finished {:?} on plot {} with no effect",
                id,
                task.work,
                task.plot_id
            );
        }
        ctx.farm.emit(FarmEvent::WorkerTaskCompleted(id));
        self.work_elapsed = 0.0;
        self.progress = 0.0;
        mover.stop_moving();
    }

    /// Abort the task without applying it.
    pub fn clear_current_task<M: Mover + ?Sized>(
        &mut self,
        id: WorkerId,
        farm: &mut Farm,
        mover: &mut M,
    ) {
        if let Some(task) = self.task.take() {
            farm.release_plot(task.plot_id, id);
            log::debug!("Worker {} dropped {:?} on plot {}", id, task.work, task.plot_id);
        }
        self.work_elapsed = 0.0;
        self.progress = 0.0;
        mover.stop_moving();
    }

    fn set_state<M: Mover + ?Sized>(
        &mut self,
        id: WorkerId,
        next: WorkerState,
        farm: &mut Farm,
        mover: &mut M,
    ) {
        if self.state == next {
            return;
        }
        if self.state == WorkerState::Moving {
            mover.stop_moving();
        }
        match next {
            WorkerState::Working => {
                self.work_elapsed = 0.0;
                self.progress = 0.0;
            }
            WorkerState::Sleeping => self.clear_current_task(id, farm, mover),
            WorkerState::Idle | WorkerState::Moving => {}
        }
        log::debug!("Worker {}: {:?} -> {:?}", id, self.state, next);
        self.state = next;
        farm.emit(FarmEvent::WorkerStateChanged(id, next));
    }
}

/// Tick every worker, in id order.
pub fn worker_system(world: &mut World, ctx: &mut WorkContext<'_>, delta_seconds: f32) {
    let mut workers: Vec<(WorkerId, Entity)> = world
        .query_mut::<&WorkerProfile>()
        .into_iter()
        .map(|(entity, profile)| (profile.id, entity))
        .collect();
    workers.sort_by_key(|(id, _)| *id);

    for (_, entity) in workers {
        if let Ok((profile, brain, walker)) =
            world.query_one_mut::<(&WorkerProfile, &mut WorkerBrain, &mut Walker)>(entity)
        {
            brain.tick(profile, walker, ctx, delta_seconds);
        }
    }
}
