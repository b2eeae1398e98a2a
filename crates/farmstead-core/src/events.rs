//! Farm notifications.
//!
//! Listeners are plain closures called synchronously, in subscription order,
//! at the point of mutation.

use crate::components::{PlotId, WorkerId};
use farmstead_logic::constants::WorkerState;

#[derive(Debug, Clone, PartialEq)]
pub enum FarmEvent {
    FarmStateChanged,
    GoldChanged(u64),
    PlotStateChanged(PlotId),
    WorkerTaskCompleted(WorkerId),
    WorkerStateChanged(WorkerId, WorkerState),
    /// Work progress in `[0, 1]` while a worker is Working.
    WorkerProgress(WorkerId, f32),
    /// Gold first reached the win threshold.
    GoalReached(u64),
}

type Listener = Box<dyn FnMut(&FarmEvent)>;

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&FarmEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&mut self, event: FarmEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_listeners_called_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        let a = Rc::clone(&seen);
        bus.subscribe(move |e| a.borrow_mut().push(("a", e.clone())));
        let b = Rc::clone(&seen);
        bus.subscribe(move |e| b.borrow_mut().push(("b", e.clone())));

        bus.emit(FarmEvent::GoldChanged(7));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ("a", FarmEvent::GoldChanged(7)));
        assert_eq!(seen[1].0, "b");
    }

    #[test]
    fn test_clear() {
        let mut bus = EventBus::new();
        bus.subscribe(|_| {});
        assert_eq!(bus.listener_count(), 1);
        bus.clear();
        bus.emit(FarmEvent::FarmStateChanged);
        assert_eq!(bus.listener_count(), 0);
    }
}
