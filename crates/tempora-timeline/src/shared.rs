//! Thread-safe access to a world and its timeline controller

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tempora_core::{Dimension, TimelineMask, Transform};
use tempora_ecs::{Entity, World};

use crate::aware::ApplyOutcome;
use crate::config::TimelineSettings;
use crate::controller::{DimensionListener, ListenerId, SwitchOutcome, TimelineController};
use crate::lifecycle;
use crate::presentation::Presentation;

/// A world together with the controller that owns its timeline
#[derive(Default)]
pub struct TimelineStage {
    pub world: World,
    pub controller: TimelineController,
}

impl TimelineStage {
    pub fn new(settings: &TimelineSettings) -> Self {
        Self {
            world: World::new(),
            controller: TimelineController::from_settings(settings),
        }
    }

    pub fn switch_to(&mut self, dimension: Dimension) -> SwitchOutcome {
        self.controller.switch_to(&mut self.world, dimension)
    }

    pub fn spawn_authored(&mut self, transform: Transform, presentation: Option<Presentation>) -> Entity {
        lifecycle::spawn_authored(&mut self.world, &mut self.controller, transform, presentation)
    }

    pub fn spawn_dynamic(
        &mut self,
        transform: Transform,
        presentation: Option<Presentation>,
        mask: TimelineMask,
    ) -> (Entity, ApplyOutcome) {
        lifecycle::spawn_dynamic(&mut self.world, &mut self.controller, transform, presentation, mask)
    }

    pub fn destroy(&mut self, entity: Entity) -> bool {
        lifecycle::destroy(&mut self.world, &mut self.controller, entity)
    }
}

#[derive(Default)]
struct SharedListeners {
    listeners: Vec<(ListenerId, Box<dyn DimensionListener>)>,
    next_id: u64,
}

/// Cloneable handle to a [`TimelineStage`] behind a lock.
///
/// A switch holds the lock for its whole dispatch, so no thread ever sees
/// a half-switched world. Listeners added through [`subscribe`] run after
/// the lock is released and may read or lock the stage. Switches from
/// different threads can deliver their notifications in either order.
///
/// [`subscribe`]: SharedTimeline::subscribe
#[derive(Clone, Default)]
pub struct SharedTimeline {
    inner: Arc<Mutex<TimelineStage>>,
    listeners: Arc<Mutex<SharedListeners>>,
}

impl SharedTimeline {
    pub fn new(stage: TimelineStage) -> Self {
        Self {
            inner: Arc::new(Mutex::new(stage)),
            listeners: Arc::default(),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, TimelineStage> {
        self.inner.lock()
    }

    pub fn switch_to(&self, dimension: Dimension) -> SwitchOutcome {
        let outcome = self.inner.lock().switch_to(dimension);
        if let SwitchOutcome::Switched(change) = outcome {
            self.notify(change.to);
        }
        outcome
    }

    /// Call `listener` after every switch made through this handle or its
    /// clones. It must not switch, subscribe or unsubscribe through the
    /// handle itself.
    pub fn subscribe(&self, listener: impl DimensionListener + 'static) -> ListenerId {
        let mut shared = self.listeners.lock();
        let id = ListenerId(shared.next_id);
        shared.next_id += 1;
        shared.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut shared = self.listeners.lock();
        let before = shared.listeners.len();
        shared.listeners.retain(|(listener_id, _)| *listener_id != id);
        shared.listeners.len() != before
    }

    fn notify(&self, dimension: Dimension) {
        for (_, listener) in &mut self.listeners.lock().listeners {
            listener.on_dimension_changed(dimension);
        }
    }

    pub fn current_dimension(&self) -> Dimension {
        self.inner.lock().controller.current_dimension()
    }
}
