//! The timeline controller
//!
//! Single source of truth for the current dimension. Owns the registry of
//! time-aware entities and walks it synchronously on every switch.

use std::fmt;

use tempora_core::{Dimension, DimensionChange};
use tempora_ecs::Entity;
use tracing::{debug, info, trace};

use crate::aware::ApplyOutcome;
use crate::config::TimelineSettings;

/// Whatever stores the registered entities.
///
/// The controller only holds entity handles; the host resolves them.
pub trait TimelineHost {
    /// Whether `entity` still exists and can receive dimension changes
    fn contains(&self, entity: Entity) -> bool;

    /// Deliver a dimension change to one entity.
    ///
    /// A host that reports [`ApplyOutcome::Paradox`] has already destroyed
    /// the entity; the controller only drops it from the registry.
    fn dispatch(&mut self, entity: Entity, change: DimensionChange) -> ApplyOutcome;
}

/// Observer of completed dimension switches (HUD, audio cues)
pub trait DimensionListener: Send {
    fn on_dimension_changed(&mut self, dimension: Dimension);
}

impl<F: FnMut(Dimension) + Send> DimensionListener for F {
    fn on_dimension_changed(&mut self, dimension: Dimension) {
        (self)(dimension);
    }
}

/// Handle returned by [`TimelineController::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Result of a switch request. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The dimension changed and every registered entity was visited
    Switched(DimensionChange),
    /// The requested dimension was already current
    AlreadyActive,
    /// Switching has not been enabled yet
    Disabled,
}

impl SwitchOutcome {
    pub fn is_switched(&self) -> bool {
        matches!(self, Self::Switched(_))
    }
}

/// Tracks the current dimension and fans every switch out to the registry
pub struct TimelineController {
    current: Dimension,
    switching_enabled: bool,
    enforce_gate: bool,
    registry: Vec<Entity>,
    listeners: Vec<(ListenerId, Box<dyn DimensionListener>)>,
    next_listener_id: u64,
}

impl TimelineController {
    /// Controller starting in `starting`, with switching disabled and the gate enforced
    pub fn new(starting: Dimension) -> Self {
        Self {
            current: starting,
            switching_enabled: false,
            enforce_gate: true,
            registry: Vec::new(),
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    pub fn from_settings(settings: &TimelineSettings) -> Self {
        Self {
            switching_enabled: settings.switching_enabled,
            enforce_gate: settings.enforce_gate,
            ..Self::new(settings.starting_dimension)
        }
    }

    pub fn current_dimension(&self) -> Dimension {
        self.current
    }

    pub fn switching_enabled(&self) -> bool {
        self.switching_enabled
    }

    /// Whether `switch_to` itself refuses to run while switching is disabled.
    ///
    /// When `false` the flag is advisory and only input adapters honor it.
    pub fn enforces_gate(&self) -> bool {
        self.enforce_gate
    }

    /// Unlock dimension switching. Idempotent.
    pub fn enable_switching(&mut self) {
        if self.switching_enabled {
            return;
        }
        self.switching_enabled = true;
        info!("Time control abilities have been acquired");
    }

    // ---- Registry ----

    /// Add an entity to the registry. Returns `false` if it was already present.
    pub fn register(&mut self, entity: Entity) -> bool {
        if self.registry.contains(&entity) {
            return false;
        }
        self.registry.push(entity);
        true
    }

    /// Remove an entity from the registry. Returns `false` if it was absent.
    pub fn unregister(&mut self, entity: Entity) -> bool {
        let Some(position) = self.registry.iter().position(|e| *e == entity) else {
            return false;
        };
        self.registry.remove(position);
        true
    }

    pub fn is_registered(&self, entity: Entity) -> bool {
        self.registry.contains(&entity)
    }

    /// Registered entities in registration order
    pub fn registered(&self) -> &[Entity] {
        &self.registry
    }

    // ---- Notifications ----

    /// Call `listener` after every completed switch, with the new dimension.
    ///
    /// Listeners run inside the switch. Behind a [`SharedTimeline`] that
    /// means under its lock, so a listener here must not touch the shared
    /// handle. Use [`SharedTimeline::subscribe`] for that.
    ///
    /// [`SharedTimeline`]: crate::SharedTimeline
    /// [`SharedTimeline::subscribe`]: crate::SharedTimeline::subscribe
    pub fn subscribe(&mut self, listener: impl DimensionListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    // ---- Switching ----

    /// Make `dimension` current and bring every registered entity along.
    ///
    /// Listeners are notified only after every entity has been visited, so
    /// they always observe the updated world.
    pub fn switch_to<H: TimelineHost>(&mut self, host: &mut H, dimension: Dimension) -> SwitchOutcome {
        if dimension == self.current {
            return SwitchOutcome::AlreadyActive;
        }
        if self.enforce_gate && !self.switching_enabled {
            debug!("Ignoring switch to {dimension}: time control not acquired");
            return SwitchOutcome::Disabled;
        }

        let change = DimensionChange::new(self.current, dimension);
        self.current = dimension;
        self.dispatch(host, change);
        self.notify(dimension);

        info!("Switched to {dimension}");
        SwitchOutcome::Switched(change)
    }

    pub fn switch_to_past<H: TimelineHost>(&mut self, host: &mut H) -> SwitchOutcome {
        self.switch_to(host, Dimension::Past)
    }

    pub fn switch_to_present<H: TimelineHost>(&mut self, host: &mut H) -> SwitchOutcome {
        self.switch_to(host, Dimension::Present)
    }

    pub fn switch_to_future<H: TimelineHost>(&mut self, host: &mut H) -> SwitchOutcome {
        self.switch_to(host, Dimension::Future)
    }

    /// Visit a copy of the registry taken before the first entity runs, so
    /// entities destroyed mid-walk neither shift nor repeat anyone's turn.
    fn dispatch<H: TimelineHost>(&mut self, host: &mut H, change: DimensionChange) {
        let visiting = self.registry.clone();
        for entity in visiting {
            if !host.contains(entity) {
                trace!("Dropping {entity} from the registry: no longer exists");
                self.unregister(entity);
                continue;
            }
            if host.dispatch(entity, change).is_paradox() {
                self.unregister(entity);
            }
        }
    }

    fn notify(&mut self, dimension: Dimension) {
        for (_, listener) in &mut self.listeners {
            listener.on_dimension_changed(dimension);
        }
    }
}

impl Default for TimelineController {
    fn default() -> Self {
        Self::from_settings(&TimelineSettings::default())
    }
}

impl fmt::Debug for TimelineController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimelineController")
            .field("current", &self.current)
            .field("switching_enabled", &self.switching_enabled)
            .field("enforce_gate", &self.enforce_gate)
            .field("registered", &self.registry.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
