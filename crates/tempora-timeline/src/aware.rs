//! Time-aware entity state
//!
//! Every time-aware entity keeps one [`Snapshot`] per dimension. Whatever is
//! recorded in a dimension flows forward into the causally later ones: the
//! Past rewrites Present and Future, the Present rewrites Future, and the
//! Future rewrites nothing.

use tempora_core::{Dimension, Snapshot, TimelineMask, Transform};
use tempora_ecs::{Entity, World};

use crate::presentation::{Active, Presentation};

/// Component holding an entity's per-dimension state
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineAware {
    snapshots: [Snapshot; 3],
    birth: Dimension,
    mask: TimelineMask,
    spawned: bool,
}

impl TimelineAware {
    /// State for an object placed in the scene by hand.
    ///
    /// Born in the Past, allowed everywhere, and seeded with `transform` in
    /// all three dimensions.
    pub fn authored(transform: &Transform) -> Self {
        Self {
            snapshots: [Snapshot::capture(transform); 3],
            birth: Dimension::Past,
            mask: TimelineMask::ALL,
            spawned: false,
        }
    }

    /// Restrict the dimensions this entity may exist in
    pub fn with_mask(mut self, mask: TimelineMask) -> Self {
        self.mask = mask;
        self
    }

    /// Override the dimension this entity counts as created in
    pub fn with_birth(mut self, birth: Dimension) -> Self {
        self.birth = birth;
        self
    }

    pub fn snapshot(&self, dimension: Dimension) -> &Snapshot {
        &self.snapshots[dimension.index()]
    }

    pub fn birth(&self) -> Dimension {
        self.birth
    }

    pub fn mask(&self) -> TimelineMask {
        self.mask
    }

    /// Whether a spawner created this entity at runtime
    pub fn is_spawned(&self) -> bool {
        self.spawned
    }

    /// Store the live transform as the state of `dimension`
    pub fn record(&mut self, dimension: Dimension, transform: &Transform) {
        self.snapshots[dimension.index()] = Snapshot::capture(transform);
    }

    /// Copy the snapshot of `changed` into every causally later dimension
    pub fn propagate(&mut self, changed: Dimension) {
        let source = self.snapshots[changed.index()];
        for later in changed.later() {
            self.snapshots[later.index()] = source;
        }
    }

    /// Observing `dimension` would show a spawned entity before it was created
    pub fn is_paradox(&self, dimension: Dimension) -> bool {
        self.spawned && dimension.is_before(self.birth)
    }

    /// Whether the mask lets this entity exist in `dimension`
    pub fn is_visible_in(&self, dimension: Dimension) -> bool {
        self.mask.contains_dimension(dimension)
    }

    pub(crate) fn mark_spawned(&mut self, birth: Dimension, mask: TimelineMask) {
        self.birth = birth;
        self.mask = mask;
        self.spawned = true;
    }
}

/// What applying a dimension did to an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Active and showing the dimension's snapshot and variant
    Shown(Dimension),
    /// Deactivated because the mask excludes the dimension
    Hidden(Dimension),
    /// The dimension precedes the entity's creation; it must be destroyed
    Paradox(Dimension),
    /// The entity is gone or was never time-aware
    Missing,
}

impl ApplyOutcome {
    pub fn is_paradox(&self) -> bool {
        matches!(self, Self::Paradox(_))
    }
}

/// Record the live transform into `dimension` and push it forward.
///
/// Skipped for inactive entities, whose frozen transform must not overwrite
/// the stored state.
pub(crate) fn record_and_propagate(world: &mut World, entity: Entity, dimension: Dimension) -> bool {
    let live = Active::of(world, entity)
        .then(|| world.get::<Transform>(entity).copied())
        .flatten();
    let Some(aware) = world.get_mut::<TimelineAware>(entity) else {
        return false;
    };
    if let Some(transform) = live {
        aware.record(dimension, &transform);
    }
    aware.propagate(dimension);
    true
}

/// Make `dimension` the live state of an entity.
///
/// Never destroys anything itself: a paradox is reported back so the owner
/// of the entity can tear it down.
pub fn apply_dimension(world: &mut World, entity: Entity, dimension: Dimension) -> ApplyOutcome {
    let Some(aware) = world.get::<TimelineAware>(entity) else {
        return ApplyOutcome::Missing;
    };
    if aware.is_paradox(dimension) {
        return ApplyOutcome::Paradox(dimension);
    }

    let visible = aware.is_visible_in(dimension);
    let snapshot = *aware.snapshot(dimension);
    let presentation = world.get::<Presentation>(entity).copied();

    world.insert(entity, Active(visible));
    if !visible {
        if let Some(presentation) = presentation {
            presentation.hide(world);
        }
        return ApplyOutcome::Hidden(dimension);
    }

    if let Some(transform) = world.get_mut::<Transform>(entity) {
        snapshot.apply_to(transform);
    }
    if let Some(presentation) = presentation {
        presentation.show(world, entity, dimension);
    }
    ApplyOutcome::Shown(dimension)
}

#[cfg(test)]
mod tests {
    use tempora_core::Vec3;

    use super::*;

    fn at(x: f32) -> Transform {
        Transform::from_position(Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn authored_defaults() {
        let aware = TimelineAware::authored(&at(1.0));
        assert_eq!(aware.birth(), Dimension::Past);
        assert_eq!(aware.mask(), TimelineMask::ALL);
        assert!(!aware.is_spawned());
        for dimension in Dimension::ALL {
            assert_eq!(aware.snapshot(dimension).position.x, 1.0);
        }
    }

    #[test]
    fn past_overwrites_present_and_future() {
        let mut aware = TimelineAware::authored(&at(0.0));
        aware.record(Dimension::Past, &at(5.0));
        aware.propagate(Dimension::Past);
        assert_eq!(aware.snapshot(Dimension::Present).position.x, 5.0);
        assert_eq!(aware.snapshot(Dimension::Future).position.x, 5.0);
    }

    #[test]
    fn present_overwrites_only_future() {
        let mut aware = TimelineAware::authored(&at(0.0));
        aware.record(Dimension::Present, &at(3.0));
        aware.propagate(Dimension::Present);
        assert_eq!(aware.snapshot(Dimension::Past).position.x, 0.0);
        assert_eq!(aware.snapshot(Dimension::Present).position.x, 3.0);
        assert_eq!(aware.snapshot(Dimension::Future).position.x, 3.0);
    }

    #[test]
    fn future_overwrites_nothing() {
        let mut aware = TimelineAware::authored(&at(0.0));
        aware.record(Dimension::Future, &at(7.0));
        aware.propagate(Dimension::Future);
        assert_eq!(aware.snapshot(Dimension::Past).position.x, 0.0);
        assert_eq!(aware.snapshot(Dimension::Present).position.x, 0.0);
        assert_eq!(aware.snapshot(Dimension::Future).position.x, 7.0);
    }

    #[test]
    fn authored_entities_never_paradox() {
        let aware = TimelineAware::authored(&at(0.0)).with_birth(Dimension::Future);
        assert!(!aware.is_paradox(Dimension::Past));
    }

    #[test]
    fn spawned_paradox_uses_target_dimension() {
        let mut aware = TimelineAware::authored(&at(0.0));
        aware.mark_spawned(Dimension::Future, TimelineMask::FUTURE);
        assert!(aware.is_paradox(Dimension::Past));
        assert!(aware.is_paradox(Dimension::Present));
        assert!(!aware.is_paradox(Dimension::Future));
    }

    #[test]
    fn apply_moves_transform_and_activates() {
        let mut world = World::new();
        let entity = world.spawn();
        let mut aware = TimelineAware::authored(&at(0.0));
        aware.record(Dimension::Future, &at(9.0));
        world.insert(entity, at(0.0));
        world.insert(entity, aware);
        world.insert(entity, Active(false));

        let outcome = apply_dimension(&mut world, entity, Dimension::Future);
        assert_eq!(outcome, ApplyOutcome::Shown(Dimension::Future));
        assert!(Active::of(&world, entity));
        assert_eq!(world.get::<Transform>(entity).unwrap().position.x, 9.0);
    }

    #[test]
    fn apply_hides_outside_mask() {
        let mut world = World::new();
        let entity = world.spawn();
        world.insert(entity, at(2.0));
        world.insert(
            entity,
            TimelineAware::authored(&at(2.0)).with_mask(TimelineMask::PAST),
        );

        let outcome = apply_dimension(&mut world, entity, Dimension::Present);
        assert_eq!(outcome, ApplyOutcome::Hidden(Dimension::Present));
        assert!(!Active::of(&world, entity));
        assert!(world.is_alive(entity));
    }

    #[test]
    fn inactive_entity_is_not_recorded() {
        let mut world = World::new();
        let entity = world.spawn();
        world.insert(entity, at(0.0));
        world.insert(entity, TimelineAware::authored(&at(0.0)));
        world.insert(entity, Active(false));
        world.get_mut::<Transform>(entity).unwrap().position.x = 42.0;

        assert!(record_and_propagate(&mut world, entity, Dimension::Past));
        let aware = world.get::<TimelineAware>(entity).unwrap();
        assert_eq!(aware.snapshot(Dimension::Past).position.x, 0.0);
        assert_eq!(aware.snapshot(Dimension::Future).position.x, 0.0);
    }

    #[test]
    fn apply_on_plain_entity_is_missing() {
        let mut world = World::new();
        let entity = world.spawn();
        assert_eq!(
            apply_dimension(&mut world, entity, Dimension::Past),
            ApplyOutcome::Missing
        );
    }
}
