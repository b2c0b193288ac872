//! Creating, updating and destroying time-aware entities in a [`World`]

use tempora_core::{Dimension, DimensionChange, TimelineMask, Transform};
use tempora_ecs::{Entity, World};
use tracing::{debug, info};

use crate::aware::{apply_dimension, record_and_propagate, ApplyOutcome, TimelineAware};
use crate::controller::{TimelineController, TimelineHost};
use crate::presentation::{Active, Presentation, Renderer};

/// Place a hand-authored object: born in the Past, visible everywhere.
pub fn spawn_authored(
    world: &mut World,
    controller: &mut TimelineController,
    transform: Transform,
    presentation: Option<Presentation>,
) -> Entity {
    let aware = TimelineAware::authored(&transform);
    spawn_with(world, controller, transform, aware, presentation)
}

/// Place a hand-authored object with explicit time-aware state (for
/// example one restricted to a subset of dimensions).
pub fn spawn_with(
    world: &mut World,
    controller: &mut TimelineController,
    transform: Transform,
    aware: TimelineAware,
    presentation: Option<Presentation>,
) -> Entity {
    let entity = build(world, transform, aware, presentation);
    controller.register(entity);
    let current = controller.current_dimension();
    apply_or_destroy(world, controller, entity, current);
    entity
}

/// Spawn an object at runtime, born in the controller's current dimension.
///
/// The returned outcome tells the spawner whether the object is visible
/// right away.
pub fn spawn_dynamic(
    world: &mut World,
    controller: &mut TimelineController,
    transform: Transform,
    presentation: Option<Presentation>,
    mask: TimelineMask,
) -> (Entity, ApplyOutcome) {
    let entity = build(world, transform, TimelineAware::authored(&transform), presentation);
    controller.register(entity);
    let birth = controller.current_dimension();
    let outcome = initialize_as_spawned(world, controller, entity, birth, mask);
    (entity, outcome)
}

/// Mark a freshly built entity as spawned in `birth` and bring it up to
/// date with the current dimension.
///
/// Must be called once, right after construction. The current transform
/// becomes the state of `birth` and of every dimension after it.
pub fn initialize_as_spawned(
    world: &mut World,
    controller: &mut TimelineController,
    entity: Entity,
    birth: Dimension,
    mask: TimelineMask,
) -> ApplyOutcome {
    let Some(transform) = world.get::<Transform>(entity).copied() else {
        return ApplyOutcome::Missing;
    };
    let Some(aware) = world.get_mut::<TimelineAware>(entity) else {
        return ApplyOutcome::Missing;
    };
    aware.mark_spawned(birth, mask);
    aware.record(birth, &transform);
    aware.propagate(birth);

    let current = controller.current_dimension();
    apply_or_destroy(world, controller, entity, current)
}

/// Bring one entity from `change.from` to `change.to`.
///
/// Records the live transform into the dimension being left (only while
/// active), propagates it forward, then applies the new dimension. A
/// paradox despawns the entity together with its variant children.
pub fn handle_dimension_change(world: &mut World, entity: Entity, change: DimensionChange) -> ApplyOutcome {
    if !record_and_propagate(world, entity, change.from) {
        return ApplyOutcome::Missing;
    }
    let outcome = apply_dimension(world, entity, change.to);
    if outcome.is_paradox() {
        info!("{entity} cannot exist in the {} before it was created", change.to);
        despawn_with_children(world, entity);
    }
    outcome
}

/// Destroy an entity from outside the timeline (gameplay, abilities).
///
/// Idempotent. Despawning through [`World::despawn`] alone is also safe:
/// the controller drops stale handles on its next switch.
pub fn destroy(world: &mut World, controller: &mut TimelineController, entity: Entity) -> bool {
    controller.unregister(entity);
    despawn_with_children(world, entity)
}

impl TimelineHost for World {
    fn contains(&self, entity: Entity) -> bool {
        self.has::<TimelineAware>(entity)
    }

    fn dispatch(&mut self, entity: Entity, change: DimensionChange) -> ApplyOutcome {
        handle_dimension_change(self, entity, change)
    }
}

fn build(
    world: &mut World,
    transform: Transform,
    aware: TimelineAware,
    presentation: Option<Presentation>,
) -> Entity {
    let entity = world.spawn();
    world.insert(entity, transform);
    world.insert(entity, aware);
    world.insert(entity, Active(true));
    if let Some(presentation) = presentation {
        if matches!(presentation, Presentation::MaterialSwap { .. }) && !world.has::<Renderer>(entity) {
            world.insert(entity, Renderer::default());
        }
        world.insert(entity, presentation);
    }
    entity
}

fn apply_or_destroy(
    world: &mut World,
    controller: &mut TimelineController,
    entity: Entity,
    dimension: Dimension,
) -> ApplyOutcome {
    let outcome = apply_dimension(world, entity, dimension);
    if outcome.is_paradox() {
        info!("{entity} was created after the {dimension} and is destroyed");
        destroy(world, controller, entity);
    }
    outcome
}

fn despawn_with_children(world: &mut World, entity: Entity) -> bool {
    let children: Vec<Entity> = world
        .get::<Presentation>(entity)
        .map(|presentation| presentation.child_entities().collect())
        .unwrap_or_default();
    if !world.despawn(entity) {
        return false;
    }
    for child in children {
        world.despawn(child);
    }
    debug!("Despawned {entity}");
    true
}
