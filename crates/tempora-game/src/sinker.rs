//! Sinking raised objects back into the ground

use std::collections::HashSet;

use glam::Vec3;
use tempora_core::Transform;
use tempora_ecs::{Entity, World};
use tempora_timeline::lifecycle;
use tempora_timeline::{Active, TimelineController};
use tracing::{debug, info};

use crate::spawner::Grabbable;

/// An object on its way into the ground
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sinking {
    pub entity: Entity,
    pub start: Vec3,
    /// One object height below `start`
    pub end: Vec3,
}

#[derive(Debug, Default)]
pub struct MatterSinker {
    sinking: HashSet<Entity>,
}

impl MatterSinker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_sinking(&self, entity: Entity) -> bool {
        self.sinking.contains(&entity)
    }

    /// Closest visible grabbable object within `range` of `from` that is not
    /// already sinking
    pub fn nearest_target(&self, world: &World, from: Vec3, range: f32) -> Option<Entity> {
        world
            .iter::<Grabbable>()
            .filter(|(entity, _)| Active::of(world, *entity) && !self.is_sinking(*entity))
            .filter_map(|(entity, _)| {
                let distance = world.get::<Transform>(entity)?.position.distance(from);
                (distance <= range).then_some((entity, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(entity, _)| entity)
    }

    /// Start sinking a grabbable object.
    ///
    /// Refuses dead entities, hidden ones, non-grabbable ones and objects
    /// that are already sinking.
    pub fn begin_sink(&mut self, world: &World, entity: Entity) -> Option<Sinking> {
        if !world.has::<Grabbable>(entity)
            || !Active::of(world, entity)
            || self.sinking.contains(&entity)
        {
            debug!("{entity} cannot be sunk");
            return None;
        }
        let transform = world.get::<Transform>(entity)?;
        let start = transform.position;
        let end = start - Vec3::Y * transform.scale.y;
        self.sinking.insert(entity);
        Some(Sinking { entity, start, end })
    }

    /// Lower the object to its end point and destroy it.
    ///
    /// Returns `false` if something else destroyed it in the meantime.
    pub fn finish_sink(&mut self, world: &mut World, controller: &mut TimelineController, sinking: Sinking) -> bool {
        self.sinking.remove(&sinking.entity);
        let Some(transform) = world.get_mut::<Transform>(sinking.entity) else {
            return false;
        };
        transform.position = sinking.end;
        let destroyed = lifecycle::destroy(world, controller, sinking.entity);
        if destroyed {
            info!("{} sank into the ground", sinking.entity);
        }
        destroyed
    }

    /// Sink an object in one step
    pub fn sink(&mut self, world: &mut World, controller: &mut TimelineController, entity: Entity) -> bool {
        match self.begin_sink(world, entity) {
            Some(sinking) => self.finish_sink(world, controller, sinking),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use tempora_core::Dimension;
    use tempora_timeline::Presentation;

    use super::*;
    use crate::spawner::{MatterSpawner, SpawnVariant, SpawnerSettings};

    fn setup() -> (World, TimelineController, MatterSpawner) {
        let mut controller = TimelineController::new(Dimension::Present);
        controller.enable_switching();
        let spawner = MatterSpawner::new(SpawnerSettings::default(), vec![SpawnVariant::new("Regular")]);
        (World::new(), controller, spawner)
    }

    #[test]
    fn sinking_lowers_by_height_and_destroys() {
        let (mut world, mut controller, mut spawner) = setup();
        let matter = spawner.spawn(&mut world, &mut controller, Vec3::ZERO).unwrap();
        world.get_mut::<Transform>(matter.entity).unwrap().scale = Vec3::new(1.0, 2.0, 1.0);
        let mut sinker = MatterSinker::new();

        let sinking = sinker.begin_sink(&world, matter.entity).unwrap();
        assert_eq!(sinking.end, sinking.start - Vec3::new(0.0, 2.0, 0.0));
        assert!(sinker.is_sinking(matter.entity));
        assert!(sinker.begin_sink(&world, matter.entity).is_none());

        assert!(sinker.finish_sink(&mut world, &mut controller, sinking));
        assert!(!world.is_alive(matter.entity));
        assert!(!controller.is_registered(matter.entity));
        assert!(!sinker.is_sinking(matter.entity));
        assert_eq!(spawner.available_slots(&world), 3);
    }

    #[test]
    fn non_grabbable_and_dead_entities_are_refused() {
        let (mut world, mut controller, mut spawner) = setup();
        let mut sinker = MatterSinker::new();
        let plain = world.spawn();
        world.insert(plain, Transform::default());
        assert!(!sinker.sink(&mut world, &mut controller, plain));

        let matter = spawner.spawn(&mut world, &mut controller, Vec3::ZERO).unwrap();
        world.despawn(matter.entity);
        assert!(!sinker.sink(&mut world, &mut controller, matter.entity));
    }

    #[test]
    fn object_destroyed_while_sinking() {
        let (mut world, mut controller, mut spawner) = setup();
        let mut sinker = MatterSinker::new();
        let matter = spawner.spawn(&mut world, &mut controller, Vec3::ZERO).unwrap();

        let sinking = sinker.begin_sink(&world, matter.entity).unwrap();
        lifecycle::destroy(&mut world, &mut controller, matter.entity);

        assert!(!sinker.finish_sink(&mut world, &mut controller, sinking));
        assert!(!sinker.is_sinking(matter.entity));
    }

    #[test]
    fn hidden_objects_cannot_be_sunk() {
        let (mut world, mut controller, mut spawner) = setup();
        let mut sinker = MatterSinker::new();
        let hidden = spawner.spawn(&mut world, &mut controller, Vec3::ZERO).unwrap();
        world.insert(hidden.entity, Active(false));

        assert!(sinker.nearest_target(&world, Vec3::ZERO, 20.0).is_none());
        assert!(!sinker.sink(&mut world, &mut controller, hidden.entity));
        assert!(world.is_alive(hidden.entity));
    }

    #[test]
    fn nearest_target_picks_closest_in_range() {
        let (mut world, mut controller, mut spawner) = setup();
        let sinker = MatterSinker::new();
        let near = spawner.spawn(&mut world, &mut controller, Vec3::new(2.0, 0.0, 0.0)).unwrap();
        spawner.spawn(&mut world, &mut controller, Vec3::new(5.0, 0.0, 0.0)).unwrap();
        spawner.spawn(&mut world, &mut controller, Vec3::new(50.0, 0.0, 0.0)).unwrap();

        assert_eq!(sinker.nearest_target(&world, Vec3::ZERO, 20.0), Some(near.entity));
        assert!(sinker.nearest_target(&world, Vec3::new(100.0, 0.0, 0.0), 20.0).is_none());
    }

    #[test]
    fn sinking_one_object_keeps_the_others_variants() {
        let mut controller = TimelineController::new(Dimension::Present);
        controller.enable_switching();
        let mut world = World::new();
        let mut spawner = MatterSpawner::new(
            SpawnerSettings::default(),
            vec![SpawnVariant::new("Crystal").with_child_variants()],
        );
        let mut sinker = MatterSinker::new();
        let sunk = spawner.spawn(&mut world, &mut controller, Vec3::ZERO).unwrap();
        let kept = spawner.spawn(&mut world, &mut controller, Vec3::X).unwrap();
        let kept_children: Vec<Entity> = world
            .get::<Presentation>(kept.entity)
            .unwrap()
            .child_entities()
            .collect();

        assert!(sinker.sink(&mut world, &mut controller, sunk.entity));

        assert!(world.is_alive(kept.entity));
        assert!(kept_children.iter().all(|child| world.is_alive(*child)));

        controller.switch_to_future(&mut world);
        assert!(Active::of(&world, kept_children[2]));
        assert!(!Active::of(&world, kept_children[1]));
    }
}
