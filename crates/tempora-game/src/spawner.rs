//! Matter bending: raising time-aware objects out of the ground
//!
//! Objects are born in whatever dimension is current when they are raised
//! and are only allowed to exist from that dimension onward.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tempora_core::{Dimension, TimelineMask, Transform};
use tempora_ecs::{Entity, World};
use tempora_timeline::lifecycle;
use tempora_timeline::{Active, ApplyOutcome, MaterialId, Presentation, TimelineController};
use thiserror::Error;
use tracing::{debug, info};

/// Spawner tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerSettings {
    /// Objects that may be raised at the same time
    pub max_spawned: usize,
    /// How far above the ground point a raised object ends up
    pub rise_height: f32,
    /// How far below the ground point a raised object starts
    pub sink_offset: f32,
}

impl Default for SpawnerSettings {
    fn default() -> Self {
        Self {
            max_spawned: 3,
            rise_height: 1.0,
            sink_offset: 0.5,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpawnError {
    #[error("Bending limit reached: {max} objects already raised")]
    LimitReached { max: usize },

    #[error("No spawn variants configured")]
    NoVariants,
}

/// How a variant looks in each dimension.
///
/// A template: every raised object gets its own [`Presentation`] built
/// from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantLook {
    /// One material per dimension on the object's own renderer
    Materials([Option<MaterialId>; 3]),
    /// Three fresh child objects, one per dimension
    Children,
}

impl VariantLook {
    fn instantiate(self, world: &mut World) -> Presentation {
        match self {
            Self::Materials(materials) => Presentation::MaterialSwap { materials },
            Self::Children => {
                let [past, present, future] = Dimension::ALL.map(|dimension| {
                    let child = world.spawn();
                    world.insert(child, ChildVariant(dimension));
                    world.insert(child, Active(false));
                    child
                });
                Presentation::children(past, present, future)
            }
        }
    }
}

/// Component on a child object built by [`VariantLook::Children`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildVariant(pub Dimension);

/// One kind of object the spawner can raise
#[derive(Debug, Clone)]
pub struct SpawnVariant {
    pub name: String,
    pub look: Option<VariantLook>,
}

impl SpawnVariant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            look: None,
        }
    }

    pub fn with_materials(mut self, past: MaterialId, present: MaterialId, future: MaterialId) -> Self {
        self.look = Some(VariantLook::Materials([Some(past), Some(present), Some(future)]));
        self
    }

    pub fn with_child_variants(mut self) -> Self {
        self.look = Some(VariantLook::Children);
        self
    }
}

/// Component recording which variant raised an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnTag {
    pub variant: usize,
}

/// Marker for objects the player may pick up or sink back into the ground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Grabbable;

/// A freshly raised object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnedMatter {
    pub entity: Entity,
    /// Where the object appears, below the ground point
    pub start: Vec3,
    /// Where the object comes to rest
    pub target: Vec3,
    pub outcome: ApplyOutcome,
}

/// Raises objects, tracks them and enforces the slot budget
#[derive(Debug, Clone)]
pub struct MatterSpawner {
    settings: SpawnerSettings,
    variants: Vec<SpawnVariant>,
    selected: usize,
    spawned: Vec<Entity>,
}

impl MatterSpawner {
    pub fn new(settings: SpawnerSettings, variants: Vec<SpawnVariant>) -> Self {
        Self {
            settings,
            variants,
            selected: 0,
            spawned: Vec::new(),
        }
    }

    pub fn settings(&self) -> &SpawnerSettings {
        &self.settings
    }

    pub fn variants(&self) -> &[SpawnVariant] {
        &self.variants
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_variant(&self) -> Option<&SpawnVariant> {
        self.variants.get(self.selected)
    }

    /// Select the next variant, wrapping around. No-op without variants.
    pub fn cycle_variant(&mut self) -> Option<&SpawnVariant> {
        if self.variants.is_empty() {
            return None;
        }
        self.selected = (self.selected + 1) % self.variants.len();
        let variant = &self.variants[self.selected];
        info!("Switched to variant: {}", variant.name);
        Some(variant)
    }

    /// Raise the selected variant at `ground_point`.
    ///
    /// The object starts below the ground and is tracked until it is
    /// destroyed or its slot is freed.
    pub fn spawn(
        &mut self,
        world: &mut World,
        controller: &mut TimelineController,
        ground_point: Vec3,
    ) -> Result<SpawnedMatter, SpawnError> {
        self.prune(world);
        let Some(variant) = self.variants.get(self.selected) else {
            return Err(SpawnError::NoVariants);
        };
        if self.spawned.len() >= self.settings.max_spawned {
            debug!("Bending limit reached, cannot raise more objects");
            return Err(SpawnError::LimitReached {
                max: self.settings.max_spawned,
            });
        }

        let start = ground_point - Vec3::Y * self.settings.sink_offset;
        let target = ground_point + Vec3::Y * self.settings.rise_height;
        let birth = controller.current_dimension();
        let presentation = variant.look.map(|look| look.instantiate(world));

        let (entity, outcome) = lifecycle::spawn_dynamic(
            world,
            controller,
            Transform::from_position(start),
            presentation,
            TimelineMask::forward_from(birth),
        );
        world.insert(
            entity,
            SpawnTag {
                variant: self.selected,
            },
        );
        world.insert(entity, Grabbable);
        self.spawned.push(entity);

        info!("Raised {} in the {birth} as {entity}", variant.name);
        Ok(SpawnedMatter {
            entity,
            start,
            target,
            outcome,
        })
    }

    /// Snap a raised object to its resting point. Returns `false` if it is gone.
    pub fn settle(&self, world: &mut World, matter: &SpawnedMatter) -> bool {
        match world.get_mut::<Transform>(matter.entity) {
            Some(transform) => {
                transform.position = matter.target;
                true
            }
            None => false,
        }
    }

    /// Stop tracking an object without destroying it (for example once it
    /// is stuck to a surface).
    pub fn free_slot(&mut self, entity: Entity) -> bool {
        let before = self.spawned.len();
        self.spawned.retain(|e| *e != entity);
        let freed = self.spawned.len() != before;
        if freed {
            info!("{entity} was stuck to a surface, slot freed");
        }
        freed
    }

    /// Tracked objects that still exist, visible or not
    pub fn active_count(&self, world: &World) -> usize {
        self.spawned.iter().filter(|e| world.is_alive(**e)).count()
    }

    pub fn available_slots(&self, world: &World) -> usize {
        self.settings.max_spawned.saturating_sub(self.active_count(world))
    }

    /// Currently active objects of one variant
    pub fn count_of_kind(&self, world: &World, variant: usize) -> usize {
        world
            .iter::<SpawnTag>()
            .filter(|(entity, tag)| tag.variant == variant && Active::of(world, *entity))
            .count()
    }

    fn prune(&mut self, world: &World) {
        self.spawned.retain(|e| world.is_alive(*e));
    }
}

#[cfg(test)]
mod tests {
    use tempora_core::Dimension;
    use tempora_timeline::{Renderer, TimelineAware};

    use super::*;

    fn rocks() -> Vec<SpawnVariant> {
        vec![
            SpawnVariant::new("Regular"),
            SpawnVariant::new("Tall"),
            SpawnVariant::new("Wide").with_materials(MaterialId(1), MaterialId(2), MaterialId(3)),
            SpawnVariant::new("Crystal").with_child_variants(),
        ]
    }

    fn unlocked(dimension: Dimension) -> TimelineController {
        let mut controller = TimelineController::new(dimension);
        controller.enable_switching();
        controller
    }

    #[test]
    fn cycle_wraps_around() {
        let mut spawner = MatterSpawner::new(SpawnerSettings::default(), rocks());
        assert_eq!(spawner.selected_variant().unwrap().name, "Regular");
        spawner.cycle_variant();
        spawner.cycle_variant();
        assert_eq!(spawner.selected_index(), 2);
        assert_eq!(spawner.cycle_variant().unwrap().name, "Crystal");
        assert_eq!(spawner.cycle_variant().unwrap().name, "Regular");
    }

    #[test]
    fn cycle_without_variants_is_noop() {
        let mut spawner = MatterSpawner::new(SpawnerSettings::default(), Vec::new());
        assert!(spawner.cycle_variant().is_none());
        assert_eq!(spawner.selected_index(), 0);
    }

    #[test]
    fn spawn_without_variants_fails() {
        let mut world = World::new();
        let mut controller = unlocked(Dimension::Present);
        let mut spawner = MatterSpawner::new(SpawnerSettings::default(), Vec::new());
        assert_eq!(
            spawner.spawn(&mut world, &mut controller, Vec3::ZERO),
            Err(SpawnError::NoVariants)
        );
    }

    #[test]
    fn spawn_uses_current_dimension_and_forward_mask() {
        let mut world = World::new();
        let mut controller = unlocked(Dimension::Present);
        let mut spawner = MatterSpawner::new(SpawnerSettings::default(), rocks());

        let matter = spawner
            .spawn(&mut world, &mut controller, Vec3::new(2.0, 0.0, 0.0))
            .unwrap();

        assert_eq!(matter.outcome, ApplyOutcome::Shown(Dimension::Present));
        assert_eq!(matter.start, Vec3::new(2.0, -0.5, 0.0));
        assert_eq!(matter.target, Vec3::new(2.0, 1.0, 0.0));
        let aware = world.get::<TimelineAware>(matter.entity).unwrap();
        assert_eq!(aware.birth(), Dimension::Present);
        assert_eq!(aware.mask(), TimelineMask::PRESENT | TimelineMask::FUTURE);
        assert!(world.has::<Grabbable>(matter.entity));
        assert!(controller.is_registered(matter.entity));
    }

    #[test]
    fn settle_moves_to_target() {
        let mut world = World::new();
        let mut controller = unlocked(Dimension::Past);
        let mut spawner = MatterSpawner::new(SpawnerSettings::default(), rocks());
        let matter = spawner.spawn(&mut world, &mut controller, Vec3::ZERO).unwrap();

        assert!(spawner.settle(&mut world, &matter));
        assert_eq!(
            world.get::<Transform>(matter.entity).unwrap().position,
            Vec3::Y
        );
    }

    #[test]
    fn limit_is_enforced_and_slots_recover() {
        let mut world = World::new();
        let mut controller = unlocked(Dimension::Present);
        let mut spawner = MatterSpawner::new(SpawnerSettings::default(), rocks());

        let raised: Vec<_> = (0..3)
            .map(|_| spawner.spawn(&mut world, &mut controller, Vec3::ZERO).unwrap())
            .collect();
        assert_eq!(spawner.available_slots(&world), 0);
        assert_eq!(
            spawner.spawn(&mut world, &mut controller, Vec3::ZERO),
            Err(SpawnError::LimitReached { max: 3 })
        );

        lifecycle::destroy(&mut world, &mut controller, raised[0].entity);
        assert_eq!(spawner.available_slots(&world), 1);
        assert!(spawner.spawn(&mut world, &mut controller, Vec3::ZERO).is_ok());
    }

    #[test]
    fn paradox_frees_slots() {
        let mut world = World::new();
        let mut controller = unlocked(Dimension::Future);
        let mut spawner = MatterSpawner::new(SpawnerSettings::default(), rocks());
        spawner.spawn(&mut world, &mut controller, Vec3::ZERO).unwrap();
        spawner.spawn(&mut world, &mut controller, Vec3::ZERO).unwrap();
        assert_eq!(spawner.active_count(&world), 2);

        controller.switch_to_present(&mut world);

        assert_eq!(spawner.active_count(&world), 0);
        assert_eq!(spawner.available_slots(&world), 3);
    }

    #[test]
    fn freed_slot_keeps_the_object() {
        let mut world = World::new();
        let mut controller = unlocked(Dimension::Present);
        let mut spawner = MatterSpawner::new(SpawnerSettings::default(), rocks());
        let matter = spawner.spawn(&mut world, &mut controller, Vec3::ZERO).unwrap();

        assert!(spawner.free_slot(matter.entity));
        assert!(!spawner.free_slot(matter.entity));
        assert_eq!(spawner.active_count(&world), 0);
        assert!(world.is_alive(matter.entity));
    }

    #[test]
    fn count_of_kind_ignores_hidden_objects() {
        let mut world = World::new();
        let mut controller = unlocked(Dimension::Present);
        let mut spawner = MatterSpawner::new(SpawnerSettings::default(), rocks());
        spawner.spawn(&mut world, &mut controller, Vec3::ZERO).unwrap();
        spawner.cycle_variant();
        spawner.cycle_variant();
        let wide = spawner.spawn(&mut world, &mut controller, Vec3::ZERO).unwrap();

        assert_eq!(spawner.count_of_kind(&world, 0), 1);
        assert_eq!(spawner.count_of_kind(&world, 2), 1);
        assert_eq!(
            world.get::<Renderer>(wide.entity).unwrap().material,
            Some(MaterialId(2))
        );

        world.insert(wide.entity, Active(false));
        assert_eq!(spawner.count_of_kind(&world, 2), 0);
    }

    #[test]
    fn child_variants_are_built_per_object() {
        let mut world = World::new();
        let mut controller = unlocked(Dimension::Present);
        let mut spawner = MatterSpawner::new(
            SpawnerSettings::default(),
            vec![SpawnVariant::new("Crystal").with_child_variants()],
        );
        let first = spawner.spawn(&mut world, &mut controller, Vec3::ZERO).unwrap();
        let second = spawner.spawn(&mut world, &mut controller, Vec3::X).unwrap();

        let children = |entity: Entity| -> Vec<Entity> {
            world
                .get::<Presentation>(entity)
                .unwrap()
                .child_entities()
                .collect()
        };
        let (a, b) = (children(first.entity), children(second.entity));
        assert_eq!(a.len(), 3);
        assert!(a.iter().all(|child| !b.contains(child)));
        assert_eq!(
            world.get::<ChildVariant>(b[1]),
            Some(&ChildVariant(Dimension::Present))
        );
        assert!(Active::of(&world, a[1]) && Active::of(&world, b[1]));
        assert!(!Active::of(&world, a[0]) && !Active::of(&world, b[2]));
    }
}
