//! Per-dimension visual variants
//!
//! An entity picks one of two presentation strategies: swap the material on
//! its own renderer, or show exactly one of several child entities.

use tempora_core::Dimension;
use tempora_ecs::{Entity, World};
use tracing::warn;

/// Whether an entity currently takes part in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Active(pub bool);

impl Active {
    /// Read an entity's flag. Entities without one count as active.
    pub fn of(world: &World, entity: Entity) -> bool {
        world.get::<Active>(entity).map_or(true, |active| active.0)
    }
}

/// Handle to a material owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

/// Shared renderer whose material is swapped per dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Renderer {
    pub material: Option<MaterialId>,
}

/// Visual binding for each dimension, indexed by [`Dimension::index`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// One material per dimension on the entity's own [`Renderer`]
    MaterialSwap { materials: [Option<MaterialId>; 3] },
    /// One pre-built child entity per dimension; only one is active at a time
    ChildVariants { children: [Option<Entity>; 3] },
}

impl Presentation {
    /// Material-swap presentation with a material bound in every dimension
    pub fn materials(past: MaterialId, present: MaterialId, future: MaterialId) -> Self {
        Self::MaterialSwap {
            materials: [Some(past), Some(present), Some(future)],
        }
    }

    /// Child-variant presentation with a child bound in every dimension
    pub fn children(past: Entity, present: Entity, future: Entity) -> Self {
        Self::ChildVariants {
            children: [Some(past), Some(present), Some(future)],
        }
    }

    /// Child entities owned by this presentation
    pub fn child_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        let children: &[Option<Entity>] = match self {
            Self::MaterialSwap { .. } => &[],
            Self::ChildVariants { children } => children,
        };
        children.iter().flatten().copied()
    }

    /// Select the variant bound to `dimension`.
    ///
    /// A missing binding leaves the current visuals as they are.
    pub(crate) fn show(&self, world: &mut World, entity: Entity, dimension: Dimension) {
        match self {
            Self::MaterialSwap { materials } => {
                let Some(material) = materials[dimension.index()] else {
                    warn!("{entity} has no material bound for {dimension}");
                    return;
                };
                match world.get_mut::<Renderer>(entity) {
                    Some(renderer) => renderer.material = Some(material),
                    None => warn!("{entity} swaps materials but has no renderer"),
                }
            }
            Self::ChildVariants { children } => {
                if children[dimension.index()].is_none() {
                    warn!("{entity} has no child variant bound for {dimension}");
                    return;
                }
                for (index, child) in children.iter().enumerate() {
                    if let Some(child) = child {
                        world.insert(*child, Active(index == dimension.index()));
                    }
                }
            }
        }
    }

    /// Turn every variant off while the owning entity is hidden
    pub(crate) fn hide(&self, world: &mut World) {
        for child in self.child_entities() {
            world.insert(child, Active(false));
        }
    }
}
