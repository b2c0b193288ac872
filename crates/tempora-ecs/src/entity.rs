use std::fmt;

/// Handle to an entity in a [`World`](crate::World).
///
/// Packs the slot index in the low half and the slot's generation in the
/// high half, so a handle to a freed slot never equals its successor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(u64);

impl Entity {
    pub const fn from_parts(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | index as u64)
    }

    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub(crate) fn slot(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Entity").field(&format_args!("{self}")).finish()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index(), self.generation())
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    generation: u32,
    alive: bool,
}

/// Hands out entity slots and recycles freed ones under a new generation.
#[derive(Debug, Default)]
pub(crate) struct EntityAllocator {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    live: usize,
}

impl EntityAllocator {
    /// Allocate a new entity, reusing a freed slot if available.
    pub fn allocate(&mut self) -> Entity {
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.alive = true;
            return Entity::from_parts(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            alive: true,
        });
        Entity::from_parts(index, 0)
    }

    /// Free an entity's slot. Returns `true` if the handle referred to a live entity.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let slot = &mut self.slots[entity.slot()];
        slot.alive = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(entity.index());
        self.live -= 1;
        true
    }

    /// Whether the handle still refers to a live entity.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.slots
            .get(entity.slot())
            .is_some_and(|slot| slot.alive && slot.generation == entity.generation())
    }

    /// Handle of the live entity occupying `index`, if any.
    pub fn live_at(&self, index: u32) -> Option<Entity> {
        let slot = self.slots.get(index as usize)?;
        slot.alive.then_some(Entity::from_parts(index, slot.generation))
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.live
    }
}
