use std::any::Any;

/// Marker trait for types that can be attached to entities.
pub trait Component: 'static + Send + Sync {}

/// Any `'static + Send + Sync` type is a valid component.
impl<T: 'static + Send + Sync> Component for T {}

/// Type-erased view of a column, so the world can drop an entity's
/// components without knowing their types.
pub(crate) trait ErasedColumn: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn remove(&mut self, index: u32) -> bool;
}

/// Sparse-set column for one component type: O(1) insert/remove/lookup by
/// entity slot, packed storage for iteration.
pub(crate) struct Column<T> {
    /// Entity slot → position in `packed`.
    sparse: Vec<Option<usize>>,
    /// (entity slot, value) pairs, densely packed.
    packed: Vec<(u32, T)>,
}

impl<T: Component> Column<T> {
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            packed: Vec::new(),
        }
    }

    /// Insert or replace the value for an entity slot.
    pub fn insert(&mut self, index: u32, value: T) {
        let idx = index as usize;
        if idx >= self.sparse.len() {
            self.sparse.resize(idx + 1, None);
        }
        match self.sparse[idx] {
            Some(pos) => self.packed[pos].1 = value,
            None => {
                self.sparse[idx] = Some(self.packed.len());
                self.packed.push((index, value));
            }
        }
    }

    pub fn get(&self, index: u32) -> Option<&T> {
        let pos = (*self.sparse.get(index as usize)?)?;
        self.packed.get(pos).map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        let pos = (*self.sparse.get(index as usize)?)?;
        self.packed.get_mut(pos).map(|(_, value)| value)
    }

    /// Iterate over (entity slot, &value) pairs in packed order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.packed.iter().map(|(index, value)| (*index, value))
    }

    pub fn len(&self) -> usize {
        self.packed.len()
    }
}

impl<T: Component> ErasedColumn for Column<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn remove(&mut self, index: u32) -> bool {
        let Some(pos) = self.sparse.get_mut(index as usize).and_then(Option::take) else {
            return false;
        };
        self.packed.swap_remove(pos);
        // The former last element now lives at `pos`.
        if let Some((moved, _)) = self.packed.get(pos) {
            self.sparse[*moved as usize] = Some(pos);
        }
        true
    }
}
