//! Generational slot pool.
//!
//! Units and projectiles are "destroyed" by returning their slot to the
//! pool and reincarnated by reusing it, avoiding per-spawn allocation.
//! Generations make stale handles detectable: a handle minted for a
//! previous occupant of a slot stops resolving once the slot is reused.

/// Handle to an occupied pool slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    index: usize,
    generation: u32,
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Reusable storage for pooled records.
pub struct SlotPool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
}

impl<T> SlotPool<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Preallocate capacity for `n` slots.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            slots: Vec::with_capacity(n),
            free: Vec::with_capacity(n),
        }
    }

    /// Place a value in a free slot (reusing one if available) and
    /// return its handle.
    pub fn acquire(&mut self, value: T) -> PoolHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.value = Some(value);
            PoolHandle {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len();
            self.slots.push(Slot {
                generation: 0,
                value: Some(value),
            });
            PoolHandle {
                index,
                generation: 0,
            }
        }
    }

    /// Return a slot to the free list, yielding its value so the caller
    /// can reset attributes. Stale or double releases return None.
    pub fn release(&mut self, handle: PoolHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index)?;
        if slot.generation != handle.generation || slot.value.is_none() {
            return None;
        }
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        slot.value.take()
    }

    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        let slot = self.slots.get(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total slots ever allocated (occupied + free).
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl<T> Default for SlotPool<T> {
    fn default() -> Self {
        Self::new()
    }
}
