//! Lock-free shared attack-target slot.
//!
//! The AI worker pool writes target selections while the simulation
//! thread reads them in the same frame for damage and angle work. The
//! slot is therefore a packed atomic, exchanged with compare-and-swap,
//! never a lock: a mutex here could stall the simulation tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hecs::Entity;

/// No-target sentinel. `hecs::Entity::to_bits` is non-zero, so zero is
/// free to mean "empty".
const EMPTY: u64 = 0;

/// Shared, atomically-exchanged reference to the current attack target.
///
/// Cloning the handle clones the `Arc`; all clones observe the same slot.
#[derive(Debug, Clone, Default)]
pub struct TargetHandle(Arc<AtomicU64>);

impl TargetHandle {
    pub fn new() -> Self {
        Self(Arc::new(AtomicU64::new(EMPTY)))
    }

    /// Current target, if any.
    pub fn get(&self) -> Option<Entity> {
        let bits = self.0.load(Ordering::Acquire);
        if bits == EMPTY {
            None
        } else {
            Entity::from_bits(bits)
        }
    }

    /// Unconditionally set the target.
    pub fn set(&self, target: Entity) {
        self.0.store(target.to_bits().get(), Ordering::Release);
    }

    /// Clear the slot.
    pub fn clear(&self) {
        self.0.store(EMPTY, Ordering::Release);
    }

    /// Set the target only if the slot is currently empty. Returns true
    /// on success. This is the AI-worker write path: the worker never
    /// overwrites an order the player or host placed first.
    pub fn set_if_empty(&self, target: Entity) -> bool {
        self.0
            .compare_exchange(
                EMPTY,
                target.to_bits().get(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Clear the slot only if it still holds `expected`. Returns true if
    /// the clear happened. Used by destroyed-notifications so a clear
    /// racing with a retarget cannot drop the newer order.
    pub fn clear_if(&self, expected: Entity) -> bool {
        self.0
            .compare_exchange(
                expected.to_bits().get(),
                EMPTY,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Atomically take the current target, leaving the slot empty.
    pub fn take(&self) -> Option<Entity> {
        let bits = self.0.swap(EMPTY, Ordering::AcqRel);
        if bits == EMPTY {
            None
        } else {
            Entity::from_bits(bits)
        }
    }
}
