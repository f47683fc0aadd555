// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! Process-wide bookkeeping of the overlay framebuffer nodes.
//!
//! The display controller exposes a fixed, small set of overlay nodes. Every
//! sink instance in the process draws a node from the same [`OverlayPool`]
//! when it starts and hands it back when it stops. Callers beyond the pool's
//! capacity still get a slot (marked [`OverlayId::Overflow`]) so that the
//! failure surfaces where it belongs: at the exclusive open of the node.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError},
};

use tracing::{debug, warn};

use crate::config;

static GLOBAL_POOL: LazyLock<Arc<OverlayPool>> = LazyLock::new(|| Arc::new(OverlayPool::new()));

/// Identifies which overlay node a slot refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayId {
    /// Overlay node `fb<n>`, `n` in `1..=OVERLAY_NODE_COUNT`.
    Node(u8),
    /// Acquired while every node was in use.
    Overflow,
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayId::Node(n) => write!(f, "overlay {n}"),
            OverlayId::Overflow => f.write_str("overflow"),
        }
    }
}

#[derive(Debug, Default)]
struct PoolState {
    /// Bit `n - 1` is set while overlay node `n` is held.
    occupied: u8,
    /// Number of live overflow slots.
    overflow: u32,
}

/// Occupancy tracker for the overlay nodes.
#[derive(Debug, Default)]
pub struct OverlayPool {
    state: Mutex<PoolState>,
}

impl OverlayPool {
    /// Creates an empty pool. Most callers want [`OverlayPool::global`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The pool shared by every sink in the process.
    pub fn global() -> Arc<OverlayPool> {
        GLOBAL_POOL.clone()
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        // The state is a pair of counters updated atomically under the lock,
        // so it is consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the lowest-numbered free overlay node.
    ///
    /// When every node is taken the overflow counter is bumped, a warning is
    /// logged and the slot points at overlay node 1; opening it will then
    /// normally fail because the node is already held.
    pub fn acquire(self: &Arc<Self>) -> PoolSlot {
        let mut state = self.lock();

        let free = (1..=config::OVERLAY_NODE_COUNT).find(|n| state.occupied & bit(*n) == 0);
        let id = match free {
            Some(n) => {
                state.occupied |= bit(n);
                OverlayId::Node(n)
            }
            None => {
                state.overflow += 1;
                warn!(
                    "All {} overlay nodes are in use ({} overflow slot(s)); the next open will likely fail",
                    config::OVERLAY_NODE_COUNT,
                    state.overflow
                );
                OverlayId::Overflow
            }
        };

        let path = match id {
            OverlayId::Node(n) => config::overlay_node(n),
            OverlayId::Overflow => config::overlay_node(1),
        };
        debug!("Acquired {} at {}", id, path.display());

        PoolSlot {
            pool: Arc::clone(self),
            id,
            path,
        }
    }

    fn release(&self, id: OverlayId) {
        let mut state = self.lock();
        match id {
            OverlayId::Node(n) => state.occupied &= !bit(n),
            OverlayId::Overflow => state.overflow = state.overflow.saturating_sub(1),
        }
        debug!("Released {}", id);
    }

    /// Returns whether overlay node `n` is currently held. Always false for
    /// numbers outside `1..=OVERLAY_NODE_COUNT`.
    pub fn is_occupied(&self, n: u8) -> bool {
        (1..=config::OVERLAY_NODE_COUNT).contains(&n) && self.lock().occupied & bit(n) != 0
    }

    /// Number of nodes currently held, not counting overflow slots.
    pub fn occupied_count(&self) -> u32 {
        self.lock().occupied.count_ones()
    }

    /// Number of live overflow slots.
    pub fn overflow_count(&self) -> u32 {
        self.lock().overflow
    }
}

fn bit(n: u8) -> u8 {
    1 << (n - 1)
}

/// A held overlay node. Dropping the slot returns it to its pool.
#[derive(Debug)]
pub struct PoolSlot {
    pool: Arc<OverlayPool>,
    id: OverlayId,
    path: PathBuf,
}

impl PoolSlot {
    pub fn id(&self) -> OverlayId {
        self.id
    }

    /// Device node to open for this slot.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PoolSlot {
    fn drop(&mut self) {
        self.pool.release(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowest_free_node_is_taken_first() {
        let pool = Arc::new(OverlayPool::new());

        let first = pool.acquire();
        let second = pool.acquire();
        assert_eq!(first.id(), OverlayId::Node(1));
        assert_eq!(second.id(), OverlayId::Node(2));
        assert_eq!(first.path(), config::overlay_node(1));
        assert_eq!(second.path(), config::overlay_node(2));

        drop(first);
        assert!(!pool.is_occupied(1));
        assert!(pool.is_occupied(2));

        let again = pool.acquire();
        assert_eq!(again.id(), OverlayId::Node(1));
    }

    #[test]
    fn overflow_is_counted_and_released() {
        let pool = Arc::new(OverlayPool::new());
        let _a = pool.acquire();
        let _b = pool.acquire();

        let extra = pool.acquire();
        assert_eq!(extra.id(), OverlayId::Overflow);
        assert_eq!(pool.overflow_count(), 1);
        assert_eq!(pool.occupied_count(), 2);

        drop(extra);
        assert_eq!(pool.overflow_count(), 0);
        assert_eq!(pool.occupied_count(), 2);
    }

    #[test]
    fn nodes_outside_the_pool_are_never_occupied() {
        let pool = Arc::new(OverlayPool::new());
        let _a = pool.acquire();
        let _b = pool.acquire();

        assert!(!pool.is_occupied(0));
        assert!(!pool.is_occupied(config::OVERLAY_NODE_COUNT + 1));
        assert!(!pool.is_occupied(u8::MAX));
    }

    #[test]
    fn concurrent_slots_never_exceed_capacity() {
        let pool = Arc::new(OverlayPool::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let slot = pool.acquire();
                        assert!(pool.occupied_count() <= u32::from(config::OVERLAY_NODE_COUNT));
                        drop(slot);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(pool.occupied_count(), 0);
        assert_eq!(pool.overflow_count(), 0);
    }
}
