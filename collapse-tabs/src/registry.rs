//! Per-tab scroll state, keyed by tab index.

use std::sync::Arc;

use collapse_tabs_ui::{CellId, SharedValue};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::surface::ScrollSurface;

/// One mounted tab.
#[derive(Clone)]
pub struct SceneEntry {
    /// Tab index.
    pub index: usize,
    /// Latest scroll offset reported by the tab's surface.
    pub offset: SharedValue<f32>,
    /// Handle used to scroll the tab programmatically.
    pub surface: Arc<dyn ScrollSurface>,
    /// Whether the scene has measured its first layout.
    pub ready: bool,
}

impl std::fmt::Debug for SceneEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneEntry")
            .field("index", &self.index)
            .field("offset", &self.offset.get())
            .field("gesture", &self.surface.gesture_id())
            .field("ready", &self.ready)
            .finish()
    }
}

/// Mounted tabs of one tab view.
///
/// Written by scene mount and unmount on the main context, read by the
/// gesture context. Lookups hand out clones so no lock is held while a
/// surface is scrolled.
#[derive(Default)]
pub struct SceneRegistry {
    entries: RwLock<FxHashMap<usize, SceneEntry>>,
}

impl SceneRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the scene at `index` and returns the replaced
    /// entry.
    ///
    /// The ready flag survives only when the same offset cell and surface
    /// register again; a new scene waits for its own first layout.
    pub fn register(
        &self,
        index: usize,
        offset: SharedValue<f32>,
        surface: Arc<dyn ScrollSurface>,
    ) -> Option<SceneEntry> {
        let mut entries = self.entries.write();
        let ready = entries.get(&index).is_some_and(|entry| {
            entry.ready && entry.offset.ptr_eq(&offset) && Arc::ptr_eq(&entry.surface, &surface)
        });
        let replaced = entries.insert(
            index,
            SceneEntry {
                index,
                offset,
                surface,
                ready,
            },
        );
        debug!(index, ready, "scene registered");
        replaced
    }

    /// Removes the scene at `index`.
    pub fn unregister(&self, index: usize) -> Option<SceneEntry> {
        let removed = self.entries.write().remove(&index);
        if removed.is_some() {
            debug!(index, "scene unregistered");
        }
        removed
    }

    /// Removes the scene at `index` only if it still uses the `offset` cell.
    ///
    /// Lets an unmounting scene leave a newer registration of the same index
    /// alone.
    pub fn unregister_matching(&self, index: usize, offset: CellId) -> Option<SceneEntry> {
        let mut entries = self.entries.write();
        if entries.get(&index)?.offset.id() != offset {
            return None;
        }
        let removed = entries.remove(&index);
        debug!(index, "scene unregistered");
        removed
    }

    /// Returns a snapshot of the scene at `index`.
    pub fn get(&self, index: usize) -> Option<SceneEntry> {
        self.entries.read().get(&index).cloned()
    }

    /// Returns the scene at `index` if it is mounted and ready.
    pub fn get_ready(&self, index: usize) -> Option<SceneEntry> {
        self.get(index).filter(|entry| entry.ready)
    }

    /// Marks the scene at `index` as laid out.
    ///
    /// Returns `true` only for the transition from not-ready to ready.
    pub fn mark_ready(&self, index: usize) -> bool {
        let mut entries = self.entries.write();
        match entries.get_mut(&index) {
            Some(entry) if !entry.ready => {
                entry.ready = true;
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if the scene at `index` is mounted and ready.
    pub fn is_ready(&self, index: usize) -> bool {
        self.entries
            .read()
            .get(&index)
            .is_some_and(|entry| entry.ready)
    }

    /// Mounted indices in ascending order.
    pub fn indices(&self) -> SmallVec<[usize; 8]> {
        let mut indices: SmallVec<[usize; 8]> = self.entries.read().keys().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// Number of mounted scenes.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` when no scene is mounted.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
