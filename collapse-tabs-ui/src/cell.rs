//! Shared animation cells.
//!
//! A [`SharedValue`] is the unit of state that crosses the two execution
//! contexts of the widget: the gesture/animation context writes it every
//! frame, while the main context reads it during layout and writes it when
//! measurements change. Every cell carries
//!
//! - a **version** that increases on each write, so observers can tell whether
//!   anything changed since they last looked, and
//! - an **animation generation** that identifies the animation currently
//!   allowed to write the cell. Direct writes and cancellations bump the
//!   generation, which locks out any animation started before them.
//!
//! ```
//! use collapse_tabs_ui::SharedValue;
//!
//! let offset = SharedValue::new(0.0_f32);
//! let reader = offset.clone();
//! offset.set(42.0);
//! assert_eq!(reader.get(), 42.0);
//! assert_eq!(reader.version(), 1);
//! ```

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::RwLock;

static NEXT_CELL_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`SharedValue`], shared by all of its clones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u64);

struct CellInner<T> {
    id: CellId,
    value: RwLock<T>,
    version: AtomicU64,
    generation: AtomicU64,
}

/// Thread-safe observable cell.
///
/// Cloning a `SharedValue` yields another handle to the same storage.
pub struct SharedValue<T> {
    inner: Arc<CellInner<T>>,
}

impl<T> Clone for SharedValue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedValue")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.read())
            .field("version", &self.version())
            .finish()
    }
}

impl<T: Default> Default for SharedValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> SharedValue<T> {
    /// Creates a new cell holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(CellInner {
                id: CellId(NEXT_CELL_ID.fetch_add(1, Ordering::Relaxed)),
                value: RwLock::new(value),
                version: AtomicU64::new(0),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Returns the identity shared by every clone of this cell.
    pub fn id(&self) -> CellId {
        self.inner.id
    }

    /// Returns `true` when both handles point at the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of writes applied to the cell so far.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Execute a closure with a shared reference to the stored value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.inner.value.read();
        f(&guard)
    }

    /// Execute a closure with a mutable reference to the stored value.
    ///
    /// This is a direct write: any animation running on the cell stops
    /// writing to it.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.value.write();
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        let result = f(&mut guard);
        self.inner.version.fetch_add(1, Ordering::AcqRel);
        result
    }

    /// Get a cloned value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(Clone::clone)
    }

    /// Replace the stored value, cancelling any running animation's writes.
    pub fn set(&self, value: T) {
        self.with_mut(|slot| *slot = value);
    }

    /// Replace the stored value only when it differs from the current one.
    ///
    /// Returns `true` when a write happened.
    pub fn set_if_changed(&self, value: T) -> bool
    where
        T: PartialEq,
    {
        if self.with(|current| *current == value) {
            return false;
        }
        self.set(value);
        true
    }

    /// Current animation generation.
    pub fn animation_generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Locks out every animation started before this call and returns the new
    /// generation.
    ///
    /// Takes the write lock, so an animation write racing with this call is
    /// either fully applied before it or rejected after it.
    pub fn invalidate_animation(&self) -> u64 {
        let _guard = self.inner.value.write();
        self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Writes `value` on behalf of the animation holding `generation`.
    ///
    /// Returns `false` without writing when the animation has been cancelled
    /// or superseded.
    pub fn write_from_animation(&self, generation: u64, value: T) -> bool {
        let mut guard = self.inner.value.write();
        if self.inner.generation.load(Ordering::Acquire) != generation {
            return false;
        }
        *guard = value;
        self.inner.version.fetch_add(1, Ordering::AcqRel);
        true
    }
}
