//! Callback and renderer handles passed through widget configuration.
//!
//! Handles compare by identity (`Arc::ptr_eq`), so configuration structs
//! holding them stay comparable without comparing closures.

use std::{fmt, sync::Arc};

use tracing::warn;

use crate::MainHandle;

struct Slot<F: ?Sized>(Arc<F>);

impl<F: ?Sized> Clone for Slot<F> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<F: ?Sized> PartialEq for Slot<F> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Comparable handle for an `Fn()` user callback.
#[derive(Clone)]
pub struct Callback {
    slot: Slot<dyn Fn() + Send + Sync>,
}

impl Callback {
    /// Wraps a closure.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            slot: Slot(Arc::new(handler)),
        }
    }

    /// Invokes the callback on the calling thread.
    pub fn call(&self) {
        (self.slot.0)();
    }

    /// Schedules the callback on the main context.
    ///
    /// A closed dispatcher is logged and the call is dropped.
    pub fn post(&self, main: &MainHandle) {
        let handler = self.clone();
        if let Err(err) = main.run_on_main(move || handler.call()) {
            warn!("dropping callback: {err}");
        }
    }
}

impl<F> From<F> for Callback
where
    F: Fn() + Send + Sync + 'static,
{
    fn from(handler: F) -> Self {
        Self::new(handler)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

impl Eq for Callback {}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Arc::as_ptr(&self.slot.0))
    }
}

/// Comparable handle for an `Fn(T) -> R` user callback.
pub struct CallbackWith<T, R = ()> {
    slot: Slot<dyn Fn(T) -> R + Send + Sync>,
}

impl<T, R> CallbackWith<T, R> {
    /// Wraps a closure.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        Self {
            slot: Slot(Arc::new(handler)),
        }
    }

    /// Invokes the callback on the calling thread.
    pub fn call(&self, value: T) -> R {
        (self.slot.0)(value)
    }
}

impl<T: Send + 'static> CallbackWith<T> {
    /// Schedules the callback with `value` on the main context.
    pub fn post(&self, main: &MainHandle, value: T) {
        let handler = self.clone();
        if let Err(err) = main.run_on_main(move || handler.call(value)) {
            warn!("dropping callback: {err}");
        }
    }
}

impl<T, R, F> From<F> for CallbackWith<T, R>
where
    F: Fn(T) -> R + Send + Sync + 'static,
{
    fn from(handler: F) -> Self {
        Self::new(handler)
    }
}

impl<T, R> Clone for CallbackWith<T, R> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T, R> PartialEq for CallbackWith<T, R> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

impl<T, R> Eq for CallbackWith<T, R> {}

impl<T, R> fmt::Debug for CallbackWith<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallbackWith({:p})", Arc::as_ptr(&self.slot.0).cast::<()>())
    }
}

/// Comparable handle for a deferred renderer producing `R` from `T`.
///
/// Same identity semantics as [`CallbackWith`], kept distinct so renderer
/// overrides and event handlers cannot be swapped by accident.
pub struct RenderSlotWith<T, R> {
    slot: Slot<dyn Fn(T) -> R + Send + Sync>,
}

impl<T, R> RenderSlotWith<T, R> {
    /// Wraps a render closure.
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        Self {
            slot: Slot(Arc::new(render)),
        }
    }

    /// Runs the renderer.
    pub fn render(&self, value: T) -> R {
        (self.slot.0)(value)
    }
}

impl<T, R, F> From<F> for RenderSlotWith<T, R>
where
    F: Fn(T) -> R + Send + Sync + 'static,
{
    fn from(render: F) -> Self {
        Self::new(render)
    }
}

impl<T, R> Clone for RenderSlotWith<T, R> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T, R> PartialEq for RenderSlotWith<T, R> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

impl<T, R> Eq for RenderSlotWith<T, R> {}

impl<T, R> fmt::Debug for RenderSlotWith<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RenderSlotWith({:p})", Arc::as_ptr(&self.slot.0).cast::<()>())
    }
}
