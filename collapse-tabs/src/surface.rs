//! The host scroll surfaces wrapped by scenes.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

static NEXT_GESTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a host gesture recognizer, used for simultaneous recognition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GestureId(u64);

impl GestureId {
    /// Allocates a fresh, process-unique id.
    pub fn next() -> Self {
        Self(NEXT_GESTURE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value, for hosts that key their own recognizers by number.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A scrollable list owned by the host toolkit.
///
/// Implementations forward the command to the native list. The resulting
/// scroll events come back through
/// [`SceneAdapter::on_scroll`](crate::SceneAdapter::on_scroll), possibly from
/// within `scroll_to` itself.
pub trait ScrollSurface: Send + Sync {
    /// Moves the list to `offset_y`.
    fn scroll_to(&self, offset_y: f32, animated: bool);

    /// The native gesture recognizer of this surface.
    fn gesture_id(&self) -> GestureId;
}

/// A programmatic scroll recorded by [`MemoryScrollSurface`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollCommand {
    /// Requested offset.
    pub offset_y: f32,
    /// Whether the host was asked to animate.
    pub animated: bool,
}

/// In-memory [`ScrollSurface`] that records every command.
///
/// Useful for tests and headless hosts. It does not emit scroll events; feed
/// [`MemoryScrollSurface::position`] back into the scene when the echo
/// matters.
#[derive(Debug)]
pub struct MemoryScrollSurface {
    gesture: GestureId,
    commands: Mutex<Vec<ScrollCommand>>,
}

impl Default for MemoryScrollSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScrollSurface {
    /// Creates a surface with a fresh gesture id.
    pub fn new() -> Self {
        Self {
            gesture: GestureId::next(),
            commands: Mutex::new(Vec::new()),
        }
    }

    /// All commands received so far, oldest first.
    pub fn commands(&self) -> Vec<ScrollCommand> {
        self.commands.lock().clone()
    }

    /// The most recent command.
    pub fn last_command(&self) -> Option<ScrollCommand> {
        self.commands.lock().last().copied()
    }

    /// Offset of the most recent command.
    pub fn position(&self) -> Option<f32> {
        self.last_command().map(|command| command.offset_y)
    }

    /// Forgets the recorded commands.
    pub fn clear(&self) {
        self.commands.lock().clear();
    }
}

impl ScrollSurface for MemoryScrollSurface {
    fn scroll_to(&self, offset_y: f32, animated: bool) {
        self.commands.lock().push(ScrollCommand { offset_y, animated });
    }

    fn gesture_id(&self) -> GestureId {
        self.gesture
    }
}
