//! Pan recognition and the simultaneous-gesture set.
//!
//! ## Usage
//!
//! Hosts that deliver raw pointer input feed it into
//! [`GestureCoordinator::header_pointer`](crate::GestureCoordinator::header_pointer)
//! and [`GestureCoordinator::content_pointer`](crate::GestureCoordinator::content_pointer),
//! which run a [`PanRecognizer`] each. Hosts with their own recognizers can
//! call the phase handlers directly with [`PanEvent`]s.

use std::{collections::VecDeque, sync::Arc, time::Instant};

use parking_lot::{Mutex, RwLock};
use smallvec::SmallVec;

use crate::surface::GestureId;

/// Window of pointer samples used to estimate the release velocity.
const VELOCITY_WINDOW_MS: u128 = 100;

/// Translation and velocity of an active pan.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PanEvent {
    /// Horizontal travel since the pointer went down.
    pub translation_x: f32,
    /// Vertical travel since the pointer went down; positive is downward.
    pub translation_y: f32,
    /// Horizontal velocity in pixels per second.
    pub velocity_x: f32,
    /// Vertical velocity in pixels per second.
    pub velocity_y: f32,
}

impl PanEvent {
    /// A vertical pan without velocity.
    pub fn vertical(translation_y: f32) -> Self {
        Self {
            translation_y,
            ..Self::default()
        }
    }

    /// Replaces the vertical velocity.
    pub fn with_velocity_y(mut self, velocity_y: f32) -> Self {
        self.velocity_y = velocity_y;
        self
    }
}

/// Raw pointer input for a [`PanRecognizer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
    /// The pointer touched down.
    Down {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
        /// Time of the sample.
        at: Instant,
    },
    /// The pointer moved.
    Move {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
        /// Time of the sample.
        at: Instant,
    },
    /// The pointer lifted.
    Up {
        /// Time of the sample.
        at: Instant,
    },
    /// The host or another recognizer took the pointer away.
    Cancel,
}

/// Phase callbacks produced by a [`PanRecognizer`], in order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PanCallback {
    /// The pointer went down on the recognizer.
    Begin,
    /// Movement crossed an activation offset.
    Start,
    /// The pan moved while active.
    Update(PanEvent),
    /// An active pan ended.
    End {
        /// Final translation and release velocity.
        event: PanEvent,
        /// `false` when the pan was cancelled instead of released.
        success: bool,
    },
}

/// Callbacks emitted for one pointer input.
pub type PanCallbacks = SmallVec<[PanCallback; 3]>;

/// Activation thresholds of a [`PanRecognizer`].
///
/// A pan activates once its translation leaves `[min, max]` on any configured
/// axis. `None` disables activation along that axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanConfig {
    /// Horizontal activation range.
    pub active_offset_x: Option<(f32, f32)>,
    /// Vertical activation range.
    pub active_offset_y: Option<(f32, f32)>,
    /// Disabled recognizers ignore all input.
    pub enabled: bool,
}

impl PanConfig {
    /// Activates on vertical travel beyond `±slop`.
    pub fn vertical(slop: f32) -> Self {
        Self {
            active_offset_x: None,
            active_offset_y: Some((-slop, slop)),
            enabled: true,
        }
    }

    fn activates(&self, translation_x: f32, translation_y: f32) -> bool {
        let outside = |range: Option<(f32, f32)>, value: f32| {
            range.is_some_and(|(min, max)| value < min || value > max)
        };
        outside(self.active_offset_x, translation_x) || outside(self.active_offset_y, translation_y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PanPhase {
    Idle,
    Began,
    Active,
}

/// Single-pointer pan recognizer.
pub struct PanRecognizer {
    config: PanConfig,
    phase: PanPhase,
    origin: (f32, f32),
    last: (f32, f32, Instant),
    velocity_history: VecDeque<(Instant, f32, f32)>,
}

impl PanRecognizer {
    /// Creates an idle recognizer.
    pub fn new(config: PanConfig) -> Self {
        Self {
            config,
            phase: PanPhase::Idle,
            origin: (0.0, 0.0),
            last: (0.0, 0.0, Instant::now()),
            velocity_history: VecDeque::new(),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> PanConfig {
        self.config
    }

    /// Replaces the horizontal activation range.
    pub fn set_active_offset_x(&mut self, range: Option<(f32, f32)>) {
        self.config.active_offset_x = range;
    }

    /// Enables or disables the recognizer; disabling cancels a running pan.
    pub fn set_enabled(&mut self, enabled: bool) -> PanCallbacks {
        self.config.enabled = enabled;
        if enabled {
            PanCallbacks::new()
        } else {
            self.handle(PointerInput::Cancel)
        }
    }

    /// Returns `true` between activation and release.
    pub fn is_active(&self) -> bool {
        self.phase == PanPhase::Active
    }

    /// Feeds one pointer input and returns the resulting callbacks.
    pub fn handle(&mut self, input: PointerInput) -> PanCallbacks {
        let mut callbacks = PanCallbacks::new();
        if !self.config.enabled && self.phase == PanPhase::Idle {
            return callbacks;
        }
        match input {
            PointerInput::Down { x, y, at } => {
                if self.phase == PanPhase::Active {
                    callbacks.push(PanCallback::End {
                        event: self.event(self.last.0, self.last.1, 0.0, 0.0),
                        success: false,
                    });
                }
                self.phase = PanPhase::Began;
                self.origin = (x, y);
                self.last = (x, y, at);
                self.velocity_history.clear();
                callbacks.push(PanCallback::Begin);
            }
            PointerInput::Move { x, y, at } => {
                if self.phase == PanPhase::Idle {
                    return callbacks;
                }
                self.record_sample(x, y, at);
                let event = self.event(x, y, 0.0, 0.0);
                if self.phase == PanPhase::Began
                    && self.config.activates(event.translation_x, event.translation_y)
                {
                    self.phase = PanPhase::Active;
                    callbacks.push(PanCallback::Start);
                }
                if self.phase == PanPhase::Active {
                    let (vx, vy) = self.average_velocity();
                    callbacks.push(PanCallback::Update(self.event(x, y, vx, vy)));
                }
            }
            PointerInput::Up { at } => {
                if self.phase == PanPhase::Active {
                    // A pointer resting before release has no momentum left.
                    let (vx, vy) = if at.duration_since(self.last.2).as_millis() > VELOCITY_WINDOW_MS {
                        (0.0, 0.0)
                    } else {
                        self.average_velocity()
                    };
                    callbacks.push(PanCallback::End {
                        event: self.event(self.last.0, self.last.1, vx, vy),
                        success: true,
                    });
                }
                self.reset();
            }
            PointerInput::Cancel => {
                if self.phase == PanPhase::Active {
                    callbacks.push(PanCallback::End {
                        event: self.event(self.last.0, self.last.1, 0.0, 0.0),
                        success: false,
                    });
                }
                self.reset();
            }
        }
        callbacks
    }

    fn reset(&mut self) {
        self.phase = PanPhase::Idle;
        self.velocity_history.clear();
    }

    fn event(&self, x: f32, y: f32, velocity_x: f32, velocity_y: f32) -> PanEvent {
        PanEvent {
            translation_x: x - self.origin.0,
            translation_y: y - self.origin.1,
            velocity_x,
            velocity_y,
        }
    }

    fn record_sample(&mut self, x: f32, y: f32, at: Instant) {
        let (last_x, last_y, last_at) = self.last;
        let dt = at.saturating_duration_since(last_at).as_secs_f32();
        if dt > 0.0 {
            self.velocity_history
                .push_back((at, (x - last_x) / dt, (y - last_y) / dt));
            while let Some(&(sample_at, _, _)) = self.velocity_history.front() {
                if at.duration_since(sample_at).as_millis() > VELOCITY_WINDOW_MS {
                    self.velocity_history.pop_front();
                } else {
                    break;
                }
            }
        }
        self.last = (x, y, at);
    }

    fn average_velocity(&self) -> (f32, f32) {
        if self.velocity_history.is_empty() {
            return (0.0, 0.0);
        }
        let count = self.velocity_history.len() as f32;
        let (sum_x, sum_y) = self
            .velocity_history
            .iter()
            .fold((0.0, 0.0), |(sx, sy), &(_, vx, vy)| (sx + vx, sy + vy));
        (sum_x / count, sum_y / count)
    }
}

/// Gestures recognized simultaneously with the content pan.
///
/// Scenes register their native gestures while mounting; registrations land
/// in a pending set. [`SimultaneousGestures::commit`] publishes the pending
/// set as an immutable snapshot at the start of a frame, and the content pan
/// only ever consults that snapshot.
#[derive(Default)]
pub struct SimultaneousGestures {
    pending: Mutex<Pending>,
    committed: RwLock<Arc<[GestureId]>>,
}

#[derive(Default)]
struct Pending {
    ids: SmallVec<[GestureId; 8]>,
    dirty: bool,
}

impl SimultaneousGestures {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` to the pending set; duplicates are ignored.
    pub fn register(&self, id: GestureId) -> bool {
        let mut pending = self.pending.lock();
        if pending.ids.contains(&id) {
            return false;
        }
        pending.ids.push(id);
        pending.dirty = true;
        true
    }

    /// Removes `id` from the pending set.
    pub fn unregister(&self, id: GestureId) -> bool {
        let mut pending = self.pending.lock();
        let before = pending.ids.len();
        pending.ids.retain(|existing| *existing != id);
        let removed = pending.ids.len() != before;
        pending.dirty |= removed;
        removed
    }

    /// Publishes the pending set. Returns `true` if the snapshot changed.
    pub fn commit(&self) -> bool {
        let mut pending = self.pending.lock();
        if !pending.dirty {
            return false;
        }
        pending.dirty = false;
        *self.committed.write() = Arc::from(pending.ids.as_slice());
        true
    }

    /// The committed snapshot.
    pub fn snapshot(&self) -> Arc<[GestureId]> {
        self.committed.read().clone()
    }

    /// Returns `true` if `id` is in the committed snapshot.
    pub fn contains(&self, id: GestureId) -> bool {
        self.committed.read().contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn pan_activates_past_slop_and_reports_translation() {
        let base = Instant::now();
        let mut pan = PanRecognizer::new(PanConfig::vertical(10.0));
        let begin = pan.handle(PointerInput::Down { x: 0.0, y: 100.0, at: base });
        assert_eq!(begin.as_slice(), &[PanCallback::Begin]);

        let below = pan.handle(PointerInput::Move { x: 0.0, y: 108.0, at: at(base, 16) });
        assert!(below.is_empty());

        let start = pan.handle(PointerInput::Move { x: 0.0, y: 120.0, at: at(base, 32) });
        assert_eq!(start[0], PanCallback::Start);
        let PanCallback::Update(event) = start[1] else {
            panic!("expected update");
        };
        assert_eq!(event.translation_y, 20.0);
        assert!(event.velocity_y > 0.0);

        let end = pan.handle(PointerInput::Up { at: at(base, 40) });
        let PanCallback::End { event, success } = end[0] else {
            panic!("expected end");
        };
        assert!(success);
        assert_eq!(event.translation_y, 20.0);
        assert!(event.velocity_y > 0.0);
        assert!(!pan.is_active());
    }

    #[test]
    fn horizontal_range_keeps_small_sideways_moves_inactive() {
        let base = Instant::now();
        let mut pan = PanRecognizer::new(PanConfig {
            active_offset_x: Some((-400.0, 400.0)),
            ..PanConfig::vertical(10.0)
        });
        pan.handle(PointerInput::Down { x: 0.0, y: 0.0, at: base });
        assert!(pan
            .handle(PointerInput::Move { x: 150.0, y: 2.0, at: at(base, 16) })
            .is_empty());
        assert!(!pan.is_active());
    }

    #[test]
    fn resting_release_has_no_velocity() {
        let base = Instant::now();
        let mut pan = PanRecognizer::new(PanConfig::vertical(10.0));
        pan.handle(PointerInput::Down { x: 0.0, y: 0.0, at: base });
        pan.handle(PointerInput::Move { x: 0.0, y: 50.0, at: at(base, 16) });
        let end = pan.handle(PointerInput::Up { at: at(base, 500) });
        let PanCallback::End { event, .. } = end[0] else {
            panic!("expected end");
        };
        assert_eq!(event.velocity_y, 0.0);
    }

    #[test]
    fn cancel_ends_active_pan_unsuccessfully() {
        let base = Instant::now();
        let mut pan = PanRecognizer::new(PanConfig::vertical(10.0));
        pan.handle(PointerInput::Down { x: 0.0, y: 0.0, at: base });
        pan.handle(PointerInput::Move { x: 0.0, y: 30.0, at: at(base, 16) });
        let end = pan.handle(PointerInput::Cancel);
        assert!(matches!(end[0], PanCallback::End { success: false, .. }));
        assert!(pan.handle(PointerInput::Up { at: at(base, 32) }).is_empty());
    }

    #[test]
    fn disabled_recognizer_ignores_input() {
        let mut pan = PanRecognizer::new(PanConfig {
            enabled: false,
            ..PanConfig::vertical(10.0)
        });
        let now = Instant::now();
        assert!(pan.handle(PointerInput::Down { x: 0.0, y: 0.0, at: now }).is_empty());
    }

    #[test]
    fn registrations_are_invisible_until_committed() {
        let set = SimultaneousGestures::new();
        let a = GestureId::next();
        let b = GestureId::next();
        assert!(set.register(a));
        assert!(!set.register(a));
        assert!(!set.contains(a));
        assert!(set.commit());
        assert!(set.contains(a));

        let held = set.snapshot();
        set.register(b);
        set.unregister(a);
        assert_eq!(&*held, &[a]);
        assert!(set.commit());
        assert!(!set.contains(a));
        assert!(set.contains(b));
        assert!(!set.commit());
    }
}
