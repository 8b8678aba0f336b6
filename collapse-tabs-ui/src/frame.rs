//! Per-frame scheduling of animations, reactions and frame callbacks.
//!
//! ## Usage
//!
//! One [`FrameClock`] belongs to one widget instance. The animation context
//! calls [`FrameClock::tick`] (directly or through a
//! [`FrameDriver`](crate::FrameDriver)) once per display frame. A tick
//!
//! 1. steps every running animation and writes the result into its cell,
//! 2. runs the finish callbacks of animations that completed,
//! 3. flushes the reactions, and
//! 4. invokes the frame callbacks registered with [`FrameClock::receive_frame`].

use std::{
    cell::RefCell,
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};

use parking_lot::{Mutex, ReentrantMutex};
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::{
    SharedValue,
    animation::Animation,
    cell::CellId,
};

new_key_type! {
    /// Handle to an animation registered with a [`FrameClock`].
    pub struct AnimationKey;
}

/// Callback run when an animation ends.
///
/// The flag is `true` when the animation reached its resting value and `false`
/// when it was cancelled or superseded.
pub type FinishCallback = Box<dyn FnOnce(bool) + Send>;

/// Whether a frame callback wants to be called again on the next frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Keep the callback registered.
    Continue,
    /// Unregister the callback.
    Stop,
}

type FrameCallback = Box<dyn FnMut(u64) -> FrameControl + Send>;

struct RunningAnimation {
    cell: SharedValue<f32>,
    generation: u64,
    animation: Box<dyn Animation>,
    on_finish: Option<FinishCallback>,
}

trait ErasedReaction: Send {
    fn run(&mut self);
}

struct Reaction<T, P, R> {
    prepare: P,
    react: R,
    previous: Option<T>,
}

impl<T, P, R> ErasedReaction for Reaction<T, P, R>
where
    T: PartialEq + Send,
    P: Fn() -> T + Send,
    R: FnMut(&T, Option<&T>) + Send,
{
    fn run(&mut self) {
        let next = (self.prepare)();
        if self.previous.as_ref() == Some(&next) {
            return;
        }
        (self.react)(&next, self.previous.as_ref());
        self.previous = Some(next);
    }
}

/// Frame scheduler shared between the gesture context and the animation
/// context.
pub struct FrameClock {
    animations: Mutex<SlotMap<AnimationKey, RunningAnimation>>,
    reactions: ReentrantMutex<RefCell<Vec<Box<dyn ErasedReaction>>>>,
    frame_callbacks: Mutex<Vec<FrameCallback>>,
    frame_nanos: AtomicU64,
    last_tick: Mutex<Option<Instant>>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Creates an idle clock.
    pub fn new() -> Self {
        Self {
            animations: Mutex::new(SlotMap::with_key()),
            reactions: ReentrantMutex::new(RefCell::new(Vec::new())),
            frame_callbacks: Mutex::new(Vec::new()),
            frame_nanos: AtomicU64::new(0),
            last_tick: Mutex::new(None),
        }
    }

    /// Starts `animation` on `cell`, cancelling whatever animation was
    /// driving the cell before.
    pub fn animate(
        &self,
        cell: &SharedValue<f32>,
        mut animation: Box<dyn Animation>,
        on_finish: Option<FinishCallback>,
    ) -> AnimationKey {
        self.cancel_animation(cell);
        let generation = cell.invalidate_animation();
        animation.start(cell.get());
        self.animations.lock().insert(RunningAnimation {
            cell: cell.clone(),
            generation,
            animation,
            on_finish,
        })
    }

    /// Stops every animation driving `cell`.
    ///
    /// Finish callbacks run with `false` before this returns, and no
    /// cancelled animation writes to the cell afterwards.
    pub fn cancel_animation(&self, cell: &SharedValue<f32>) {
        cell.invalidate_animation();
        let cancelled = self.remove_for_cell(cell.id());
        for callback in cancelled {
            callback(false);
        }
    }

    fn remove_for_cell(&self, id: CellId) -> SmallVec<[FinishCallback; 2]> {
        let mut animations = self.animations.lock();
        let keys: SmallVec<[AnimationKey; 2]> = animations
            .iter()
            .filter(|(_, running)| running.cell.id() == id)
            .map(|(key, _)| key)
            .collect();
        keys.into_iter()
            .filter_map(|key| animations.remove(key))
            .filter_map(|running| running.on_finish)
            .collect()
    }

    /// Returns `true` while an animation is driving `cell`.
    pub fn is_animating(&self, cell: &SharedValue<f32>) -> bool {
        let id = cell.id();
        self.animations
            .lock()
            .iter()
            .any(|(_, running)| running.cell.id() == id)
    }

    /// Returns `true` while any animation is running.
    pub fn has_active_animations(&self) -> bool {
        !self.animations.lock().is_empty()
    }

    /// Registers a reaction.
    ///
    /// On every flush `prepare` is evaluated; when its result differs from the
    /// previous one `react` receives the new and the previous value. The first
    /// flush always reacts. A reaction registered from inside a running reaction
    /// is ignored.
    pub fn add_reaction<T, P, R>(&self, prepare: P, react: R)
    where
        T: PartialEq + Send + 'static,
        P: Fn() -> T + Send + 'static,
        R: FnMut(&T, Option<&T>) + Send + 'static,
    {
        let reactions = self.reactions.lock();
        let Ok(mut reactions) = reactions.try_borrow_mut() else {
            warn!("reaction registered while reactions are running, ignored");
            return;
        };
        reactions.push(Box::new(Reaction {
            prepare,
            react,
            previous: None,
        }));
    }

    /// Runs every reaction once.
    ///
    /// A flush requested from inside a reaction on the same thread is
    /// skipped. A flush from another thread waits for the running one and
    /// then runs in full.
    pub fn flush_reactions(&self) {
        let reactions = self.reactions.lock();
        let Ok(mut reactions) = reactions.try_borrow_mut() else {
            trace!("nested reaction flush skipped");
            return;
        };
        for reaction in reactions.iter_mut() {
            reaction.run();
        }
    }

    /// Registers a callback invoked with the frame time on every tick until
    /// it returns [`FrameControl::Stop`].
    pub fn receive_frame(&self, callback: impl FnMut(u64) -> FrameControl + Send + 'static) {
        self.frame_callbacks.lock().push(Box::new(callback));
    }

    /// Nanoseconds of frame time elapsed since the clock was created.
    pub fn frame_nanos(&self) -> u64 {
        self.frame_nanos.load(Ordering::Acquire)
    }

    /// Ticks the clock using wall time since the previous call.
    pub fn tick_now(&self) {
        let now = Instant::now();
        let dt = {
            let mut last = self.last_tick.lock();
            let dt = last
                .map(|previous| now.saturating_duration_since(previous).as_secs_f32())
                .unwrap_or(1.0 / 60.0);
            *last = Some(now);
            dt
        };
        self.tick(dt);
    }

    /// Advances the clock by `dt` seconds.
    pub fn tick(&self, dt: f32) {
        let nanos = (dt.max(0.0) as f64 * 1e9) as u64;
        let frame_nanos = self.frame_nanos.fetch_add(nanos, Ordering::AcqRel) + nanos;

        let mut ended: SmallVec<[(FinishCallback, bool); 4]> = SmallVec::new();
        {
            let mut animations = self.animations.lock();
            let mut done: SmallVec<[(AnimationKey, bool); 4]> = SmallVec::new();
            for (key, running) in animations.iter_mut() {
                let value = running.animation.step(dt);
                if !running.cell.write_from_animation(running.generation, value) {
                    done.push((key, false));
                } else if running.animation.is_finished() {
                    done.push((key, true));
                }
            }
            for (key, finished) in done {
                if let Some(running) = animations.remove(key) {
                    trace!(finished, cell = ?running.cell.id(), "animation ended");
                    if let Some(callback) = running.on_finish {
                        ended.push((callback, finished));
                    }
                }
            }
        }
        for (callback, finished) in ended {
            callback(finished);
        }

        self.flush_reactions();

        // Callbacks may register further callbacks; those land in the emptied
        // list and are merged back after this frame.
        let mut callbacks = std::mem::take(&mut *self.frame_callbacks.lock());
        callbacks.retain_mut(|callback| callback(frame_nanos) == FrameControl::Continue);
        let mut registered = self.frame_callbacks.lock();
        callbacks.append(&mut registered);
        *registered = callbacks;
    }
}
