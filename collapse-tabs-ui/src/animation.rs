//! Value animations driven by the [`FrameClock`](crate::FrameClock).
//!
//! ## Usage
//!
//! Build one of [`Decay`], [`Spring`] or [`Timing`] and hand it to
//! [`FrameClock::animate`](crate::FrameClock::animate) together with the cell
//! it should drive. The clock calls [`Animation::start`] with the cell's
//! current value and then [`Animation::step`] once per frame until
//! [`Animation::is_finished`] reports completion.

/// Longest frame step fed to the integrators, in seconds.
const MAX_FRAME_DT: f32 = 0.05;

/// Velocity below which a decay animation stops (pixels per second).
const MIN_DECAY_VELOCITY: f32 = 10.0;

/// Distance and velocity below which a spring is considered settled.
const SPRING_REST_THRESHOLD: f32 = 0.01;

/// Integration step used by springs, in seconds.
const SPRING_SUBSTEP: f32 = 1.0 / 240.0;

/// A value animation.
pub trait Animation: Send {
    /// Seeds the animation with the value the target cell holds right now.
    fn start(&mut self, current: f32);

    /// Advances the animation by `dt` seconds and returns the new value.
    fn step(&mut self, dt: f32) -> f32;

    /// Returns `true` once the animation reached its resting value.
    fn is_finished(&self) -> bool;
}

/// Configuration for [`Decay`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecayConfig {
    /// Initial velocity in pixels per second.
    pub velocity: f32,
    /// Fraction of velocity kept per millisecond.
    pub deceleration: f32,
    /// Optional `[min, max]` bounds; reaching one ends the animation.
    pub clamp: Option<(f32, f32)>,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            velocity: 0.0,
            deceleration: 0.998,
            clamp: None,
        }
    }
}

/// Momentum animation decelerating from a release velocity.
#[derive(Clone, Debug)]
pub struct Decay {
    config: DecayConfig,
    value: f32,
    velocity: f32,
    finished: bool,
}

impl Decay {
    /// Creates a decay animation from its configuration.
    pub fn new(config: DecayConfig) -> Self {
        Self {
            config,
            value: 0.0,
            velocity: config.velocity,
            finished: false,
        }
    }

    fn clamp_value(&mut self) {
        let Some((min, max)) = self.config.clamp else {
            return;
        };
        if self.value <= min {
            self.value = min;
            self.finished = true;
        } else if self.value >= max {
            self.value = max;
            self.finished = true;
        }
    }
}

impl Animation for Decay {
    fn start(&mut self, current: f32) {
        self.value = current;
        self.velocity = self.config.velocity;
        self.finished = self.velocity.abs() < MIN_DECAY_VELOCITY;
        if let Some((min, max)) = self.config.clamp {
            // Already outside the bounds: settle on the nearest one.
            if current < min || current > max {
                self.clamp_value();
            }
        }
    }

    fn step(&mut self, dt: f32) -> f32 {
        if self.finished {
            return self.value;
        }
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.velocity *= self.config.deceleration.powf(dt * 1000.0);
        self.value += self.velocity * dt;
        self.clamp_value();
        if self.velocity.abs() < MIN_DECAY_VELOCITY {
            self.finished = true;
        }
        self.value
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Physical parameters of a [`Spring`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    /// Mass attached to the spring.
    pub mass: f32,
    /// Spring stiffness.
    pub stiffness: f32,
    /// Damping coefficient.
    pub damping: f32,
    /// Initial velocity in pixels per second.
    pub velocity: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            stiffness: 100.0,
            damping: 10.0,
            velocity: 0.0,
        }
    }
}

/// Damped spring pulling the value toward a target.
#[derive(Clone, Debug)]
pub struct Spring {
    config: SpringConfig,
    target: f32,
    value: f32,
    velocity: f32,
    finished: bool,
}

impl Spring {
    /// Creates a spring toward `target`.
    pub fn new(target: f32, config: SpringConfig) -> Self {
        Self {
            config,
            target,
            value: target,
            velocity: config.velocity,
            finished: false,
        }
    }

    /// Target the spring settles on.
    pub fn target(&self) -> f32 {
        self.target
    }

    fn snap_to_target(&mut self) {
        self.value = self.target;
        self.velocity = 0.0;
        self.finished = true;
    }
}

impl Animation for Spring {
    fn start(&mut self, current: f32) {
        self.value = current;
        self.velocity = self.config.velocity;
        self.finished = false;
        if (self.value - self.target).abs() < SPRING_REST_THRESHOLD
            && self.velocity.abs() < SPRING_REST_THRESHOLD
        {
            self.snap_to_target();
        }
    }

    fn step(&mut self, dt: f32) -> f32 {
        if self.finished {
            return self.value;
        }
        let stiffness = self.config.stiffness.max(0.0);
        let mass = self.config.mass.max(f32::EPSILON);
        if stiffness == 0.0 {
            self.snap_to_target();
            return self.value;
        }
        let damping = self.config.damping.max(0.0);

        let mut remaining = dt.clamp(0.0, MAX_FRAME_DT);
        while remaining > 0.0 {
            let h = remaining.min(SPRING_SUBSTEP);
            let displacement = self.value - self.target;
            let acceleration = (-stiffness * displacement - damping * self.velocity) / mass;
            self.velocity += acceleration * h;
            self.value += self.velocity * h;
            remaining -= h;
        }

        if (self.value - self.target).abs() < SPRING_REST_THRESHOLD
            && self.velocity.abs() < SPRING_REST_THRESHOLD
        {
            self.snap_to_target();
        }
        self.value
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Easing curves for [`Timing`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Quadratic ease-in-out.
    #[default]
    EaseInOutQuad,
    /// Cubic ease-out.
    EaseOutCubic,
}

impl Easing {
    /// Maps linear progress `t` in `[0, 1]` onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Duration-based animation toward a target.
#[derive(Clone, Debug)]
pub struct Timing {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    easing: Easing,
    value: f32,
}

impl Timing {
    /// Creates a timing animation lasting `duration_ms` milliseconds.
    pub fn new(to: f32, duration_ms: u32, easing: Easing) -> Self {
        Self {
            from: to,
            to,
            duration: (duration_ms as f32 / 1000.0).max(1e-6),
            elapsed: 0.0,
            easing,
            value: to,
        }
    }
}

impl Animation for Timing {
    fn start(&mut self, current: f32) {
        self.from = current;
        self.value = current;
        self.elapsed = 0.0;
    }

    fn step(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        let progress = self.easing.apply(self.elapsed / self.duration);
        self.value = self.from + (self.to - self.from) * progress;
        if self.is_finished() {
            self.value = self.to;
        }
        self.value
    }

    fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}
