//! Dedicated animation thread.
//!
//! Hosts without their own display-link callback can let a [`FrameDriver`]
//! tick a [`FrameClock`] at a fixed rate on a background thread. That thread
//! is the widget's gesture/animation context: it never blocks on the main
//! context and only talks to it through a
//! [`MainHandle`](crate::MainHandle).

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use tracing::debug;

use crate::{FrameClock, thread_utils::set_thread_name};

/// Default frame rate of the animation thread.
pub const DEFAULT_TARGET_FPS: u32 = 60;

/// Ticks a [`FrameClock`] on a named background thread until stopped.
pub struct FrameDriver {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FrameDriver {
    /// Spawns the animation thread.
    pub fn spawn(clock: Arc<FrameClock>, target_fps: u32) -> io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let frame = Duration::from_secs_f64(1.0 / f64::from(target_fps.max(1)));
        let running_in_thread = running.clone();
        let handle = thread::Builder::new()
            .name("collapse-tabs-anim".to_string())
            .spawn(move || {
                set_thread_name("collapse-anim");
                debug!(?frame, "animation thread started");
                while running_in_thread.load(Ordering::Acquire) {
                    let started = Instant::now();
                    clock.tick_now();
                    if let Some(rest) = frame.checked_sub(started.elapsed()) {
                        thread::sleep(rest);
                    }
                }
                debug!("animation thread stopped");
            })?;
        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Returns `true` until [`FrameDriver::stop`] is called.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stops the thread and waits for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::error!("animation thread panicked");
        }
    }
}

impl Drop for FrameDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        SharedValue,
        animation::{Easing, Timing},
    };

    #[test]
    fn driver_runs_animations_to_completion() {
        let clock = Arc::new(FrameClock::new());
        let cell = SharedValue::new(0.0_f32);
        clock.animate(&cell, Box::new(Timing::new(1.0, 30, Easing::Linear)), None);
        let driver = FrameDriver::spawn(clock.clone(), 240).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while clock.has_active_animations() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        driver.stop();
        assert_eq!(cell.get(), 1.0);
    }
}
