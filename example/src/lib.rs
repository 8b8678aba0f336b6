mod app;
mod list;

use std::sync::Arc;

use collapse_tabs_ui::{
    DEFAULT_TARGET_FPS, FrameClock, FrameDriver, init_deadlock_detection, init_tracing,
};
use tracing::error;

use crate::app::Demo;

/// Runs the headless demo on a frame driver thread.
pub fn desktop_main() {
    init_tracing();
    init_deadlock_detection();

    let clock = Arc::new(FrameClock::new());
    let driver = match FrameDriver::spawn(clock.clone(), DEFAULT_TARGET_FPS) {
        Ok(driver) => driver,
        Err(err) => {
            error!("failed to start frame driver: {err}");
            return;
        }
    };
    Demo::new(clock).run();
    driver.stop();
}
