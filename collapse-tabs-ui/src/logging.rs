//! Process-wide diagnostics setup for hosts and demos.

/// Default filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "error,collapse_tabs=info,collapse_tabs_ui=info";

/// Installs a global `tracing` subscriber.
///
/// Honors `RUST_LOG` and falls back to [`DEFAULT_LOG_FILTER`]. Calling it
/// again, or after the host installed its own subscriber, does nothing.
pub fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER) {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("error"),
        },
    };

    #[cfg(target_os = "android")]
    {
        let _ = tracing_subscriber::fmt()
            .compact()
            .with_env_filter(filter)
            .try_init();
    }

    #[cfg(not(target_os = "android"))]
    {
        let _ = tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(filter)
            .with_thread_names(true)
            .try_init();
    }
}

/// Starts a background thread that reports `parking_lot` deadlocks every ten
/// seconds. Only active in debug builds; later calls are no-ops.
pub fn init_deadlock_detection() {
    #[cfg(debug_assertions)]
    {
        use std::{sync::Once, thread, time::Duration};

        static INIT: Once = Once::new();
        INIT.call_once(|| {
            let spawned = thread::Builder::new()
                .name("deadlock-check".to_string())
                .spawn(|| {
                    loop {
                        thread::sleep(Duration::from_secs(10));
                        let deadlocks = parking_lot::deadlock::check_deadlock();
                        if deadlocks.is_empty() {
                            continue;
                        }
                        tracing::error!("{} deadlocks detected", deadlocks.len());
                        for (idx, threads) in deadlocks.iter().enumerate() {
                            for thread in threads {
                                tracing::error!(
                                    deadlock = idx,
                                    thread = ?thread.thread_id(),
                                    backtrace = ?thread.backtrace(),
                                    "deadlocked thread"
                                );
                            }
                        }
                    }
                });
            if let Err(err) = spawned {
                tracing::warn!("failed to start deadlock detector: {err}");
            }
        });
    }
}
