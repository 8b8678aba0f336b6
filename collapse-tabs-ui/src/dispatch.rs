//! Hand-off of callbacks from the gesture context to the main context.
//!
//! Gesture handlers never wait for application code. Anything that belongs to
//! the main context (user callbacks, state updates) is posted through a
//! [`MainHandle`] and executed later when the main context calls
//! [`MainDispatcher::drain`]. A handle created with [`MainHandle::inline`]
//! runs tasks on the calling thread instead, for hosts that process gestures
//! on the main context already.

use std::sync::mpsc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

type Task = Box<dyn FnOnce() + Send>;

/// Failure to post a task to the main context.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// The dispatcher owning the queue has been dropped.
    #[error("main-context dispatcher has been dropped")]
    Closed,
}

/// Sending side of the main-context queue.
#[derive(Clone)]
pub struct MainHandle {
    sender: Option<mpsc::Sender<Task>>,
}

impl std::fmt::Debug for MainHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainHandle")
            .field("inline", &self.is_inline())
            .finish()
    }
}

impl MainHandle {
    /// A handle that runs every task immediately on the calling thread.
    pub fn inline() -> Self {
        Self { sender: None }
    }

    /// Returns `true` for handles created with [`MainHandle::inline`].
    pub fn is_inline(&self) -> bool {
        self.sender.is_none()
    }

    /// Schedules `task` on the main context.
    pub fn run_on_main(&self, task: impl FnOnce() + Send + 'static) -> Result<(), DispatchError> {
        match &self.sender {
            None => {
                task();
                Ok(())
            }
            Some(sender) => sender
                .send(Box::new(task))
                .map_err(|_| DispatchError::Closed),
        }
    }
}

/// Receiving side of the main-context queue, owned by the main context.
pub struct MainDispatcher {
    sender: mpsc::Sender<Task>,
    receiver: Mutex<mpsc::Receiver<Task>>,
}

impl Default for MainDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MainDispatcher {
    /// Creates an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    /// Returns a handle that posts into this queue.
    pub fn handle(&self) -> MainHandle {
        MainHandle {
            sender: Some(self.sender.clone()),
        }
    }

    /// Runs every queued task and returns how many ran.
    pub fn drain(&self) -> usize {
        let receiver = self.receiver.lock();
        let mut ran = 0;
        while let Ok(task) = receiver.try_recv() {
            task();
            ran += 1;
        }
        if ran > 0 {
            debug!(ran, "drained main-context tasks");
        }
        ran
    }
}
