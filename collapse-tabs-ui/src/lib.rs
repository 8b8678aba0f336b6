//! Runtime primitives for `collapse-tabs`.
//!
//! The collapsible tab view runs on two execution contexts: a main context
//! that owns layout and user callbacks, and a gesture/animation context that
//! processes touches and steps animations every frame. This crate supplies
//! what both share:
//!
//! - [`SharedValue`] cells, readable and writable from either context,
//! - [`animation`] curves (decay, spring, timing) and the [`FrameClock`] that
//!   steps them and flushes reactions,
//! - a [`FrameDriver`] thread for hosts without a display link,
//! - [`MainHandle`]/[`MainDispatcher`] for posting work to the main context,
//! - identity-compared [`Callback`] handles for configuration structs.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use collapse_tabs_ui::{FrameClock, SharedValue, animation::{Easing, Timing}};
//!
//! let clock = Arc::new(FrameClock::new());
//! let opacity = SharedValue::new(0.0_f32);
//! clock.animate(&opacity, Box::new(Timing::new(1.0, 100, Easing::Linear)), None);
//! clock.tick(0.1);
//! assert_eq!(opacity.get(), 1.0);
//! ```
#![deny(missing_docs, clippy::unwrap_used)]

pub mod animation;
mod cell;
mod dispatch;
mod driver;
mod frame;
pub mod interpolate;
mod logging;
mod prop;
mod thread_utils;

pub use crate::{
    cell::{CellId, SharedValue},
    dispatch::{DispatchError, MainDispatcher, MainHandle},
    driver::{DEFAULT_TARGET_FPS, FrameDriver},
    frame::{AnimationKey, FinishCallback, FrameClock, FrameControl},
    logging::{DEFAULT_LOG_FILTER, init_deadlock_detection, init_tracing},
    prop::{Callback, CallbackWith, RenderSlotWith},
    thread_utils::set_thread_name,
};
