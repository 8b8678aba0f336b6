//! A tab view with a collapsible header shared by every tab.
//!
//! # Usage
//!
//! Create a [`CollapsibleTabView`] with a [`FrameClock`](collapse_tabs_ui::FrameClock)
//! that the host ticks once per frame and a [`MainHandle`](collapse_tabs_ui::MainHandle)
//! for user callbacks. Each tab mounts a [`SceneAdapter`] around its
//! scrollable list; the adapter keeps the list in step with the header.
//! Pointer input goes to the view's [`GestureCoordinator`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use collapse_tabs::{
//!     CollapsibleTabView, CollapsibleTabsArgs, MemoryScrollSurface, NavigationState, PanEvent,
//!     Route, SceneAdapter, SceneArgs, TabStrip, TabViewScope,
//! };
//! use collapse_tabs_ui::{FrameClock, MainHandle};
//!
//! struct Strip;
//!
//! impl TabStrip for Strip {
//!     fn render(&self, navigation: &NavigationState, scope: &mut TabViewScope<'_>) {
//!         scope.tab_bar(|_| {});
//!         for route in &navigation.routes {
//!             scope.scene(route, |_| {});
//!         }
//!     }
//! }
//!
//! let navigation = NavigationState {
//!     routes: vec![Route::new("posts", "Posts"), Route::new("likes", "Likes")],
//!     index: 0,
//! };
//! let view = CollapsibleTabView::new(
//!     CollapsibleTabsArgs::default().initial_header_height(200.0),
//!     navigation,
//!     Strip,
//!     Arc::new(FrameClock::new()),
//!     MainHandle::inline(),
//! );
//!
//! let surface = Arc::new(MemoryScrollSurface::new());
//! let scene = SceneAdapter::mount(view.context(), 0, surface.clone(), SceneArgs::default());
//! scene.on_layout();
//!
//! let coordinator = view.coordinator();
//! coordinator.header_begin();
//! coordinator.header_update(&PanEvent::vertical(0.0));
//! coordinator.header_update(&PanEvent::vertical(-80.0));
//! assert_eq!(surface.position(), Some(80.0));
//! ```
#![deny(missing_docs, clippy::unwrap_used)]

pub mod config;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod gesture;
pub mod layout;
pub mod refresh_control;
pub mod registry;
pub mod scene;
pub mod state;
pub mod surface;
pub mod tab_view;

pub use crate::{
    config::{Color, CollapsibleTabsArgs, CollapsibleTabsDefaults, PullThresholdMode},
    context::HeaderTabContext,
    coordinator::{GestureCoordinator, PAN_SLOP, SYNC_EPSILON, pull_resistance},
    error::ConfigWarning,
    gesture::{
        PanCallback, PanCallbacks, PanConfig, PanEvent, PanRecognizer, PointerInput,
        SimultaneousGestures,
    },
    layout::{SceneContentStyle, header_translate_y},
    refresh_control::{RefreshControlProps, RefreshOverlay, RefreshOverlayFrame, RefreshPhase},
    registry::{SceneEntry, SceneRegistry},
    scene::{SceneAdapter, SceneArgs, ScrollEvent},
    state::SharedAnimationState,
    surface::{GestureId, MemoryScrollSurface, ScrollCommand, ScrollSurface},
    tab_view::{
        CollapsibleTabView, EmptyBodyFrame, HeaderFrame, NavigationState, Route, SceneHeaderFrame,
        TabBarFrame, TabStrip, TabViewFrame, TabViewScope,
    },
};
