//! Binding of one tab's scroll surface to the tab view.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use collapse_tabs_ui::{
    CallbackWith, SharedValue,
    animation::{Easing, Timing},
};
use derive_setters::Setters;
use tracing::{debug, trace};

use crate::{
    context::HeaderTabContext,
    coordinator::SYNC_EPSILON,
    layout::SceneContentStyle,
    surface::ScrollSurface,
};

/// Duration of the scene fade-in.
const SCENE_FADE_IN_MS: u32 = 300;

/// A scroll event reported by a scene's surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollEvent {
    /// Tab that scrolled.
    pub index: usize,
    /// New vertical offset.
    pub offset_y: f32,
}

/// Optional hooks of a [`SceneAdapter`].
#[derive(Clone, Debug, Default, Setters)]
pub struct SceneArgs {
    /// Receives scroll events of this scene while it is the active tab.
    #[setters(skip)]
    pub on_scroll: Option<CallbackWith<ScrollEvent>>,
    /// Receives every content size change as `(width, height)`.
    #[setters(skip)]
    pub on_content_size_change: Option<CallbackWith<(f32, f32)>>,
    /// Skip the top padding when the host scroll view manages it.
    pub external_scroll_view: bool,
}

impl SceneArgs {
    /// Sets the scroll listener.
    pub fn on_scroll<F>(mut self, on_scroll: F) -> Self
    where
        F: Fn(ScrollEvent) + Send + Sync + 'static,
    {
        self.on_scroll = Some(CallbackWith::new(on_scroll));
        self
    }

    /// Sets the content size listener.
    pub fn on_content_size_change<F>(mut self, on_content_size_change: F) -> Self
    where
        F: Fn((f32, f32)) + Send + Sync + 'static,
    {
        self.on_content_size_change = Some(CallbackWith::new(on_content_size_change));
        self
    }
}

/// One mounted tab.
///
/// Mounting registers the scene and its native gesture with the tab view;
/// dropping the adapter (or calling [`SceneAdapter::unmount`]) unregisters it
/// exactly once.
pub struct SceneAdapter {
    index: usize,
    context: HeaderTabContext,
    surface: Arc<dyn ScrollSurface>,
    offset: SharedValue<f32>,
    opacity: SharedValue<f32>,
    args: SceneArgs,
    positioned: AtomicBool,
    mounted: AtomicBool,
}

impl std::fmt::Debug for SceneAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneAdapter")
            .field("index", &self.index)
            .field("offset", &self.offset.get())
            .field("mounted", &self.mounted.load(Ordering::Acquire))
            .finish()
    }
}

impl SceneAdapter {
    /// Mounts the scene for tab `index`.
    pub fn mount(
        context: HeaderTabContext,
        index: usize,
        surface: Arc<dyn ScrollSurface>,
        args: SceneArgs,
    ) -> Self {
        let offset = SharedValue::new(0.0);
        let mounted = context.register_scene(index, offset.clone(), surface.clone());
        Self {
            index,
            context,
            surface,
            offset,
            opacity: SharedValue::new(0.0),
            args,
            positioned: AtomicBool::new(false),
            mounted: AtomicBool::new(mounted),
        }
    }

    /// Tab index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// This scene's scroll offset cell.
    pub fn offset(&self) -> &SharedValue<f32> {
        &self.offset
    }

    /// Current opacity of the scene.
    pub fn opacity(&self) -> f32 {
        self.opacity.get()
    }

    /// The wrapped surface.
    pub fn surface(&self) -> &Arc<dyn ScrollSurface> {
        &self.surface
    }

    /// The surface scrolled to `offset_y`.
    pub fn on_scroll(&self, offset_y: f32) {
        self.offset.set(offset_y);
        if !self.context.is_active(self.index) {
            return;
        }
        if let Some(shared) = self.context.scroll_offset() {
            shared.set(offset_y);
        }
        trace!(index = self.index, offset_y, "active scene scrolled");
        if let (Some(on_scroll), Some(main)) = (&self.args.on_scroll, self.context.main()) {
            on_scroll.post(
                &main,
                ScrollEvent {
                    index: self.index,
                    offset_y,
                },
            );
        }
    }

    /// The surface's content size changed.
    ///
    /// Once the content is tall enough to collapse the header, the scene is
    /// moved to the shared header position one time.
    pub fn on_content_size_change(&self, width: f32, height: f32) {
        if let Some(on_content_size_change) = &self.args.on_content_size_change {
            on_content_size_change.call((width, height));
        }
        if height.ceil() >= self.context.expect_height() {
            self.initial_position();
        }
        self.fade_in();
    }

    /// The surface was laid out.
    pub fn on_layout(&self) {
        if self.context.mark_scene_ready(self.index) {
            debug!(index = self.index, "scene ready");
        }
    }

    /// Padding and minimum height for the scene's content.
    pub fn content_style(&self) -> SceneContentStyle {
        let mut style = self.context.content_style().unwrap_or(SceneContentStyle {
            padding_top: 0.0,
            min_height: 0.0,
            indicator_inset_top: 0.0,
        });
        if self.args.external_scroll_view {
            style.padding_top = 0.0;
        }
        style
    }

    /// Unregisters the scene. Later calls do nothing.
    pub fn unmount(&self) {
        if self.mounted.swap(false, Ordering::AcqRel) {
            self.context.unregister_scene(self.index, self.offset.id());
        }
    }

    fn initial_position(&self) {
        if self.positioned.swap(true, Ordering::AcqRel) {
            return;
        }
        let Some(shared) = self.context.scroll_offset() else {
            return;
        };
        let target = shared.get().min(self.context.calc_height());
        if (self.offset.get() - target).abs() > SYNC_EPSILON {
            debug!(index = self.index, target, "initial scene position");
            self.surface.scroll_to(target, false);
        }
    }

    fn fade_in(&self) {
        if self.opacity.get() >= 1.0 {
            return;
        }
        match self.context.clock() {
            Some(clock) => {
                if !clock.is_animating(&self.opacity) {
                    clock.animate(
                        &self.opacity,
                        Box::new(Timing::new(1.0, SCENE_FADE_IN_MS, Easing::default())),
                        None,
                    );
                }
            }
            None => self.opacity.set(1.0),
        }
    }
}

impl Drop for SceneAdapter {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use collapse_tabs_ui::{FrameClock, MainHandle};

    use super::*;
    use crate::{
        config::CollapsibleTabsArgs, coordinator::GestureCoordinator, surface::MemoryScrollSurface,
    };

    fn view() -> (Arc<GestureCoordinator>, Arc<FrameClock>) {
        let clock = Arc::new(FrameClock::new());
        let coordinator = GestureCoordinator::new(
            CollapsibleTabsArgs::default().initial_header_height(100.0),
            clock.clone(),
            MainHandle::inline(),
        );
        (coordinator, clock)
    }

    #[test]
    fn only_the_active_scene_drives_the_shared_offset() {
        let (coordinator, _clock) = view();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in_callback = hits.clone();
        let active = SceneAdapter::mount(
            coordinator.context(),
            0,
            Arc::new(MemoryScrollSurface::new()),
            SceneArgs::default().on_scroll(move |_| {
                hits_in_callback.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let background = SceneAdapter::mount(
            coordinator.context(),
            1,
            Arc::new(MemoryScrollSurface::new()),
            SceneArgs::default(),
        );

        active.on_scroll(30.0);
        background.on_scroll(80.0);
        assert_eq!(coordinator.state().scroll_offset().get(), 30.0);
        assert_eq!(background.offset().get(), 80.0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_unregisters_once() {
        let (coordinator, _clock) = view();
        let scene = SceneAdapter::mount(
            coordinator.context(),
            0,
            Arc::new(MemoryScrollSurface::new()),
            SceneArgs::default(),
        );
        scene.on_layout();
        assert!(coordinator.registry().is_ready(0));
        scene.unmount();
        assert!(coordinator.registry().get(0).is_none());

        let replacement = SceneAdapter::mount(
            coordinator.context(),
            0,
            Arc::new(MemoryScrollSurface::new()),
            SceneArgs::default(),
        );
        drop(scene);
        assert!(coordinator.registry().get(0).is_some());
        drop(replacement);
        assert!(coordinator.registry().is_empty());
    }

    #[test]
    fn tall_content_is_positioned_once_and_fades_in() {
        let (coordinator, clock) = view();
        coordinator.on_container_layout(390.0, 500.0);
        coordinator.state().scroll_offset().set(70.0);

        let surface = Arc::new(MemoryScrollSurface::new());
        let scene = SceneAdapter::mount(
            coordinator.context(),
            1,
            surface.clone(),
            SceneArgs::default(),
        );
        assert_eq!(scene.opacity(), 0.0);

        scene.on_content_size_change(390.0, 200.0);
        assert!(surface.commands().is_empty());

        scene.on_content_size_change(390.0, 650.0);
        scene.on_content_size_change(390.0, 900.0);
        assert_eq!(surface.commands().len(), 1);
        assert_eq!(surface.position(), Some(70.0));

        clock.tick(0.35);
        assert_eq!(scene.opacity(), 1.0);
    }

    #[test]
    fn external_scroll_view_skips_padding() {
        let (coordinator, _clock) = view();
        let scene = SceneAdapter::mount(
            coordinator.context(),
            0,
            Arc::new(MemoryScrollSurface::new()),
            SceneArgs::default().external_scroll_view(true),
        );
        let style = scene.content_style();
        assert_eq!(style.padding_top, 0.0);
        assert_eq!(style.indicator_inset_top, 149.0);
    }
}
