//! The handle scenes use to reach their tab view.

use std::sync::{Arc, Weak};

use collapse_tabs_ui::{CellId, FrameClock, MainHandle, SharedValue};

use crate::{coordinator::GestureCoordinator, layout::SceneContentStyle, surface::ScrollSurface};

/// Non-owning handle to a tab view's coordinator, passed to every scene.
///
/// Once the tab view is dropped every method becomes a no-op returning
/// `None`, `false` or a neutral value.
#[derive(Clone, Debug)]
pub struct HeaderTabContext {
    coordinator: Weak<GestureCoordinator>,
}

impl HeaderTabContext {
    pub(crate) fn new(coordinator: Weak<GestureCoordinator>) -> Self {
        Self { coordinator }
    }

    /// A context not attached to any tab view.
    pub fn detached() -> Self {
        Self {
            coordinator: Weak::new(),
        }
    }

    /// The coordinator, while the tab view is alive.
    pub fn coordinator(&self) -> Option<Arc<GestureCoordinator>> {
        self.coordinator.upgrade()
    }

    /// Returns `true` while the tab view is alive.
    pub fn is_attached(&self) -> bool {
        self.coordinator.strong_count() > 0
    }

    /// Shared scroll offset cell.
    pub fn scroll_offset(&self) -> Option<SharedValue<f32>> {
        self.coordinator()
            .map(|coordinator| coordinator.state().scroll_offset().clone())
    }

    /// Header translation cell.
    pub fn header_translation(&self) -> Option<SharedValue<f32>> {
        self.coordinator()
            .map(|coordinator| coordinator.state().header_translation().clone())
    }

    /// Header sliding flag.
    pub fn is_sliding_header(&self) -> Option<SharedValue<bool>> {
        self.coordinator()
            .map(|coordinator| coordinator.state().is_sliding_header().clone())
    }

    /// Active tab index cell.
    pub fn active_index(&self) -> Option<SharedValue<usize>> {
        self.coordinator()
            .map(|coordinator| coordinator.state().active_index().clone())
    }

    /// Returns `true` if `index` is the active tab.
    pub fn is_active(&self, index: usize) -> bool {
        self.coordinator()
            .is_some_and(|coordinator| coordinator.state().active_index().get() == index)
    }

    /// Padding and minimum height for scene content.
    pub fn content_style(&self) -> Option<SceneContentStyle> {
        self.coordinator()
            .map(|coordinator| coordinator.scene_content_style())
    }

    /// Minimum content height of scenes.
    pub fn expect_height(&self) -> f32 {
        self.coordinator()
            .map_or(0.0, |coordinator| coordinator.state().expect_height())
    }

    /// Distance the header can collapse.
    pub fn calc_height(&self) -> f32 {
        self.coordinator()
            .map_or(0.0, |coordinator| coordinator.state().calc_height())
    }

    /// Configured refresh height.
    pub fn refresh_height(&self) -> Option<f32> {
        self.coordinator()
            .map(|coordinator| coordinator.args().refresh_height)
    }

    /// The frame clock of the tab view.
    pub fn clock(&self) -> Option<Arc<FrameClock>> {
        self.coordinator()
            .map(|coordinator| coordinator.clock().clone())
    }

    /// Where user callbacks are posted.
    pub fn main(&self) -> Option<MainHandle> {
        self.coordinator()
            .map(|coordinator| coordinator.main().clone())
    }

    /// Registers a scene and its native gesture.
    pub fn register_scene(
        &self,
        index: usize,
        offset: SharedValue<f32>,
        surface: Arc<dyn ScrollSurface>,
    ) -> bool {
        let Some(coordinator) = self.coordinator() else {
            return false;
        };
        coordinator.register_scene(index, offset, surface);
        true
    }

    /// Removes a scene if it still owns `offset`.
    pub fn unregister_scene(&self, index: usize, offset: CellId) -> bool {
        self.coordinator()
            .and_then(|coordinator| coordinator.unregister_scene(index, offset))
            .is_some()
    }

    /// Marks a scene as laid out.
    pub fn mark_scene_ready(&self, index: usize) -> bool {
        self.coordinator()
            .is_some_and(|coordinator| coordinator.mark_scene_ready(index))
    }
}

#[cfg(test)]
mod tests {
    use collapse_tabs_ui::MainHandle;

    use super::*;
    use crate::{config::CollapsibleTabsArgs, gesture::PanEvent, surface::MemoryScrollSurface};

    #[test]
    fn context_stops_working_after_drop() {
        let coordinator = GestureCoordinator::new(
            CollapsibleTabsArgs::default(),
            Arc::new(FrameClock::new()),
            MainHandle::inline(),
        );
        let context = coordinator.context();
        assert!(context.is_attached());
        assert!(context.is_active(0));
        assert!(context.register_scene(
            0,
            SharedValue::new(0.0),
            Arc::new(MemoryScrollSurface::new())
        ));

        drop(coordinator);
        assert!(!context.is_attached());
        assert!(context.scroll_offset().is_none());
        assert!(!context.mark_scene_ready(0));
        assert_eq!(context.expect_height(), 0.0);
    }

    #[test]
    fn detached_context_is_inert() {
        let context = HeaderTabContext::detached();
        assert!(!context.register_scene(
            1,
            SharedValue::new(0.0),
            Arc::new(MemoryScrollSurface::new())
        ));
        assert!(!context.unregister_scene(1, SharedValue::new(0.0_f32).id()));
    }

    #[test]
    fn context_exposes_header_state() {
        let coordinator = GestureCoordinator::new(
            CollapsibleTabsArgs::default()
                .initial_header_height(200.0)
                .refresh_height(80.0),
            Arc::new(FrameClock::new()),
            MainHandle::inline(),
        );
        let context = coordinator.context();
        assert!(context.register_scene(
            0,
            SharedValue::new(0.0),
            Arc::new(MemoryScrollSurface::new())
        ));
        assert!(context.mark_scene_ready(0));
        assert_eq!(context.refresh_height(), Some(80.0));

        let (translation, sliding) = (
            context.header_translation().unwrap(),
            context.is_sliding_header().unwrap(),
        );
        assert!(!sliding.get());
        coordinator.header_begin();
        coordinator.header_update(&PanEvent::vertical(0.0));
        coordinator.header_update(&PanEvent::vertical(-50.0));
        assert!(sliding.get());
        assert_eq!(translation.get(), 50.0);

        drop(coordinator);
        assert!(context.header_translation().is_none());
        assert!(context.is_sliding_header().is_none());
        assert!(context.refresh_height().is_none());
    }
}
