//! The tab view: wraps an external tab strip with the collapsible header.
//!
//! ## Usage
//!
//! Implement [`TabStrip`] for the host's tab strip. On every render
//! [`CollapsibleTabView::render`] hands it the navigation state and a
//! [`TabViewScope`]; the strip renders its tab bar through
//! [`TabViewScope::tab_bar`] and each scene through [`TabViewScope::scene`],
//! which wrap them with the header, the sticky scene headers and the empty
//! body.

use std::sync::Arc;

use collapse_tabs_ui::{CallbackWith, FrameClock, MainHandle};
use parking_lot::RwLock;
use tracing::debug;

use crate::{
    config::CollapsibleTabsArgs, context::HeaderTabContext, coordinator::GestureCoordinator,
    refresh_control::RefreshOverlayFrame,
};

/// One tab.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Route {
    /// Stable key.
    pub key: String,
    /// Label shown in the tab bar.
    pub title: String,
}

impl Route {
    /// Creates a route.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
        }
    }
}

/// Routes and the selected index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationState {
    /// Tabs in display order.
    pub routes: Vec<Route>,
    /// Selected tab.
    pub index: usize,
}

/// Placement of the collapsible header.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeaderFrame {
    /// Current translate-y of the header.
    pub translate_y: f32,
    /// Measured header height.
    pub height: f32,
}

/// Placement of the tab bar below the header.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TabBarFrame {
    /// Translate-y shared with the header.
    pub translate_y: f32,
    /// Offset pulling the tab bar under the header's overflow.
    pub offset_y: f32,
    /// Measured tab bar height.
    pub height: f32,
}

/// Placement of the body rendered when there are no routes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EmptyBodyFrame {
    /// Translate-y shared with the header.
    pub translate_y: f32,
    /// Space left for the missing tab bar.
    pub margin_top: f32,
}

/// Placement of a scene's sticky header.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SceneHeaderFrame {
    /// Top edge, right below the tab bar.
    pub top: f32,
    /// Translate-y shared with the header.
    pub translate_y: f32,
}

/// Everything a host needs to place the view for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TabViewFrame {
    /// Opacity of the whole view.
    pub opacity: f32,
    /// Translate-y of the tab view content while pulling to refresh.
    pub content_translate_y: f32,
    /// The header, when a header renderer is configured.
    pub header: Option<HeaderFrame>,
    /// The tab bar, unless replaced by the empty body.
    pub tab_bar: Option<TabBarFrame>,
    /// The empty body, when shown.
    pub empty_body: Option<EmptyBodyFrame>,
    /// Sticky scene headers by route key.
    pub scene_headers: Vec<(String, SceneHeaderFrame)>,
    /// The refresh indicator, when refreshing is configured.
    pub refresh: Option<RefreshOverlayFrame>,
}

/// External tab strip rendering the tab bar and the scenes.
pub trait TabStrip: Send + Sync {
    /// Renders the strip for `navigation` through the wrapped renderers of
    /// `scope`.
    fn render(&self, navigation: &NavigationState, scope: &mut TabViewScope<'_>);
}

/// Wrapped renderers handed to a [`TabStrip`].
pub struct TabViewScope<'a> {
    coordinator: &'a GestureCoordinator,
    navigation: &'a NavigationState,
    frame: &'a mut TabViewFrame,
}

impl TabViewScope<'_> {
    /// Renders the header and below it either the tab bar or, without
    /// routes, the empty body.
    ///
    /// `tab_bar` is the strip's own tab bar; a configured tab bar renderer
    /// replaces it.
    pub fn tab_bar(&mut self, tab_bar: impl FnOnce(&TabBarFrame)) {
        let state = self.coordinator.state();
        let args = self.coordinator.args();
        let translate_y = state.header_translate_y().get();

        if let Some(render_header) = &args.render_scroll_header {
            let header = HeaderFrame {
                translate_y,
                height: state.header_height().get(),
            };
            render_header.render(header);
            self.frame.header = Some(header);
        }

        if self.navigation.routes.is_empty()
            && let Some(empty_body) = &args.empty_body
        {
            let body = EmptyBodyFrame {
                translate_y,
                margin_top: state.tab_bar_height().get(),
            };
            empty_body.render(body);
            self.frame.empty_body = Some(body);
            return;
        }

        let bar = TabBarFrame {
            translate_y,
            offset_y: -state.overflow_height(),
            height: state.tab_bar_height().get(),
        };
        match &args.render_tab_bar {
            Some(render_tab_bar) => render_tab_bar.render(bar),
            None => tab_bar(&bar),
        }
        self.frame.tab_bar = Some(bar);
    }

    /// Renders the scene of `route` followed by its sticky header.
    pub fn scene(&mut self, route: &Route, scene: impl FnOnce(&Route)) {
        scene(route);
        let state = self.coordinator.state();
        let header = SceneHeaderFrame {
            top: state.header_height().get() + state.tab_bar_height().get(),
            translate_y: state.header_translate_y().get(),
        };
        if let Some(render_scene_header) = &self.coordinator.args().render_scene_header {
            render_scene_header.render((route.clone(), header));
        }
        self.frame.scene_headers.push((route.key.clone(), header));
    }
}

/// A collapsible-header tab view.
pub struct CollapsibleTabView {
    coordinator: Arc<GestureCoordinator>,
    navigation: RwLock<NavigationState>,
    strip: Box<dyn TabStrip>,
    on_index_change: Option<CallbackWith<usize>>,
}

impl CollapsibleTabView {
    /// Creates a view showing `navigation.index` first.
    pub fn new(
        args: CollapsibleTabsArgs,
        navigation: NavigationState,
        strip: impl TabStrip + 'static,
        clock: Arc<FrameClock>,
        main: MainHandle,
    ) -> Self {
        let args = args.initial_page(navigation.index);
        Self {
            coordinator: GestureCoordinator::new(args, clock, main),
            navigation: RwLock::new(navigation),
            strip: Box::new(strip),
            on_index_change: None,
        }
    }

    /// Sets the listener for tab changes reported by the strip.
    pub fn with_on_index_change<F>(mut self, on_index_change: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.on_index_change = Some(CallbackWith::new(on_index_change));
        self
    }

    /// The coordinator.
    pub fn coordinator(&self) -> &Arc<GestureCoordinator> {
        &self.coordinator
    }

    /// A context handle for scenes.
    pub fn context(&self) -> HeaderTabContext {
        self.coordinator.context()
    }

    /// Current navigation state.
    pub fn navigation(&self) -> NavigationState {
        self.navigation.read().clone()
    }

    /// The strip switched to `index`.
    pub fn on_index_change(&self, index: usize) {
        self.navigation.write().index = index;
        self.coordinator.set_current_index(index);
        debug!(index, "tab index changed");
        if let Some(on_index_change) = &self.on_index_change {
            on_index_change.call(index);
        }
    }

    /// Replaces the navigation state.
    pub fn set_navigation_state(&self, navigation: NavigationState) {
        let index = navigation.index;
        *self.navigation.write() = navigation;
        self.coordinator.set_current_index(index);
    }

    /// Makes `index` the active tab without notifying the listener.
    pub fn set_current_index(&self, index: usize) {
        self.navigation.write().index = index;
        self.coordinator.set_current_index(index);
    }

    /// Starts or ends a refresh.
    pub fn set_refreshing(&self, refreshing: bool) {
        self.coordinator.set_refreshing(refreshing);
    }

    /// Renders the view through the tab strip and returns its placement.
    pub fn render(&self) -> TabViewFrame {
        let state = self.coordinator.state();
        let mut frame = TabViewFrame {
            opacity: state.opacity().get(),
            content_translate_y: state.content_translate_y().get(),
            ..TabViewFrame::default()
        };
        let navigation = self.navigation();
        {
            let mut scope = TabViewScope {
                coordinator: &self.coordinator,
                navigation: &navigation,
                frame: &mut frame,
            };
            self.strip.render(&navigation, &mut scope);
        }
        frame.refresh = self
            .coordinator
            .refresh_overlay()
            .map(|overlay| overlay.render(state.pull_offset().get()));
        frame
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingStrip {
        rendered: Arc<Mutex<Vec<String>>>,
    }

    impl TabStrip for RecordingStrip {
        fn render(&self, navigation: &NavigationState, scope: &mut TabViewScope<'_>) {
            let rendered = self.rendered.clone();
            scope.tab_bar(|_| rendered.lock().push("tab-bar".to_string()));
            for route in &navigation.routes {
                let rendered = self.rendered.clone();
                scope.scene(route, |route| rendered.lock().push(route.key.clone()));
            }
        }
    }

    fn navigation(count: usize) -> NavigationState {
        NavigationState {
            routes: (0..count)
                .map(|i| Route::new(format!("tab{i}"), format!("Tab {i}")))
                .collect(),
            index: 0,
        }
    }

    #[test]
    fn renders_tab_bar_and_scene_headers() {
        let strip = RecordingStrip::default();
        let rendered = strip.rendered.clone();
        let scene_headers = Arc::new(AtomicUsize::new(0));
        let counter = scene_headers.clone();
        let view = CollapsibleTabView::new(
            CollapsibleTabsArgs::default()
                .initial_header_height(120.0)
                .render_scroll_header(|_| {})
                .render_scene_header(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            navigation(2),
            strip,
            Arc::new(FrameClock::new()),
            MainHandle::inline(),
        );

        let frame = view.render();
        assert_eq!(*rendered.lock(), vec!["tab-bar", "tab0", "tab1"]);
        assert_eq!(scene_headers.load(Ordering::SeqCst), 2);
        assert_eq!(frame.header.map(|header| header.height), Some(120.0));
        assert_eq!(frame.tab_bar.map(|bar| bar.height), Some(49.0));
        assert_eq!(frame.scene_headers[1].1.top, 169.0);
        assert!(frame.refresh.is_none());
        assert_eq!(frame.opacity, 1.0);
    }

    #[test]
    fn empty_body_replaces_tab_bar_without_routes() {
        let strip = RecordingStrip::default();
        let rendered = strip.rendered.clone();
        let view = CollapsibleTabView::new(
            CollapsibleTabsArgs::default().empty_body(|_| {}),
            navigation(0),
            strip,
            Arc::new(FrameClock::new()),
            MainHandle::inline(),
        );
        let frame = view.render();
        assert!(rendered.lock().is_empty());
        assert!(frame.tab_bar.is_none());
        assert_eq!(frame.empty_body.map(|body| body.margin_top), Some(49.0));
    }

    #[test]
    fn index_changes_reach_coordinator_and_listener() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_listener = seen.clone();
        let view = CollapsibleTabView::new(
            CollapsibleTabsArgs::default(),
            NavigationState {
                index: 1,
                ..navigation(3)
            },
            RecordingStrip::default(),
            Arc::new(FrameClock::new()),
            MainHandle::inline(),
        )
        .with_on_index_change(move |index| seen_in_listener.lock().push(index));

        assert_eq!(view.coordinator().state().active_index().get(), 1);
        view.on_index_change(2);
        assert_eq!(view.navigation().index, 2);
        assert_eq!(view.coordinator().state().active_index().get(), 2);
        view.set_current_index(0);
        assert_eq!(*seen.lock(), vec![2]);
    }

    #[test]
    fn refresh_overlay_is_reported_when_configured() {
        let view = CollapsibleTabView::new(
            CollapsibleTabsArgs::default().on_start_refresh(|| {}),
            navigation(1),
            RecordingStrip::default(),
            Arc::new(FrameClock::new()),
            MainHandle::inline(),
        );
        let refresh = view.render().refresh.unwrap();
        assert_eq!(refresh.top, -65.0);
        assert_eq!(refresh.height, 65.0);
    }
}
