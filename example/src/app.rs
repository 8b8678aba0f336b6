//! Three tabs sharing one header: a scroll, a tab switch, a header fling and
//! a pull-to-refresh.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use collapse_tabs::{
    CollapsibleTabView, CollapsibleTabsArgs, NavigationState, PointerInput, Route, SceneAdapter,
    SceneArgs, TabStrip, TabViewScope,
};
use collapse_tabs_ui::{FrameClock, MainDispatcher};
use tracing::{debug, info, trace};

use crate::list::DemoList;

const FRAME: Duration = Duration::from_millis(16);
const HEADER_HEIGHT: f32 = 240.0;
const MIN_HEADER_HEIGHT: f32 = 60.0;
const TAB_BAR_HEIGHT: f32 = 49.0;
const VIEWPORT_WIDTH: f32 = 390.0;
const VIEWPORT_HEIGHT: f32 = 700.0;

/// Logs the tab bar with the selected tab in brackets.
struct TextTabBar;

impl TabStrip for TextTabBar {
    fn render(&self, navigation: &NavigationState, scope: &mut TabViewScope<'_>) {
        scope.tab_bar(|frame| {
            let titles: Vec<String> = navigation
                .routes
                .iter()
                .enumerate()
                .map(|(index, route)| {
                    if index == navigation.index {
                        format!("[{}]", route.title)
                    } else {
                        route.title.clone()
                    }
                })
                .collect();
            info!(translate_y = frame.translate_y, "{}", titles.join(" | "));
        });
        for route in &navigation.routes {
            scope.scene(route, |route| trace!(key = %route.key, "scene rendered"));
        }
    }
}

pub struct Demo {
    view: CollapsibleTabView,
    dispatcher: MainDispatcher,
    refreshing: Arc<AtomicBool>,
    lists: Vec<Arc<DemoList>>,
    scenes: Vec<SceneAdapter>,
}

impl Demo {
    pub fn new(clock: Arc<FrameClock>) -> Self {
        let dispatcher = MainDispatcher::new();
        let refreshing = Arc::new(AtomicBool::new(false));
        let refresh_flag = refreshing.clone();
        let args = CollapsibleTabsArgs::default()
            .initial_header_height(HEADER_HEIGHT)
            .min_header_height(MIN_HEADER_HEIGHT)
            .on_start_refresh(move || {
                info!("refresh requested");
                refresh_flag.store(true, Ordering::Release);
            })
            .on_pull_enough(|| info!("release to refresh"))
            .render_scroll_header(|frame| trace!(translate_y = frame.translate_y, "header"));
        let navigation = NavigationState {
            routes: vec![
                Route::new("posts", "Posts"),
                Route::new("replies", "Replies"),
                Route::new("likes", "Likes"),
            ],
            index: 0,
        };
        let view = CollapsibleTabView::new(
            args,
            navigation,
            TextTabBar,
            clock,
            dispatcher.handle(),
        )
        .with_on_index_change(|index| info!(index, "tab selected"));

        let coordinator = view.coordinator();
        coordinator.on_header_layout(HEADER_HEIGHT);
        coordinator.on_tab_bar_layout(TAB_BAR_HEIGHT);
        coordinator.on_container_layout(VIEWPORT_WIDTH, VIEWPORT_HEIGHT);

        let style = coordinator.scene_content_style();
        let mut lists = Vec::new();
        let mut scenes = Vec::new();
        for (index, rows) in [40_usize, 12, 3].into_iter().enumerate() {
            let content_height = (rows as f32 * 72.0).max(style.min_height) + style.padding_top;
            let list = Arc::new(DemoList::new(content_height, VIEWPORT_HEIGHT));
            let scene = SceneAdapter::mount(
                view.context(),
                index,
                list.clone(),
                SceneArgs::default().on_scroll(|event| {
                    debug!(index = event.index, offset_y = event.offset_y, "scrolled")
                }),
            );
            scene.on_layout();
            scene.on_content_size_change(VIEWPORT_WIDTH, content_height);
            lists.push(list);
            scenes.push(scene);
        }

        Self {
            view,
            dispatcher,
            refreshing,
            lists,
            scenes,
        }
    }

    pub fn run(&self) {
        self.wait(Duration::from_millis(400));
        self.report("mounted");

        self.lists[0].user_scroll(120.0);
        self.pump();
        self.report("first tab scrolled");

        let start = Instant::now();
        self.view.coordinator().content_pointer(PointerInput::Down {
            x: 200.0,
            y: 400.0,
            at: start,
        });
        self.view
            .coordinator()
            .content_pointer(PointerInput::Up { at: start + FRAME });
        self.pump();
        self.view.on_index_change(1);
        self.wait(Duration::from_millis(100));
        self.report("switched to second tab");

        self.fling_header(-150.0);
        self.wait(Duration::from_millis(800));
        self.report("header flung");

        self.lists[1].user_scroll(0.0);
        self.pump();
        self.pull(120.0);
        self.wait(Duration::from_millis(400));
        self.report("pulled to refresh");

        if self.refreshing.swap(false, Ordering::AcqRel) {
            self.wait(Duration::from_millis(600));
            self.view.set_refreshing(false);
            self.wait(Duration::from_millis(400));
            self.report("refresh finished");
        }
    }

    fn fling_header(&self, distance: f32) {
        let coordinator = self.view.coordinator();
        let start = Instant::now();
        coordinator.header_pointer(PointerInput::Down {
            x: 200.0,
            y: 200.0,
            at: start,
        });
        let steps = 6;
        for step in 1..=steps {
            coordinator.header_pointer(PointerInput::Move {
                x: 200.0,
                y: 200.0 + distance * step as f32 / steps as f32,
                at: start + FRAME * step,
            });
            self.pump();
        }
        coordinator.header_pointer(PointerInput::Up {
            at: start + FRAME * (steps + 1),
        });
    }

    fn pull(&self, distance: f32) {
        let coordinator = self.view.coordinator();
        let start = Instant::now();
        coordinator.content_pointer(PointerInput::Down {
            x: 200.0,
            y: 300.0,
            at: start,
        });
        let steps = 12;
        for step in 1..=steps {
            coordinator.content_pointer(PointerInput::Move {
                x: 200.0,
                y: 300.0 + distance * step as f32 / steps as f32,
                at: start + FRAME * step,
            });
            self.pump();
        }
        coordinator.content_pointer(PointerInput::Up {
            at: start + FRAME * (steps + 1),
        });
        self.pump();
    }

    /// Runs main-context work and delivers pending scroll events.
    fn pump(&self) {
        self.dispatcher.drain();
        for (list, scene) in self.lists.iter().zip(&self.scenes) {
            if let Some(offset_y) = list.take_scroll_event() {
                scene.on_scroll(offset_y);
            }
        }
    }

    fn wait(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while Instant::now() < deadline {
            thread::sleep(FRAME);
            self.pump();
        }
    }

    fn report(&self, step: &str) {
        let frame = self.view.render();
        let state = self.view.coordinator().state();
        let positions: Vec<f32> = self.lists.iter().map(|list| list.position()).collect();
        info!(
            step,
            header_translate_y = state.header_translate_y().get(),
            content_translate_y = frame.content_translate_y,
            refresh_phase = ?self.view.coordinator().refresh_overlay().map(|overlay| overlay.phase()),
            ?positions,
            "demo step"
        );
    }
}
