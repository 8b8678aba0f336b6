//! Header drag, content drag, cross-tab sync and pull-to-refresh.
//!
//! ## Usage
//!
//! One [`GestureCoordinator`] drives one tab view. The host routes pointer
//! input that starts on the header through
//! [`GestureCoordinator::header_pointer`] and all pointer input on the view
//! through [`GestureCoordinator::content_pointer`]; both recognizers run
//! simultaneously. Scenes reach the coordinator through a
//! [`HeaderTabContext`](crate::HeaderTabContext).
//!
//! The phase handlers (`header_begin`, `content_update`, ...) are public so
//! hosts with native recognizers can skip the built-in ones. Each handler
//! flushes the clock's reactions before returning, so programmatic scrolls
//! caused by a gesture frame are issued within that frame.

use std::sync::Arc;

use collapse_tabs_ui::{
    CellId, FrameClock, FrameControl, MainHandle, SharedValue,
    animation::{Decay, DecayConfig, Easing, Spring, SpringConfig, Timing},
};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::{
    config::{CollapsibleTabsArgs, PullThresholdMode},
    context::HeaderTabContext,
    gesture::{
        PanCallback, PanCallbacks, PanConfig, PanEvent, PanRecognizer, PointerInput,
        SimultaneousGestures,
    },
    layout::header_translate_y,
    refresh_control::{RefreshOverlay, refresh_translate_y},
    registry::{SceneEntry, SceneRegistry},
    state::SharedAnimationState,
    surface::{GestureId, ScrollSurface},
};

/// Vertical travel before either pan activates.
pub const PAN_SLOP: f32 = 10.0;

/// Offsets closer than this count as synchronized.
pub const SYNC_EPSILON: f32 = 0.5;

/// Nudge applied to the active list to stop its momentum.
const STOP_SCROLL_NUDGE: f32 = 0.1;

/// Duration of the transition into and out of the refreshing state.
const REFRESH_TRANSITION_MS: u32 = 200;

/// Spring returning the indicator after a drag during a refresh.
const RELEASE_SPRING: SpringConfig = SpringConfig {
    mass: 1.4,
    stiffness: 180.0,
    damping: 25.0,
    velocity: 0.0,
};

/// Share of the release velocity carried into the release spring.
const RELEASE_VELOCITY_FACTOR: f32 = 0.7;

/// Lowest resistance factor applied to a pull.
const RESISTANCE_FLOOR: f32 = 0.96;

/// Fraction of the refresh height over which resistance ramps up.
const RESISTANCE_RAMP: f32 = 0.4;

/// Resistance factor for a pull of `distance` pixels.
///
/// ```
/// use collapse_tabs::pull_resistance;
///
/// assert_eq!(pull_resistance(0.0, 65.0), 1.0);
/// assert_eq!(pull_resistance(80.0, 65.0), 0.96);
/// ```
pub fn pull_resistance(distance: f32, refresh_height: f32) -> f32 {
    (1.0 - distance / (refresh_height * RESISTANCE_RAMP))
        .max(RESISTANCE_FLOOR)
        .min(1.0)
}

/// Gesture bookkeeping that lives for one gesture only.
#[derive(Debug, Default)]
struct DragSession {
    header_start: f32,
    pull_base: f32,
    pull_start: f32,
    dragging: bool,
    pull_enough: bool,
}

/// Coordinates the two pans of a collapsible tab view with its scenes.
pub struct GestureCoordinator {
    args: CollapsibleTabsArgs,
    state: SharedAnimationState,
    registry: SceneRegistry,
    clock: Arc<FrameClock>,
    main: MainHandle,
    overlay: Option<RefreshOverlay>,
    header_gesture: GestureId,
    child_gestures: SimultaneousGestures,
    header_pan: Mutex<PanRecognizer>,
    content_pan: Mutex<PanRecognizer>,
    session: Mutex<DragSession>,
}

impl std::fmt::Debug for GestureCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureCoordinator")
            .field("active_index", &self.state.active_index().get())
            .field("scenes", &self.registry.len())
            .field("session", &*self.session.lock())
            .finish_non_exhaustive()
    }
}

impl GestureCoordinator {
    /// Creates a coordinator driven by `clock`, posting user callbacks
    /// through `main`.
    ///
    /// Invalid arguments are logged and replaced (see
    /// [`CollapsibleTabsArgs::sanitized`]).
    pub fn new(args: CollapsibleTabsArgs, clock: Arc<FrameClock>, main: MainHandle) -> Arc<Self> {
        let args = args.sanitized();
        let main = if args.run_gestures_on_main {
            MainHandle::inline()
        } else {
            main
        };
        let state = SharedAnimationState::new(&args);
        let overlay = args
            .on_start_refresh
            .is_some()
            .then(|| RefreshOverlay::new(&args, &state));
        let header_config = PanConfig {
            enabled: args.scroll_enabled,
            ..PanConfig::vertical(PAN_SLOP)
        };
        let content_config = PanConfig {
            active_offset_x: Some((f32::NEG_INFINITY, f32::INFINITY)),
            ..header_config
        };

        let coordinator = Arc::new(Self {
            state,
            registry: SceneRegistry::new(),
            clock,
            main,
            overlay,
            header_gesture: GestureId::next(),
            child_gestures: SimultaneousGestures::new(),
            header_pan: Mutex::new(PanRecognizer::new(header_config)),
            content_pan: Mutex::new(PanRecognizer::new(content_config)),
            session: Mutex::new(DragSession::default()),
            args,
        });
        coordinator.install_reactions();
        if let Some(overlay) = &coordinator.overlay {
            overlay.attach(&coordinator.clock, &coordinator.state, &coordinator.args);
        }
        if coordinator.args.is_refreshing {
            coordinator.set_refreshing(true);
        }
        coordinator.clock.flush_reactions();
        coordinator
    }

    fn install_reactions(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.clock.receive_frame(move |_| match weak.upgrade() {
            Some(coordinator) => {
                if coordinator.child_gestures.commit() {
                    trace!("simultaneous gestures committed");
                }
                FrameControl::Continue
            }
            None => FrameControl::Stop,
        });

        let weak = Arc::downgrade(self);
        let translation = self.state.refresh_translation().clone();
        self.clock.add_reaction(
            move || translation.get(),
            move |&translation, _| {
                if let Some(coordinator) = weak.upgrade() {
                    coordinator.on_refresh_translation(translation);
                }
            },
        );

        let weak = Arc::downgrade(self);
        let (header, sliding, slide_index, active) = (
            self.state.header_translation().clone(),
            self.state.is_sliding_header().clone(),
            self.state.slide_index().clone(),
            self.state.active_index().clone(),
        );
        self.clock.add_reaction(
            move || {
                let engaged = sliding.get() && slide_index.get() == Some(active.get());
                (header.get(), engaged)
            },
            move |&(translation, engaged), _| {
                if !engaged {
                    return;
                }
                if let Some(coordinator) = weak.upgrade() {
                    coordinator.follow_header(translation);
                }
            },
        );

        let (scroll, header_height) = (
            self.state.scroll_offset().clone(),
            self.state.header_height().clone(),
        );
        let translate = self.state.header_translate_y().clone();
        let output = self.args.header_position_output.clone();
        let min_header_height = self.state.min_header_height();
        let bounces = self.args.bounces;
        self.clock.add_reaction(
            move || (scroll.get(), header_height.get()),
            move |&(scroll, header_height), _| {
                let y = header_translate_y(scroll, header_height - min_header_height, bounces);
                translate.set_if_changed(y);
                if let Some(output) = &output {
                    output.set_if_changed(y);
                }
            },
        );
    }

    /// Configuration in effect after sanitizing.
    pub fn args(&self) -> &CollapsibleTabsArgs {
        &self.args
    }

    /// Shared animation cells.
    pub fn state(&self) -> &SharedAnimationState {
        &self.state
    }

    /// Mounted scenes.
    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    /// The clock stepping this view's animations.
    pub fn clock(&self) -> &Arc<FrameClock> {
        &self.clock
    }

    /// Where user callbacks are posted.
    pub fn main(&self) -> &MainHandle {
        &self.main
    }

    /// The refresh indicator; `None` without a refresh callback.
    pub fn refresh_overlay(&self) -> Option<&RefreshOverlay> {
        self.overlay.as_ref()
    }

    /// Identity of the header recognizer.
    pub fn header_gesture_id(&self) -> GestureId {
        self.header_gesture
    }

    /// Gestures recognized together with the content pan.
    pub fn child_gestures(&self) -> &SimultaneousGestures {
        &self.child_gestures
    }

    /// A context handle for scenes.
    pub fn context(self: &Arc<Self>) -> HeaderTabContext {
        HeaderTabContext::new(Arc::downgrade(self))
    }

    // ---- scenes ----

    /// Registers the scene at `index` and its native gesture.
    pub fn register_scene(
        &self,
        index: usize,
        offset: SharedValue<f32>,
        surface: Arc<dyn ScrollSurface>,
    ) {
        let gesture = surface.gesture_id();
        self.child_gestures.register(gesture);
        if let Some(replaced) = self.registry.register(index, offset, surface) {
            let previous = replaced.surface.gesture_id();
            if previous != gesture {
                self.child_gestures.unregister(previous);
            }
        }
    }

    /// Removes the scene at `index` if it still owns `offset`.
    pub fn unregister_scene(&self, index: usize, offset: CellId) -> Option<SceneEntry> {
        let removed = self.registry.unregister_matching(index, offset)?;
        self.child_gestures.unregister(removed.surface.gesture_id());
        Some(removed)
    }

    /// Marks the scene at `index` as laid out and synchronizes it with the
    /// header the first time.
    pub fn mark_scene_ready(&self, index: usize) -> bool {
        if !self.registry.mark_ready(index) {
            return false;
        }
        self.sync_scene(index);
        self.clock.flush_reactions();
        true
    }

    /// Makes `index` the active tab. Leaves the header translation alone.
    pub fn set_current_index(&self, index: usize) {
        if self.state.active_index().set_if_changed(index) {
            debug!(index, "active tab changed");
            self.clock.flush_reactions();
        }
    }

    /// Scrolls the tab at `index` to `min(scrollOffset, calcHeight)`.
    ///
    /// Skipped for unknown or unready tabs, when the tab and the shared offset
    /// are both past the collapsible range, and when the tab is already
    /// within [`SYNC_EPSILON`] of the target. Returns `true` if a scroll was
    /// issued.
    pub fn sync_scene(&self, index: usize) -> bool {
        let Some(entry) = self.registry.get_ready(index) else {
            return false;
        };
        let shared = self.state.scroll_offset().get();
        let calc_height = self.state.calc_height();
        let current = entry.offset.get();
        if current >= calc_height && shared >= calc_height {
            return false;
        }
        let target = shared.min(calc_height);
        if (current - target).abs() <= SYNC_EPSILON {
            return false;
        }
        debug!(index, from = current, to = target, "syncing scene");
        entry.surface.scroll_to(target, false);
        true
    }

    /// Synchronizes every tab except the active one. Returns how many were
    /// scrolled.
    pub fn resync_background_scenes(&self) -> usize {
        let active = self.state.active_index().get();
        self.registry
            .indices()
            .into_iter()
            .filter(|index| *index != active)
            .filter(|index| self.sync_scene(*index))
            .count()
    }

    fn active_ready_scene(&self) -> Option<SceneEntry> {
        self.registry.get_ready(self.state.active_index().get())
    }

    fn on_refresh_translation(&self, translation: f32) {
        let refresh_height = self.args.refresh_height;
        let pull = (refresh_height - translation).max(0.0);
        if !self.state.pull_offset().set_if_changed(pull) {
            return;
        }
        self.state.content_translate_y().set(refresh_translate_y(
            pull,
            refresh_height,
            self.args.overflow_pull,
            self.args.pull_extended_coefficient,
        ));
        let Some(entry) = self.registry.get(self.state.active_index().get()) else {
            return;
        };
        if translation > refresh_height {
            entry.surface.scroll_to(translation - refresh_height, false);
        } else if translation < refresh_height && entry.offset.get() > 0.0 {
            entry.surface.scroll_to(0.0, false);
        }
    }

    fn follow_header(&self, translation: f32) {
        let Some(entry) = self.registry.get(self.state.active_index().get()) else {
            return;
        };
        if entry.offset.get() == translation {
            return;
        }
        entry.surface.scroll_to(translation, false);
    }

    // ---- pointer input ----

    /// Feeds pointer input that started on the header.
    pub fn header_pointer(&self, input: PointerInput) {
        let callbacks = self.header_pan.lock().handle(input);
        self.dispatch_header(callbacks);
    }

    /// Feeds pointer input on the whole view.
    pub fn content_pointer(&self, input: PointerInput) {
        let callbacks = self.content_pan.lock().handle(input);
        self.dispatch_content(callbacks);
    }

    /// Reports that the gesture `id` activated on the current pointer.
    ///
    /// The content pan keeps running if `id` is the header gesture or a
    /// committed child gesture, and is cancelled otherwise. Returns whether
    /// it keeps running.
    pub fn on_gesture_activated(&self, id: GestureId) -> bool {
        if id == self.header_gesture || self.child_gestures.contains(id) {
            return true;
        }
        debug!(?id, "content pan cancelled by competing gesture");
        let callbacks = self.content_pan.lock().handle(PointerInput::Cancel);
        self.dispatch_content(callbacks);
        false
    }

    /// Updates the content pan's horizontal activation to the view width.
    pub fn set_viewport_width(&self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.content_pan
                .lock()
                .set_active_offset_x(Some((-width, width)));
        }
    }

    /// Enables or disables both recognizers.
    pub fn set_scroll_enabled(&self, enabled: bool) {
        let header = self.header_pan.lock().set_enabled(enabled);
        self.dispatch_header(header);
        let content = self.content_pan.lock().set_enabled(enabled);
        self.dispatch_content(content);
    }

    fn dispatch_header(&self, callbacks: PanCallbacks) {
        for callback in callbacks {
            match callback {
                PanCallback::Begin => self.header_begin(),
                PanCallback::Start => {}
                PanCallback::Update(event) => self.header_update(&event),
                PanCallback::End { event, .. } => self.header_end(&event),
            }
        }
    }

    fn dispatch_content(&self, callbacks: PanCallbacks) {
        for callback in callbacks {
            match callback {
                PanCallback::Begin => self.content_begin(),
                PanCallback::Start => self.content_start(),
                PanCallback::Update(event) => self.content_update(&event),
                PanCallback::End { event, .. } => self.content_end(&event),
            }
        }
    }

    // ---- header drag ----

    /// Header pan touched down: stops the header momentum and the active
    /// list's momentum unless a refresh is running.
    pub fn header_begin(&self) {
        self.clock.cancel_animation(self.state.header_translation());
        if !self.state.is_refreshing().get() {
            if let Some(entry) = self.active_ready_scene() {
                entry
                    .surface
                    .scroll_to(entry.offset.get() + STOP_SCROLL_NUDGE, false);
            }
        }
        self.clock.flush_reactions();
    }

    /// Header pan moved.
    pub fn header_update(&self, event: &PanEvent) {
        let index = self.state.active_index().get();
        let Some(entry) = self.registry.get_ready(index) else {
            return;
        };
        let max = self.state.max_header_offset(self.args.pan_header_max_offset);
        let start = {
            let mut session = self.session.lock();
            if !self.state.is_sliding_header().get() {
                self.state.slide_index().set(Some(index));
                session.header_start = entry.offset.get() + event.translation_y;
                self.state.is_sliding_header().set(true);
                debug!(index, start = session.header_start, "header drag started");
            }
            session.header_start
        };
        self.state
            .header_translation()
            .set((start - event.translation_y).clamp(0.0, max));
        self.clock.flush_reactions();
    }

    /// Header pan ended: the header keeps moving with decaying momentum and
    /// stops sliding when the momentum runs out or is cancelled.
    pub fn header_end(&self, event: &PanEvent) {
        if !self.registry.is_ready(self.state.active_index().get())
            || !self.state.is_sliding_header().get()
        {
            return;
        }
        self.session.lock().header_start = 0.0;
        let max = self.state.max_header_offset(self.args.pan_header_max_offset);
        let sliding = self.state.is_sliding_header().clone();
        self.clock.animate(
            self.state.header_translation(),
            Box::new(Decay::new(DecayConfig {
                velocity: -event.velocity_y,
                clamp: Some((0.0, max)),
                ..DecayConfig::default()
            })),
            Some(Box::new(move |_| sliding.set(false))),
        );
        debug!(velocity = -event.velocity_y, "header drag released");
        self.clock.flush_reactions();
    }

    // ---- content drag ----

    /// Content pan touched down: cancels the header momentum and brings the
    /// background tabs in line with the header.
    pub fn content_begin(&self) {
        if self.active_ready_scene().is_none() {
            return;
        }
        self.clock.cancel_animation(self.state.header_translation());
        self.state.slide_index().set(None);
        self.state.drag_index().set(None);
        let synced = self.resync_background_scenes();
        if synced > 0 {
            debug!(synced, "background tabs resynchronized");
        }
        self.clock.flush_reactions();
    }

    /// Content pan activated: the pull is measured from this gesture only.
    pub fn content_start(&self) {
        let mut session = self.session.lock();
        session.pull_base = 0.0;
        session.pull_start = 0.0;
        session.dragging = false;
        session.pull_enough = false;
    }

    /// Content pan moved: drives the pull-to-refresh translation.
    pub fn content_update(&self, event: &PanEvent) {
        let index = self.state.active_index().get();
        let Some(entry) = self.registry.get_ready(index) else {
            return;
        };
        if self.args.on_start_refresh.is_none() {
            return;
        }
        let refreshing = self.state.is_refreshing().get();
        if refreshing != self.state.is_refreshing_with_animation().get() {
            return;
        }
        let refresh_height = self.args.refresh_height;
        let translation_y = event.translation_y;

        if refreshing {
            if translation_y < 0.0 {
                debug!("refresh cancelled by upward drag");
                self.state.is_refreshing().set(false);
                self.state.is_refreshing_with_animation().set(false);
                self.state.refresh_translation().set(refresh_height);
                self.clock.flush_reactions();
                return;
            }
            let start = {
                let mut session = self.session.lock();
                if !session.dragging {
                    session.pull_start =
                        refresh_height - self.state.pull_offset().get() + entry.offset.get();
                    session.dragging = true;
                }
                session.pull_start
            };
            let pull = start - translation_y;
            let resisted = pull * pull_resistance(pull, refresh_height);
            self.state.refresh_translation().set(resisted.max(0.0));
            self.clock.flush_reactions();
            return;
        }

        if self.state.scroll_offset().get() > 0.0 || translation_y <= 0.0 {
            return;
        }

        let crossed = {
            let mut session = self.session.lock();
            if !session.dragging {
                self.state.drag_index().set(Some(index));
                session.pull_base = translation_y;
                session.dragging = true;
                trace!(index, base = translation_y, "pull started");
                return;
            }
            let distance = translation_y - session.pull_base;
            let resisted = distance * pull_resistance(distance.abs(), refresh_height);
            self.state
                .refresh_translation()
                .set(refresh_height - resisted);
            let measured = match self.args.pull_threshold_mode {
                PullThresholdMode::RawDistance => distance,
                PullThresholdMode::ResistedOffset => resisted,
            };
            let crossed = !session.pull_enough && measured > refresh_height;
            if crossed && self.args.on_pull_enough.is_some() {
                session.pull_enough = true;
            }
            crossed
        };
        if crossed && let Some(on_pull_enough) = &self.args.on_pull_enough {
            debug!("pulled past refresh height");
            on_pull_enough.post(&self.main);
        }
        self.clock.flush_reactions();
    }

    /// Content pan ended: settles the pull into a refresh or back to rest.
    pub fn content_end(&self, event: &PanEvent) {
        if self.active_ready_scene().is_none() || self.args.on_start_refresh.is_none() {
            return;
        }
        {
            let mut session = self.session.lock();
            if !session.dragging {
                return;
            }
            session.dragging = false;
        }
        let refreshing = self.state.is_refreshing().get();
        if refreshing != self.state.is_refreshing_with_animation().get() {
            return;
        }
        if refreshing {
            self.session.lock().pull_start = 0.0;
            self.clock.animate(
                self.state.refresh_translation(),
                Box::new(Spring::new(
                    0.0,
                    SpringConfig {
                        velocity: -event.velocity_y * RELEASE_VELOCITY_FACTOR,
                        ..RELEASE_SPRING
                    },
                )),
                None,
            );
        } else if self.state.refresh_translation().get() < 0.0 {
            self.start_refresh();
        } else {
            self.end_refresh();
        }
        self.clock.flush_reactions();
    }

    // ---- refresh ----

    /// Starts or ends a refresh from outside a gesture.
    pub fn set_refreshing(&self, refreshing: bool) {
        if refreshing {
            self.start_refresh();
        } else {
            self.end_refresh();
        }
        self.clock.flush_reactions();
    }

    fn start_refresh(&self) {
        self.animate_to_refresh(true, 0.0);
    }

    fn end_refresh(&self) {
        let refresh_height = self.args.refresh_height;
        let translation = self.state.refresh_translation().get();
        let destination = if translation > refresh_height {
            translation + refresh_height
        } else {
            refresh_height
        };
        self.animate_to_refresh(false, destination);
    }

    fn animate_to_refresh(&self, to_refresh: bool, destination: f32) {
        let refreshing = self.state.is_refreshing().get();
        if to_refresh && refreshing {
            return;
        }
        if !to_refresh
            && !refreshing
            && self.state.refresh_translation().get() == destination
        {
            return;
        }
        self.state.is_refreshing().set(to_refresh);
        if to_refresh {
            debug!("refresh started");
            if let Some(on_start_refresh) = &self.args.on_start_refresh {
                on_start_refresh.post(&self.main);
            }
        } else {
            debug!(destination, "refresh ended");
        }
        let with_animation = self.state.is_refreshing_with_animation().clone();
        self.clock.animate(
            self.state.refresh_translation(),
            Box::new(Timing::new(destination, REFRESH_TRANSITION_MS, Easing::default())),
            Some(Box::new(move |_| with_animation.set(to_refresh))),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use collapse_tabs_ui::MainDispatcher;

    use super::*;
    use crate::surface::MemoryScrollSurface;

    struct Scene {
        surface: Arc<MemoryScrollSurface>,
        offset: SharedValue<f32>,
    }

    impl Scene {
        /// Applies the surface's last scroll command, as a native list would.
        fn echo(&self) {
            if let Some(position) = self.surface.position() {
                self.offset.set(position);
            }
        }
    }

    fn coordinator(args: CollapsibleTabsArgs) -> (Arc<GestureCoordinator>, Arc<FrameClock>) {
        let clock = Arc::new(FrameClock::new());
        let coordinator = GestureCoordinator::new(args, clock.clone(), MainHandle::inline());
        (coordinator, clock)
    }

    fn mount(coordinator: &GestureCoordinator, index: usize) -> Scene {
        let scene = Scene {
            surface: Arc::new(MemoryScrollSurface::new()),
            offset: SharedValue::new(0.0),
        };
        coordinator.register_scene(index, scene.offset.clone(), scene.surface.clone());
        coordinator.mark_scene_ready(index);
        scene
    }

    fn run_frames(clock: &FrameClock, frames: usize) {
        for _ in 0..frames {
            clock.tick(1.0 / 60.0);
        }
    }

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let in_callback = count.clone();
        (count, move || {
            in_callback.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn pull(coordinator: &GestureCoordinator, translations: &[f32]) {
        coordinator.content_begin();
        coordinator.content_start();
        for &translation_y in translations {
            coordinator.content_update(&PanEvent::vertical(translation_y));
        }
        let last = translations.last().copied().unwrap_or_default();
        coordinator.content_end(&PanEvent::vertical(last));
    }

    #[test]
    fn resistance_keeps_pull_monotonic() {
        let mut previous = 0.0;
        for step in 0..=300 {
            let distance = step as f32;
            let resistance = pull_resistance(distance, 65.0);
            assert!((RESISTANCE_FLOOR..=1.0).contains(&resistance));
            let resisted = distance * resistance;
            assert!(resisted >= previous);
            previous = resisted;
        }
    }

    #[test]
    fn header_drag_stays_within_bounds() {
        let (coordinator, _clock) = coordinator(
            CollapsibleTabsArgs::default()
                .initial_header_height(200.0)
                .overflow_height(20.0),
        );
        let scene = mount(&coordinator, 0);
        let max = coordinator.state().max_header_offset(None);
        assert_eq!(max, 200.0);

        coordinator.header_begin();
        for translation_y in [-10.0, -80.0, -400.0, 150.0, 30.0, -120.0] {
            coordinator.header_update(&PanEvent::vertical(translation_y));
            let translation = coordinator.state().header_translation().get();
            assert!((0.0..=max).contains(&translation), "{translation}");
        }
        assert_eq!(coordinator.state().header_translation().get(), 110.0);
        assert_eq!(scene.surface.position(), Some(110.0));
    }

    #[test]
    fn header_release_decays_and_stops_sliding() {
        let (coordinator, clock) =
            coordinator(CollapsibleTabsArgs::default().initial_header_height(300.0));
        let _scene = mount(&coordinator, 0);

        coordinator.header_begin();
        coordinator.header_update(&PanEvent::vertical(-10.0));
        coordinator.header_update(&PanEvent::vertical(-60.0));
        assert!(coordinator.state().is_sliding_header().get());
        coordinator.header_end(&PanEvent::vertical(-60.0).with_velocity_y(-900.0));

        run_frames(&clock, 240);
        let translation = coordinator.state().header_translation().get();
        assert!(translation > 50.0 && translation <= 300.0);
        assert!(!coordinator.state().is_sliding_header().get());
    }

    #[test]
    fn switching_tabs_keeps_header_translation() {
        let (coordinator, _clock) =
            coordinator(CollapsibleTabsArgs::default().initial_header_height(200.0));
        let _first = mount(&coordinator, 0);
        let _second = mount(&coordinator, 1);

        coordinator.header_begin();
        coordinator.header_update(&PanEvent::vertical(0.0));
        coordinator.header_update(&PanEvent::vertical(-70.0));
        let before = coordinator.state().header_translation().get();

        coordinator.set_current_index(1);
        assert_eq!(coordinator.state().active_index().get(), 1);
        assert_eq!(coordinator.state().header_translation().get(), before);
    }

    #[test]
    fn newly_ready_tab_catches_up_with_collapsed_header() {
        let (coordinator, _clock) =
            coordinator(CollapsibleTabsArgs::default().initial_header_height(100.0));
        let _first = mount(&coordinator, 0);
        coordinator.state().scroll_offset().set(120.0);

        let second = mount(&coordinator, 1);
        assert_eq!(second.surface.position(), Some(100.0));

        coordinator.set_current_index(1);
        second.echo();
        assert!(!coordinator.sync_scene(1));
    }

    #[test]
    fn background_resync_is_idempotent() {
        let (coordinator, _clock) =
            coordinator(CollapsibleTabsArgs::default().initial_header_height(100.0));
        let scenes: Vec<Scene> = (0..3).map(|index| mount(&coordinator, index)).collect();
        assert!(scenes.iter().all(|scene| scene.surface.commands().is_empty()));

        coordinator.state().scroll_offset().set(60.0);
        scenes[0].offset.set(60.0);
        coordinator.content_begin();
        assert!(scenes[0].surface.commands().is_empty());
        assert_eq!(scenes[1].surface.position(), Some(60.0));
        assert_eq!(scenes[2].surface.position(), Some(60.0));

        scenes.iter().for_each(Scene::echo);
        coordinator.content_begin();
        assert_eq!(scenes[1].surface.commands().len(), 1);
        assert_eq!(scenes[2].surface.commands().len(), 1);
        assert_eq!(coordinator.resync_background_scenes(), 0);
    }

    #[test]
    fn tabs_past_the_collapsible_range_are_left_alone() {
        let (coordinator, _clock) =
            coordinator(CollapsibleTabsArgs::default().initial_header_height(100.0));
        let _first = mount(&coordinator, 0);
        let second = mount(&coordinator, 1);
        second.offset.set(400.0);
        coordinator.state().scroll_offset().set(250.0);
        assert!(!coordinator.sync_scene(1));
        assert!(second.surface.commands().is_empty());
    }

    #[test]
    fn long_pull_starts_refresh_once() {
        let dispatcher = MainDispatcher::new();
        let clock = Arc::new(FrameClock::new());
        let (starts, on_start) = counter();
        let (enough, on_enough) = counter();
        let coordinator = GestureCoordinator::new(
            CollapsibleTabsArgs::default()
                .on_start_refresh(on_start)
                .on_pull_enough(on_enough),
            clock.clone(),
            dispatcher.handle(),
        );
        let _scene = mount(&coordinator, 0);

        pull(&coordinator, &[1.0, 40.0, 80.0, 90.0, 85.0]);
        assert!(coordinator.state().is_refreshing().get());
        assert_eq!(starts.load(Ordering::SeqCst), 0);
        dispatcher.drain();
        assert_eq!(enough.load(Ordering::SeqCst), 1);
        assert_eq!(starts.load(Ordering::SeqCst), 1);

        run_frames(&clock, 20);
        let state = coordinator.state();
        assert!(state.is_refreshing_with_animation().get());
        assert_eq!(state.refresh_translation().get(), 0.0);
        assert_eq!(state.pull_offset().get(), 65.0);
        assert_eq!(
            coordinator.refresh_overlay().map(RefreshOverlay::phase),
            Some(crate::refresh_control::RefreshPhase::Refreshing)
        );
    }

    #[test]
    fn short_pull_springs_back_without_refresh() {
        let (starts, on_start) = counter();
        let (enough, on_enough) = counter();
        let (coordinator, clock) = coordinator(
            CollapsibleTabsArgs::default()
                .on_start_refresh(on_start)
                .on_pull_enough(on_enough),
        );
        let _scene = mount(&coordinator, 0);

        coordinator.content_begin();
        coordinator.content_start();
        coordinator.content_update(&PanEvent::vertical(1.0));
        coordinator.content_update(&PanEvent::vertical(41.0));
        assert!((coordinator.state().refresh_translation().get() - 26.6).abs() < 1e-3);
        assert!((coordinator.state().pull_offset().get() - 38.4).abs() < 1e-3);
        coordinator.content_end(&PanEvent::vertical(41.0));

        run_frames(&clock, 20);
        assert_eq!(coordinator.state().refresh_translation().get(), 65.0);
        assert_eq!(coordinator.state().pull_offset().get(), 0.0);
        assert!(!coordinator.state().is_refreshing().get());
        assert_eq!(starts.load(Ordering::SeqCst), 0);
        assert_eq!(enough.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn resisted_threshold_needs_a_longer_pull() {
        let (enough, on_enough) = counter();
        let (coordinator, _clock) = coordinator(
            CollapsibleTabsArgs::default()
                .on_start_refresh(|| {})
                .on_pull_enough(on_enough)
                .pull_threshold_mode(PullThresholdMode::ResistedOffset),
        );
        let _scene = mount(&coordinator, 0);

        coordinator.content_begin();
        coordinator.content_start();
        coordinator.content_update(&PanEvent::vertical(0.5));
        coordinator.content_update(&PanEvent::vertical(68.0));
        assert_eq!(enough.load(Ordering::SeqCst), 0);
        coordinator.content_update(&PanEvent::vertical(70.5));
        assert_eq!(enough.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn pull_is_ignored_without_refresh_callback() {
        let (coordinator, _clock) = coordinator(CollapsibleTabsArgs::default());
        let _scene = mount(&coordinator, 0);
        pull(&coordinator, &[1.0, 120.0]);
        assert_eq!(coordinator.state().refresh_translation().get(), 65.0);
        assert!(!coordinator.state().is_refreshing().get());
        assert!(coordinator.refresh_overlay().is_none());
    }

    #[test]
    fn pull_is_ignored_while_list_is_scrolled() {
        let (coordinator, _clock) =
            coordinator(CollapsibleTabsArgs::default().on_start_refresh(|| {}));
        let _scene = mount(&coordinator, 0);
        coordinator.state().scroll_offset().set(30.0);
        pull(&coordinator, &[1.0, 120.0]);
        assert_eq!(coordinator.state().refresh_translation().get(), 65.0);
    }

    #[test]
    fn upward_drag_cancels_running_refresh() {
        let (coordinator, clock) =
            coordinator(CollapsibleTabsArgs::default().on_start_refresh(|| {}));
        let _scene = mount(&coordinator, 0);
        coordinator.set_refreshing(true);
        run_frames(&clock, 20);
        assert!(coordinator.state().is_refreshing_with_animation().get());

        coordinator.content_begin();
        coordinator.content_start();
        coordinator.content_update(&PanEvent::vertical(-20.0));
        let state = coordinator.state();
        assert!(!state.is_refreshing().get());
        assert!(!state.is_refreshing_with_animation().get());
        assert_eq!(state.refresh_translation().get(), 65.0);
        assert_eq!(state.pull_offset().get(), 0.0);
    }

    #[test]
    fn refresh_can_be_driven_externally() {
        let (starts, on_start) = counter();
        let (coordinator, clock) = coordinator(
            CollapsibleTabsArgs::default()
                .on_start_refresh(on_start)
                .is_refreshing(true),
        );
        let _scene = mount(&coordinator, 0);
        assert!(coordinator.state().is_refreshing().get());
        assert_eq!(starts.load(Ordering::SeqCst), 1);

        run_frames(&clock, 20);
        coordinator.set_refreshing(true);
        assert_eq!(starts.load(Ordering::SeqCst), 1);

        coordinator.set_refreshing(false);
        assert!(!coordinator.state().is_refreshing().get());
        run_frames(&clock, 20);
        assert!(!coordinator.state().is_refreshing_with_animation().get());
        assert_eq!(coordinator.state().refresh_translation().get(), 65.0);
        assert_eq!(coordinator.state().pull_offset().get(), 0.0);
    }

    #[test]
    fn unmounting_mid_gesture_is_harmless() {
        let (coordinator, _clock) = coordinator(
            CollapsibleTabsArgs::default()
                .initial_header_height(150.0)
                .on_start_refresh(|| {}),
        );
        let scene = mount(&coordinator, 0);
        coordinator.content_begin();
        coordinator.content_start();
        coordinator.content_update(&PanEvent::vertical(1.0));
        coordinator.header_begin();

        assert!(coordinator.unregister_scene(0, scene.offset.id()).is_some());
        coordinator.content_update(&PanEvent::vertical(50.0));
        coordinator.header_update(&PanEvent::vertical(-30.0));
        coordinator.content_end(&PanEvent::vertical(50.0));
        coordinator.header_end(&PanEvent::vertical(-30.0));
        assert!(coordinator.registry().is_empty());
        assert!(!coordinator.state().is_refreshing().get());
    }

    #[test]
    fn stale_unmount_keeps_newer_scene() {
        let (coordinator, _clock) = coordinator(CollapsibleTabsArgs::default());
        let old = mount(&coordinator, 0);
        let _new = mount(&coordinator, 0);
        assert!(coordinator.unregister_scene(0, old.offset.id()).is_none());
        assert_eq!(coordinator.registry().len(), 1);
    }

    #[test]
    fn competing_gestures_cancel_content_pan() {
        let (coordinator, clock) = coordinator(CollapsibleTabsArgs::default());
        let scene = mount(&coordinator, 0);
        let child = scene.surface.gesture_id();
        assert!(!coordinator.child_gestures().contains(child));
        clock.tick(1.0 / 60.0);
        assert!(coordinator.child_gestures().contains(child));

        let at = std::time::Instant::now();
        coordinator.content_pointer(PointerInput::Down { x: 0.0, y: 0.0, at });
        coordinator.content_pointer(PointerInput::Move { x: 0.0, y: 20.0, at });
        assert!(coordinator.content_pan.lock().is_active());

        assert!(coordinator.on_gesture_activated(child));
        assert!(coordinator.on_gesture_activated(coordinator.header_gesture_id()));
        assert!(coordinator.content_pan.lock().is_active());

        assert!(!coordinator.on_gesture_activated(GestureId::next()));
        assert!(!coordinator.content_pan.lock().is_active());
    }

    #[test]
    fn disabled_scrolling_ignores_pointer_input() {
        let (coordinator, _clock) =
            coordinator(CollapsibleTabsArgs::default().initial_header_height(200.0));
        let _scene = mount(&coordinator, 0);
        coordinator.set_scroll_enabled(false);

        let at = std::time::Instant::now();
        coordinator.header_pointer(PointerInput::Down { x: 0.0, y: 0.0, at });
        coordinator.header_pointer(PointerInput::Move { x: 0.0, y: -60.0, at });
        assert_eq!(coordinator.state().header_translation().get(), 0.0);
        assert!(!coordinator.state().is_sliding_header().get());
    }

    #[test]
    fn remounted_tab_catches_up_after_its_own_layout() {
        let (coordinator, _clock) =
            coordinator(CollapsibleTabsArgs::default().initial_header_height(100.0));
        let _first = mount(&coordinator, 0);
        let old = mount(&coordinator, 1);
        coordinator.state().scroll_offset().set(120.0);
        old.offset.set(100.0);

        let replacement = Scene {
            surface: Arc::new(MemoryScrollSurface::new()),
            offset: SharedValue::new(0.0),
        };
        coordinator.register_scene(1, replacement.offset.clone(), replacement.surface.clone());
        assert!(!coordinator.registry().is_ready(1));
        assert!(!coordinator.sync_scene(1));

        assert!(coordinator.mark_scene_ready(1));
        assert_eq!(replacement.surface.position(), Some(100.0));

        assert!(coordinator.unregister_scene(1, old.offset.id()).is_none());
        assert!(coordinator.registry().is_ready(1));
    }

    #[test]
    fn replaced_surface_gesture_leaves_simultaneous_set() {
        let (coordinator, clock) = coordinator(CollapsibleTabsArgs::default());
        let old = mount(&coordinator, 0);
        let new = mount(&coordinator, 0);
        clock.tick(1.0 / 60.0);
        assert!(!coordinator.child_gestures().contains(old.surface.gesture_id()));
        assert!(coordinator.child_gestures().contains(new.surface.gesture_id()));
    }

    #[test]
    fn pull_baseline_belongs_to_the_current_gesture() {
        let (coordinator, _clock) =
            coordinator(CollapsibleTabsArgs::default().on_start_refresh(|| {}));
        let scene = mount(&coordinator, 0);
        coordinator.content_begin();
        coordinator.content_start();
        coordinator.content_update(&PanEvent::vertical(1.0));
        coordinator.content_update(&PanEvent::vertical(11.0));
        coordinator.unregister_scene(0, scene.offset.id());
        coordinator.content_end(&PanEvent::vertical(11.0));
        // indicator back at rest, drag session left open
        coordinator.state().refresh_translation().set(65.0);

        let _remounted = mount(&coordinator, 0);
        coordinator.content_begin();
        coordinator.content_start();
        coordinator.content_update(&PanEvent::vertical(30.0));
        assert_eq!(coordinator.state().refresh_translation().get(), 65.0);
        assert_eq!(coordinator.state().pull_offset().get(), 0.0);

        coordinator.content_update(&PanEvent::vertical(40.0));
        assert!((coordinator.state().pull_offset().get() - 9.6).abs() < 1e-3);
    }

    #[test]
    fn dragging_during_refresh_keeps_scrolled_list_in_place() {
        let (coordinator, clock) =
            coordinator(CollapsibleTabsArgs::default().on_start_refresh(|| {}));
        let scene = mount(&coordinator, 0);
        coordinator.set_refreshing(true);
        run_frames(&clock, 20);
        assert_eq!(coordinator.state().pull_offset().get(), 65.0);

        scene.offset.set(100.0);
        scene.surface.clear();
        coordinator.content_begin();
        coordinator.content_start();
        coordinator.content_update(&PanEvent::vertical(5.0));

        let translation = coordinator.state().refresh_translation().get();
        assert!((translation - 91.2).abs() < 1e-3);
        assert_eq!(coordinator.state().pull_offset().get(), 0.0);
        let position = scene.surface.position().unwrap();
        assert!((position - 26.2).abs() < 1e-3);
        assert!(!scene.surface.last_command().unwrap().animated);

        coordinator.set_refreshing(false);
        run_frames(&clock, 20);
        let settled = coordinator.state().refresh_translation().get();
        assert!((settled - 156.2).abs() < 1e-3);
        assert!(!coordinator.state().is_refreshing_with_animation().get());
    }

    #[test]
    fn refreshing_while_scrolled_returns_list_to_top() {
        let (coordinator, clock) =
            coordinator(CollapsibleTabsArgs::default().on_start_refresh(|| {}));
        let scene = mount(&coordinator, 0);
        scene.offset.set(50.0);
        coordinator.set_refreshing(true);
        run_frames(&clock, 20);

        let commands = scene.surface.commands();
        assert!(!commands.is_empty());
        assert!(commands.iter().all(|command| command.offset_y == 0.0));
    }

    #[test]
    fn refreshing_at_rest_leaves_list_alone() {
        let (coordinator, clock) =
            coordinator(CollapsibleTabsArgs::default().on_start_refresh(|| {}));
        let scene = mount(&coordinator, 0);
        coordinator.set_refreshing(true);
        run_frames(&clock, 20);
        assert!(scene.surface.commands().is_empty());
    }
}
