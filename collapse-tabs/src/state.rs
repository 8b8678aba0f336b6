//! Cells shared between the gesture context and the main context.

use collapse_tabs_ui::SharedValue;

use crate::config::CollapsibleTabsArgs;

/// Animation state of one collapsible tab view.
///
/// Every accessor returns the cell itself; clones of a cell observe and
/// write the same value from either execution context.
#[derive(Clone, Debug)]
pub struct SharedAnimationState {
    scroll_offset: SharedValue<f32>,
    header_translation: SharedValue<f32>,
    header_translate_y: SharedValue<f32>,
    active_index: SharedValue<usize>,
    is_sliding_header: SharedValue<bool>,
    slide_index: SharedValue<Option<usize>>,
    drag_index: SharedValue<Option<usize>>,
    is_refreshing: SharedValue<bool>,
    is_refreshing_with_animation: SharedValue<bool>,
    refresh_translation: SharedValue<f32>,
    pull_offset: SharedValue<f32>,
    content_translate_y: SharedValue<f32>,
    opacity: SharedValue<f32>,
    tab_bar_height: SharedValue<f32>,
    header_height: SharedValue<f32>,
    min_header_height: f32,
    overflow_height: f32,
    tab_view_height: SharedValue<f32>,
    sticky_header_height: SharedValue<f32>,
}

impl SharedAnimationState {
    /// Creates the state for a view configured with `args`.
    pub fn new(args: &CollapsibleTabsArgs) -> Self {
        let header_height = args.initial_header_height - args.overflow_height;
        Self {
            scroll_offset: args
                .shared_scroll_offset
                .clone()
                .unwrap_or_else(|| SharedValue::new(0.0)),
            header_translation: SharedValue::new(0.0),
            header_translate_y: SharedValue::new(0.0),
            active_index: SharedValue::new(args.initial_page),
            is_sliding_header: SharedValue::new(false),
            slide_index: SharedValue::new(Some(args.initial_page)),
            drag_index: SharedValue::new(Some(args.initial_page)),
            is_refreshing: SharedValue::new(false),
            is_refreshing_with_animation: SharedValue::new(false),
            refresh_translation: SharedValue::new(args.refresh_height),
            pull_offset: SharedValue::new(0.0),
            content_translate_y: SharedValue::new(0.0),
            opacity: SharedValue::new(if args.initial_header_height == 0.0 { 0.0 } else { 1.0 }),
            tab_bar_height: SharedValue::new(args.initial_tab_bar_height),
            header_height: SharedValue::new(header_height),
            min_header_height: args.min_header_height,
            overflow_height: args.overflow_height,
            tab_view_height: SharedValue::new(0.0),
            sticky_header_height: SharedValue::new(0.0),
        }
    }

    /// Scroll offset of the active tab's list.
    pub fn scroll_offset(&self) -> &SharedValue<f32> {
        &self.scroll_offset
    }

    /// Header translation driven by header drags.
    pub fn header_translation(&self) -> &SharedValue<f32> {
        &self.header_translation
    }

    /// Translate-y applied to the header and tab bar, derived from the scroll
    /// offset every frame.
    pub fn header_translate_y(&self) -> &SharedValue<f32> {
        &self.header_translate_y
    }

    /// Index of the visible tab.
    pub fn active_index(&self) -> &SharedValue<usize> {
        &self.active_index
    }

    /// `true` from the first header-drag update until its momentum ends.
    pub fn is_sliding_header(&self) -> &SharedValue<bool> {
        &self.is_sliding_header
    }

    /// Tab that was active when the header drag started.
    pub fn slide_index(&self) -> &SharedValue<Option<usize>> {
        &self.slide_index
    }

    /// Tab that was active when the pull started.
    pub fn drag_index(&self) -> &SharedValue<Option<usize>> {
        &self.drag_index
    }

    /// Whether a refresh is requested.
    pub fn is_refreshing(&self) -> &SharedValue<bool> {
        &self.is_refreshing
    }

    /// Follows [`Self::is_refreshing`] once the transition animation ends.
    pub fn is_refreshing_with_animation(&self) -> &SharedValue<bool> {
        &self.is_refreshing_with_animation
    }

    /// Raw refresh translation: the refresh height at rest, below it while
    /// pulling, zero while refreshing.
    pub fn refresh_translation(&self) -> &SharedValue<f32> {
        &self.refresh_translation
    }

    /// Rubber-banded pull amount derived from the refresh translation.
    pub fn pull_offset(&self) -> &SharedValue<f32> {
        &self.pull_offset
    }

    /// Translate-y of the tab view content while pulling.
    pub fn content_translate_y(&self) -> &SharedValue<f32> {
        &self.content_translate_y
    }

    /// Opacity of the whole view; fades in after the header is measured.
    pub fn opacity(&self) -> &SharedValue<f32> {
        &self.opacity
    }

    /// Measured tab bar height.
    pub fn tab_bar_height(&self) -> &SharedValue<f32> {
        &self.tab_bar_height
    }

    /// Measured header height, without the overflow part.
    pub fn header_height(&self) -> &SharedValue<f32> {
        &self.header_height
    }

    /// Height of the tab view container.
    pub fn tab_view_height(&self) -> &SharedValue<f32> {
        &self.tab_view_height
    }

    /// Height of the sticky scene header.
    pub fn sticky_header_height(&self) -> &SharedValue<f32> {
        &self.sticky_header_height
    }

    /// Height the header never collapses below.
    pub fn min_header_height(&self) -> f32 {
        self.min_header_height
    }

    /// Part of the header overlapping the tab bar.
    pub fn overflow_height(&self) -> f32 {
        self.overflow_height
    }

    /// Distance the header can collapse by scrolling.
    pub fn calc_height(&self) -> f32 {
        self.header_height.get() - self.min_header_height
    }

    /// Upper bound of the header translation.
    pub fn max_header_offset(&self, pan_header_max_offset: Option<f32>) -> f32 {
        pan_header_max_offset
            .unwrap_or_else(|| self.calc_height() + self.overflow_height)
            .max(0.0)
    }

    /// Minimum content height of every scene, so any tab can collapse the
    /// header fully.
    pub fn expect_height(&self) -> f32 {
        (self.header_height.get() + self.tab_view_height.get() - self.min_header_height).floor()
    }

    /// Top padding of every scene's content.
    pub fn padding_top(&self) -> f32 {
        self.tab_bar_height.get() + self.header_height.get() + self.sticky_header_height.get()
    }
}
