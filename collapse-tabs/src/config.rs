//! Configuration of the collapsible tab view.

use collapse_tabs_ui::{Callback, RenderSlotWith, SharedValue};
use derive_setters::Setters;

use crate::{
    error::ConfigWarning,
    refresh_control::RefreshControlProps,
    tab_view::{EmptyBodyFrame, HeaderFrame, Route, SceneHeaderFrame, TabBarFrame},
};

/// Default values of [`CollapsibleTabsArgs`].
pub struct CollapsibleTabsDefaults;

impl CollapsibleTabsDefaults {
    /// Pull distance that triggers a refresh.
    pub const REFRESH_HEIGHT: f32 = 65.0;
    /// Extra pull allowed past the refresh height before the indicator stiffens.
    pub const OVERFLOW_PULL: f32 = 50.0;
    /// Elasticity of the indicator once the overflow pull is used up.
    pub const PULL_EXTENDED_COEFFICIENT: f32 = 0.1;
    /// Tab bar height assumed before the first layout.
    pub const TAB_BAR_HEIGHT: f32 = 49.0;
    /// Offset of the refresh indicator from the top of the view.
    pub const REFRESH_CONTROL_TOP: f32 = 0.0;
    /// Default refresh indicator color (`#999999`).
    pub const REFRESH_CONTROL_COLOR: Color = Color::rgb(0x99, 0x99, 0x99);
}

/// RGBA color handed to refresh indicator renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Formats the color as `#rrggbb` or `#rrggbbaa` when translucent.
    pub fn to_hex(self) -> String {
        if self.a == 0xff {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// What the over-pull notification compares against the refresh height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PullThresholdMode {
    /// Raw finger travel since the pull started.
    #[default]
    RawDistance,
    /// Pull offset after resistance has been applied.
    ResistedOffset,
}

/// Arguments for [`CollapsibleTabView`](crate::CollapsibleTabView) and
/// [`GestureCoordinator`](crate::GestureCoordinator).
#[derive(Clone, Debug, Setters)]
pub struct CollapsibleTabsArgs {
    /// Pull distance that triggers a refresh.
    pub refresh_height: f32,
    /// Extra pull allowed past the refresh height.
    pub overflow_pull: f32,
    /// Elasticity of the refresh indicator past the overflow pull.
    pub pull_extended_coefficient: f32,
    /// Part of the header that overlaps the tab bar.
    pub overflow_height: f32,
    /// Height the header never collapses below.
    pub min_header_height: f32,
    /// Tab shown first.
    pub initial_page: usize,
    /// Tab bar height assumed before the first layout.
    pub initial_tab_bar_height: f32,
    /// Header height assumed before the first layout. A zero header starts
    /// transparent and fades in once measured.
    pub initial_header_height: f32,
    /// Whether the header and content recognizers are enabled.
    pub scroll_enabled: bool,
    /// Whether the view starts in the refreshing state.
    pub is_refreshing: bool,
    /// Upper bound of the header translation; defaults to the collapsible
    /// range plus the overflow height.
    #[setters(strip_option)]
    pub pan_header_max_offset: Option<f32>,
    /// Offset of the refresh indicator from the top of the view.
    pub refresh_control_top: f32,
    /// Color handed to refresh indicator renderers.
    pub refresh_control_color: Color,
    /// What the over-pull notification is measured against.
    pub pull_threshold_mode: PullThresholdMode,
    /// Run gesture callbacks inline instead of posting them to the main
    /// context.
    pub run_gestures_on_main: bool,
    /// Whether the host's scroll surfaces overscroll past the top. The header
    /// then follows negative scroll offsets.
    pub bounces: bool,
    /// Invoked when a refresh starts. Without it the refresh path is skipped.
    #[setters(skip)]
    pub on_start_refresh: Option<Callback>,
    /// Invoked once per gesture when the pull crosses the refresh height.
    #[setters(skip)]
    pub on_pull_enough: Option<Callback>,
    /// Renders the collapsible header above the tab bar.
    #[setters(skip)]
    pub render_scroll_header: Option<RenderSlotWith<HeaderFrame, ()>>,
    /// Replaces the tab strip's own tab bar.
    #[setters(skip)]
    pub render_tab_bar: Option<RenderSlotWith<TabBarFrame, ()>>,
    /// Renders a sticky header on top of each scene.
    #[setters(skip)]
    pub render_scene_header: Option<RenderSlotWith<(Route, SceneHeaderFrame), ()>>,
    /// Replaces the default refresh indicator.
    #[setters(skip)]
    pub render_refresh_control: Option<RenderSlotWith<RefreshControlProps, ()>>,
    /// Rendered instead of the tab bar when there are no routes.
    #[setters(skip)]
    pub empty_body: Option<RenderSlotWith<EmptyBodyFrame, ()>>,
    /// Externally owned scroll offset cell to use as the shared offset.
    #[setters(strip_option)]
    pub shared_scroll_offset: Option<SharedValue<f32>>,
    /// Receives the header position every time it changes.
    #[setters(strip_option)]
    pub header_position_output: Option<SharedValue<f32>>,
    /// Receives the collapsible header range after each header layout.
    #[setters(strip_option)]
    pub header_height_output: Option<SharedValue<f32>>,
}

impl Default for CollapsibleTabsArgs {
    fn default() -> Self {
        Self {
            refresh_height: CollapsibleTabsDefaults::REFRESH_HEIGHT,
            overflow_pull: CollapsibleTabsDefaults::OVERFLOW_PULL,
            pull_extended_coefficient: CollapsibleTabsDefaults::PULL_EXTENDED_COEFFICIENT,
            overflow_height: 0.0,
            min_header_height: 0.0,
            initial_page: 0,
            initial_tab_bar_height: CollapsibleTabsDefaults::TAB_BAR_HEIGHT,
            initial_header_height: 0.0,
            scroll_enabled: true,
            is_refreshing: false,
            pan_header_max_offset: None,
            refresh_control_top: CollapsibleTabsDefaults::REFRESH_CONTROL_TOP,
            refresh_control_color: CollapsibleTabsDefaults::REFRESH_CONTROL_COLOR,
            pull_threshold_mode: PullThresholdMode::default(),
            run_gestures_on_main: false,
            bounces: false,
            on_start_refresh: None,
            on_pull_enough: None,
            render_scroll_header: None,
            render_tab_bar: None,
            render_scene_header: None,
            render_refresh_control: None,
            empty_body: None,
            shared_scroll_offset: None,
            header_position_output: None,
            header_height_output: None,
        }
    }
}

impl CollapsibleTabsArgs {
    /// Sets the refresh callback.
    pub fn on_start_refresh<F>(mut self, on_start_refresh: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_start_refresh = Some(Callback::new(on_start_refresh));
        self
    }

    /// Sets the refresh callback using a shared handle.
    pub fn on_start_refresh_shared(mut self, on_start_refresh: impl Into<Callback>) -> Self {
        self.on_start_refresh = Some(on_start_refresh.into());
        self
    }

    /// Sets the over-pull notification.
    pub fn on_pull_enough<F>(mut self, on_pull_enough: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_pull_enough = Some(Callback::new(on_pull_enough));
        self
    }

    /// Sets the collapsible header renderer.
    pub fn render_scroll_header<F>(mut self, render: F) -> Self
    where
        F: Fn(HeaderFrame) + Send + Sync + 'static,
    {
        self.render_scroll_header = Some(RenderSlotWith::new(render));
        self
    }

    /// Sets a custom tab bar renderer.
    pub fn render_tab_bar<F>(mut self, render: F) -> Self
    where
        F: Fn(TabBarFrame) + Send + Sync + 'static,
    {
        self.render_tab_bar = Some(RenderSlotWith::new(render));
        self
    }

    /// Sets the sticky scene header renderer.
    pub fn render_scene_header<F>(mut self, render: F) -> Self
    where
        F: Fn((Route, SceneHeaderFrame)) + Send + Sync + 'static,
    {
        self.render_scene_header = Some(RenderSlotWith::new(render));
        self
    }

    /// Sets a custom refresh indicator renderer.
    pub fn render_refresh_control<F>(mut self, render: F) -> Self
    where
        F: Fn(RefreshControlProps) + Send + Sync + 'static,
    {
        self.render_refresh_control = Some(RenderSlotWith::new(render));
        self
    }

    /// Sets the renderer used when there are no routes.
    pub fn empty_body<F>(mut self, render: F) -> Self
    where
        F: Fn(EmptyBodyFrame) + Send + Sync + 'static,
    {
        self.empty_body = Some(RenderSlotWith::new(render));
        self
    }

    /// Lists the problems with these arguments.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if !(self.refresh_height.is_finite() && self.refresh_height > 0.0) {
            warnings.push(ConfigWarning::NonPositiveRefreshHeight(self.refresh_height));
        }
        for (field, value) in self.lengths() {
            if !(value.is_finite() && value >= 0.0) {
                warnings.push(ConfigWarning::InvalidLength { field, value });
            }
        }
        if let Some(max) = self.pan_header_max_offset
            && !(max.is_finite() && max >= 0.0)
        {
            warnings.push(ConfigWarning::InvalidLength {
                field: "pan_header_max_offset",
                value: max,
            });
        }
        if self.overflow_height > self.initial_tab_bar_height {
            warnings.push(ConfigWarning::OverflowExceedsTabBar {
                overflow: self.overflow_height,
                tab_bar: self.initial_tab_bar_height,
            });
        }
        if self.initial_header_height > 0.0 && self.min_header_height > self.initial_header_height {
            warnings.push(ConfigWarning::MinHeaderAboveHeader {
                min: self.min_header_height,
                header: self.initial_header_height,
            });
        }
        warnings
    }

    /// Returns the arguments with every invalid value replaced by a usable
    /// one, logging a warning for each problem found.
    pub fn sanitized(mut self) -> Self {
        for warning in self.validate() {
            warning.report();
        }
        if !(self.refresh_height.is_finite() && self.refresh_height > 0.0) {
            self.refresh_height = CollapsibleTabsDefaults::REFRESH_HEIGHT;
        }
        self.overflow_pull = non_negative(self.overflow_pull);
        self.pull_extended_coefficient = non_negative(self.pull_extended_coefficient);
        self.overflow_height = non_negative(self.overflow_height);
        self.min_header_height = non_negative(self.min_header_height);
        self.initial_tab_bar_height = non_negative(self.initial_tab_bar_height);
        self.initial_header_height = non_negative(self.initial_header_height);
        self.pan_header_max_offset = self
            .pan_header_max_offset
            .filter(|max| max.is_finite() && *max >= 0.0);
        self
    }

    fn lengths(&self) -> [(&'static str, f32); 7] {
        [
            ("overflow_pull", self.overflow_pull),
            ("pull_extended_coefficient", self.pull_extended_coefficient),
            ("overflow_height", self.overflow_height),
            ("min_header_height", self.min_header_height),
            ("initial_tab_bar_height", self.initial_tab_bar_height),
            ("initial_header_height", self.initial_header_height),
            ("refresh_control_top", self.refresh_control_top),
        ]
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let args = CollapsibleTabsArgs::default();
        assert_eq!(args.refresh_height, 65.0);
        assert_eq!(args.overflow_pull, 50.0);
        assert_eq!(args.pull_extended_coefficient, 0.1);
        assert_eq!(args.initial_tab_bar_height, 49.0);
        assert_eq!(args.refresh_control_color.to_hex(), "#999999");
        assert_eq!(args.pull_threshold_mode, PullThresholdMode::RawDistance);
        assert!(args.scroll_enabled);
        assert!(args.validate().is_empty());
    }

    #[test]
    fn overflow_larger_than_tab_bar_is_reported() {
        let args = CollapsibleTabsArgs::default().overflow_height(60.0);
        assert_eq!(
            args.validate(),
            vec![ConfigWarning::OverflowExceedsTabBar {
                overflow: 60.0,
                tab_bar: 49.0
            }]
        );
    }

    #[test]
    fn sanitized_replaces_invalid_values() {
        let args = CollapsibleTabsArgs::default()
            .refresh_height(-1.0)
            .min_header_height(f32::NAN)
            .pan_header_max_offset(-4.0)
            .sanitized();
        assert_eq!(args.refresh_height, CollapsibleTabsDefaults::REFRESH_HEIGHT);
        assert_eq!(args.min_header_height, 0.0);
        assert_eq!(args.pan_header_max_offset, None);
        assert!(args.validate().is_empty());
    }

    #[test]
    fn setters_chain() {
        let args = CollapsibleTabsArgs::default()
            .initial_page(2)
            .bounces(true)
            .pull_threshold_mode(PullThresholdMode::ResistedOffset)
            .on_start_refresh(|| {});
        assert_eq!(args.initial_page, 2);
        assert!(args.bounces);
        assert!(args.on_start_refresh.is_some());
    }
}
