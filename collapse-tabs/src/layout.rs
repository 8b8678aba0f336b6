//! Layout measurements and the header transform.

use collapse_tabs_ui::{
    animation::{Easing, Timing},
    interpolate::{Extrapolation, interpolate},
};
use tracing::debug;

use crate::{coordinator::GestureCoordinator, error::ConfigWarning};

/// Duration of the fade-in after the header is measured.
const HEADER_FADE_IN_MS: u32 = 300;

/// Tab bar height changes smaller than this are ignored.
const TAB_BAR_LAYOUT_TOLERANCE: f32 = 1.0;

/// Translate-y of the header for a scroll offset.
///
/// The header moves up with the content until `calc_height` is reached. On
/// surfaces that bounce past the top the header also follows the overscroll
/// downward.
pub fn header_translate_y(scroll_offset: f32, calc_height: f32, bounces: bool) -> f32 {
    let y = interpolate(
        scroll_offset,
        &[0.0, calc_height],
        &[0.0, -calc_height],
        Extrapolation::Clamp,
    );
    if bounces && scroll_offset <= 0.0 {
        -scroll_offset
    } else {
        y
    }
}

/// Layout values every scene applies to its content.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneContentStyle {
    /// Top padding so content starts below the header, tab bar and sticky
    /// header.
    pub padding_top: f32,
    /// Minimum content height, so every tab can collapse the header fully.
    pub min_height: f32,
    /// Top inset of the scroll indicator.
    pub indicator_inset_top: f32,
}

impl GestureCoordinator {
    /// The header was laid out with `height`, overflow included.
    pub fn on_header_layout(&self, height: f32) {
        let state = self.state();
        let header = height - state.overflow_height();
        state.header_height().set(header);
        if state.min_header_height() > header {
            ConfigWarning::MinHeaderAboveHeader {
                min: state.min_header_height(),
                header,
            }
            .report();
        }
        if let Some(output) = &self.args().header_height_output {
            output.set(state.calc_height().abs());
        }
        debug!(header, "header measured");
        self.clock().animate(
            state.opacity(),
            Box::new(Timing::new(1.0, HEADER_FADE_IN_MS, Easing::default())),
            None,
        );
        self.clock().flush_reactions();
    }

    /// The tab bar was laid out with `height`.
    pub fn on_tab_bar_layout(&self, height: f32) {
        let overflow = self.state().overflow_height();
        if overflow > height {
            ConfigWarning::OverflowExceedsTabBar {
                overflow,
                tab_bar: height,
            }
            .report();
        }
        let tab_bar = self.state().tab_bar_height();
        if (tab_bar.get() - height).abs() < TAB_BAR_LAYOUT_TOLERANCE {
            return;
        }
        tab_bar.set(height);
    }

    /// The tab view container was laid out.
    pub fn on_container_layout(&self, width: f32, height: f32) {
        self.state().tab_view_height().set(height);
        self.set_viewport_width(width);
    }

    /// The sticky scene header was laid out with `height`.
    pub fn on_sticky_header_layout(&self, height: f32) {
        self.state().sticky_header_height().set_if_changed(height);
    }

    /// Padding and minimum height for scene content.
    pub fn scene_content_style(&self) -> SceneContentStyle {
        let padding_top = self.state().padding_top();
        SceneContentStyle {
            padding_top,
            min_height: self.state().expect_height(),
            indicator_inset_top: padding_top,
        }
    }
}
