//! Pull-to-refresh indicator state.
//!
//! The indicator never owns state of its own: its phase, progress and
//! position are recomputed from the shared refresh cells whenever one of them
//! changes.

use std::sync::Arc;

use collapse_tabs_ui::{
    FrameClock, RenderSlotWith, SharedValue,
    animation::{Spring, SpringConfig},
    interpolate::{Extrapolation, interpolate},
};
use tracing::trace;

use crate::{
    config::{Color, CollapsibleTabsArgs},
    state::SharedAnimationState,
};

/// Spring pulling the indicator opacity toward the view opacity.
const OPACITY_SPRING: SpringConfig = SpringConfig {
    mass: 1.0,
    stiffness: 120.0,
    damping: 15.0,
    velocity: 0.0,
};

/// Phase of the refresh indicator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RefreshPhase {
    /// Not refreshing and nothing pulled. Any positive pull short of the
    /// refresh height is [`RefreshPhase::Cancel`].
    #[default]
    Idle,
    /// A refresh was requested and the indicator is moving into place.
    Pending,
    /// The refresh is running.
    Refreshing,
    /// The refresh ended and the indicator is moving away.
    Finish,
    /// Pulled, but not far enough to refresh.
    Cancel,
    /// Pulled far enough; releasing starts a refresh.
    Success,
}

impl RefreshPhase {
    /// Derives the phase from the refresh flags and the pull progress.
    pub fn derive(is_refreshing: bool, is_refreshing_with_animation: bool, progress: f32) -> Self {
        if is_refreshing != is_refreshing_with_animation {
            return if is_refreshing {
                RefreshPhase::Pending
            } else {
                RefreshPhase::Finish
            };
        }
        if is_refreshing {
            RefreshPhase::Refreshing
        } else if progress <= 0.0 {
            RefreshPhase::Idle
        } else if progress < 1.0 {
            RefreshPhase::Cancel
        } else {
            RefreshPhase::Success
        }
    }
}

/// Pull progress in `[0, 1]`, forced to 1 while an animated refresh runs.
pub fn refresh_progress(pull_offset: f32, refresh_height: f32, is_refreshing_with_animation: bool) -> f32 {
    if is_refreshing_with_animation {
        return 1.0;
    }
    if refresh_height <= 0.0 {
        return 0.0;
    }
    (pull_offset / refresh_height).min(1.0)
}

/// Translate-y for a pull offset: linear up to the overflow pull, then
/// stretched by `pull_extended_coefficient`.
pub fn refresh_translate_y(
    pull_offset: f32,
    refresh_height: f32,
    overflow_pull: f32,
    pull_extended_coefficient: f32,
) -> f32 {
    let knee = refresh_height + overflow_pull;
    interpolate(
        pull_offset,
        &[0.0, knee, knee + 1.0],
        &[0.0, knee, knee + pull_extended_coefficient],
        Extrapolation::Extend,
    )
}

/// Values handed to a custom refresh indicator renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RefreshControlProps {
    /// Current phase.
    pub phase: RefreshPhase,
    /// Pull progress in `[0, 1]`.
    pub progress: f32,
    /// Rubber-banded pull amount.
    pub pull_offset: f32,
    /// Configured indicator color.
    pub color: Color,
}

/// Placement of the refresh indicator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RefreshOverlayFrame {
    /// Top edge before translation; the indicator hides above the content.
    pub top: f32,
    /// Indicator height, equal to the refresh height.
    pub height: f32,
    /// Current translate-y.
    pub translate_y: f32,
    /// Current opacity.
    pub opacity: f32,
}

/// Refresh indicator of a tab view.
#[derive(Debug)]
pub struct RefreshOverlay {
    top: f32,
    height: f32,
    color: Color,
    phase: SharedValue<RefreshPhase>,
    progress: SharedValue<f32>,
    translate_y: SharedValue<f32>,
    opacity: SharedValue<f32>,
    renderer: Option<RenderSlotWith<RefreshControlProps, ()>>,
}

impl RefreshOverlay {
    pub(crate) fn new(args: &CollapsibleTabsArgs, state: &SharedAnimationState) -> Self {
        Self {
            top: args.refresh_control_top - args.refresh_height,
            height: args.refresh_height,
            color: args.refresh_control_color,
            phase: SharedValue::new(RefreshPhase::Idle),
            progress: SharedValue::new(0.0),
            translate_y: SharedValue::new(0.0),
            opacity: SharedValue::new(state.opacity().get()),
            renderer: args.render_refresh_control.clone(),
        }
    }

    /// Keeps the indicator in step with the shared refresh cells.
    pub(crate) fn attach(
        &self,
        clock: &Arc<FrameClock>,
        state: &SharedAnimationState,
        args: &CollapsibleTabsArgs,
    ) {
        let refresh_height = args.refresh_height;
        let overflow_pull = args.overflow_pull;
        let coefficient = args.pull_extended_coefficient;

        let inputs = (
            state.pull_offset().clone(),
            state.is_refreshing().clone(),
            state.is_refreshing_with_animation().clone(),
        );
        let (phase, progress, translate_y) =
            (self.phase.clone(), self.progress.clone(), self.translate_y.clone());
        clock.add_reaction(
            move || (inputs.0.get(), inputs.1.get(), inputs.2.get()),
            move |&(pull, refreshing, with_animation), _| {
                let next_progress = refresh_progress(pull, refresh_height, with_animation);
                let next_phase = RefreshPhase::derive(refreshing, with_animation, next_progress);
                progress.set_if_changed(next_progress);
                if phase.set_if_changed(next_phase) {
                    trace!(phase = ?next_phase, "refresh phase");
                }
                translate_y.set_if_changed(refresh_translate_y(
                    pull,
                    refresh_height,
                    overflow_pull,
                    coefficient,
                ));
            },
        );

        let container_opacity = state.opacity().clone();
        let opacity = self.opacity.clone();
        let weak_clock = Arc::downgrade(clock);
        clock.add_reaction(
            move || container_opacity.get(),
            move |&target, previous| {
                let Some(clock) = weak_clock.upgrade() else {
                    return;
                };
                if previous.is_none() && opacity.get() == target {
                    return;
                }
                clock.animate(&opacity, Box::new(Spring::new(target, OPACITY_SPRING)), None);
            },
        );
    }

    /// Current phase.
    pub fn phase(&self) -> RefreshPhase {
        self.phase.get()
    }

    /// Current pull progress.
    pub fn progress(&self) -> f32 {
        self.progress.get()
    }

    /// The phase cell, for hosts that observe it.
    pub fn phase_cell(&self) -> &SharedValue<RefreshPhase> {
        &self.phase
    }

    /// Current placement.
    pub fn frame(&self) -> RefreshOverlayFrame {
        RefreshOverlayFrame {
            top: self.top,
            height: self.height,
            translate_y: self.translate_y.get(),
            opacity: self.opacity.get(),
        }
    }

    /// Values for a custom renderer.
    pub fn props(&self, pull_offset: f32) -> RefreshControlProps {
        RefreshControlProps {
            phase: self.phase(),
            progress: self.progress(),
            pull_offset,
            color: self.color,
        }
    }

    /// Runs the custom renderer, if any, and returns the placement.
    pub fn render(&self, pull_offset: f32) -> RefreshOverlayFrame {
        if let Some(renderer) = &self.renderer {
            renderer.render(self.props(pull_offset));
        }
        self.frame()
    }
}
