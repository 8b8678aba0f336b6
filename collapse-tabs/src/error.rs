//! Configuration problems reported while setting up a tab view.

use thiserror::Error;

/// Non-fatal configuration problems.
///
/// Warnings are logged through `tracing` when they are detected; the widget
/// keeps running with the best-effort values from
/// [`CollapsibleTabsArgs::sanitized`](crate::CollapsibleTabsArgs::sanitized).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigWarning {
    /// The overflow height hides more than the whole tab bar.
    #[error("overflow height {overflow} is larger than the tab bar height {tab_bar}")]
    OverflowExceedsTabBar {
        /// Configured overflow height.
        overflow: f32,
        /// Measured or initial tab bar height.
        tab_bar: f32,
    },
    /// The refresh trigger distance is zero, negative or not finite.
    #[error("refresh height must be positive, got {0}")]
    NonPositiveRefreshHeight(f32),
    /// The collapse floor lies above the measured header.
    #[error("min header height {min} is larger than the header height {header}")]
    MinHeaderAboveHeader {
        /// Configured minimum header height.
        min: f32,
        /// Measured header height.
        header: f32,
    },
    /// A length that must not be negative is negative or not finite.
    #[error("{field} must be a finite, non-negative length, got {value}")]
    InvalidLength {
        /// Name of the offending option.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },
}

impl ConfigWarning {
    /// Logs the warning.
    pub(crate) fn report(&self) {
        tracing::warn!("{self}");
    }
}
