//! Piecewise-linear mapping between numeric ranges.

/// How [`interpolate`] treats inputs outside the first/last input stop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Extrapolation {
    /// Continue the slope of the outermost segment.
    #[default]
    Extend,
    /// Pin to the outermost output value.
    Clamp,
}

/// Linear interpolation between `a` and `b`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Maps `value` from the `input` stops onto the matching `output` stops.
///
/// `input` must be ascending and both slices must have the same length of at
/// least two; otherwise `value` is returned unchanged.
///
/// ```
/// use collapse_tabs_ui::interpolate::{Extrapolation, interpolate};
///
/// let y = interpolate(50.0, &[0.0, 100.0], &[0.0, -100.0], Extrapolation::Clamp);
/// assert_eq!(y, -50.0);
/// let clamped = interpolate(150.0, &[0.0, 100.0], &[0.0, -100.0], Extrapolation::Clamp);
/// assert_eq!(clamped, -100.0);
/// ```
pub fn interpolate(value: f32, input: &[f32], output: &[f32], extrapolation: Extrapolation) -> f32 {
    if input.len() < 2 || input.len() != output.len() {
        return value;
    }

    let last = input.len() - 1;
    let segment = input
        .windows(2)
        .position(|w| value < w[1])
        .unwrap_or(last - 1);

    let (in_lo, in_hi) = (input[segment], input[segment + 1]);
    let (out_lo, out_hi) = (output[segment], output[segment + 1]);

    if extrapolation == Extrapolation::Clamp {
        if value <= input[0] {
            return output[0];
        }
        if value >= input[last] {
            return output[last];
        }
    }

    let span = in_hi - in_lo;
    if span.abs() <= f32::EPSILON {
        return out_lo;
    }
    lerp(out_lo, out_hi, (value - in_lo) / span)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_within_segments() {
        let input = [0.0, 115.0, 116.0];
        let output = [0.0, 115.0, 115.1];
        assert_eq!(interpolate(57.5, &input, &output, Extrapolation::Extend), 57.5);
        let tail = interpolate(115.5, &input, &output, Extrapolation::Extend);
        assert!((tail - 115.05).abs() < 1e-4);
    }

    #[test]
    fn extends_past_the_last_stop() {
        let input = [0.0, 115.0, 116.0];
        let output = [0.0, 115.0, 115.1];
        let beyond = interpolate(126.0, &input, &output, Extrapolation::Extend);
        assert!((beyond - 116.1).abs() < 1e-3);
        let below = interpolate(-10.0, &input, &output, Extrapolation::Extend);
        assert!((below + 10.0).abs() < 1e-4);
    }

    #[test]
    fn clamps_when_requested() {
        assert_eq!(
            interpolate(-5.0, &[0.0, 10.0], &[0.0, -10.0], Extrapolation::Clamp),
            0.0
        );
        assert_eq!(
            interpolate(50.0, &[0.0, 10.0], &[0.0, -10.0], Extrapolation::Clamp),
            -10.0
        );
    }

    #[test]
    fn malformed_stops_pass_value_through() {
        assert_eq!(interpolate(3.0, &[0.0], &[1.0], Extrapolation::Clamp), 3.0);
        assert_eq!(interpolate(3.0, &[0.0, 1.0], &[1.0], Extrapolation::Clamp), 3.0);
    }
}
