//! Axis limit and tick-step planning.

use smallvec::SmallVec;
use tracing::trace;

/// Inclusive value range shown on an axis. `bottom > top` is allowed and
/// describes a reversed axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub bottom: f64,
    pub top: f64,
}

impl AxisRange {
    #[must_use]
    pub const fn new(bottom: f64, top: f64) -> Self {
        Self { bottom, top }
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.top - self.bottom
    }
}

/// Limits policy for axes whose bounds may follow the data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatAxisRule {
    pub fixed: AxisRange,
    pub valid_min: f64,
    pub valid_max: f64,
    pub min_range: f64,
    /// Exact zeros are treated as "not yet measured".
    pub ignore_zero: bool,
}

impl FloatAxisRule {
    /// Returns the fixed range, or the data-driven one when `dynamic` is set
    /// and at least one sample is valid.
    #[must_use]
    pub fn resolve(&self, dynamic: bool, series: &[&[Option<f64>]]) -> AxisRange {
        if !dynamic {
            return self.fixed;
        }
        dynamic_float_limits(
            self.valid_min,
            self.valid_max,
            self.min_range,
            self.ignore_zero,
            series,
        )
        .unwrap_or(self.fixed)
    }
}

/// Data-driven range for values inside `[valid_min, valid_max]`.
///
/// A margin of 10% of `max(value_range, min_range)` is added on both sides.
/// When the value range is below `min_range` the missing span is split
/// between the two sides in proportion to their remaining headroom toward
/// the validity window, and the result is clamped to that window.
#[must_use]
pub fn dynamic_float_limits(
    valid_min: f64,
    valid_max: f64,
    min_range: f64,
    ignore_zero: bool,
    series: &[&[Option<f64>]],
) -> Option<AxisRange> {
    let mut extrema: Option<(f64, f64)> = None;
    for value in series.iter().flat_map(|samples| samples.iter().flatten()) {
        let value = *value;
        if !(valid_min..=valid_max).contains(&value) || (ignore_zero && value == 0.0) {
            continue;
        }
        extrema = Some(match extrema {
            None => (value, value),
            Some((low, high)) => (low.min(value), high.max(value)),
        });
    }
    let (data_min, data_max) = extrema?;

    let value_range = data_max - data_min;
    let margin = value_range.max(min_range) * 0.1;
    let mut min = data_min - margin;
    let mut max = data_max + margin;

    let extra_space = min_range - value_range;
    if extra_space > 0.0 {
        let min_remaining = min - valid_min;
        let max_remaining = valid_max - max;
        let total_remaining = min_remaining + max_remaining;

        if total_remaining > 0.0 {
            min -= extra_space * (min_remaining / total_remaining);
            max += extra_space * (max_remaining / total_remaining);
        } else {
            min -= extra_space / 2.0;
            max += extra_space / 2.0;
        }
    }

    let range = AxisRange::new(min.max(valid_min), max.min(valid_max));
    trace!(data_min, data_max, bottom = range.bottom, top = range.top, "dynamic axis limits");
    Some(range)
}

/// Top limit for bit loading, whose bottom is pinned at zero.
///
/// Returns `None` when no sample is positive.
#[must_use]
pub fn dynamic_bits_top(min_range: f64, series: &[&[Option<f64>]]) -> Option<f64> {
    let data_max = series
        .iter()
        .flat_map(|samples| samples.iter().flatten())
        .copied()
        .filter(|value| *value > 0.0)
        .reduce(f64::max)?;
    Some(data_max.max(min_range) + 0.75)
}

/// Bit loading range: fixed `0..fixed_top`, optionally lowered to fit the data.
#[must_use]
pub fn bits_axis_range(
    fixed_top: f64,
    min_range: f64,
    dynamic: bool,
    series: &[&[Option<f64>]],
) -> AxisRange {
    let top = if dynamic {
        dynamic_bits_top(min_range, series)
            .filter(|top| *top < fixed_top)
            .unwrap_or(fixed_top)
    } else {
        fixed_top
    };
    AxisRange::new(0.0, top)
}

const MAX_STEP_DOUBLINGS: usize = 64;

/// Picks the smallest candidate step whose label count fits into
/// `pixel_span / min_spacing`, doubling the largest candidate when none do.
#[must_use]
pub fn determine_step(steps: &[i64], value_range: f64, pixel_span: f64, min_spacing: f64) -> i64 {
    let fallback = steps.first().copied().unwrap_or(1).max(1);
    let range = value_range.abs();
    if !range.is_finite() || range == 0.0 {
        return fallback;
    }

    let max_count = if min_spacing > 0.0 && pixel_span.is_finite() {
        (pixel_span / min_spacing).floor().max(1.0)
    } else {
        1.0
    };
    let fits = |step: i64| range / step as f64 <= max_count;

    if let Some(step) = steps.iter().copied().filter(|step| *step > 0).find(|step| fits(*step)) {
        return step;
    }

    let mut step = steps.iter().copied().max().unwrap_or(1).max(1);
    for _ in 0..MAX_STEP_DOUBLINGS {
        step = step.saturating_mul(2);
        if fits(step) {
            break;
        }
    }
    step
}

/// First tick at or after `start` on a grid of `step`.
///
/// For a negative step (descending ticks) this is the largest multiple of
/// `|step|` at or below `start`.
#[must_use]
pub fn first_tick(start: f64, step: f64) -> f64 {
    if step > 0.0 {
        (start / step).ceil() * step + 0.0
    } else if step < 0.0 {
        let magnitude = -step;
        (start / magnitude).floor() * magnitude + 0.0
    } else {
        start
    }
}

/// How tick values of an axis are rendered as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelFormat {
    /// Plain integer (bin index, dB values).
    Integer,
    /// Tick value in kHz shown as MHz.
    Frequency,
    /// Tick value in minutes shown as d/h/min.
    Duration,
    /// Counter value with k/M suffixes.
    Count,
}

/// Everything needed to lay out one axis, excluding the step, which depends
/// on the pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisPlan {
    pub range: AxisRange,
    pub label_start: i64,
    pub label_end: i64,
    pub steps: SmallVec<[i64; 24]>,
    /// Widest label in digit widths.
    pub digits: f64,
    pub format: LabelFormat,
}

impl AxisPlan {
    #[must_use]
    pub fn new(range: AxisRange, steps: &[i64], digits: f64, format: LabelFormat) -> Self {
        let (low, high) = if range.bottom <= range.top {
            (range.bottom, range.top)
        } else {
            (range.top, range.bottom)
        };
        Self {
            range,
            label_start: low.ceil() as i64,
            label_end: high.floor() as i64,
            steps: SmallVec::from_slice(steps),
            digits,
            format,
        }
    }

    #[must_use]
    pub fn with_label_bounds(mut self, start: i64, end: i64) -> Self {
        self.label_start = start;
        self.label_end = end;
        self
    }

    /// Tick values from the first aligned tick up to `label_end`.
    #[must_use]
    pub fn tick_values(&self, step: i64) -> Vec<i64> {
        let step = step.max(1);
        let first = first_tick(self.label_start as f64, step as f64) as i64;
        (0..)
            .map(|index: i64| first + index * step)
            .take_while(|value| *value <= self.label_end)
            .collect()
    }

    /// Position of `value` along the axis, 0 at `bottom` and 1 at `top`.
    #[must_use]
    pub fn fraction(&self, value: f64) -> f64 {
        let span = self.range.span();
        if span == 0.0 || !span.is_finite() {
            return 0.0;
        }
        (value - self.range.bottom) / span
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{
        AxisPlan, AxisRange, FloatAxisRule, LabelFormat, bits_axis_range, determine_step,
        dynamic_float_limits, first_tick,
    };

    const SNR: FloatAxisRule = FloatAxisRule {
        fixed: AxisRange::new(0.0, 65.0),
        valid_min: -32.0,
        valid_max: 95.0,
        min_range: 20.0,
        ignore_zero: true,
    };

    #[test]
    fn fixed_range_is_used_without_dynamic_flag() {
        let data = [Some(40.0), Some(42.0)];
        assert_eq!(SNR.resolve(false, &[&data]), AxisRange::new(0.0, 65.0));
    }

    #[test]
    fn dynamic_range_falls_back_when_nothing_is_valid() {
        let data = [Some(0.0), Some(120.0), None];
        assert_eq!(SNR.resolve(true, &[&data]), AxisRange::new(0.0, 65.0));
    }

    #[test]
    fn narrow_data_is_widened_by_headroom() {
        let data = [Some(40.0), Some(50.0)];
        let range = dynamic_float_limits(-32.0, 95.0, 20.0, false, &[&data]).expect("valid");
        // margin 2, slack 10 split 70:43
        assert_relative_eq!(range.bottom, 38.0 - 10.0 * 70.0 / 113.0, epsilon = 1e-9);
        assert_relative_eq!(range.top, 52.0 + 10.0 * 43.0 / 113.0, epsilon = 1e-9);
        assert_relative_eq!(range.span(), 24.0, epsilon = 1e-9);
    }

    #[test]
    fn wide_data_gets_symmetric_margin() {
        let data = [Some(-100.0), Some(-50.0)];
        let range = dynamic_float_limits(-150.0, -23.0, 20.0, false, &[&data]).expect("valid");
        assert_relative_eq!(range.bottom, -105.0, epsilon = 1e-9);
        assert_relative_eq!(range.top, -45.0, epsilon = 1e-9);
    }

    #[test]
    fn limits_are_clamped_to_validity_window() {
        let data = [Some(94.0)];
        let range = dynamic_float_limits(-32.0, 95.0, 20.0, false, &[&data]).expect("valid");
        assert!(range.top <= 95.0);
        assert!(range.bottom < 94.0);
    }

    #[test]
    fn bits_top_only_shrinks() {
        let low = [Some(2.0), Some(3.0)];
        assert_relative_eq!(bits_axis_range(15.166_666_667, 4.0, true, &[&low]).top, 4.75);
        let high = [Some(15.0)];
        assert_relative_eq!(
            bits_axis_range(15.166_666_667, 4.0, true, &[&high]).top,
            15.166_666_667
        );
        assert_relative_eq!(bits_axis_range(15.166_666_667, 4.0, false, &[&low]).top, 15.166_666_667);
    }

    #[test]
    fn step_selection_respects_pixel_budget() {
        assert_eq!(determine_step(&[1, 2, 5, 10], 65.0, 100.0, 10.0), 10);
        assert_eq!(determine_step(&[1, 2, 5, 10], 65.0, 1000.0, 10.0), 1);
        assert_eq!(determine_step(&[1, 2], 15.0, 40.0, 10.0), 4);
        assert_eq!(determine_step(&[1, 2], 0.0, 40.0, 10.0), 1);
    }

    #[test]
    fn first_tick_aligns_to_step() {
        assert_relative_eq!(first_tick(-33.4, 10.0), -30.0);
        assert_relative_eq!(first_tick(20.0, 10.0), 20.0);
        assert_relative_eq!(first_tick(7.0, -5.0), 5.0);
    }

    #[test]
    fn tick_values_cover_label_bounds() {
        let plan = AxisPlan::new(AxisRange::new(-160.0, -69.0), &[20], 3.75, LabelFormat::Integer);
        assert_eq!(plan.label_start, -160);
        assert_eq!(plan.label_end, -69);
        assert_eq!(plan.tick_values(20), vec![-160, -140, -120, -100, -80]);
    }

    #[test]
    fn reversed_axis_fraction() {
        let plan = AxisPlan::new(AxisRange::new(1440.0, 0.0), &[60], 5.5, LabelFormat::Duration);
        assert_eq!(plan.label_start, 0);
        assert_eq!(plan.label_end, 1440);
        assert_relative_eq!(plan.fraction(0.0), 1.0);
        assert_relative_eq!(plan.fraction(1440.0), 0.0);
    }
}
